#![cfg(feature = "std")]
//! Connection acceptance and wiring of the server loops.

use std::net::SocketAddr;
use std::sync::Arc;

use log::{debug, info, warn};
use tokio::net::TcpListener;
use tokio::sync::watch;

use crate::{
    config::ServerConfig,
    matchmaking::{run_matchmaker, MatchmakingQueue},
    player::{Player, PlayerId},
    protocol::ServerMessage,
    registry::{run_cleanup, SessionRegistry},
    transport::{tcp::TcpTransport, Transport},
};

/// Accepts inbound connections, greets them and queues them for pairing.
pub struct ConnectionAcceptor {
    listener: TcpListener,
    queue: Arc<MatchmakingQueue>,
    next_id: u64,
}

impl ConnectionAcceptor {
    pub fn new(listener: TcpListener, queue: Arc<MatchmakingQueue>) -> Self {
        Self {
            listener,
            queue,
            next_id: 1,
        }
    }

    /// Wrap `transport` in a new player, send the welcome line and enqueue.
    /// Returns `false` if the welcome could not be delivered.
    pub async fn admit(&mut self, transport: Box<dyn Transport>) -> bool {
        let id = PlayerId(self.next_id);
        self.next_id += 1;
        let mut player = Player::new(id, transport);
        let welcome = ServerMessage::Welcome {
            name: player.name().to_string(),
        };
        if let Err(e) = player.send(&welcome).await {
            warn!("dropping {} from {}: welcome failed: {}", id, player.peer(), e);
            player.disconnect().await;
            return false;
        }
        info!("{} ({}) connected from {}", player.name(), id, player.peer());
        self.queue.enqueue(player);
        true
    }

    /// Accept until `shutdown` flips.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        loop {
            let accepted = tokio::select! {
                accepted = self.listener.accept() => accepted,
                _ = shutdown.changed() => break,
            };
            match accepted {
                Ok((stream, addr)) => {
                    debug!("accepted connection from {}", addr);
                    self.admit(Box::new(TcpTransport::new(stream))).await;
                }
                Err(e) => warn!("accept failed: {}", e),
            }
        }
        debug!("acceptor stopped");
    }
}

/// The whole server: acceptor, matchmaker and cleanup sweep sharing one
/// queue and one registry.
pub struct Server {
    config: ServerConfig,
    queue: Arc<MatchmakingQueue>,
    registry: Arc<SessionRegistry>,
}

impl Server {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            queue: Arc::new(MatchmakingQueue::new()),
            registry: Arc::new(SessionRegistry::new()),
        }
    }

    pub fn queue(&self) -> Arc<MatchmakingQueue> {
        Arc::clone(&self.queue)
    }

    pub fn registry(&self) -> Arc<SessionRegistry> {
        Arc::clone(&self.registry)
    }

    /// Bind the configured port on all interfaces.
    pub async fn bind(&self) -> anyhow::Result<TcpListener> {
        let addr = SocketAddr::from(([0, 0, 0, 0], self.config.port));
        let listener = TcpListener::bind(addr).await?;
        info!("Server is listening on {}", listener.local_addr()?);
        Ok(listener)
    }

    /// Run every loop on `listener` until `shutdown` flips, then abort the
    /// sessions still running.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: watch::Receiver<bool>,
    ) -> anyhow::Result<()> {
        let acceptor = ConnectionAcceptor::new(listener, self.queue());
        let accept = tokio::spawn(acceptor.run(shutdown.clone()));
        let matchmaker = tokio::spawn(run_matchmaker(
            self.queue(),
            self.registry(),
            self.config.clone(),
            shutdown.clone(),
        ));
        let cleanup = tokio::spawn(run_cleanup(
            self.registry(),
            self.config.cleanup_interval,
            shutdown,
        ));

        let (accept, matchmaker, cleanup) = tokio::join!(accept, matchmaker, cleanup);
        accept?;
        matchmaker?;
        cleanup?;

        self.registry.abort_all();
        info!("Server shutdown complete");
        Ok(())
    }
}
