#![cfg(feature = "std")]
//! Player connection handle: one transport plus that player's boards.

use core::fmt;

use log::debug;
use rand::Rng;

use crate::{
    board::{Board, EnemyView},
    common::{BoardError, ShotOutcome},
    protocol::ServerMessage,
    transport::Transport,
};

/// Identity assigned by the acceptor, unique for the server's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

pub struct Player {
    id: PlayerId,
    name: String,
    transport: Box<dyn Transport>,
    board: Board,
    enemy_view: EnemyView,
    ready: bool,
    connected: bool,
}

impl Player {
    /// New player named `Player <id>`.
    pub fn new(id: PlayerId, transport: Box<dyn Transport>) -> Self {
        Self::with_name(id, format!("Player {}", id.0), transport)
    }

    pub fn with_name(id: PlayerId, name: impl Into<String>, transport: Box<dyn Transport>) -> Self {
        Self {
            id,
            name: name.into(),
            transport,
            board: Board::new(),
            enemy_view: EnemyView::new(),
            ready: false,
            connected: true,
        }
    }

    pub fn id(&self) -> PlayerId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn peer(&self) -> String {
        self.transport.peer()
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn enemy_view(&self) -> &EnemyView {
        &self.enemy_view
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn set_ready(&mut self, ready: bool) {
        self.ready = ready;
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Clear both boards and randomly place `fleet`.
    pub fn auto_place<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        fleet: &[usize],
    ) -> Result<usize, BoardError> {
        self.enemy_view.clear();
        self.ready = false;
        self.board.auto_place(rng, fleet)
    }

    /// Shoot at (x, y) on `target`'s board, recording the result in our view.
    pub fn fire_at(&mut self, target: &mut Player, x: usize, y: usize) -> ShotOutcome {
        target.board.resolve_shot(&mut self.enemy_view, x, y)
    }

    /// `YOUR_TURN` prompt with both renderings.
    pub fn your_turn(&self) -> ServerMessage {
        ServerMessage::YourTurn {
            board: self.board.render(true),
            view: self.enemy_view.render(),
        }
    }

    /// `OPPONENT_TURN` notice with both renderings.
    pub fn opponent_turn(&self) -> ServerMessage {
        ServerMessage::OpponentTurn {
            board: self.board.render(true),
            view: self.enemy_view.render(),
        }
    }

    /// Send a message. Any failure marks the player disconnected.
    pub async fn send(&mut self, msg: &ServerMessage) -> anyhow::Result<()> {
        if !self.connected {
            return Err(anyhow::anyhow!("{} is disconnected", self.name));
        }
        let result = self.transport.send(&msg.to_string()).await;
        if let Err(e) = &result {
            debug!("send to {} ({}) failed: {}", self.name, self.id, e);
            self.connected = false;
        }
        result
    }

    /// Best-effort send used for farewells; returns whether it went out.
    pub async fn notify(&mut self, msg: &ServerMessage) -> bool {
        self.send(msg).await.is_ok()
    }

    /// Receive the next command line. Cancel-safe; any failure marks the
    /// player disconnected.
    pub async fn recv(&mut self) -> anyhow::Result<String> {
        if !self.connected {
            return Err(anyhow::anyhow!("{} is disconnected", self.name));
        }
        let result = self.transport.recv().await;
        if let Err(e) = &result {
            debug!("receive from {} ({}) failed: {}", self.name, self.id, e);
            self.connected = false;
        }
        result
    }

    /// Probe the connection without blocking. A dead peer marks the player
    /// disconnected.
    pub fn check_alive(&mut self) -> bool {
        if self.connected && !self.transport.is_alive() {
            debug!("{} ({}) is gone", self.name, self.id);
            self.connected = false;
        }
        self.connected
    }

    /// Close the connection.
    pub async fn disconnect(&mut self) {
        self.transport.close().await;
        self.connected = false;
        self.ready = false;
    }
}

impl fmt::Debug for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Player")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("ready", &self.ready)
            .field("connected", &self.connected)
            .finish()
    }
}
