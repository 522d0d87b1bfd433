#![cfg(feature = "std")]

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::transport::Transport;

/// Channel-backed transport. Each `send` arrives as one `recv` unit on the
/// other end, so a multi-line server message is received whole.
pub struct InMemoryTransport {
    tx: Option<UnboundedSender<String>>,
    rx: UnboundedReceiver<String>,
    name: &'static str,
}

impl InMemoryTransport {
    /// Two connected ends: `(server side, client side)`.
    pub fn pair() -> (Self, Self) {
        let (tx1, rx1) = mpsc::unbounded_channel();
        let (tx2, rx2) = mpsc::unbounded_channel();
        (
            Self {
                tx: Some(tx1),
                rx: rx2,
                name: "memory:server",
            },
            Self {
                tx: Some(tx2),
                rx: rx1,
                name: "memory:client",
            },
        )
    }
}

#[async_trait::async_trait]
impl Transport for InMemoryTransport {
    async fn send(&mut self, text: &str) -> anyhow::Result<()> {
        let tx = self
            .tx
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("Transport is shut down"))?;
        tx.send(text.to_string())
            .map_err(|_| anyhow::anyhow!("Channel closed"))
    }

    async fn recv(&mut self) -> anyhow::Result<String> {
        self.rx
            .recv()
            .await
            .ok_or_else(|| anyhow::anyhow!("Channel closed"))
    }

    async fn close(&mut self) {
        self.tx = None;
        self.rx.close();
    }

    fn is_alive(&mut self) -> bool {
        self.tx.as_ref().is_some_and(|tx| !tx.is_closed())
    }

    fn peer(&self) -> String {
        self.name.to_string()
    }
}
