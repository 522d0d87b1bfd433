//! Byte-stream transports carrying the text protocol.

use alloc::string::String;

/// One player's connection.
///
/// `recv` must be cancel-safe: the session races the two players' `recv`
/// futures against each other and a deadline, and a cancelled call may not
/// lose buffered input.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// Send `text` in full.
    async fn send(&mut self, text: &str) -> anyhow::Result<()>;
    /// Receive the next inbound unit: a line without its terminator.
    async fn recv(&mut self) -> anyhow::Result<String>;
    /// Close the connection. Pending and later `recv` calls on the peer fail.
    async fn close(&mut self);
    /// Non-blocking check that the peer has not gone away. Inbound data seen
    /// while checking stays buffered for the next `recv`.
    fn is_alive(&mut self) -> bool;
    /// Human-readable peer address for logs.
    fn peer(&self) -> String;
}

#[cfg(feature = "std")]
pub mod tcp;
#[cfg(feature = "std")]
pub mod in_memory;
