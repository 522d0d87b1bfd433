#![cfg(feature = "std")]

use std::io::ErrorKind;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpStream, ToSocketAddrs};
use tokio::time::sleep;

use crate::config::{MAX_LINE_LEN, SEND_BACKOFF};
use crate::transport::Transport;

/// Read chunk size.
const READ_CHUNK: usize = 512;

/// Newline-delimited text over TCP.
pub struct TcpTransport {
    reader: OwnedReadHalf,
    writer: OwnedWriteHalf,
    pending: Vec<u8>,
    peer: String,
    closed: bool,
}

impl TcpTransport {
    pub fn new(stream: TcpStream) -> Self {
        let peer = stream
            .peer_addr()
            .map(|addr| addr.to_string())
            .unwrap_or_else(|_| "unknown".to_string());
        let (reader, writer) = stream.into_split();
        Self {
            reader,
            writer,
            pending: Vec::new(),
            peer,
            closed: false,
        }
    }

    pub async fn connect<A: ToSocketAddrs>(addr: A) -> anyhow::Result<Self> {
        let stream = TcpStream::connect(addr).await?;
        Ok(Self::new(stream))
    }

    /// Pop the first complete line out of the buffer.
    fn take_line(&mut self) -> Option<String> {
        let end = self.pending.iter().position(|&b| b == b'\n')?;
        let raw: Vec<u8> = self.pending.drain(..=end).collect();
        let line = String::from_utf8_lossy(&raw);
        Some(line.trim_end_matches(&['\r', '\n'][..]).to_string())
    }
}

fn io_error(e: std::io::Error, op: &str) -> anyhow::Error {
    match e.kind() {
        ErrorKind::UnexpectedEof => anyhow::anyhow!("Connection closed by peer"),
        ErrorKind::ConnectionReset | ErrorKind::BrokenPipe | ErrorKind::ConnectionAborted => {
            anyhow::anyhow!("Connection reset by peer")
        }
        _ => anyhow::anyhow!("{} error: {}", op, e),
    }
}

#[async_trait::async_trait]
impl Transport for TcpTransport {
    /// Writes until the whole message is flushed. A full send buffer is
    /// retried after [`SEND_BACKOFF`]; any other error is fatal.
    async fn send(&mut self, text: &str) -> anyhow::Result<()> {
        if self.closed {
            return Err(anyhow::anyhow!("Transport is shut down"));
        }
        let mut data = text.as_bytes();
        while !data.is_empty() {
            match self.writer.try_write(data) {
                Ok(0) => return Err(anyhow::anyhow!("Connection closed by peer")),
                Ok(n) => data = &data[n..],
                Err(e) if e.kind() == ErrorKind::WouldBlock => sleep(SEND_BACKOFF).await,
                Err(e) => return Err(io_error(e, "Write")),
            }
        }
        Ok(())
    }

    async fn recv(&mut self) -> anyhow::Result<String> {
        loop {
            if let Some(line) = self.take_line() {
                return Ok(line);
            }
            if self.closed {
                return Err(anyhow::anyhow!("Transport is shut down"));
            }
            if self.pending.len() > MAX_LINE_LEN {
                return Err(anyhow::anyhow!(
                    "Line too long: more than {} bytes without a newline",
                    MAX_LINE_LEN
                ));
            }
            let mut chunk = [0u8; READ_CHUNK];
            let n = self
                .reader
                .read(&mut chunk)
                .await
                .map_err(|e| io_error(e, "Read"))?;
            if n == 0 {
                return Err(anyhow::anyhow!("Connection closed by peer"));
            }
            self.pending.extend_from_slice(&chunk[..n]);
        }
    }

    /// Drains whatever the socket has ready without waiting. EOF or a hard
    /// read error means the peer is gone.
    fn is_alive(&mut self) -> bool {
        if self.closed {
            return false;
        }
        let mut chunk = [0u8; READ_CHUNK];
        while self.pending.len() <= MAX_LINE_LEN {
            match self.reader.try_read(&mut chunk) {
                Ok(0) => return false,
                Ok(n) => self.pending.extend_from_slice(&chunk[..n]),
                Err(e) if e.kind() == ErrorKind::WouldBlock => return true,
                Err(_) => return false,
            }
        }
        true
    }

    async fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            let _ = self.writer.shutdown().await;
        }
    }

    fn peer(&self) -> String {
        self.peer.clone()
    }
}
