// src/protocol/connection.rs

use std::io;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::timeout;
use tracing::{debug, error, info};

use crate::protocol::command::RemoteCommand;

/// Upper bound for a single response read.
pub const MAX_RESPONSE_BYTES: usize = 8_000_000;

/// Result of waiting for one response.
#[derive(Debug)]
pub enum Received {
    /// A non-empty, trimmed message.
    Data(String),
    /// The runner closed the connection, or sent nothing but whitespace.
    Empty,
    /// Nothing arrived within the read timeout.
    TimedOut,
    /// The connection broke while reading.
    Lost(io::Error),
}

/// One client session's socket, with a bounded read timeout.
///
/// Generic over the stream so tests can drive it through an in-memory
/// duplex pipe.
#[derive(Debug)]
pub struct Connection<S> {
    stream: S,
    peer: String,
    read_timeout: Duration,
    buf: Vec<u8>,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    pub fn new(stream: S, peer: impl Into<String>, read_timeout: Duration) -> Self {
        Self {
            stream,
            peer: peer.into(),
            read_timeout,
            buf: Vec::new(),
        }
    }

    pub fn peer(&self) -> &str {
        &self.peer
    }

    pub fn read_timeout(&self) -> Duration {
        self.read_timeout
    }

    /// Send one NUL-terminated command.
    pub async fn send(&mut self, command: &RemoteCommand) -> io::Result<()> {
        let result = async {
            self.stream.write_all(&command.encode()).await?;
            self.stream.flush().await
        }
        .await;

        match &result {
            Ok(()) => debug!(peer = %self.peer, %command, "sent"),
            Err(e) => error!(peer = %self.peer, error = %e, "connection lost while sending data to client"),
        }
        result
    }

    /// Wait for one response, bounded by the read timeout.
    pub async fn receive(&mut self) -> Received {
        if self.buf.len() != MAX_RESPONSE_BYTES {
            self.buf.resize(MAX_RESPONSE_BYTES, 0);
        }

        let read = timeout(self.read_timeout, self.stream.read(&mut self.buf)).await;
        match read {
            Err(_elapsed) => {
                error!(
                    peer = %self.peer,
                    timeout = ?self.read_timeout,
                    "client did not respond in time"
                );
                Received::TimedOut
            }
            Ok(Err(e)) => {
                error!(peer = %self.peer, error = %e, "connection lost while reading data from client");
                Received::Lost(e)
            }
            Ok(Ok(0)) => {
                info!(peer = %self.peer, "client disconnected");
                Received::Empty
            }
            Ok(Ok(n)) => {
                let text = String::from_utf8_lossy(&self.buf[..n]);
                let trimmed = text.trim_matches(|c: char| c.is_whitespace() || c == '\0');
                if trimmed.is_empty() {
                    debug!(peer = %self.peer, bytes = n, "received blank message");
                    return Received::Empty;
                }
                debug!(peer = %self.peer, bytes = n, "received: {}", trimmed);
                Received::Data(trimmed.to_string())
            }
        }
    }

    /// Close the write side; errors are logged and otherwise ignored.
    pub async fn shutdown(&mut self) {
        if let Err(e) = self.stream.shutdown().await {
            debug!(peer = %self.peer, error = %e, "error during connection cleanup");
        }
    }
}
