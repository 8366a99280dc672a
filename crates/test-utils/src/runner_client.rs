use std::net::SocketAddr;

use serde_json::{Value, json};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;

/// The runner's side of a session, driven step by step from a test.
pub struct ScriptedRunner<S> {
    stream: S,
}

impl ScriptedRunner<TcpStream> {
    pub async fn connect(addr: SocketAddr) -> anyhow::Result<Self> {
        Ok(Self::new(TcpStream::connect(addr).await?))
    }
}

impl<S> ScriptedRunner<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S) -> Self {
        Self { stream }
    }

    /// Read one NUL-terminated command. Returns `None` if the server closed
    /// the connection first.
    pub async fn next_command(&mut self) -> anyhow::Result<Option<String>> {
        let mut bytes = Vec::new();
        loop {
            let mut byte = [0u8; 1];
            let n = self.stream.read(&mut byte).await?;
            if n == 0 {
                return Ok(None);
            }
            if byte[0] == 0 {
                return Ok(Some(String::from_utf8(bytes)?));
            }
            bytes.push(byte[0]);
        }
    }

    /// Read one command and check it.
    pub async fn expect_command(&mut self, expected: &str) -> anyhow::Result<()> {
        match self.next_command().await? {
            Some(cmd) if cmd == expected => Ok(()),
            Some(cmd) => anyhow::bail!("expected command {expected:?}, got {cmd:?}"),
            None => anyhow::bail!("expected command {expected:?}, connection closed"),
        }
    }

    pub async fn reply(&mut self, text: &str) -> anyhow::Result<()> {
        self.stream.write_all(text.as_bytes()).await?;
        self.stream.flush().await?;
        Ok(())
    }

    /// Close the connection without replying.
    pub async fn hang_up(mut self) -> anyhow::Result<()> {
        self.stream.shutdown().await?;
        Ok(())
    }

    pub fn into_inner(self) -> S {
        self.stream
    }
}

/// Body of a result message for one test.
pub fn result_message(suite: &str, name: &str, status: &str, duration_us: u64) -> String {
    result_message_with(
        suite,
        json!({
            "name": name,
            "result": status,
            "duration": duration_us,
            "assertions": 1,
            "exceptions": [],
            "errors": [],
        }),
    )
}

/// Result message with caller-supplied details.
pub fn result_message_with(suite: &str, details: Value) -> String {
    json!({
        "details": details,
        "suite": suite,
        "timestamp": 100,
    })
    .to_string()
}
