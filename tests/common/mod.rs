#![allow(dead_code)]

pub use remotest_test_utils::init_tracing;

use std::io;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite, DuplexStream, ReadBuf};

use remotest::engine::{ExecutionStateMachine, ModeHandler, RunSettings, RunSignals};
use remotest::fs::FileSystem;
use remotest::fs::mock::MockFileSystem;
use remotest::protocol::Connection;
use remotest::report::ReportExporter;
use remotest_test_utils::runner_client::ScriptedRunner;

/// Read timeout used by in-memory sessions.
pub const SESSION_TIMEOUT: Duration = Duration::from_millis(100);

/// A state machine writing its reports into an in-memory filesystem.
pub struct Harness {
    pub machine: ExecutionStateMachine,
    pub fs: Arc<MockFileSystem>,
    pub signals: RunSignals,
}

impl Harness {
    pub fn automatic(strict_accounting: bool) -> Self {
        Self::with_handler(ModeHandler::automatic(), strict_accounting)
    }

    pub fn with_handler(handler: ModeHandler, strict_accounting: bool) -> Self {
        let fs = Arc::new(MockFileSystem::new());
        let signals = RunSignals::new();
        let exporter = ReportExporter::new(Arc::clone(&fs) as Arc<dyn FileSystem>, "results");
        let settings = RunSettings::new("xUnit").strict(strict_accounting);
        let machine = ExecutionStateMachine::new(handler, settings, signals.clone(), exporter);
        Self {
            machine,
            fs,
            signals,
        }
    }

    pub fn report(&self, file: &str) -> String {
        self.fs
            .read_to_string(std::path::Path::new("results").join(file).as_path())
            .expect("report should have been written")
    }
}

/// Both ends of an in-memory session.
pub fn session() -> (Connection<DuplexStream>, ScriptedRunner<DuplexStream>) {
    let (server, client) = tokio::io::duplex(64 * 1024);
    (
        Connection::new(server, "duplex", SESSION_TIMEOUT),
        ScriptedRunner::new(client),
    )
}

/// A peer that answers the first read with `reply`, then resets the
/// connection. Writes are discarded.
pub struct ResettingStream {
    reply: Option<Vec<u8>>,
}

impl ResettingStream {
    pub fn new(reply: &str) -> Self {
        let mut bytes = reply.as_bytes().to_vec();
        bytes.push(0);
        Self { reply: Some(bytes) }
    }
}

impl AsyncRead for ResettingStream {
    fn poll_read(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match self.reply.take() {
            Some(reply) => {
                buf.put_slice(&reply);
                Poll::Ready(Ok(()))
            }
            None => Poll::Ready(Err(io::Error::from(io::ErrorKind::ConnectionReset))),
        }
    }
}

impl AsyncWrite for ResettingStream {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}
