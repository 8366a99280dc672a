// src/server/listener.rs

use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

use crate::engine::ExecutionStateMachine;
use crate::errors::Result;
use crate::protocol::Connection;

/// Accepts runner connections until the stop signal is raised.
///
/// Sessions are served strictly one after another, so the state machine
/// only ever has a single writer.
#[derive(Debug)]
pub struct ConnectionListener {
    listener: TcpListener,
    read_timeout: Duration,
}

impl ConnectionListener {
    pub async fn bind(host: &str, port: u16, read_timeout: Duration) -> Result<Self> {
        let listener = TcpListener::bind((host, port))
            .await
            .with_context(|| format!("binding {host}:{port}"))?;
        Ok(Self::from_listener(listener, read_timeout))
    }

    pub fn from_listener(listener: TcpListener, read_timeout: Duration) -> Self {
        Self {
            listener,
            read_timeout,
        }
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Serve connections until the run stops.
    ///
    /// An automatic session in progress is abandoned when the stop signal
    /// is raised; a manual session runs until the operator exits.
    pub async fn serve(self, machine: &mut ExecutionStateMachine) {
        let stop = machine.signals().stop.clone();
        match self.local_addr() {
            Ok(addr) => info!(%addr, "server listening"),
            Err(e) => debug!(error = %e, "listening on unknown address"),
        }

        loop {
            let accepted = tokio::select! {
                biased;
                _ = stop.cancelled() => break,
                accepted = self.listener.accept() => accepted,
            };

            let (stream, peer) = match accepted {
                Ok(pair) => pair,
                Err(e) => {
                    warn!(error = %e, "failed to accept connection");
                    continue;
                }
            };

            let mut conn = Connection::new(stream, peer.to_string(), self.read_timeout);

            if machine.session_outlives_stop() {
                machine.handle_session(&mut conn).await;
            } else {
                tokio::select! {
                    biased;
                    _ = machine.handle_session(&mut conn) => {}
                    _ = stop.cancelled() => {
                        info!(peer = %conn.peer(), "stop signal raised; abandoning session");
                    }
                }
            }

            conn.shutdown().await;
            info!(peer = %peer, "client disconnected");
        }

        info!("server stopped accepting connections");
    }
}
