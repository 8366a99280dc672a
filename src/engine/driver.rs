// src/engine/driver.rs

//! Protocol drivers: what one session does, per execution mode.
//!
//! The mode is chosen once, when the [`ModeHandler`] is built; after that
//! a session is just `handler.drive(ctx, conn)`.

use std::fmt;

use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, info, warn};

use crate::engine::context::RunContext;
use crate::engine::machine::run_pending_tests;
use crate::engine::state::RunPhase;
use crate::model::parse_test_list;
use crate::operator::OperatorConsole;
use crate::protocol::{Connection, Received, RemoteCommand, is_exit_command};
use crate::types::ExecutionMode;

pub enum ModeHandler {
    /// Discover the test list, then run it in order.
    Automatic,
    /// Forward operator commands verbatim.
    Manual(ManualDriver),
}

impl ModeHandler {
    pub fn automatic() -> Self {
        ModeHandler::Automatic
    }

    pub fn manual(console: Box<dyn OperatorConsole>) -> Self {
        ModeHandler::Manual(ManualDriver::new(console))
    }

    /// Build the handler for `mode`; the console is only created for manual
    /// mode.
    pub fn for_mode(
        mode: ExecutionMode,
        console: impl FnOnce() -> Box<dyn OperatorConsole>,
    ) -> Self {
        match mode {
            ExecutionMode::Automatic => Self::automatic(),
            ExecutionMode::Manual => Self::manual(console()),
        }
    }

    pub fn mode(&self) -> ExecutionMode {
        match self {
            ModeHandler::Automatic => ExecutionMode::Automatic,
            ModeHandler::Manual(_) => ExecutionMode::Manual,
        }
    }

    /// Drive one fresh session.
    pub(crate) async fn drive<S>(&mut self, ctx: &mut RunContext, conn: &mut Connection<S>)
    where
        S: AsyncRead + AsyncWrite + Unpin + Send,
    {
        match self {
            ModeHandler::Automatic => start_automatic(ctx, conn).await,
            ModeHandler::Manual(driver) => driver.drive(ctx, conn).await,
        }
    }
}

impl fmt::Debug for ModeHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModeHandler::Automatic => f.write_str("Automatic"),
            ModeHandler::Manual(_) => f.write_str("Manual"),
        }
    }
}

/// Fresh automatic session: discover the tests, then enter the run loop.
///
/// A failed or empty discovery ends the session without touching the test
/// list; the next connection starts over.
async fn start_automatic<S>(ctx: &mut RunContext, conn: &mut Connection<S>)
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    ctx.set_phase(RunPhase::Starting);

    if conn.send(&RemoteCommand::GetTests).await.is_err() {
        return;
    }

    let body = match conn.receive().await {
        Received::Data(body) => body,
        other => {
            warn!(peer = %conn.peer(), outcome = ?other, "no test list received; ending session");
            return;
        }
    };

    let tests = parse_test_list(&body);
    info!(count = tests.len(), "received test list");
    ctx.state.assign_tests(tests);

    ctx.set_phase(RunPhase::Running);
    run_pending_tests(ctx, conn).await;
}

/// Manual session: relay operator commands until `EXIT`/`QUIT`.
pub struct ManualDriver {
    console: Box<dyn OperatorConsole>,
}

impl ManualDriver {
    pub fn new(console: Box<dyn OperatorConsole>) -> Self {
        Self { console }
    }

    async fn drive<S>(&mut self, ctx: &mut RunContext, conn: &mut Connection<S>)
    where
        S: AsyncRead + AsyncWrite + Unpin + Send,
    {
        ctx.set_phase(RunPhase::Running);

        // The operator drives from here on; nothing is left to schedule.
        ctx.signals.stop.cancel();

        loop {
            let command = match self.console.read_command().await {
                Some(command) => command,
                None => {
                    info!("operator input closed; sending EXIT");
                    let _ = conn.send(&RemoteCommand::Exit).await;
                    break;
                }
            };

            if conn.send(&RemoteCommand::Raw(command.clone())).await.is_err() {
                return;
            }

            if is_exit_command(&command) {
                info!("waiting for client to disconnect...");
                break;
            }

            match conn.receive().await {
                Received::Data(response) => self.console.show_response(&response),
                other => {
                    debug!(outcome = ?other, "no response from client; ending manual session");
                    return;
                }
            }
        }

        ctx.set_phase(RunPhase::Finished);
    }
}
