// src/engine/machine.rs

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::engine::context::{RunContext, RunSettings};
use crate::engine::driver::ModeHandler;
use crate::engine::recovery::LostAttempt;
use crate::engine::signals::RunSignals;
use crate::engine::state::{RunPhase, RunState};
use crate::errors::ReportError;
use crate::protocol::{Connection, Received, RemoteCommand};
use crate::report::ReportExporter;
use crate::results::ResultAggregator;

/// Owns the run and decides, per connection, between a fresh start and
/// resuming at the stored progress index.
///
/// All mutation of run state and results goes through
/// [`ExecutionStateMachine::handle_session`], which the listener calls for one
/// connection at a time.
#[derive(Debug)]
pub struct ExecutionStateMachine {
    handler: ModeHandler,
    ctx: RunContext,
}

impl ExecutionStateMachine {
    pub fn new(
        handler: ModeHandler,
        settings: RunSettings,
        signals: RunSignals,
        exporter: ReportExporter,
    ) -> Self {
        let ctx = RunContext::new(handler.mode(), settings, signals, exporter);
        Self { handler, ctx }
    }

    pub fn context(&self) -> &RunContext {
        &self.ctx
    }

    pub fn state(&self) -> &RunState {
        self.ctx.state()
    }

    pub fn results(&self) -> &ResultAggregator {
        self.ctx.results()
    }

    pub fn signals(&self) -> &RunSignals {
        self.ctx.signals()
    }

    pub fn subscribe_phase(&self) -> watch::Receiver<RunPhase> {
        self.ctx.subscribe_phase()
    }

    pub fn take_export_error(&mut self) -> Option<ReportError> {
        self.ctx.take_export_error()
    }

    /// A manual session keeps going after the stop signal; it ends when the
    /// operator exits.
    pub fn session_outlives_stop(&self) -> bool {
        matches!(self.handler, ModeHandler::Manual(_))
    }

    /// Service one client connection.
    pub async fn handle_session<S>(&mut self, conn: &mut Connection<S>)
    where
        S: AsyncRead + AsyncWrite + Unpin + Send,
    {
        info!(peer = %conn.peer(), "client connected");

        if self.ctx.state.phase() == RunPhase::Finished {
            warn!(peer = %conn.peer(), "run already finished; ignoring connection");
            return;
        }

        if self.ctx.state.should_resume() {
            info!(
                index = self.ctx.state.progress_index(),
                total = self.ctx.state.total(),
                "resuming test run after reconnect"
            );
            run_pending_tests(&mut self.ctx, conn).await;
            return;
        }

        self.handler.drive(&mut self.ctx, conn).await;
    }
}

/// The automatic run loop, from the stored progress index to the end of
/// the list.
///
/// Every attempt advances the index exactly once, whatever happened to it.
/// An attempt without data ends the session; if it was the last test the
/// run is finalized right away.
pub(crate) async fn run_pending_tests<S>(ctx: &mut RunContext, conn: &mut Connection<S>)
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    while let Some(identifier) = ctx.state.current_test().cloned() {
        let index = ctx.state.progress_index();
        debug!(index, %identifier, "running test");

        if conn.send(&RemoteCommand::Run(identifier.clone())).await.is_err() {
            warn!(index, %identifier, "failed to send command, aborting test run");
            return;
        }

        let lost = match conn.receive().await {
            Received::Data(data) => {
                debug!(index, %identifier, "processing test result");
                ctx.record_result(index, &identifier, &data);
                None
            }
            Received::TimedOut => {
                ctx.record_lost(LostAttempt::TimedOut, index, &identifier);
                Some(LostAttempt::TimedOut)
            }
            Received::Lost(_) => {
                ctx.record_lost(LostAttempt::ConnectionLost, index, &identifier);
                Some(LostAttempt::ConnectionLost)
            }
            Received::Empty => {
                if ctx.settings.strict_accounting {
                    ctx.record_lost(LostAttempt::Disconnected, index, &identifier);
                }
                Some(LostAttempt::Disconnected)
            }
        };

        ctx.state.advance();

        if let Some(cause) = lost {
            warn!(index, %identifier, ?cause, "no data received, aborting test run");
            if ctx.state.is_complete() {
                finish_run(ctx, conn).await;
            }
            return;
        }
    }

    if ctx.state.is_complete() {
        finish_run(ctx, conn).await;
    }
}

/// Mark the run finished, export the reports, tell the runner to exit and
/// raise the stop signal.
async fn finish_run<S>(ctx: &mut RunContext, conn: &mut Connection<S>)
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    ctx.set_phase(RunPhase::Finished);

    let exported = ctx.export_reports();

    if let Some(framework) = ctx.results.framework() {
        let summary = framework.summary();
        match serde_json::to_string_pretty(&summary) {
            Ok(text) => info!("run summary:\n{text}"),
            Err(e) => debug!(error = %e, "could not render run summary"),
        }
    }

    match exported {
        Some(paths) => info!(
            xml = %paths.xml.display(),
            json = %paths.json.display(),
            tests = ctx.results.test_count(),
            "all tests executed"
        ),
        None => warn!("test run finished but reports could not be written"),
    }

    if conn.send(&RemoteCommand::Exit).await.is_ok() {
        info!("sent EXIT command to client");
    }

    ctx.signals.stop.cancel();
    info!("test run completion signal set");
}
