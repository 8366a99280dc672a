// src/engine/context.rs

use tokio::sync::watch;
use tracing::{error, info};

use crate::engine::recovery::{CrashRecoveryManager, LostAttempt};
use crate::engine::signals::RunSignals;
use crate::engine::state::{RunPhase, RunState};
use crate::errors::ReportError;
use crate::model::{TestFrameworkResult, TestIdentifier};
use crate::report::{ExportedReports, ReportExporter};
use crate::results::ResultAggregator;
use crate::types::ExecutionMode;

/// Per-run settings that do not change once the run starts.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub run_name: String,
    /// Also record synthetic failures for clean disconnects and malformed
    /// result messages.
    pub strict_accounting: bool,
}

impl RunSettings {
    pub fn new(run_name: impl Into<String>) -> Self {
        Self {
            run_name: run_name.into(),
            strict_accounting: false,
        }
    }

    pub fn strict(mut self, strict_accounting: bool) -> Self {
        self.strict_accounting = strict_accounting;
        self
    }
}

/// Everything a session mutates: run state, result tree, signals.
///
/// Owned by the state machine; the phase is published on a watch channel so
/// the supervisor can read it without sharing the state itself.
#[derive(Debug)]
pub struct RunContext {
    pub(crate) settings: RunSettings,
    pub(crate) state: RunState,
    pub(crate) results: ResultAggregator,
    pub(crate) signals: RunSignals,
    pub(crate) recovery: CrashRecoveryManager,
    exporter: ReportExporter,
    phase_tx: watch::Sender<RunPhase>,
    export_error: Option<ReportError>,
}

impl RunContext {
    pub fn new(
        mode: ExecutionMode,
        settings: RunSettings,
        signals: RunSignals,
        exporter: ReportExporter,
    ) -> Self {
        let (phase_tx, _) = watch::channel(RunPhase::Waiting);
        Self {
            results: ResultAggregator::new(settings.run_name.clone()),
            settings,
            state: RunState::new(mode),
            signals,
            recovery: CrashRecoveryManager::new(),
            exporter,
            phase_tx,
            export_error: None,
        }
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    pub fn results(&self) -> &ResultAggregator {
        &self.results
    }

    pub fn signals(&self) -> &RunSignals {
        &self.signals
    }

    pub fn settings(&self) -> &RunSettings {
        &self.settings
    }

    pub fn subscribe_phase(&self) -> watch::Receiver<RunPhase> {
        self.phase_tx.subscribe()
    }

    /// The export failure from finalization, if any.
    pub fn take_export_error(&mut self) -> Option<ReportError> {
        self.export_error.take()
    }

    pub(crate) fn set_phase(&mut self, phase: RunPhase) {
        if self.state.set_phase(phase) {
            info!(state = %phase, "state changed");
            self.phase_tx.send_replace(phase);
        }
    }

    /// Record a runner message for the test at `index`.
    pub(crate) fn record_result(&mut self, index: usize, identifier: &TestIdentifier, data: &str) {
        match self.results.ingest(data) {
            Ok(_) => {}
            Err(e) => {
                error!(index, %identifier, error = %e, "dropping malformed result message");
                if self.settings.strict_accounting {
                    self.record_lost(LostAttempt::Malformed, index, identifier);
                }
            }
        }
    }

    pub(crate) fn record_lost(&mut self, cause: LostAttempt, index: usize, identifier: &TestIdentifier) {
        self.recovery
            .recover(cause, index, identifier, &mut self.results, &self.signals);
    }

    /// Write the reports; an empty tree is exported when nothing was
    /// recorded. A failure is kept for [`RunContext::take_export_error`].
    pub(crate) fn export_reports(&mut self) -> Option<ExportedReports> {
        let empty;
        let framework = match self.results.framework() {
            Some(framework) => framework,
            None => {
                empty = TestFrameworkResult::new(
                    self.settings.run_name.clone(),
                    crate::engine::recovery::now_timestamp(),
                );
                &empty
            }
        };

        match self.exporter.export(framework) {
            Ok(paths) => Some(paths),
            Err(e) => {
                error!(error = %e, "failed to produce result files");
                self.export_error = Some(e);
                None
            }
        }
    }
}
