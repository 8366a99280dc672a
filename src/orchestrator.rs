// src/orchestrator.rs

//! Wires one run together: the connection listener driving the state
//! machine, the runner supervisor and the operator cancel channel, all
//! sharing the same [`RunSignals`].

use std::sync::Arc;

use tracing::{info, warn};

use crate::config::ConfigFile;
use crate::engine::{ExecutionStateMachine, ModeHandler, RunPhase, RunSettings, RunSignals};
use crate::errors::{ReportError, Result};
use crate::exec::{
    LaunchSpec, ProcessLauncher, RealProcessLauncher, SubprocessSupervisor, SupervisionReport,
    SupervisorOptions,
};
use crate::fs::{FileSystem, RealFileSystem};
use crate::model::ResultCounts;
use crate::operator::{
    OperatorCancelChannel, OperatorCancelSource, OperatorConsole, StdinConsole, build_cancel_source,
    cancel_backend_for,
};
use crate::report::ReportExporter;
use crate::server::{ConnectionListener, resolve_bind_host};
use crate::types::ExecutionMode;

/// How a run ended.
#[derive(Debug)]
pub struct RunOutcome {
    pub phase: RunPhase,
    pub progress_index: usize,
    pub total: usize,
    pub tests_recorded: usize,
    pub counts: Option<ResultCounts>,
    pub runner: SupervisionReport,
    pub operator_cancelled: bool,
    pub export_error: Option<ReportError>,
}

impl RunOutcome {
    pub fn is_finished(&self) -> bool {
        self.phase == RunPhase::Finished
    }
}

pub struct Orchestrator<L> {
    config: ConfigFile,
    launcher: L,
    cancel_source: Box<dyn OperatorCancelSource>,
    console: Option<Box<dyn OperatorConsole>>,
    fs: Arc<dyn FileSystem>,
}

impl Orchestrator<RealProcessLauncher> {
    /// Production wiring: real processes, real files, the configured
    /// cancel backend and stdin as the manual console.
    ///
    /// Manual mode swaps a keypress backend for Ctrl-C, since stdin carries
    /// the operator's commands.
    pub fn from_config(config: ConfigFile) -> Self {
        let cancel_source =
            build_cancel_source(cancel_backend_for(config.server.mode, config.operator.cancel));
        Self {
            config,
            launcher: RealProcessLauncher,
            cancel_source,
            console: None,
            fs: Arc::new(RealFileSystem),
        }
    }
}

impl<L> Orchestrator<L>
where
    L: ProcessLauncher,
{
    pub fn with_launcher<M: ProcessLauncher>(self, launcher: M) -> Orchestrator<M> {
        Orchestrator {
            config: self.config,
            launcher,
            cancel_source: self.cancel_source,
            console: self.console,
            fs: self.fs,
        }
    }

    pub fn with_cancel_source(mut self, source: Box<dyn OperatorCancelSource>) -> Self {
        self.cancel_source = source;
        self
    }

    pub fn with_console(mut self, console: Box<dyn OperatorConsole>) -> Self {
        self.console = Some(console);
        self
    }

    pub fn with_file_system(mut self, fs: Arc<dyn FileSystem>) -> Self {
        self.fs = fs;
        self
    }

    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Bind the configured address and run to completion.
    pub async fn run(self) -> Result<RunOutcome> {
        let server = &self.config.server;
        let host = resolve_bind_host(&server.host).await;
        let listener = ConnectionListener::bind(&host, server.port, server.timeout).await?;
        self.run_with_listener(listener).await
    }

    /// Run to completion on an already bound listener.
    ///
    /// Returns once the stop signal has been raised and every task has
    /// wound down. A runner that cannot be launched is an error; a failed
    /// report export is returned inside the outcome.
    pub async fn run_with_listener(self, listener: ConnectionListener) -> Result<RunOutcome> {
        let Orchestrator {
            config,
            launcher,
            cancel_source,
            console,
            fs,
        } = self;

        let mode = config.server.mode;
        info!(
            %mode,
            addr = ?listener.local_addr().ok(),
            run_name = %config.server.run_name,
            exe = %config.runner.exe,
            "starting test run"
        );

        let signals = RunSignals::new();
        let handler = ModeHandler::for_mode(mode, || {
            console.unwrap_or_else(|| Box::new(StdinConsole::new()))
        });
        let settings =
            RunSettings::new(config.server.run_name.clone()).strict(config.server.strict_accounting);
        let exporter = ReportExporter::new(fs, config.report.output_dir.clone());
        let mut machine = ExecutionStateMachine::new(handler, settings, signals.clone(), exporter);

        let options = SupervisorOptions {
            restart_delay: config.runner.restart_delay,
            shutdown_grace: match mode {
                ExecutionMode::Automatic => Some(config.runner.shutdown_grace),
                ExecutionMode::Manual => None,
            },
        };
        let supervisor = SubprocessSupervisor::new(
            launcher,
            LaunchSpec::from(&config.runner),
            options,
            signals.clone(),
            machine.subscribe_phase(),
        );
        let cancel = OperatorCancelChannel::new(cancel_source, signals.stop.clone());

        let ((), supervision, operator_cancelled) =
            tokio::join!(listener.serve(&mut machine), supervisor.run(), cancel.run());
        let runner = supervision?;

        let state = machine.state();
        let outcome = RunOutcome {
            phase: state.phase(),
            progress_index: state.progress_index(),
            total: state.total(),
            tests_recorded: machine.results().test_count(),
            counts: machine.results().framework().map(|fw| fw.counts()),
            runner,
            operator_cancelled,
            export_error: machine.take_export_error(),
        };

        if outcome.is_finished() {
            info!(
                executed = outcome.progress_index,
                total = outcome.total,
                recorded = outcome.tests_recorded,
                "test run complete"
            );
        } else {
            warn!(
                phase = %outcome.phase,
                executed = outcome.progress_index,
                total = outcome.total,
                "test run ended before completion"
            );
        }

        Ok(outcome)
    }
}
