// src/exec/supervisor.rs

use std::time::Duration;

use tokio::sync::watch;
use tokio::time;
use tracing::{debug, error, info, warn};

use crate::engine::{RunPhase, RunSignals};
use crate::errors::{RemotestError, Result};
use crate::exec::launcher::{LaunchSpec, ProcessLauncher, RunnerProcess};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SupervisorOptions {
    /// Pause between an exit and the relaunch.
    pub restart_delay: Duration,
    /// How long the runner may take to exit once the run is stopped before
    /// it is killed. `None` waits for it to exit on its own.
    pub shutdown_grace: Option<Duration>,
}

impl Default for SupervisorOptions {
    fn default() -> Self {
        Self {
            restart_delay: Duration::from_millis(500),
            shutdown_grace: Some(Duration::from_secs(5)),
        }
    }
}

/// What happened to the runner over the whole run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SupervisionReport {
    pub launches: usize,
    pub reboots: usize,
    pub unexpected_exits: usize,
}

enum ChildEvent {
    Stopped,
    RebootRequested,
    Exited(std::io::Result<Option<i32>>),
}

/// Keeps the runner process alive until the run is stopped.
///
/// - an exit before the run finished relaunches the runner after
///   `restart_delay`;
/// - a reboot request kills the current process and relaunches it;
/// - the stop signal ends supervision, giving the runner `shutdown_grace`
///   to exit before it is killed. Without a grace period the runner is
///   left to exit on its own, unless no session ever started.
pub struct SubprocessSupervisor<L> {
    launcher: L,
    spec: LaunchSpec,
    options: SupervisorOptions,
    signals: RunSignals,
    phase: watch::Receiver<RunPhase>,
}

impl<L> SubprocessSupervisor<L>
where
    L: ProcessLauncher,
{
    pub fn new(
        launcher: L,
        spec: LaunchSpec,
        options: SupervisorOptions,
        signals: RunSignals,
        phase: watch::Receiver<RunPhase>,
    ) -> Self {
        Self {
            launcher,
            spec,
            options,
            signals,
            phase,
        }
    }

    /// Run until the stop signal is raised.
    ///
    /// A failed launch is fatal: the stop signal is raised so the rest of
    /// the run winds down, and the error is returned.
    pub async fn run(mut self) -> Result<SupervisionReport> {
        let mut report = SupervisionReport::default();

        while !self.signals.is_stopped() {
            let mut child = match self.launcher.launch(&self.spec) {
                Ok(child) => child,
                Err(e) => {
                    error!(exe = %self.spec.exe, error = %e, "failed to launch runner");
                    self.signals.stop.cancel();
                    return Err(RemotestError::LaunchError(format!("{e:#}")));
                }
            };
            report.launches += 1;
            info!(pid = ?child.id(), launches = report.launches, "runner started");

            let event = tokio::select! {
                biased;
                _ = self.signals.stop.cancelled() => ChildEvent::Stopped,
                _ = self.signals.reboot.requested() => ChildEvent::RebootRequested,
                status = child.wait() => ChildEvent::Exited(status),
            };

            match event {
                ChildEvent::Stopped => {
                    self.shutdown(child.as_mut()).await;
                    break;
                }
                ChildEvent::RebootRequested => {
                    report.reboots += 1;
                    info!(pid = ?child.id(), "reboot requested; killing runner");
                    kill(child.as_mut()).await;
                }
                ChildEvent::Exited(status) => {
                    if self.is_finished() {
                        debug!(?status, "runner exited after the run finished");
                        break;
                    }
                    report.unexpected_exits += 1;
                    match status {
                        Ok(exit_code) => warn!(?exit_code, "runner exited before the run finished"),
                        Err(e) => warn!(error = %e, "failed to wait for runner"),
                    }
                }
            }

            if !self.pause_before_restart().await {
                break;
            }
        }

        info!(
            launches = report.launches,
            reboots = report.reboots,
            "runner supervision ended"
        );
        Ok(report)
    }

    fn is_finished(&self) -> bool {
        self.signals.is_stopped() || *self.phase.borrow() == RunPhase::Finished
    }

    /// Sleep for the restart delay. Returns `false` if the run was stopped
    /// meanwhile.
    async fn pause_before_restart(&self) -> bool {
        tokio::select! {
            _ = self.signals.stop.cancelled() => false,
            _ = time::sleep(self.options.restart_delay) => true,
        }
    }

    async fn shutdown(&self, child: &mut dyn RunnerProcess) {
        match self.options.shutdown_grace {
            Some(grace) => match time::timeout(grace, child.wait()).await {
                Ok(status) => debug!(?status, "runner exited"),
                Err(_) => {
                    warn!(grace = ?grace, "runner did not exit in time; killing it");
                    kill(child).await;
                }
            },
            None if *self.phase.borrow() == RunPhase::Waiting => {
                info!("run stopped before any session started; killing runner");
                kill(child).await;
            }
            None => {
                debug!("waiting for runner to exit");
                if let Err(e) = child.wait().await {
                    warn!(error = %e, "failed to wait for runner");
                }
            }
        }
    }
}

async fn kill(child: &mut dyn RunnerProcess) {
    if let Err(e) = child.kill().await {
        warn!(pid = ?child.id(), error = %e, "failed to kill runner");
    }
}
