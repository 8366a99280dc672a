// src/exec/launcher.rs

use std::future::Future;
use std::io;
use std::pin::Pin;
use std::process::Stdio;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tracing::{debug, info};

use crate::config::RunnerConfig;
use crate::logging::RUNNER_TARGET;

/// Executable and arguments of the runner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchSpec {
    pub exe: String,
    pub args: Vec<String>,
}

impl From<&RunnerConfig> for LaunchSpec {
    fn from(cfg: &RunnerConfig) -> Self {
        Self {
            exe: cfg.exe.clone(),
            args: cfg.args.clone(),
        }
    }
}

/// A launched runner process.
pub trait RunnerProcess: Send {
    fn id(&self) -> Option<u32>;

    /// Wait for exit and return the exit code, if the platform reports one.
    ///
    /// Must be cancel-safe: the supervisor races it against other signals.
    fn wait(&mut self) -> Pin<Box<dyn Future<Output = io::Result<Option<i32>>> + Send + '_>>;

    /// Kill the process and reap it.
    fn kill(&mut self) -> Pin<Box<dyn Future<Output = io::Result<()>> + Send + '_>>;
}

/// Trait abstracting how the runner is started.
///
/// Production code uses [`RealProcessLauncher`]; tests provide a launcher
/// whose processes exit on command.
pub trait ProcessLauncher: Send {
    fn launch(&mut self, spec: &LaunchSpec) -> Result<Box<dyn RunnerProcess>>;
}

/// Launches the runner as an OS process and streams its output into the
/// log, one event per non-empty line.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealProcessLauncher;

impl ProcessLauncher for RealProcessLauncher {
    fn launch(&mut self, spec: &LaunchSpec) -> Result<Box<dyn RunnerProcess>> {
        info!(exe = %spec.exe, args = ?spec.args, "running runner executable");

        let mut cmd = Command::new(&spec.exe);
        cmd.args(&spec.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd
            .spawn()
            .with_context(|| format!("spawning runner '{}'", spec.exe))?;

        let pid = child.id();
        if let Some(stdout) = child.stdout.take() {
            forward_output(stdout, pid);
        }
        if let Some(stderr) = child.stderr.take() {
            forward_output(stderr, pid);
        }

        Ok(Box::new(OsProcess { child }))
    }
}

/// Log every non-empty line of `stream` until it closes.
fn forward_output<R>(stream: R, pid: Option<u32>)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = BufReader::new(stream).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    let line = line.trim();
                    if !line.is_empty() {
                        info!(target: RUNNER_TARGET, pid, "{}", line);
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    debug!(pid, error = %e, "stopped reading runner output");
                    break;
                }
            }
        }
    });
}

struct OsProcess {
    child: Child,
}

impl RunnerProcess for OsProcess {
    fn id(&self) -> Option<u32> {
        self.child.id()
    }

    fn wait(&mut self) -> Pin<Box<dyn Future<Output = io::Result<Option<i32>>> + Send + '_>> {
        Box::pin(async move {
            let status = self.child.wait().await?;
            Ok(status.code())
        })
    }

    fn kill(&mut self) -> Pin<Box<dyn Future<Output = io::Result<()>> + Send + '_>> {
        Box::pin(self.child.kill())
    }
}
