// src/exec/mod.rs

//! Runner process layer.
//!
//! - [`launcher`] abstracts how the runner executable is started, so tests
//!   can swap in a fake process. The real launcher uses
//!   `tokio::process::Command` and forwards every output line to the log.
//! - [`supervisor`] keeps the runner alive for the duration of the run:
//!   relaunching it after an unexpected exit or a reboot request, and
//!   shutting it down once the stop signal is raised.

pub mod launcher;
pub mod supervisor;

pub use launcher::{LaunchSpec, ProcessLauncher, RealProcessLauncher, RunnerProcess};
pub use supervisor::{SubprocessSupervisor, SupervisionReport, SupervisorOptions};
