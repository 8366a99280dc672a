// src/engine/mod.rs

//! Run engine.
//!
//! - [`state`]: the pure run-state core (phase, test list, progress index).
//! - [`signals`]: the stop token and the reboot request.
//! - [`context`]: everything a session mutates, threaded explicitly.
//! - [`recovery`]: synthetic results for lost attempts.
//! - [`driver`]: per-mode session handling (automatic / manual).
//! - [`machine`]: the state machine, the automatic run loop and
//!   finalization.

pub mod context;
pub mod driver;
pub mod machine;
pub mod recovery;
pub mod signals;
pub mod state;

pub use context::{RunContext, RunSettings};
pub use driver::{ManualDriver, ModeHandler};
pub use machine::ExecutionStateMachine;
pub use recovery::{CrashRecoveryManager, LostAttempt};
pub use signals::{RebootSignal, RunSignals};
pub use state::{RunPhase, RunState};
