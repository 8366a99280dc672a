// src/operator/mod.rs

//! Operator-facing seams.
//!
//! - [`console`]: where manual-mode commands come from and where runner
//!   responses are shown.
//! - [`cancel`]: the operator cancel channel and its swappable backends.
//! - [`keypress`]: the terminal keypress backend (crossterm).

pub mod cancel;
pub mod console;
pub mod keypress;

pub use cancel::{
    CtrlCCancelSource, NoopCancelSource, OperatorCancelChannel, OperatorCancelSource,
    build_cancel_source, cancel_backend_for,
};
pub use console::{OperatorConsole, StdinConsole};
pub use keypress::KeypressCancelSource;
