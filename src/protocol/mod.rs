// src/protocol/mod.rs

//! Wire protocol spoken with the runner.
//!
//! - Commands (server → runner) are UTF-8 strings terminated by one NUL byte.
//! - Responses (runner → server) have no framing: whatever a single read
//!   returns, up to [`MAX_RESPONSE_BYTES`], is one message. It is decoded as
//!   UTF-8 and trimmed of whitespace and trailing NULs.

pub mod command;
pub mod connection;

pub use command::{RemoteCommand, is_exit_command};
pub use connection::{Connection, MAX_RESPONSE_BYTES, Received};
