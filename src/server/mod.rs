// src/server/mod.rs

//! TCP side of the orchestrator: resolving the bind address and accepting
//! runner connections one at a time.

pub mod listener;
pub mod net;

pub use listener::ConnectionListener;
pub use net::resolve_bind_host;
