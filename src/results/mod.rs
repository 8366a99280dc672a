// src/results/mod.rs

//! Turning runner messages into the result tree.
//!
//! - [`message`] parses one inbound result message.
//! - [`aggregator`] owns the tree and applies the lazy creation rules for
//!   the framework and suite levels.

pub mod aggregator;
pub mod message;

pub use aggregator::ResultAggregator;
pub use message::ResultMessage;
