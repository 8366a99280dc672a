// src/model/mod.rs

//! Result data model: a three-level tree mirroring a run.
//!
//! - [`TestFrameworkResult`]: one per run, named after the configured run
//!   name, holding suites in first-seen order.
//! - [`TestSuiteResult`]: one per suite name, holding tests in execution
//!   order.
//! - [`TestResult`]: one reported (or synthesized) test outcome.
//!
//! Each level also exposes serialisable views used by the report writers
//! and the completion summary.

pub mod framework;
pub mod identifier;
pub mod suite;
pub mod test_result;

pub use framework::{FrameworkReport, FrameworkSummary, ResultCounts, TestFrameworkResult};
pub use identifier::{TestIdentifier, parse_test_list};
pub use suite::{SuiteReport, SuiteSummary, TestSuiteResult};
pub use test_result::{
    AssertionDigest, AssertionFailure, ExceptionDigest, TestRecord, TestResult, TestStatus,
    TestSummary,
};

/// Convert a duration reported in microseconds to seconds.
pub fn micros_to_secs(micros: f64) -> f64 {
    micros / 1_000_000.0
}
