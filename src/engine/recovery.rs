// src/engine/recovery.rs

//! Synthesized results for attempts that produced no usable outcome.

use serde_json::{Map, Value};
use tracing::{error, warn};

use crate::engine::signals::RunSignals;
use crate::model::{AssertionFailure, TestIdentifier, TestResult};
use crate::results::ResultAggregator;

/// Why an attempt has no result from the runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LostAttempt {
    /// No response within the read timeout; the runner is presumed hung.
    TimedOut,
    /// The connection broke mid-read; the runner is presumed crashed.
    ConnectionLost,
    /// The runner closed the connection cleanly without answering.
    Disconnected,
    /// The runner answered, but the message could not be used.
    Malformed,
}

impl LostAttempt {
    pub fn diagnostic(self) -> &'static str {
        match self {
            LostAttempt::TimedOut => "FATAL :: Runner hanged for too long. Process killed.",
            LostAttempt::ConnectionLost => "FATAL :: Runner silently crashed.",
            LostAttempt::Disconnected => "FATAL :: Runner disconnected without reporting a result.",
            LostAttempt::Malformed => "FATAL :: Runner sent a malformed result message.",
        }
    }

    /// Only a hang needs the runner killed and relaunched; a crashed runner
    /// is restarted when the supervisor sees it exit.
    pub fn requests_reboot(self) -> bool {
        self == LostAttempt::TimedOut
    }
}

/// Records a failing stand-in result for the in-flight test so that the
/// progress index can move past it.
#[derive(Debug, Clone, Default)]
pub struct CrashRecoveryManager;

impl CrashRecoveryManager {
    pub fn new() -> Self {
        Self
    }

    /// Build the synthetic result for `identifier` at `index`.
    pub fn synthesize(&self, cause: LostAttempt, index: usize, identifier: &TestIdentifier) -> TestResult {
        let message = cause.diagnostic();

        let mut extra = Map::new();
        extra.insert("message".to_string(), Value::from(message));
        extra.insert("test_index".to_string(), Value::from(index));
        extra.insert("identifier".to_string(), Value::from(identifier.as_str()));

        TestResult {
            name: identifier.test_name().to_string(),
            result: "failed".to_string(),
            duration: 0.0,
            assertions: 0,
            exceptions: Vec::new(),
            errors: vec![AssertionFailure {
                expected: None,
                actual: None,
                description: Some(Value::from(message)),
                extra,
            }],
        }
    }

    /// Record the synthetic result through the normal aggregation path and
    /// raise the reboot signal when the cause calls for it.
    pub fn recover(
        &self,
        cause: LostAttempt,
        index: usize,
        identifier: &TestIdentifier,
        results: &mut ResultAggregator,
        signals: &RunSignals,
    ) {
        let synthetic = self.synthesize(cause, index, identifier);
        let timestamp = now_timestamp();

        error!(
            index,
            %identifier,
            ?cause,
            "recording synthetic failure: {}",
            cause.diagnostic()
        );
        results.record(identifier.suite(), timestamp, synthetic);

        if cause.requests_reboot() {
            warn!(index, %identifier, "requesting runner restart");
            signals.reboot.request();
        }
    }
}

/// Seconds since the Unix epoch, with sub-second precision.
pub fn now_timestamp() -> f64 {
    chrono::Utc::now().timestamp_micros() as f64 / 1_000_000.0
}
