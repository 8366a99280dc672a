// src/results/aggregator.rs

use tracing::{debug, info};

use crate::errors::IngestError;
use crate::model::{TestFrameworkResult, TestResult};
use crate::results::message::ResultMessage;

/// Builds and holds the Framework → Suite → Test tree for one run.
///
/// Only the session handler mutates it; report writers get shared
/// references.
#[derive(Debug)]
pub struct ResultAggregator {
    run_name: String,
    framework: Option<TestFrameworkResult>,
}

impl ResultAggregator {
    pub fn new(run_name: impl Into<String>) -> Self {
        Self {
            run_name: run_name.into(),
            framework: None,
        }
    }

    pub fn run_name(&self) -> &str {
        &self.run_name
    }

    /// The tree, once at least one result has been recorded.
    pub fn framework(&self) -> Option<&TestFrameworkResult> {
        self.framework.as_ref()
    }

    pub fn test_count(&self) -> usize {
        self.framework.as_ref().map_or(0, TestFrameworkResult::test_count)
    }

    /// Parse a result message and record it.
    ///
    /// A malformed message leaves the tree untouched.
    pub fn ingest(&mut self, data: &str) -> Result<&TestResult, IngestError> {
        debug!("received test result data");
        let message = ResultMessage::parse(data)?;
        Ok(self.record(&message.suite, message.timestamp, message.details))
    }

    /// Append `result` to `suite`, creating the framework and suite entries
    /// on first use.
    ///
    /// The framework timestamp comes from the first recorded result, a suite
    /// timestamp from the first result in that suite.
    pub fn record(&mut self, suite: &str, timestamp: f64, result: TestResult) -> &TestResult {
        let run_name = &self.run_name;
        let framework = self.framework.get_or_insert_with(|| {
            info!(name = %run_name, timestamp, "initialized framework result");
            TestFrameworkResult::new(run_name.clone(), timestamp)
        });

        let (suite_result, created) = framework.suite_entry(suite, timestamp);
        if created {
            info!(suite, timestamp, "initialized new test suite result");
        }

        debug!(suite, test = %result.name, status = %result.result, "added test result");
        suite_result.push(result)
    }
}
