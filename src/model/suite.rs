// src/model/suite.rs

use serde::{Deserialize, Serialize};

use crate::model::framework::ResultCounts;
use crate::model::test_result::{TestRecord, TestResult, TestStatus, TestSummary};

/// All results for one suite, in execution order.
///
/// The name and timestamp are fixed when the suite is first seen.
#[derive(Debug, Clone, PartialEq)]
pub struct TestSuiteResult {
    name: String,
    timestamp: f64,
    tests: Vec<TestResult>,
}

impl TestSuiteResult {
    pub fn new(name: impl Into<String>, timestamp: f64) -> Self {
        Self {
            name: name.into(),
            timestamp,
            tests: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn timestamp(&self) -> f64 {
        self.timestamp
    }

    pub fn tests(&self) -> &[TestResult] {
        &self.tests
    }

    pub(crate) fn push(&mut self, result: TestResult) -> &TestResult {
        self.tests.push(result);
        &self.tests[self.tests.len() - 1]
    }

    pub fn counts(&self) -> ResultCounts {
        self.tests.iter().fold(ResultCounts::default(), |mut counts, test| {
            counts.record(test);
            counts
        })
    }

    pub fn to_report(&self) -> SuiteReport {
        SuiteReport {
            name: self.name.clone(),
            timestamp: self.timestamp,
            tests: self.tests.iter().map(TestResult::to_record).collect(),
        }
    }

    /// Counts plus the compact view of every test that did not cleanly pass.
    pub fn summary(&self) -> SuiteSummary {
        SuiteSummary {
            name: self.name.clone(),
            counts: self.counts(),
            not_passed: self
                .tests
                .iter()
                .filter(|t| t.status() != TestStatus::Passed || t.did_error() || !t.errors.is_empty())
                .map(TestResult::to_summary)
                .collect(),
        }
    }
}

/// Serialisable full view of a [`TestSuiteResult`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuiteReport {
    pub name: String,
    pub timestamp: f64,
    pub tests: Vec<TestRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuiteSummary {
    pub name: String,
    #[serde(flatten)]
    pub counts: ResultCounts,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub not_passed: Vec<TestSummary>,
}
