// src/model/framework.rs

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::model::suite::{SuiteReport, SuiteSummary, TestSuiteResult};
use crate::model::test_result::{TestResult, TestStatus};

/// Root of the result tree for one run.
///
/// Suites are keyed by name (unique) and keep first-seen order.
#[derive(Debug, Clone, PartialEq)]
pub struct TestFrameworkResult {
    name: String,
    timestamp: f64,
    suites: IndexMap<String, TestSuiteResult>,
}

impl TestFrameworkResult {
    pub fn new(name: impl Into<String>, timestamp: f64) -> Self {
        Self {
            name: name.into(),
            timestamp,
            suites: IndexMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn timestamp(&self) -> f64 {
        self.timestamp
    }

    pub fn suites(&self) -> impl Iterator<Item = &TestSuiteResult> {
        self.suites.values()
    }

    pub fn suite(&self, name: &str) -> Option<&TestSuiteResult> {
        self.suites.get(name)
    }

    pub fn suite_count(&self) -> usize {
        self.suites.len()
    }

    pub fn test_count(&self) -> usize {
        self.suites.values().map(|s| s.tests().len()).sum()
    }

    /// Return the named suite, creating it with `timestamp` if unseen.
    ///
    /// The second value is true when the suite was created by this call.
    pub(crate) fn suite_entry(&mut self, name: &str, timestamp: f64) -> (&mut TestSuiteResult, bool) {
        let created = !self.suites.contains_key(name);
        let suite = self
            .suites
            .entry(name.to_string())
            .or_insert_with(|| TestSuiteResult::new(name, timestamp));
        (suite, created)
    }

    pub fn counts(&self) -> ResultCounts {
        self.suites
            .values()
            .fold(ResultCounts::default(), |acc, suite| acc + suite.counts())
    }

    pub fn to_report(&self) -> FrameworkReport {
        FrameworkReport {
            name: self.name.clone(),
            timestamp: self.timestamp,
            testsuites: self.suites.values().map(TestSuiteResult::to_report).collect(),
        }
    }

    pub fn summary(&self) -> FrameworkSummary {
        FrameworkSummary {
            name: self.name.clone(),
            counts: self.counts(),
            suites: self.suites.values().map(TestSuiteResult::summary).collect(),
        }
    }
}

/// Per-status totals for a suite or a whole run.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ResultCounts {
    pub tests: usize,
    pub passed: usize,
    /// Failed or expired.
    pub failures: usize,
    /// Tests that threw at least one exception.
    pub errors: usize,
    pub skipped: usize,
    /// Sum of durations, in seconds.
    pub time: f64,
}

impl ResultCounts {
    pub(crate) fn record(&mut self, test: &TestResult) {
        self.tests += 1;
        if test.status() == TestStatus::Passed {
            self.passed += 1;
        }
        if test.did_fail() {
            self.failures += 1;
        }
        if test.did_error() {
            self.errors += 1;
        }
        if test.was_skipped() {
            self.skipped += 1;
        }
        self.time += test.duration_secs();
    }
}

impl std::ops::Add for ResultCounts {
    type Output = ResultCounts;

    fn add(self, rhs: ResultCounts) -> ResultCounts {
        ResultCounts {
            tests: self.tests + rhs.tests,
            passed: self.passed + rhs.passed,
            failures: self.failures + rhs.failures,
            errors: self.errors + rhs.errors,
            skipped: self.skipped + rhs.skipped,
            time: self.time + rhs.time,
        }
    }
}

/// Serialisable full view of the whole tree; this is the JSON report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameworkReport {
    pub name: String,
    pub timestamp: f64,
    pub testsuites: Vec<SuiteReport>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameworkSummary {
    pub name: String,
    #[serde(flatten)]
    pub counts: ResultCounts,
    pub suites: Vec<SuiteSummary>,
}
