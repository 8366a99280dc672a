// src/model/test_result.rs

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::errors::ReportError;
use crate::model::micros_to_secs;

/// Normalised outcome of a test.
///
/// Runners report a free-text status; it is matched case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TestStatus {
    Passed,
    Failed,
    Errored,
    Expired,
    Skipped,
    /// Any status text not listed above.
    Unknown,
}

impl TestStatus {
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "passed" | "pass" | "success" => TestStatus::Passed,
            "failed" | "fail" | "failure" => TestStatus::Failed,
            "errored" | "error" => TestStatus::Errored,
            "expired" => TestStatus::Expired,
            "skipped" | "skip" => TestStatus::Skipped,
            _ => TestStatus::Unknown,
        }
    }
}

/// One assertion failure reported for a test.
///
/// `expected`, `actual` and `description` are the well-known keys; any other
/// keys the runner sends (or that recovery adds) are kept in `extra`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AssertionFailure {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Value>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AssertionFailure {
    pub fn digest(&self) -> AssertionDigest {
        AssertionDigest {
            expected: self.expected.clone(),
            actual: self.actual.clone(),
            description: self.description.clone(),
        }
    }
}

/// A single test outcome, exactly as reported by the runner (or
/// synthesized by crash recovery).
///
/// Missing fields take their defaults, and `null` lists are read as empty.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct TestResult {
    #[serde(default)]
    pub name: String,

    /// Free-text status as reported; see [`TestResult::status`].
    #[serde(default)]
    pub result: String,

    /// Duration in microseconds.
    #[serde(default)]
    pub duration: f64,

    #[serde(default)]
    pub assertions: u64,

    #[serde(default, deserialize_with = "null_as_default")]
    pub exceptions: Vec<Value>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub errors: Vec<AssertionFailure>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl TestResult {
    pub fn status(&self) -> TestStatus {
        TestStatus::from_label(&self.result)
    }

    /// True when the test threw at least one exception.
    pub fn did_error(&self) -> bool {
        !self.exceptions.is_empty()
    }

    pub fn did_expire(&self) -> bool {
        self.status() == TestStatus::Expired
    }

    /// Expired tests count as failures.
    pub fn did_fail(&self) -> bool {
        matches!(self.status(), TestStatus::Failed | TestStatus::Expired)
    }

    pub fn was_skipped(&self) -> bool {
        self.status() == TestStatus::Skipped
    }

    pub fn duration_secs(&self) -> f64 {
        micros_to_secs(self.duration)
    }

    /// Full view, with the duration converted to seconds.
    pub fn to_record(&self) -> TestRecord {
        TestRecord {
            name: self.name.clone(),
            result: self.result.clone(),
            time: self.duration_secs(),
            assertions: self.assertions,
            exceptions: self.exceptions.clone(),
            errors: self.errors.clone(),
        }
    }

    /// Compact view: the name, plus assertion digests and an exception digest
    /// only when there is something to report.
    pub fn to_summary(&self) -> TestSummary {
        let errors = if self.errors.is_empty() {
            None
        } else {
            Some(self.errors.iter().map(AssertionFailure::digest).collect())
        };

        let exceptions = self.exceptions.first().map(|first| ExceptionDigest {
            count: self.exceptions.len(),
            first: first.clone(),
        });

        TestSummary {
            name: self.name.clone(),
            errors,
            exceptions,
        }
    }

    /// The `testcase` element for this result as an XML fragment.
    pub fn to_xml(&self) -> Result<String, ReportError> {
        crate::report::xml::render_testcase(self)
    }
}

/// Serialisable full view of a [`TestResult`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestRecord {
    pub name: String,
    pub result: String,
    /// Seconds.
    pub time: f64,
    pub assertions: u64,
    pub exceptions: Vec<Value>,
    pub errors: Vec<AssertionFailure>,
}

/// Serialisable compact view of a [`TestResult`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestSummary {
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<AssertionDigest>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub exceptions: Option<ExceptionDigest>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssertionDigest {
    pub expected: Option<Value>,
    pub actual: Option<Value>,
    pub description: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExceptionDigest {
    pub count: usize,
    pub first: Value,
}
