// src/results/message.rs

use serde_json::Value;

use crate::errors::IngestError;
use crate::model::TestResult;

/// A result message as sent by the runner after a `RUN` command:
///
/// ```json
/// {"details": {"name": "t1", "result": "passed", "duration": 500000,
///              "assertions": 2, "exceptions": [], "errors": []},
///  "suite": "A", "timestamp": 100}
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ResultMessage {
    pub details: TestResult,
    pub suite: String,
    pub timestamp: f64,
}

impl ResultMessage {
    /// Parse a trimmed message body.
    ///
    /// All three top-level fields are required; a `null` counts as missing.
    pub fn parse(data: &str) -> Result<Self, IngestError> {
        let value: Value = serde_json::from_str(data).map_err(IngestError::InvalidJson)?;
        let Value::Object(mut fields) = value else {
            return Err(IngestError::MissingField("details"));
        };

        let details = match fields.remove("details") {
            Some(Value::Null) | None => return Err(IngestError::MissingField("details")),
            Some(details) => details,
        };
        let suite = fields
            .get("suite")
            .and_then(Value::as_str)
            .ok_or(IngestError::MissingField("suite"))?
            .to_string();
        let timestamp = fields
            .get("timestamp")
            .and_then(Value::as_f64)
            .ok_or(IngestError::MissingField("timestamp"))?;

        let details: TestResult =
            serde_json::from_value(details).map_err(IngestError::InvalidDetails)?;

        Ok(Self {
            details,
            suite,
            timestamp,
        })
    }
}
