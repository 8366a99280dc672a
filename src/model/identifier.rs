// src/model/identifier.rs

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of one test as announced by the runner: `suite@test`.
///
/// The string is kept verbatim and sent back unchanged in `RUN` commands;
/// it is only split when a result has to be synthesized for it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TestIdentifier(String);

impl TestIdentifier {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Split into `(suite, test)` at the first `@`.
    ///
    /// Without an `@` the suite is empty and the whole identifier is the
    /// test name.
    pub fn split(&self) -> (&str, &str) {
        self.0.split_once('@').unwrap_or(("", self.0.as_str()))
    }

    pub fn suite(&self) -> &str {
        self.split().0
    }

    pub fn test_name(&self) -> &str {
        self.split().1
    }
}

impl fmt::Display for TestIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TestIdentifier {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for TestIdentifier {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Parse a discovery response: one identifier per line, in run order.
///
/// Lines are trimmed and blank lines are skipped.
pub fn parse_test_list(body: &str) -> Vec<TestIdentifier> {
    body.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(TestIdentifier::from)
        .collect()
}
