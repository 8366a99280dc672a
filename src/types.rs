use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// How the orchestrator drives the runner.
///
/// - `Automatic`: the server asks the runner for its test list and runs each
///   test in order, without an operator.
/// - `Manual`: every command is typed by an operator and forwarded verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    Automatic,
    Manual,
}

impl Default for ExecutionMode {
    fn default() -> Self {
        ExecutionMode::Automatic
    }
}

impl FromStr for ExecutionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "automatic" => Ok(ExecutionMode::Automatic),
            "manual" => Ok(ExecutionMode::Manual),
            other => Err(other.to_string()),
        }
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionMode::Automatic => f.write_str("automatic"),
            ExecutionMode::Manual => f.write_str("manual"),
        }
    }
}

/// Which operator action ends the run early.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CancelBackendKind {
    /// Space key (or Ctrl-C while the terminal is in raw mode).
    Keypress,
    /// SIGINT / Ctrl-C through the OS signal handler.
    CtrlC,
    /// No operator cancel; the run ends only on completion.
    None,
}

impl Default for CancelBackendKind {
    fn default() -> Self {
        CancelBackendKind::Keypress
    }
}

impl FromStr for CancelBackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "keypress" => Ok(CancelBackendKind::Keypress),
            "ctrl-c" | "ctrlc" => Ok(CancelBackendKind::CtrlC),
            "none" => Ok(CancelBackendKind::None),
            other => Err(format!(
                "invalid cancel backend: {other} (expected \"keypress\", \"ctrl-c\" or \"none\")"
            )),
        }
    }
}
