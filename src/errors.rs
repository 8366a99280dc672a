// src/errors.rs

//! Crate-wide error aliases and helpers.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RemotestError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Unknown execution mode: {0} (expected \"automatic\" or \"manual\")")]
    UnknownMode(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Failed to launch runner: {0}")]
    LaunchError(String),

    #[error("Report export failed: {0}")]
    Report(#[from] ReportError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Failure while serialising or writing one of the run reports.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("failed to serialize XML report: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("failed to serialize JSON report: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to write report file: {0:#}")]
    Write(anyhow::Error),
}

/// A result message from the runner that could not be turned into a
/// test result.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("result message is not valid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),

    #[error("result message is missing required field `{0}`")]
    MissingField(&'static str),

    #[error("result details do not describe a test result: {0}")]
    InvalidDetails(#[source] serde_json::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, RemotestError>;
