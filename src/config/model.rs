// src/config/model.rs

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::types::{CancelBackendKind, ExecutionMode};

/// Configuration exactly as read from a TOML file.
///
/// ```toml
/// [server]
/// mode = "automatic"
/// host = "auto"
/// port = 8000
/// timeout = "1m"
/// run_name = "nightly:smoke"
///
/// [runner]
/// exe = "./build/test-runner"
/// args = ["--remote", "8000"]
/// restart_delay = "500ms"
///
/// [report]
/// output_dir = "results"
///
/// [operator]
/// cancel = "keypress"
/// ```
///
/// Every section is optional. Values stay as strings here so that the
/// validation step can report bad modes and durations with context.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawConfigFile {
    #[serde(default)]
    pub server: RawServerSection,

    #[serde(default)]
    pub runner: RawRunnerSection,

    #[serde(default)]
    pub report: ReportSection,

    #[serde(default)]
    pub operator: OperatorSection,
}

/// `[server]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct RawServerSection {
    /// `"automatic"` or `"manual"`. Anything else is rejected at validation.
    #[serde(default = "default_mode")]
    pub mode: String,

    /// Address to bind. `"auto"` resolves the machine's LAN address.
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// How long to wait for any single response from the runner.
    #[serde(default = "default_timeout")]
    pub timeout: String,

    /// Name of the framework result; also the base name of report files.
    #[serde(default = "default_run_name")]
    pub run_name: String,

    /// Record a synthetic failure for every attempt that produced no usable
    /// result, not only for timeouts and connection resets.
    #[serde(default)]
    pub strict_accounting: bool,
}

fn default_mode() -> String {
    "automatic".to_string()
}

fn default_host() -> String {
    "auto".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_timeout() -> String {
    "1m".to_string()
}

fn default_run_name() -> String {
    "xUnit".to_string()
}

impl Default for RawServerSection {
    fn default() -> Self {
        Self {
            mode: default_mode(),
            host: default_host(),
            port: default_port(),
            timeout: default_timeout(),
            run_name: default_run_name(),
            strict_accounting: false,
        }
    }
}

/// `[runner]` section: the external test-runner executable.
#[derive(Debug, Clone, Deserialize)]
pub struct RawRunnerSection {
    /// Path of the executable. Required, but may come from the CLI instead.
    #[serde(default)]
    pub exe: Option<String>,

    #[serde(default)]
    pub args: Vec<String>,

    /// Pause between a runner exit and its relaunch.
    #[serde(default = "default_restart_delay")]
    pub restart_delay: String,

    /// How long the runner may keep running after the stop signal before it
    /// is killed (automatic mode only).
    #[serde(default = "default_shutdown_grace")]
    pub shutdown_grace: String,
}

fn default_restart_delay() -> String {
    "500ms".to_string()
}

fn default_shutdown_grace() -> String {
    "5s".to_string()
}

impl Default for RawRunnerSection {
    fn default() -> Self {
        Self {
            exe: None,
            args: Vec::new(),
            restart_delay: default_restart_delay(),
            shutdown_grace: default_shutdown_grace(),
        }
    }
}

/// `[report]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ReportSection {
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("results")
}

impl Default for ReportSection {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
        }
    }
}

/// `[operator]` section.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct OperatorSection {
    #[serde(default)]
    pub cancel: CancelBackendKind,
}

/// Validated configuration used by the rest of the crate.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub server: ServerConfig,
    pub runner: RunnerConfig,
    pub report: ReportSection,
    pub operator: OperatorSection,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub mode: ExecutionMode,
    pub host: String,
    pub port: u16,
    pub timeout: Duration,
    pub run_name: String,
    pub strict_accounting: bool,
}

#[derive(Debug, Clone)]
pub struct RunnerConfig {
    pub exe: String,
    pub args: Vec<String>,
    pub restart_delay: Duration,
    pub shutdown_grace: Duration,
}
