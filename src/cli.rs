// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::RawConfigFile;
use crate::types::CancelBackendKind;

/// Command-line arguments for `remotest`.
///
/// Every option except `--config`, `--log-level` and `--dry-run` overrides
/// the matching value from the config file.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "remotest",
    version,
    about = "Drive a socket-connected test runner and collect its results.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Remotest.toml` in the current working directory. A missing
    /// default file is fine; a missing explicit file is an error.
    #[arg(long, value_name = "PATH", default_value = "Remotest.toml")]
    pub config: PathBuf,

    /// Execution mode (automatic or manual).
    #[arg(long, value_name = "MODE")]
    pub mode: Option<String>,

    /// Address to bind; "auto" resolves the local LAN address.
    #[arg(long, value_name = "HOST")]
    pub host: Option<String>,

    #[arg(long, value_name = "PORT")]
    pub port: Option<u16>,

    /// Response timeout, e.g. "90s" or "2m".
    #[arg(long, value_name = "DURATION")]
    pub timeout: Option<String>,

    /// Name of the run; used for the framework result and report files.
    #[arg(long, value_name = "NAME")]
    pub run_name: Option<String>,

    /// Directory the XML and JSON reports are written to.
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// How the operator can end the run early.
    #[arg(long, value_name = "BACKEND")]
    pub cancel: Option<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `REMOTEST_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Resolve and print the configuration, but don't bind or spawn anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Runner executable followed by its arguments.
    #[arg(value_name = "EXE", trailing_var_arg = true, allow_hyphen_values = true)]
    pub command: Vec<String>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl CliArgs {
    /// Apply command-line overrides on top of a raw config.
    pub fn apply_overrides(&self, raw: &mut RawConfigFile) -> Result<(), String> {
        if let Some(mode) = &self.mode {
            raw.server.mode = mode.clone();
        }
        if let Some(host) = &self.host {
            raw.server.host = host.clone();
        }
        if let Some(port) = self.port {
            raw.server.port = port;
        }
        if let Some(timeout) = &self.timeout {
            raw.server.timeout = timeout.clone();
        }
        if let Some(run_name) = &self.run_name {
            raw.server.run_name = run_name.clone();
        }
        if let Some(dir) = &self.output_dir {
            raw.report.output_dir = dir.clone();
        }
        if let Some(cancel) = &self.cancel {
            raw.operator.cancel = cancel.parse::<CancelBackendKind>()?;
        }
        if let Some((exe, args)) = self.command.split_first() {
            raw.runner.exe = Some(exe.clone());
            raw.runner.args = args.to_vec();
        }
        Ok(())
    }
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
