// src/config/validate.rs

use std::time::Duration;

use crate::config::duration::parse_duration;
use crate::config::model::{
    ConfigFile, RawConfigFile, RawRunnerSection, RawServerSection, RunnerConfig, ServerConfig,
};
use crate::errors::{RemotestError, Result};
use crate::types::ExecutionMode;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = RemotestError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        let server = validate_server(&raw.server)?;
        let runner = validate_runner(&raw.runner)?;
        Ok(ConfigFile {
            server,
            runner,
            report: raw.report,
            operator: raw.operator,
        })
    }
}

fn validate_server(raw: &RawServerSection) -> Result<ServerConfig> {
    let mode: ExecutionMode = raw.mode.parse().map_err(RemotestError::UnknownMode)?;

    if raw.host.trim().is_empty() {
        return Err(RemotestError::ConfigError(
            "[server].host must not be empty (use \"auto\" to resolve it)".to_string(),
        ));
    }

    let timeout = field_duration("server", "timeout", &raw.timeout)?;
    if timeout.is_zero() {
        return Err(RemotestError::ConfigError(
            "[server].timeout must be greater than zero".to_string(),
        ));
    }

    if raw.run_name.trim().is_empty() {
        return Err(RemotestError::ConfigError(
            "[server].run_name must not be empty".to_string(),
        ));
    }

    Ok(ServerConfig {
        mode,
        host: raw.host.trim().to_string(),
        port: raw.port,
        timeout,
        run_name: raw.run_name.clone(),
        strict_accounting: raw.strict_accounting,
    })
}

fn validate_runner(raw: &RawRunnerSection) -> Result<RunnerConfig> {
    let exe = match raw.exe.as_deref().map(str::trim) {
        Some(exe) if !exe.is_empty() => exe.to_string(),
        _ => {
            return Err(RemotestError::ConfigError(
                "no runner executable configured: set [runner].exe or pass it on the command line"
                    .to_string(),
            ));
        }
    };

    Ok(RunnerConfig {
        exe,
        args: raw.args.clone(),
        restart_delay: field_duration("runner", "restart_delay", &raw.restart_delay)?,
        shutdown_grace: field_duration("runner", "shutdown_grace", &raw.shutdown_grace)?,
    })
}

fn field_duration(section: &str, field: &str, value: &str) -> Result<Duration> {
    parse_duration(value)
        .map_err(|e| RemotestError::ConfigError(format!("[{section}].{field}: {e}")))
}
