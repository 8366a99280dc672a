#![allow(dead_code)]

use std::path::Path;

use remotest::config::{ConfigFile, RawConfigFile};
use remotest::types::CancelBackendKind;

/// Builder for `ConfigFile` to simplify test setup.
///
/// Starts from the defaults with a runner executable set, loopback host,
/// an ephemeral port and short delays.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        let mut config = RawConfigFile::default();
        config.server.host = "127.0.0.1".to_string();
        config.server.port = 0;
        config.runner.exe = Some("fake-runner".to_string());
        config.runner.restart_delay = "10ms".to_string();
        config.runner.shutdown_grace = "100ms".to_string();
        config.operator.cancel = CancelBackendKind::None;
        Self { config }
    }

    pub fn mode(mut self, mode: &str) -> Self {
        self.config.server.mode = mode.to_string();
        self
    }

    pub fn timeout(mut self, timeout: &str) -> Self {
        self.config.server.timeout = timeout.to_string();
        self
    }

    pub fn run_name(mut self, name: &str) -> Self {
        self.config.server.run_name = name.to_string();
        self
    }

    pub fn strict_accounting(mut self, val: bool) -> Self {
        self.config.server.strict_accounting = val;
        self
    }

    pub fn runner(mut self, exe: &str, args: &[&str]) -> Self {
        self.config.runner.exe = Some(exe.to_string());
        self.config.runner.args = args.iter().map(|a| a.to_string()).collect();
        self
    }

    pub fn output_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.config.report.output_dir = dir.as_ref().to_path_buf();
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}
