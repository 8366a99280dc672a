// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod model;
pub mod operator;
pub mod orchestrator;
pub mod protocol;
pub mod report;
pub mod results;
pub mod server;
pub mod types;

use anyhow::{Result, anyhow};
use tracing::debug;

use crate::cli::CliArgs;
use crate::config::{ConfigFile, load_or_default};
use crate::orchestrator::Orchestrator;
use crate::report::report_basename;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading and CLI overrides
/// - the connection listener and execution state machine
/// - the runner supervisor
/// - the operator cancel channel
pub async fn run(args: CliArgs) -> Result<()> {
    let mut raw = load_or_default(&args.config)?;
    args.apply_overrides(&mut raw).map_err(|e| anyhow!(e))?;
    let cfg = ConfigFile::try_from(raw)?;

    if args.dry_run {
        print_dry_run(&cfg);
        return Ok(());
    }

    let outcome = Orchestrator::from_config(cfg).run().await?;

    if let Some(err) = outcome.export_error {
        return Err(anyhow!(err).context("test run finished but reports were not written"));
    }
    Ok(())
}

/// Simple dry-run output: print the resolved configuration.
fn print_dry_run(cfg: &ConfigFile) {
    println!("remotest dry-run");
    println!("  server.mode = {}", cfg.server.mode);
    println!("  server.host = {}", cfg.server.host);
    println!("  server.port = {}", cfg.server.port);
    println!("  server.timeout = {:?}", cfg.server.timeout);
    println!("  server.run_name = {}", cfg.server.run_name);
    println!("  server.strict_accounting = {}", cfg.server.strict_accounting);
    println!();

    println!("runner:");
    println!("  exe: {}", cfg.runner.exe);
    if !cfg.runner.args.is_empty() {
        println!("  args: {:?}", cfg.runner.args);
    }
    println!("  restart_delay: {:?}", cfg.runner.restart_delay);
    println!("  shutdown_grace: {:?}", cfg.runner.shutdown_grace);
    println!();

    let base = report_basename(&cfg.server.run_name);
    let dir = &cfg.report.output_dir;
    println!("reports:");
    println!("  xml: {}", dir.join(format!("{base}.xml")).display());
    println!("  json: {}", dir.join(format!("{base}.json")).display());
    println!("operator.cancel = {:?}", cfg.operator.cancel);

    debug!("dry-run complete (no execution)");
}
