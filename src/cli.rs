//! CLI argument parsing and command dispatch

use anyhow::Result;
use clap::Parser;
use ruff_sync::output::OutputConfig;

use crate::commands;

/// ruff-sync - Keep a project's Ruff configuration in sync with an upstream pyproject.toml
#[derive(Parser, Debug)]
#[command(name = "ruff-sync")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    sync: commands::sync::SyncArgs,

    /// Colorize output (always, never, auto)
    #[arg(
        long,
        value_name = "WHEN",
        default_value = "auto",
        value_parser = ["always", "never", "auto"]
    )]
    color: String,

    /// Set log level (error, warn, info, debug, trace); RUST_LOG takes precedence
    #[arg(
        long,
        value_name = "LEVEL",
        default_value = "warn",
        value_parser = ["error", "warn", "info", "debug", "trace"]
    )]
    log_level: String,
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        init_logging(&self.log_level);
        let output = OutputConfig::from_env_and_flag(&self.color);
        commands::sync::execute(self.sync, &output)
    }
}

fn init_logging(level: &str) {
    let env = env_logger::Env::default().default_filter_or(level);
    // A logger may already be installed when embedded; keep it
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .try_init();
}
