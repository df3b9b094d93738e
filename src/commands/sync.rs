//! Sync command implementation
//!
//! Resolves settings from the command line and the `[tool.ruff-sync]` block,
//! then runs the sync pipeline:
//! 1. Fetching and filtering the upstream `tool.ruff` section
//! 2. Merging it into the local `pyproject.toml`
//! 3. Writing the result back

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use ruff_sync::config::{self, SyncConfig};
use ruff_sync::defaults::DEFAULT_TIMEOUT_SECS;
use ruff_sync::fetch::HttpFetcher;
use ruff_sync::output::{self, OutputConfig};
use ruff_sync::phases::{orchestrator, SyncOptions};

/// Arguments for the sync command
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// URL of the upstream pyproject.toml (GitHub "blob" URLs are accepted).
    /// May be omitted when `upstream` is set in [tool.ruff-sync]
    #[arg(value_name = "UPSTREAM")]
    pub upstream: Option<String>,

    /// The pyproject.toml to update, or a directory containing one [default: .]
    #[arg(long, value_name = "PATH")]
    pub source: Option<PathBuf>,

    /// Keys of [tool.ruff] to leave under local control [default: per-file-ignores]
    #[arg(long, value_name = "NAME", num_args = 1..)]
    pub exclude: Option<Vec<String>>,

    /// Print the merged file instead of writing it
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Seconds to wait for the upstream file
    #[arg(long, value_name = "SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,
}

/// Execute the sync command
pub fn execute(args: SyncArgs, output_config: &OutputConfig) -> Result<()> {
    println!("{}", output::syncing(output_config));

    let settings = config::resolve(SyncConfig {
        upstream: args.upstream,
        source: args.source,
        exclude: args.exclude,
    })?;
    if let Some(line) = output::excluding(output_config, &settings.exclusions) {
        println!("{}", line);
    }

    let options = SyncOptions::new(settings).dry_run(args.dry_run);
    let fetcher = HttpFetcher::new(Duration::from_secs(args.timeout))?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start the async runtime")?;
    let report = runtime.block_on(orchestrator::execute_sync(&options, &fetcher))?;

    if args.dry_run {
        print!("{}", report.rendered);
    } else if report.written {
        println!("{}", output::updated(output_config, &report.source));
    } else {
        println!("{}", output::unchanged(output_config, &report.source));
    }
    Ok(())
}
