//! Orchestrator for the complete sync operation
//!
//! This module coordinates all phases to provide a clean API for a sync run.

use log::info;

use super::{phase1, phase2, phase3, SyncOptions, SyncReport};
use crate::error::{Error, Result};
use crate::fetch::Fetcher;

/// Execute the complete sync operation (Phases 1-3)
///
/// 1. Fetch the upstream document and filter its target section
/// 2. Merge that section into the local document
/// 3. Write the local file back, unless nothing changed or this is a dry run
///
/// The local file is only ever touched by the final step.
pub async fn execute_sync(options: &SyncOptions, fetcher: &dyn Fetcher) -> Result<SyncReport> {
    // Phase 1: Upstream
    let upstream = phase1::execute(
        &options.upstream,
        fetcher,
        &options.section,
        &options.exclusions,
    )
    .await?;
    let source = upstream
        .document
        .section(&options.section)?
        .ok_or_else(|| Error::MissingSection {
            path: options.section.to_string(),
            origin: options.upstream.to_string(),
        })?;

    // Phase 2: Local Merge
    let merged = phase2::execute(&options.source, &source)?;
    let rendered = merged.rendered();
    let changed = rendered != merged.original;

    // Phase 3: Write to Disk
    let written = changed && !options.dry_run;
    if written {
        phase3::execute(&options.source, &rendered)?;
    } else if !changed {
        info!("{} already matches upstream", options.source.display());
    } else {
        info!("Dry run: leaving {} unchanged", options.source.display());
    }

    Ok(SyncReport {
        source: options.source.clone(),
        upstream: options.upstream.clone(),
        removed: upstream.removed,
        changed,
        written,
        rendered,
    })
}
