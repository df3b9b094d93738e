//! Implementation of the phases of a sync run.
//!
//! ## Overview
//!
//! A sync is a straight pipeline with no retries:
//! 1. Upstream - fetch the upstream file, parse it, locate the target section
//!    and strip excluded keys
//! 2. Local Merge - load the local file, locate (or create) the target
//!    section and merge the upstream section into it
//! 3. Writing to Disk - atomically replace the local file, if anything changed
//!
//! Any failure aborts the run before the write, leaving the local file exactly
//! as it was.

use std::fmt;
use std::path::PathBuf;

use url::Url;

use crate::config::Settings;
use crate::defaults;
use crate::exclude::Exclusions;
use crate::path::SectionPath;

// Phase modules
pub mod local_merge;
pub mod orchestrator;
pub mod upstream;
pub mod write;

// Numbered aliases, in pipeline order
pub use local_merge as phase2;
pub use upstream as phase1;
pub use write as phase3;

/// The states a sync run passes through, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
    FetchUpstream,
    ParseUpstream,
    LocateTargetSection,
    FilterExcluded,
    LoadLocalDocument,
    LocateOrCreateTargetSection,
    Merge,
    WriteBack,
}

impl Phase {
    /// Log entry into this phase
    pub(crate) fn enter(self) {
        log::info!("Phase: {}", self);
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::FetchUpstream => "fetch upstream",
            Phase::ParseUpstream => "parse upstream",
            Phase::LocateTargetSection => "locate target section",
            Phase::FilterExcluded => "filter excluded keys",
            Phase::LoadLocalDocument => "load local document",
            Phase::LocateOrCreateTargetSection => "locate or create target section",
            Phase::Merge => "merge",
            Phase::WriteBack => "write back",
        };
        f.write_str(name)
    }
}

/// Everything a sync run needs to know
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOptions {
    /// Where to fetch the upstream document from
    pub upstream: Url,
    /// The local configuration file to update
    pub source: PathBuf,
    /// The section to synchronize
    pub section: SectionPath,
    /// Keys of the upstream section to leave alone
    pub exclusions: Exclusions,
    /// Compute the result without writing it
    pub dry_run: bool,
}

impl SyncOptions {
    /// Options for syncing the default section with resolved settings
    pub fn new(settings: Settings) -> Self {
        Self {
            upstream: settings.upstream,
            source: settings.source,
            section: defaults::target_section(),
            exclusions: settings.exclusions,
            dry_run: false,
        }
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

/// Outcome of a successful sync run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    /// The local file that was (or would have been) updated
    pub source: PathBuf,
    /// The upstream document that was merged
    pub upstream: Url,
    /// Paths removed from the upstream section, relative to it
    pub removed: Vec<SectionPath>,
    /// Whether the merge changed the local document
    pub changed: bool,
    /// Whether the local file was rewritten
    pub written: bool,
    /// The merged document
    pub rendered: String,
}
