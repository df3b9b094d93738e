//! # ruff-sync Library
//!
//! This library keeps a project's Ruff configuration in step with an upstream
//! `pyproject.toml`. It is designed to be used by the `ruff-sync`
//! command-line tool but can also be embedded in other tooling.
//!
//! ## Quick Example
//!
//! ```
//! use ruff_sync::document::ConfigDocument;
//! use ruff_sync::exclude::{filter_children, Exclusions};
//! use ruff_sync::merge::merge;
//! use ruff_sync::path::SectionPath;
//! use ruff_sync::section::{locate_mut, Missing};
//!
//! let section = SectionPath::parse("tool.ruff");
//!
//! let mut upstream = ConfigDocument::parse(
//!     "[tool.ruff]\ntarget-version = \"py39\"\nlint.select = [\"E\", \"F\"]\nlint.ignore = [\"W191\"]\n",
//!     "upstream",
//! )?;
//! let exclusions: Exclusions = ["ignore"].into_iter().collect();
//! if let Some(table) = locate_mut(upstream.root_mut(), &section, Missing::Absent)? {
//!     filter_children(table, &exclusions);
//! }
//!
//! let mut local = ConfigDocument::parse(
//!     "[tool.ruff]\ntarget-version = \"py38\"\nlint.select = [\"E\"]\n",
//!     "pyproject.toml",
//! )?;
//! let source = upstream.section(&section)?.expect("upstream has tool.ruff");
//! let destination = locate_mut(local.root_mut(), &section, Missing::Create)?.expect("created");
//! merge(destination, &source)?;
//!
//! assert_eq!(
//!     local.to_string(),
//!     "[tool.ruff]\ntarget-version = \"py39\"\nlint.select = [\"E\", \"F\"]\n"
//! );
//! # Ok::<(), ruff_sync::error::Error>(())
//! ```
//!
//! ## Core Concepts
//!
//! - **Documents (`document`)**: round-trip-preserving TOML documents that
//!   remember which tables were written out of order.
//! - **Sections (`path`, `section`)**: addressing, finding and creating the
//!   table being synchronized.
//! - **Exclusions (`exclude`)**: keys stripped from upstream so that they stay
//!   under local control.
//! - **Merging (`merge`)**: the structural, upstream-wins merge of one section
//!   into another.
//! - **Phases (`phases`)**: the fetch, merge and write pipeline, driven by
//!   `phases::orchestrator`.
//!
//! ## Execution Flow
//!
//! 1.  **Upstream**: fetch the upstream file, parse it, locate `tool.ruff` and
//!     filter excluded keys.
//! 2.  **Local Merge**: load the local file, locate or create `tool.ruff` and
//!     merge.
//! 3.  **Disk Output**: atomically replace the local file if it changed.

pub mod config;
pub mod defaults;
pub mod document;
pub mod error;
pub mod exclude;
pub mod fetch;
pub mod merge;
pub mod output;
pub mod path;
pub mod phases;
pub mod section;

#[cfg(test)]
mod merge_proptest;
