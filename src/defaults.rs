//! Default values for ruff-sync.
//!
//! This module provides centralized default values used by the library and
//! the command line, ensuring consistency and avoiding duplication.

use std::time::Duration;

use crate::exclude::Exclusions;
use crate::path::SectionPath;

/// Name of the configuration file looked for when `--source` is a directory
pub const CONFIG_FILE_NAME: &str = "pyproject.toml";

/// Dotted path of the section that gets synchronized
pub const TARGET_SECTION: &str = "tool.ruff";

/// Dotted path of ruff-sync's own configuration block
pub const CONFIG_SECTION: &str = "tool.ruff-sync";

/// Keys excluded from the upstream section unless told otherwise
pub const DEFAULT_EXCLUDE: &[&str] = &["per-file-ignores"];

/// Seconds to wait for the upstream file before giving up
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub(crate) const GITHUB_HOST: &str = "github.com";
pub(crate) const GITHUB_RAW_HOST: &str = "raw.githubusercontent.com";

/// The section synchronized by default, `tool.ruff`
pub fn target_section() -> SectionPath {
    SectionPath::parse(TARGET_SECTION)
}

/// The path of the `[tool.ruff-sync]` block
pub fn config_section() -> SectionPath {
    SectionPath::parse(CONFIG_SECTION)
}

/// The default exclusion set
///
/// Per-file ignores refer to the layout of the upstream project, so they are
/// rarely meaningful elsewhere.
pub fn default_exclusions() -> Exclusions {
    DEFAULT_EXCLUDE.iter().collect()
}

pub fn default_timeout() -> Duration {
    Duration::from_secs(DEFAULT_TIMEOUT_SECS)
}
