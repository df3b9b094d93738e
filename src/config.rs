//! # Local Configuration
//!
//! A project can record its sync settings next to the section being synced:
//!
//! ```toml
//! [tool.ruff-sync]
//! upstream = "https://github.com/org/template/blob/main/pyproject.toml"
//! exclude = ["per-file-ignores", "target-version"]
//! ```
//!
//! The block is read from the file that is about to be edited. Command-line
//! values take precedence over it, and built-in defaults fill whatever
//! neither provides. Unknown keys are reported with a warning and ignored.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use serde::Deserialize;
use url::Url;

use crate::defaults::{self, CONFIG_FILE_NAME, CONFIG_SECTION};
use crate::error::{Error, Result};
use crate::exclude::Exclusions;
use crate::fetch;

const KNOWN_KEYS: &[&str] = &["upstream", "source", "exclude"];

/// The settings a `[tool.ruff-sync]` block (or the command line) may supply
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SyncConfig {
    /// URL or path of the upstream `pyproject.toml`
    pub upstream: Option<String>,
    /// File or directory to sync, relative to the configuration file
    pub source: Option<PathBuf>,
    /// Keys to leave under local control
    pub exclude: Option<Vec<String>>,
}

impl SyncConfig {
    /// Extract the `[tool.ruff-sync]` block from TOML text
    ///
    /// Text without the block yields the empty configuration.
    ///
    /// # Errors
    ///
    /// Returns `Error::Parse` if the text is not TOML and `Error::Config` if
    /// the block does not have the expected shape.
    pub fn from_toml(text: &str, origin: &str) -> Result<Self> {
        let document: toml::Table = toml::from_str(text).map_err(|e| Error::Parse {
            origin: origin.to_string(),
            message: e.to_string(),
        })?;

        let mut current = &document;
        let mut block = None;
        let section = defaults::config_section();
        for (depth, key) in section.iter().enumerate() {
            match current.get(key) {
                Some(toml::Value::Table(table)) if depth + 1 == section.len() => block = Some(table),
                Some(toml::Value::Table(table)) => current = table,
                Some(_) => return Err(shape_error(&format!("`{}` must be a table", section.prefix(depth + 1)))),
                None => break,
            }
        }

        let Some(block) = block else {
            debug!("No [{}] block in {}", CONFIG_SECTION, origin);
            return Ok(Self::default());
        };

        for key in block.keys() {
            if !KNOWN_KEYS.contains(&key.as_str()) {
                warn!("Unknown ruff-sync configuration: {}", key);
            }
        }

        toml::Value::Table(block.clone())
            .try_into()
            .map_err(|e: toml::de::Error| shape_error(e.message()))
    }

    /// Read the `[tool.ruff-sync]` block from a file
    ///
    /// # Errors
    ///
    /// Returns `Error::FileAccess` if the file cannot be read, otherwise as
    /// [`SyncConfig::from_toml`].
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| Error::FileAccess {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_toml(&text, &path.display().to_string())
    }

    /// Fill every setting missing from `self` from `fallback`
    pub fn or(self, fallback: SyncConfig) -> SyncConfig {
        SyncConfig {
            upstream: self.upstream.or(fallback.upstream),
            source: self.source.or(fallback.source),
            exclude: self.exclude.or(fallback.exclude),
        }
    }
}

fn shape_error(message: &str) -> Error {
    Error::Config {
        message: format!("invalid [{}] block: {}", CONFIG_SECTION, message),
        hint: Some(
            "expected `upstream` (string), `source` (string) and `exclude` (list of strings)"
                .to_string(),
        ),
    }
}

/// Settings for one sync run, after precedence has been applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub upstream: Url,
    /// The configuration file to edit, canonicalized
    pub source: PathBuf,
    pub exclusions: Exclusions,
}

/// Resolve `--source` to the configuration file it designates
///
/// A directory designates the `pyproject.toml` inside it.
///
/// # Errors
///
/// Returns `Error::FileAccess` if the resulting file does not exist.
pub fn resolve_source(path: &Path) -> Result<PathBuf> {
    let candidate = if path.is_dir() {
        path.join(CONFIG_FILE_NAME)
    } else {
        path.to_path_buf()
    };
    let resolved = fs::canonicalize(&candidate).map_err(|e| Error::FileAccess {
        path: candidate.display().to_string(),
        message: e.to_string(),
    })?;
    if !resolved.is_file() {
        return Err(Error::FileAccess {
            path: resolved.display().to_string(),
            message: "not a file".to_string(),
        });
    }
    Ok(resolved)
}

/// Combine command-line settings with the target file's configuration block
///
/// The file is found from `cli.source` (default `.`); its block may redirect
/// to another file with `source` only when the command line did not name one.
///
/// # Errors
///
/// Returns `Error::Config` if no upstream is given anywhere, and propagates
/// file, parse and URL errors.
pub fn resolve(cli: SyncConfig) -> Result<Settings> {
    let start = cli.source.clone().unwrap_or_else(|| PathBuf::from("."));
    let file = resolve_source(&start)?;
    let file_config = SyncConfig::load(&file)?;

    let source = match (&cli.source, &file_config.source) {
        (None, Some(relative)) => {
            let base = file.parent().unwrap_or_else(|| Path::new("."));
            resolve_source(&base.join(relative))?
        }
        _ => file,
    };

    let merged = cli.or(file_config);
    let upstream = merged.upstream.ok_or_else(|| Error::Config {
        message: "no upstream configured".to_string(),
        hint: Some(format!(
            "pass an UPSTREAM URL or set `upstream` in [{}]",
            CONFIG_SECTION
        )),
    })?;
    let upstream = fetch::parse_upstream(&upstream)?;
    let exclusions = merged
        .exclude
        .map(|names| names.iter().collect())
        .unwrap_or_else(defaults::default_exclusions);

    debug!(
        "Resolved settings: upstream={} source={} exclude=[{}]",
        upstream,
        source.display(),
        exclusions
    );
    Ok(Settings {
        upstream,
        source,
        exclusions,
    })
}
