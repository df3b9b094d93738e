//! # Error Handling
//!
//! This module defines the centralized error type for the `ruff-sync`
//! library. It uses `thiserror` to derive an `Error` enum whose variants
//! line up with the failure categories of a sync run:
//!
//! - Upstream retrieval failures (`Fetch`, `FetchTimeout`, `InvalidUrl`).
//! - Documents that are not valid TOML (`Parse`).
//! - An upstream document without the target section (`MissingSection`).
//! - A path that exists but holds the wrong kind of node (`TypeMismatch`).
//! - Local files that cannot be resolved, read or written (`FileAccess`).
//! - An unusable `[tool.ruff-sync]` block (`Config`).
//!
//! Every variant is fatal for a sync run. Conditions that are only worth a
//! warning, such as unknown configuration keys, are logged and never become
//! an `Error`.

use thiserror::Error;

/// Main error type for ruff-sync operations
#[derive(Error, Debug)]
pub enum Error {
    /// The upstream document could not be retrieved.
    ///
    /// Covers transport failures and non-success HTTP statuses.
    #[error("Failed to fetch {url}: {message}")]
    Fetch { url: String, message: String },

    /// The upstream request did not complete in time.
    #[error("Timed out fetching {url}")]
    FetchTimeout { url: String },

    /// A document is not syntactically valid TOML.
    ///
    /// `origin` names the document (a file path or the upstream URL).
    #[error("Failed to parse {origin}: {message}")]
    Parse { origin: String, message: String },

    /// The upstream document has no target section, so there is nothing to sync.
    #[error("No `{path}` section found in {origin}")]
    MissingSection { path: String, origin: String },

    /// A path exists but holds a node of the wrong shape.
    #[error("Expected `{path}` to be a {expected}, found {found}")]
    TypeMismatch {
        path: String,
        expected: &'static str,
        found: &'static str,
    },

    /// A local path does not resolve, or cannot be read or written.
    #[error("Cannot access {path}: {message}")]
    FileAccess { path: String, message: String },

    /// The local `[tool.ruff-sync]` block cannot be used.
    #[error("Configuration error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    Config {
        message: String,
        /// Optional hint for how to fix the configuration issue
        hint: Option<String>,
    },

    /// An upstream URL could not be parsed.
    #[error("URL parsing error: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
