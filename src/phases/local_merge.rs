//! Phase 2: Local Merge
//!
//! Loads the local configuration file and merges the (already filtered)
//! upstream section into it, creating the section when the file has none.

use std::fs;
use std::path::Path;

use log::debug;

use super::Phase;
use crate::document::{ConfigDocument, Section};
use crate::error::{Error, Result};
use crate::merge;
use crate::section::{locate_mut, Missing};

/// The local document before and after merging
#[derive(Debug)]
pub struct LocalMerge {
    /// The file's text as read
    pub original: String,
    /// The document with the upstream section merged in
    pub document: ConfigDocument,
}

impl LocalMerge {
    /// The merged document as text
    pub fn rendered(&self) -> String {
        self.document.to_string()
    }

    /// Whether merging changed the text of the file
    pub fn changed(&self) -> bool {
        self.rendered() != self.original
    }
}

/// Execute Phase 2: load `path` and merge `source` into its matching section
///
/// # Errors
///
/// Returns `Error::FileAccess` if the file cannot be read, `Error::Parse` if
/// it is not valid TOML and `Error::TypeMismatch` if part of the section path
/// holds something other than a table.
pub fn execute(path: &Path, source: &Section<'_>) -> Result<LocalMerge> {
    Phase::LoadLocalDocument.enter();
    let original = fs::read_to_string(path).map_err(|e| Error::FileAccess {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    let mut document = ConfigDocument::parse(&original, path.display().to_string())?;

    Phase::LocateOrCreateTargetSection.enter();
    let destination = locate_mut(document.root_mut(), source.path(), Missing::Create)?
        .ok_or_else(|| Error::MissingSection {
            path: source.path().to_string(),
            origin: path.display().to_string(),
        })?;

    Phase::Merge.enter();
    merge::merge(destination, source)?;
    debug!("Merged `{}` into {}", source.path(), path.display());

    Ok(LocalMerge { original, document })
}
