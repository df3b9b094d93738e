//! Phase 3: Writing to Disk
//!
//! The merged document replaces the local file in one step:
//!
//! 1.  **Temporary File**: The text is written to a temporary file created in
//!     the same directory as the target, so the final rename never crosses
//!     filesystems.
//! 2.  **Permissions**: The temporary file takes on the permissions of the
//!     file it replaces.
//! 3.  **Rename**: The temporary file is renamed over the target. A reader sees
//!     either the old file or the new one, never a truncated mix.

use std::fs;
use std::io::Write;
use std::path::Path;

use log::{debug, warn};
use tempfile::NamedTempFile;

use super::Phase;
use crate::error::{Error, Result};

/// Execute Phase 3: atomically replace `path` with `contents`
///
/// # Errors
///
/// Returns `Error::FileAccess` if the temporary file cannot be created,
/// written or renamed into place. The original file is untouched in that case.
pub fn execute(path: &Path, contents: &str) -> Result<()> {
    Phase::WriteBack.enter();
    let access = |message: String| Error::FileAccess {
        path: path.display().to_string(),
        message,
    };

    let dir = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut temp = NamedTempFile::new_in(dir).map_err(|e| access(e.to_string()))?;
    temp.write_all(contents.as_bytes())
        .and_then(|()| temp.as_file().sync_all())
        .map_err(|e| access(e.to_string()))?;

    if let Ok(metadata) = fs::metadata(path) {
        if let Err(e) = fs::set_permissions(temp.path(), metadata.permissions()) {
            // Not fatal; the file keeps the temporary file's default mode
            warn!("Failed to copy permissions to '{}': {}", path.display(), e);
        }
    }

    temp.persist(path).map_err(|e| access(e.error.to_string()))?;
    debug!("Wrote {} bytes to {}", contents.len(), path.display());
    Ok(())
}
