//! Locating (and creating) tables by path
//!
//! Both lookups walk a [`SectionPath`] key by key from a starting table.
//! A missing segment ends the walk with `None` unless creation was requested,
//! in which case an empty implicit table is appended at each missing level.
//! Implicit tables render no header of their own until they hold values, so
//! creating `tool.ruff` in a document without a `[tool]` table never adds an
//! empty `[tool]` header.
//!
//! A segment that exists but is not a standard table (a string, an array,
//! an inline table, an array of tables) is a `TypeMismatch`: the document is
//! not shaped the way a configuration section is expected to be.

use log::debug;
use toml_edit::{Item, Table};

use crate::document::type_name;
use crate::error::{Error, Result};
use crate::path::SectionPath;

/// Whether missing tables should be created while walking a path
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Missing {
    /// Stop and report the section as absent
    Absent,
    /// Create an empty table at each missing level
    Create,
}

/// Find the table at `path` beneath `root`
///
/// The empty path locates `root` itself.
///
/// # Errors
///
/// Returns `Error::TypeMismatch` if a segment of `path` exists but is not a table.
pub fn locate<'a>(root: &'a Table, path: &SectionPath) -> Result<Option<&'a Table>> {
    let mut current = root;
    for (depth, key) in path.iter().enumerate() {
        current = match current.get(key) {
            None => return Ok(None),
            Some(Item::Table(table)) => table,
            Some(other) => return Err(mismatch(path, depth, other)),
        };
    }
    Ok(Some(current))
}

/// Find the table at `path` beneath `root`, optionally creating it
///
/// With [`Missing::Create`] the result is always `Some`; created tables are
/// appended as the last child of their parent.
///
/// # Errors
///
/// Returns `Error::TypeMismatch` if a segment of `path` exists but is not a table.
pub fn locate_mut<'a>(
    root: &'a mut Table,
    path: &SectionPath,
    missing: Missing,
) -> Result<Option<&'a mut Table>> {
    let mut current = root;
    for (depth, key) in path.iter().enumerate() {
        if missing == Missing::Create && !current.contains_key(key) {
            debug!("Creating table `{}`", path.prefix(depth + 1));
            let mut table = Table::new();
            table.set_implicit(true);
            current.insert(key, Item::Table(table));
        }
        current = match current.get_mut(key) {
            None => return Ok(None),
            Some(Item::Table(table)) => table,
            Some(other) => return Err(mismatch(path, depth, other)),
        };
    }
    Ok(Some(current))
}

fn mismatch(path: &SectionPath, depth: usize, found: &Item) -> Error {
    Error::TypeMismatch {
        path: path.prefix(depth + 1).to_string(),
        expected: "table",
        found: type_name(found),
    }
}
