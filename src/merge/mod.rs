//! # Section Merger
//!
//! Structural, one-directional merge of an upstream table into a local one.
//!
//! For every `(key, value)` of the source, in source order:
//!
//! - **Table into table**: when the destination also holds a standard table
//!   at `key`, the two are merged recursively.
//! - **Table into inline table**: the source entries are merged into the
//!   local inline table, which keeps its inline form and its local-only keys.
//! - **Table into anything else**: a copy of the source table (stripped of the
//!   upstream document's layout) replaces whatever was there, or is appended
//!   when the key was absent. Tables that render with a header are preceded by
//!   a blank line.
//! - **Out-of-order table**: handed to [`out_of_order`], which merges its
//!   sub-tables and then writes its leaves as dotted updates.
//! - **Scalars and sequences**: the destination value is overwritten in place,
//!   keeping the key's position and the comments attached to it. A leaf
//!   replaces a destination table of the same name (upstream's shape wins).
//!
//! Keys present only in the destination are never touched, and the source is
//! never modified.
//!
//! ## Example
//!
//! ```
//! use ruff_sync::document::ConfigDocument;
//! use ruff_sync::merge::merge;
//! use ruff_sync::path::SectionPath;
//! use ruff_sync::section::{locate_mut, Missing};
//!
//! let path = SectionPath::parse("tool.ruff");
//! let upstream = ConfigDocument::parse("[tool.ruff]\nline-length = 100\n", "upstream")?;
//! let source = upstream.section(&path)?.expect("upstream section");
//!
//! let mut local = ConfigDocument::parse("[tool.ruff]\nline-length = 88\nfix = true\n", "local")?;
//! let destination = locate_mut(local.root_mut(), &path, Missing::Create)?.expect("created");
//! merge(destination, &source)?;
//!
//! assert_eq!(local.to_string(), "[tool.ruff]\nline-length = 100\nfix = true\n");
//! # Ok::<(), ruff_sync::error::Error>(())
//! ```

pub mod out_of_order;

use log::{debug, warn};
use toml_edit::{InlineTable, Item, Key, Table, Value};

use crate::document::{self, NodeKind, Section};
use crate::error::Result;
use crate::path::SectionPath;

/// Merge every entry of `source` into `destination`
///
/// # Errors
///
/// Propagates errors from locating tables while merging out-of-order tables.
pub fn merge(destination: &mut Table, source: &Section<'_>) -> Result<()> {
    for (key, item) in source.entries() {
        merge_entry(destination, key, item, source)?;
    }
    Ok(())
}

/// Merge one entry of `source` into `destination`
pub(crate) fn merge_entry(
    destination: &mut Table,
    key: &Key,
    item: &Item,
    source: &Section<'_>,
) -> Result<()> {
    let name = key.get();
    match (source.kind_of(name, item), source.child(name)) {
        (NodeKind::OutOfOrderTable, Some(child)) => {
            debug!("Normalizing out-of-order table `{}`", child.path());
            out_of_order::merge_out_of_order(destination, key, &child)
        }
        (NodeKind::Table, Some(child)) => merge_table(destination, key, &child),
        _ => {
            overwrite(destination, key, item, source);
            Ok(())
        }
    }
}

fn merge_table(destination: &mut Table, key: &Key, source: &Section<'_>) -> Result<()> {
    match destination.get_mut(key.get()) {
        Some(Item::Table(existing)) => {
            debug!("Merging table `{}`", source.path());
            merge(existing, source)
        }
        Some(Item::Value(Value::InlineTable(existing))) => {
            debug!("Merging into inline table `{}`", source.path());
            merge_inline(existing, source.table(), source.path());
            Ok(())
        }
        _ => {
            insert_table(destination, key, source);
            Ok(())
        }
    }
}

/// Merge a table into a local inline table
///
/// Replaced values keep their surrounding whitespace. When keys are added the
/// inline table is reformatted so the new entries are spaced like the rest.
fn merge_inline(destination: &mut InlineTable, source: &Table, path: &SectionPath) {
    let mut added = false;
    for (key, item) in document::entries(source) {
        let path = path.child(key.get());
        match (destination.get_mut(key.get()), item) {
            (Some(Value::InlineTable(existing)), Item::Table(table)) => {
                merge_inline(existing, table, &path);
            }
            (Some(slot), _) => {
                if let Some(mut value) = inline_value(item, &path) {
                    debug!("Updating `{}`", path);
                    *value.decor_mut() = slot.decor().clone();
                    *slot = value;
                }
            }
            (None, _) => {
                if let Some(value) = inline_value(item, &path) {
                    debug!("Adding `{}`", path);
                    destination.insert(key.get(), value);
                    added = true;
                }
            }
        }
    }
    if added {
        destination.fmt();
    }
}

/// An item converted to a value that can live inside an inline table
fn inline_value(item: &Item, path: &SectionPath) -> Option<Value> {
    match item.clone().into_value() {
        Ok(mut value) => {
            value.decor_mut().clear();
            Some(value)
        }
        Err(_) => {
            warn!("Skipping `{}`: nothing to write", path);
            None
        }
    }
}

/// Append a copy of `source` at `key`, replacing any non-table value there
pub(crate) fn insert_table(destination: &mut Table, key: &Key, source: &Section<'_>) {
    if let Some(previous) = destination.remove(key.get()) {
        warn!(
            "Replacing {} at `{}` with upstream's table",
            document::type_name(&previous),
            source.path()
        );
    } else {
        debug!("Adding table `{}`", source.path());
    }

    let mut copy = document::structural_copy(&Item::Table(source.table().clone()));
    if let Item::Table(table) = &mut copy {
        document::ensure_blank_line_before(table);
    }
    destination.insert_formatted(key, copy);
}

fn overwrite(destination: &mut Table, key: &Key, item: &Item, source: &Section<'_>) {
    let path = source.path().child(key.get());
    match destination.get(key.get()) {
        Some(previous @ Item::Table(_)) => warn!(
            "Replacing {} at `{}` with upstream's {}",
            document::type_name(previous),
            path,
            document::type_name(item)
        ),
        Some(_) => debug!("Updating `{}`", path),
        None => debug!("Adding `{}`", path),
    }
    document::set(destination, key, document::structural_copy(item));
}
