//! Merging tables whose definition is split across the source document
//!
//! When an upstream table is out of order (its header follows one of its
//! sub-tables, or an unrelated table sits between its parts) it is merged in
//! two passes:
//!
//! 1. Sub-tables are merged recursively into the destination's table of the
//!    same name, which is created first if it does not exist.
//! 2. Leaf values are staged as dotted updates and written afterwards, so a
//!    leaf always wins over whatever the first pass left at the same key.
//!
//! Nothing in the upstream tree is modified. Tables are written as fresh
//! copies, so the split layout of the upstream text never reaches the local
//! file.

use log::{debug, warn};
use toml_edit::{Item, Key, Table, Value};

use crate::document::{self, Section};
use crate::error::Result;
use crate::path::SectionPath;
use crate::section::{locate_mut, Missing};

/// A leaf write deferred until the table pass has finished
#[derive(Debug)]
struct DottedUpdate<'a> {
    parent: &'a Key,
    key: &'a Key,
    value: &'a Item,
    path: SectionPath,
}

impl DottedUpdate<'_> {
    fn apply(self, destination: &mut Table) {
        match destination.get_mut(self.parent.get()) {
            Some(Item::Table(parent)) => {
                if let Some(Item::Table(_)) = parent.get(self.key.get()) {
                    warn!("Replacing table at `{}` with upstream's value", self.path);
                    parent.remove(self.key.get());
                }
                debug!("Setting `{}`", self.path);
                document::set(parent, self.key, document::structural_copy(self.value));
            }
            _ => {
                let mut nested = Table::new();
                nested.insert_formatted(self.key, document::structural_copy(self.value));
                if let Some(previous) = destination.remove(self.parent.get()) {
                    warn!(
                        "Replacing {} with a table holding `{}`",
                        document::type_name(&previous),
                        self.path
                    );
                }
                destination.insert_formatted(self.parent, Item::Table(nested));
            }
        }
    }
}

/// Merge the out-of-order table `source`, found at `key`, into `destination`
///
/// # Errors
///
/// Propagates errors from merging the table's sub-tables.
pub(crate) fn merge_out_of_order(
    destination: &mut Table,
    key: &Key,
    source: &Section<'_>,
) -> Result<()> {
    if let Some(item) = destination.get_mut(key.get()) {
        if let Item::Value(Value::InlineTable(inline)) = item {
            debug!("Expanding inline table `{}`", source.path());
            let table = std::mem::take(inline).into_table();
            *item = Item::Table(table);
        }
    }
    if !destination.contains_key(key.get()) {
        debug!("Creating table `{}` ahead of its children", source.path());
        let created = locate_mut(destination, &SectionPath::new([key.get()]), Missing::Create)?;
        if let Some(created) = created {
            created.set_dotted(source.table().is_dotted());
        }
    }

    let mut staged = Vec::new();
    for (child_key, item) in source.entries() {
        if source.kind_of(child_key.get(), item).is_table() {
            if let Some(parent) = table_at(destination, key, source.path()) {
                super::merge_entry(parent, child_key, item, source)?;
            }
        } else {
            staged.push(DottedUpdate {
                parent: key,
                key: child_key,
                value: item,
                path: source.path().child(child_key.get()),
            });
        }
    }

    for update in staged {
        update.apply(destination);
    }
    Ok(())
}

/// The table at `key`, replacing a non-table value if necessary
fn table_at<'a>(
    destination: &'a mut Table,
    key: &Key,
    path: &SectionPath,
) -> Option<&'a mut Table> {
    let item = destination.entry_format(key).or_insert(Item::None);
    if !item.is_table() {
        if !item.is_none() {
            warn!(
                "Replacing {} at `{}` with upstream's table",
                document::type_name(item),
                path
            );
        }
        *item = Item::Table(Table::new());
    }
    item.as_table_mut()
}
