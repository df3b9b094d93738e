//! # Document Model
//!
//! A thin layer over [`toml_edit`] that gives the rest of the crate a
//! round-trip-preserving view of a TOML document.
//!
//! ## Key Components
//!
//! - **`ConfigDocument`**: owns a parsed [`DocumentMut`] together with the
//!   name of where it came from and the set of tables whose text was split
//!   across non-adjacent regions of the source ("out of order" tables).
//!   Rendering an unmodified document reproduces its input byte for byte.
//!
//! - **`Section`**: a borrowed view of one table inside a document that also
//!   knows which of its descendants are out of order. The merge code reads
//!   upstream tables only through this view.
//!
//! - **`NodeKind`**: classification of a node as a scalar, a sequence, a
//!   table, or an out-of-order table.
//!
//! - **Table helpers** (`get`, `set`, `remove`, `structural_copy`): the
//!   editing primitives the merge relies on. `set` replaces existing values
//!   in place so that the key keeps its position, spelling and surrounding
//!   comments; new keys are appended.
//!
//! ## Out-of-order tables
//!
//! TOML allows `[tool.ruff.lint]` to appear before `[tool.ruff]`, or
//! `[tool.ruff]` and `[tool.ruff.lint]` to be separated by an unrelated
//! table. `toml_edit` assembles the logical tree regardless and remembers
//! each header's position in the file. A table is flagged as out of order when
//! the headers it and its descendants own do not form one contiguous run of
//! headers, or when one of its descendants' headers precedes its own.

use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::Path;

use toml_edit::{ArrayOfTables, DocumentMut, Item, Key, RawString, Table, Value};

use crate::error::{Error, Result};
use crate::path::SectionPath;
use crate::section;

/// Classification of a node for merge purposes
///
/// Inline tables are leaves: they are replaced as a whole, never merged
/// key by key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind {
    /// A string, number, boolean, datetime or inline table
    Scalar,
    /// An array or an array of tables
    Sequence,
    /// A standard, dotted or implicit table
    Table,
    /// A table whose children were declared in non-adjacent parts of the text
    OutOfOrderTable,
}

impl NodeKind {
    /// Classify an item without order information
    pub fn of(item: &Item) -> Self {
        match item {
            Item::Table(_) => NodeKind::Table,
            Item::ArrayOfTables(_) | Item::Value(Value::Array(_)) => NodeKind::Sequence,
            Item::Value(_) | Item::None => NodeKind::Scalar,
        }
    }

    /// Whether nodes of this kind are recursed into during a merge
    pub fn is_table(self) -> bool {
        matches!(self, NodeKind::Table | NodeKind::OutOfOrderTable)
    }
}

/// A parsed TOML document with its provenance and layout information
#[derive(Debug, Clone)]
pub struct ConfigDocument {
    doc: DocumentMut,
    origin: String,
    out_of_order: BTreeSet<SectionPath>,
}

impl ConfigDocument {
    /// Parse TOML text
    ///
    /// `origin` identifies the document in error messages, e.g. a file path
    /// or the upstream URL.
    ///
    /// # Errors
    ///
    /// Returns `Error::Parse` if the text is not valid TOML.
    pub fn parse(text: &str, origin: impl Into<String>) -> Result<Self> {
        let origin = origin.into();
        let doc = text.parse::<DocumentMut>().map_err(|err| Error::Parse {
            origin: origin.clone(),
            message: err.to_string(),
        })?;
        let out_of_order = detect_out_of_order(doc.as_table());
        Ok(Self {
            doc,
            origin,
            out_of_order,
        })
    }

    /// Read and parse a TOML file
    ///
    /// # Errors
    ///
    /// Returns `Error::FileAccess` if the file cannot be read and
    /// `Error::Parse` if it is not valid TOML.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|err| Error::FileAccess {
            path: path.display().to_string(),
            message: err.to_string(),
        })?;
        Self::parse(&text, path.display().to_string())
    }

    /// Where this document came from
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// The top-level table
    pub fn root(&self) -> &Table {
        self.doc.as_table()
    }

    /// The top-level table, mutably
    pub fn root_mut(&mut self) -> &mut Table {
        self.doc.as_table_mut()
    }

    /// Look up any node by path
    pub fn get(&self, path: &SectionPath) -> Option<&Item> {
        get(self.root(), path)
    }

    /// Whether the table at `path` was flagged as out of order when parsed
    pub fn is_out_of_order(&self, path: &SectionPath) -> bool {
        self.out_of_order.contains(path)
    }

    /// All tables flagged as out of order, in path order
    pub fn out_of_order_tables(&self) -> impl Iterator<Item = &SectionPath> {
        self.out_of_order.iter()
    }

    /// A read-only view of the table at `path`
    ///
    /// Returns `Ok(None)` if any segment of the path is absent.
    ///
    /// # Errors
    ///
    /// Returns `Error::TypeMismatch` if a segment exists but is not a table.
    pub fn section(&self, path: &SectionPath) -> Result<Option<Section<'_>>> {
        Ok(section::locate(self.root(), path)?.map(|table| Section {
            table,
            path: path.clone(),
            layout: &self.out_of_order,
        }))
    }
}

impl fmt::Display for ConfigDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.doc.fmt(f)
    }
}

/// A borrowed table together with its document's order information
#[derive(Debug, Clone)]
pub struct Section<'a> {
    table: &'a Table,
    path: SectionPath,
    layout: &'a BTreeSet<SectionPath>,
}

impl<'a> Section<'a> {
    /// The underlying table
    pub fn table(&self) -> &'a Table {
        self.table
    }

    /// Path of this table from the document root
    pub fn path(&self) -> &SectionPath {
        &self.path
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Whether this table itself is out of order
    pub fn is_out_of_order(&self) -> bool {
        self.layout.contains(&self.path)
    }

    /// Children with their formatted keys, in document order
    pub fn entries(&self) -> impl Iterator<Item = (&'a Key, &'a Item)> + 'a {
        entries(self.table)
    }

    /// Classify a direct child, taking order information into account
    pub fn kind_of(&self, key: &str, item: &Item) -> NodeKind {
        match NodeKind::of(item) {
            NodeKind::Table if self.layout.contains(&self.path.child(key)) => {
                NodeKind::OutOfOrderTable
            }
            kind => kind,
        }
    }

    /// A view of a direct child table
    pub fn child(&self, key: &str) -> Option<Section<'a>> {
        match self.table.get(key) {
            Some(Item::Table(table)) => Some(Section {
                table,
                path: self.path.child(key),
                layout: self.layout,
            }),
            _ => None,
        }
    }
}

/// Children of a table with their formatted keys, in document order
pub fn entries(table: &Table) -> impl Iterator<Item = (&Key, &Item)> {
    table
        .iter()
        .filter_map(move |(key, _)| table.get_key_value(key))
}

/// Look up a node by path, starting at `table`
///
/// The empty path yields `None`; use the table itself instead.
pub fn get<'a>(table: &'a Table, path: &SectionPath) -> Option<&'a Item> {
    let (last, parents) = path.segments().split_last()?;
    let mut current = table;
    for key in parents {
        current = current.get(key)?.as_table()?;
    }
    current.get(last)
}

/// Insert or replace a child
///
/// An existing key keeps its position, its spelling and any comments attached
/// to it; only the value changes. A new key is appended after the existing
/// children, formatted as `key` is.
pub fn set(table: &mut Table, key: &Key, item: Item) -> Option<Item> {
    match table.get_mut(key.get()) {
        Some(slot) => Some(std::mem::replace(slot, item)),
        None => {
            table.insert_formatted(key, item);
            None
        }
    }
}

/// Remove a child, returning it if it was present
pub fn remove(table: &mut Table, key: &str) -> Option<Item> {
    table.remove(key)
}

/// Deep-copy an item without its source document's layout
///
/// Tables are rebuilt so that they carry no header position from the
/// document they were parsed from. When rendered inside another document the
/// copies follow the table they are inserted after, children after parents,
/// in key order. Keys, values and comments are copied verbatim.
pub fn structural_copy(item: &Item) -> Item {
    match item {
        Item::Table(table) => Item::Table(copy_table(table)),
        Item::ArrayOfTables(array) => {
            let mut copy = ArrayOfTables::new();
            for table in array.iter() {
                copy.push(copy_table(table));
            }
            Item::ArrayOfTables(copy)
        }
        other => other.clone(),
    }
}

fn copy_table(table: &Table) -> Table {
    let mut copy = Table::new();
    copy.set_implicit(table.is_implicit());
    copy.set_dotted(table.is_dotted());
    *copy.decor_mut() = table.decor().clone();
    for (key, item) in entries(table) {
        copy.insert_formatted(key, structural_copy(item));
    }
    copy
}

/// Make sure a table header will be preceded by a blank line
///
/// Dotted tables have no header and are left alone. A table without an
/// explicit prefix already gets a blank line when rendered.
pub fn ensure_blank_line_before(table: &mut Table) {
    if table.is_dotted() {
        return;
    }
    let prefix = table
        .decor()
        .prefix()
        .and_then(RawString::as_str)
        .map(str::to_owned);
    if let Some(prefix) = prefix {
        if !prefix.starts_with('\n') {
            table.decor_mut().set_prefix(format!("\n{}", prefix));
        }
    }
}

/// Human-readable name of an item's type, for diagnostics
pub fn type_name(item: &Item) -> &'static str {
    match item {
        Item::None => "nothing",
        Item::Table(_) => "table",
        Item::ArrayOfTables(_) => "array of tables",
        Item::Value(value) => match value {
            Value::String(_) => "string",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::Boolean(_) => "boolean",
            Value::Datetime(_) => "datetime",
            Value::Array(_) => "array",
            Value::InlineTable(_) => "inline table",
        },
    }
}

// Out-of-order detection

fn header_position(table: &Table) -> Option<usize> {
    if table.is_implicit() || table.is_dotted() {
        None
    } else {
        table.position()
    }
}

/// Header positions owned by `table` and everything beneath it
fn collect_headers(table: &Table, out: &mut Vec<usize>) {
    if let Some(position) = header_position(table) {
        out.push(position);
    }
    for (_, item) in table.iter() {
        match item {
            Item::Table(child) => collect_headers(child, out),
            Item::ArrayOfTables(array) => {
                for child in array.iter() {
                    collect_headers(child, out);
                }
            }
            _ => {}
        }
    }
}

fn detect_out_of_order(root: &Table) -> BTreeSet<SectionPath> {
    let mut headers = Vec::new();
    for (_, item) in root.iter() {
        match item {
            Item::Table(child) => collect_headers(child, &mut headers),
            Item::ArrayOfTables(array) => {
                for child in array.iter() {
                    collect_headers(child, &mut headers);
                }
            }
            _ => {}
        }
    }
    headers.sort_unstable();
    headers.dedup();

    let mut flagged = BTreeSet::new();
    scan_tables(root, &SectionPath::root(), &headers, &mut flagged);
    flagged
}

fn scan_tables(
    table: &Table,
    path: &SectionPath,
    headers: &[usize],
    flagged: &mut BTreeSet<SectionPath>,
) {
    for (key, item) in table.iter() {
        if let Item::Table(child) = item {
            let child_path = path.child(key);
            if is_out_of_order(child, headers) {
                flagged.insert(child_path.clone());
            }
            scan_tables(child, &child_path, headers, flagged);
        }
    }
}

fn is_out_of_order(table: &Table, headers: &[usize]) -> bool {
    let mut owned = Vec::new();
    collect_headers(table, &mut owned);
    owned.sort_unstable();

    let (Some(&first), Some(&last)) = (owned.first(), owned.last()) else {
        return false;
    };
    if header_position(table).is_some_and(|own| own != first) {
        return true;
    }

    let rank = |position: usize| headers.binary_search(&position).unwrap_or_else(|i| i);
    rank(last) - rank(first) + 1 != owned.len()
}
