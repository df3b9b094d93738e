//! Exclusion filter for upstream sections
//!
//! Before an upstream section is merged, keys the user wants to keep under
//! local control are stripped from it. Because the merge only ever visits
//! keys present in the source, an excluded key's local value (if any) is
//! left exactly as it was.
//!
//! Two forms of exclusion are accepted:
//!
//! - A bare name such as `per-file-ignores` or `ignore` matches a direct child
//!   of the section and a direct child of any of the section's direct
//!   sub-tables. Ruff settings moved under `lint` over time, so a bare name
//!   covers both `tool.ruff.per-file-ignores` and
//!   `tool.ruff.lint.per-file-ignores`.
//! - A dotted name such as `lint.per-file-ignores` matches exactly that path
//!   relative to the section.

use std::collections::BTreeSet;
use std::fmt;

use toml_edit::{Item, Table};

use crate::path::SectionPath;

/// A set of keys to strip from an upstream section
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Exclusions {
    entries: BTreeSet<SectionPath>,
}

impl Exclusions {
    /// No exclusions at all
    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether `name` (bare or dotted) is excluded
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains(&SectionPath::parse(name))
    }

    pub fn iter(&self) -> impl Iterator<Item = &SectionPath> {
        self.entries.iter()
    }
}

impl<S: AsRef<str>> FromIterator<S> for Exclusions {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|name| SectionPath::parse(name.as_ref()))
                .filter(|path| !path.is_empty())
                .collect(),
        }
    }
}

impl fmt::Display for Exclusions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, entry) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", entry)?;
        }
        Ok(())
    }
}

/// Remove excluded keys from `section`
///
/// Returns the removed paths, relative to `section`, in the order they were
/// removed.
pub fn filter_children(section: &mut Table, exclusions: &Exclusions) -> Vec<SectionPath> {
    let mut removed = Vec::new();

    for entry in exclusions.iter() {
        match entry.segments() {
            [name] => {
                if section.remove(name).is_some() {
                    removed.push(entry.clone());
                }
                for (key, item) in section.iter_mut() {
                    if let Item::Table(child) = item {
                        if child.remove(name).is_some() {
                            removed.push(SectionPath::new([key.get(), name.as_str()]));
                        }
                    }
                }
            }
            [parents @ .., name] => {
                if let Some(parent) = descend(section, parents) {
                    if parent.remove(name).is_some() {
                        removed.push(entry.clone());
                    }
                }
            }
            [] => {}
        }
    }

    removed
}

fn descend<'a>(table: &'a mut Table, path: &[String]) -> Option<&'a mut Table> {
    let mut current = table;
    for key in path {
        current = current.get_mut(key)?.as_table_mut()?;
    }
    Some(current)
}
