//! Section paths for addressing sub-trees of a TOML document

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use toml_edit::Key;

/// An ordered sequence of keys identifying a table, e.g. `tool.ruff`
///
/// Paths are used both to look tables up and to create them when missing.
/// Segments are stored unquoted; [`fmt::Display`] re-quotes segments that are
/// not valid bare keys.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SectionPath {
    segments: Vec<String>,
}

impl SectionPath {
    /// Create a path from already-split segments
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// The empty path, addressing the document root
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse a dotted key into a `SectionPath`
    ///
    /// The text is read the way TOML reads a dotted key: bare segments,
    /// basic strings with escapes (`tool."ruff\u002dsync"`) and literal
    /// strings (`tool.'a.b'`), with whitespace allowed around the dots. Text
    /// that is not a valid dotted key, such as a name containing spaces, is
    /// taken as a single segment. Blank text is the root path.
    ///
    /// # Examples
    ///
    /// ```
    /// use ruff_sync::path::SectionPath;
    ///
    /// let path = SectionPath::parse("tool.ruff.lint");
    /// assert_eq!(path.len(), 3);
    /// assert_eq!(path.to_string(), "tool.ruff.lint");
    /// ```
    pub fn parse(path: &str) -> Self {
        let trimmed = path.trim();
        if trimmed.is_empty() {
            return Self::root();
        }
        match Key::parse(trimmed) {
            Ok(keys) => Self::new(keys.iter().map(Key::get)),
            Err(_) => Self::new([trimmed]),
        }
    }

    /// The segments of this path, outermost first
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Iterate over segments as string slices
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// A new path with `key` appended
    pub fn child(&self, key: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(key.to_string());
        Self { segments }
    }

    /// The first `len` segments of this path
    pub fn prefix(&self, len: usize) -> Self {
        Self {
            segments: self.segments[..len.min(self.segments.len())].to_vec(),
        }
    }
}

impl fmt::Display for SectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            f.write_str(&Key::new(segment.as_str()).display_repr())?;
        }
        Ok(())
    }
}

impl FromStr for SectionPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<&[&str]> for SectionPath {
    fn from(segments: &[&str]) -> Self {
        Self::new(segments.iter().copied())
    }
}

impl<const N: usize> From<[&str; N]> for SectionPath {
    fn from(segments: [&str; N]) -> Self {
        Self::new(segments)
    }
}
