//! Shared test utilities for integration and E2E tests.
//!
//! This module provides common fixtures, helper functions, and sample
//! documents to reduce duplication across test files.
//!
//! ## Usage
//!
//! Add `mod common;` to your test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new()
//!         .with_pyproject(documents::LOCAL)
//!         .with_upstream(documents::UPSTREAM);
//!     fixture.command().arg(fixture.upstream_url()).assert().success();
//! }
//! ```

use assert_fs::prelude::*;
use std::path::{Path, PathBuf};

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    #[allow(unused_imports)]
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use assert_fs::TempDir;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::documents;
    pub use super::TestFixture;
}

/// Sample `pyproject.toml` documents.
#[allow(dead_code)]
pub mod documents {
    /// A local project pinned to an older Ruff setup.
    pub const LOCAL: &str = r#"[project]
name = "demo"
version = "0.1.0"

[tool.ruff]
target-version = "py38"
lint.select = ["E"]

[tool.ruff.lint.per-file-ignores]
"tests/*" = ["S101"]
"#;

    /// The upstream template.
    pub const UPSTREAM: &str = r#"[project]
name = "template"

[tool.ruff]
target-version = "py39"
line-length = 100
lint.select = ["E", "F"]
lint.ignore = ["W191"]

[tool.ruff.lint.per-file-ignores]
"__init__.py" = ["F401"]
"#;

    /// An upstream document without a `[tool.ruff]` section.
    pub const NO_RUFF: &str = r#"[project]
name = "template"

[tool.black]
line-length = 100
"#;
}

/// A temporary project directory with a `pyproject.toml` and an upstream
/// file served through a `file://` URL.
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

impl TestFixture {
    /// Create a new test fixture with an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Add a `pyproject.toml` with the given content.
    pub fn with_pyproject(self, content: &str) -> Self {
        self.with_file("pyproject.toml", content)
    }

    /// Add the upstream document as `upstream/pyproject.toml`.
    pub fn with_upstream(self, content: &str) -> Self {
        self.with_file("upstream/pyproject.toml", content)
    }

    /// Add a file with the given path and content.
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Get the path to the local `pyproject.toml`.
    pub fn pyproject_path(&self) -> PathBuf {
        self.temp_dir.path().join("pyproject.toml")
    }

    /// Read the local `pyproject.toml`.
    pub fn read_pyproject(&self) -> String {
        std::fs::read_to_string(self.pyproject_path()).expect("Failed to read pyproject.toml")
    }

    /// The `file://` URL of the upstream document.
    pub fn upstream_url(&self) -> String {
        let path = self
            .temp_dir
            .path()
            .join("upstream")
            .join("pyproject.toml")
            .canonicalize()
            .expect("Upstream file should exist");
        url::Url::from_file_path(path)
            .expect("Absolute path")
            .to_string()
    }

    /// Create a child path in the temp directory.
    #[allow(dead_code)]
    pub fn child(&self, path: &str) -> assert_fs::fixture::ChildPath {
        self.temp_dir.child(path)
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl TestFixture {
    /// Create a command configured to run in this fixture's directory,
    /// with plain output and no inherited log configuration.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("ruff-sync");
        cmd.current_dir(self.path())
            .env_remove("RUST_LOG")
            .arg("--color")
            .arg("never");
        cmd
    }
}

/// Parse TOML text into a comparable value.
#[allow(dead_code)]
pub fn toml_value(text: &str) -> toml::Table {
    toml::from_str(text).expect("valid TOML")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_creates_temp_dir() {
        let fixture = TestFixture::new();
        assert!(fixture.path().exists());
    }

    #[test]
    fn test_fixture_upstream_url_is_file_url() {
        let fixture = TestFixture::new().with_upstream(documents::UPSTREAM);
        assert!(fixture.upstream_url().starts_with("file://"));
    }

    #[test]
    fn test_documents_are_valid_toml() {
        for document in [documents::LOCAL, documents::UPSTREAM, documents::NO_RUFF] {
            toml_value(document);
        }
    }
}
