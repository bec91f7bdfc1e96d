//! Package metadata and file entries.
//!
//! Human-readable package definitions, loadable from TOML.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when loading or parsing a package definition.
#[derive(Error, Debug)]
pub enum PackageError {
    /// An I/O error occurred while reading a package file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The TOML content could not be deserialized into a valid package.
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Metadata describing a package's identity, rendered verbatim into the
/// control record.
///
/// All fields are caller-supplied and pre-validated: no semantic checking of
/// version syntax or dependency grammar happens here or downstream, only
/// textual rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageInfo {
    /// Unique name that identifies this package.
    pub name: String,
    /// Version string for the package release.
    pub version: String,
    /// Archive section the package belongs to (e.g. `utils`).
    #[serde(default)]
    pub section: String,
    /// Installation priority (e.g. `optional`).
    #[serde(default)]
    pub priority: String,
    /// Target architecture (e.g. `amd64`, `all`).
    pub arch: String,
    /// Maintainer name and email address.
    #[serde(default)]
    pub maintainer: String,
    /// Vendor name.
    #[serde(default)]
    pub vendor: String,
    /// URL of the project's homepage.
    #[serde(default)]
    pub homepage: String,
    /// Short human-readable summary of the package.
    #[serde(default)]
    pub description: String,
    /// Package this one replaces, possibly empty.
    #[serde(default)]
    pub replaces: String,
    /// Virtual package this one provides, possibly empty.
    #[serde(default)]
    pub provides: String,
    /// Runtime dependency constraint expressions, in declaration order.
    #[serde(default)]
    pub depends: Vec<String>,
    /// Conflicting package constraint expressions, in declaration order.
    #[serde(default)]
    pub conflicts: Vec<String>,
}

impl PackageInfo {
    /// Parse a package definition from a TOML file on disk.
    ///
    /// # Errors
    ///
    /// Returns `PackageError::Io` if the file cannot be read, or
    /// `PackageError::Parse` if the TOML content is invalid.
    pub fn from_file(path: &Path) -> Result<Self, PackageError> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse a package definition from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns `PackageError::Parse` if the TOML content is invalid or does
    /// not match the expected schema.
    pub fn parse(content: &str) -> Result<Self, PackageError> {
        Ok(toml::from_str(content)?)
    }
}

impl std::str::FromStr for PackageInfo {
    type Err = PackageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// A file to be packaged: where it lives on the local filesystem and where
/// it lands inside the installed tree.
///
/// The destination must start with the relative-root marker `./` (e.g.
/// `./usr/bin/tool`); builds fail loudly on entries that violate this.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileEntry {
    /// Source path on the local filesystem.
    pub src: PathBuf,
    /// Destination path inside the installed package tree, `./`-prefixed.
    pub dst: String,
}

impl FileEntry {
    /// Create a new file entry.
    pub fn new(src: impl Into<PathBuf>, dst: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            dst: dst.into(),
        }
    }

    /// The install-relative path: the destination with its `./` root marker
    /// removed. Returns `None` when the marker is absent.
    pub fn install_path(&self) -> Option<&str> {
        self.dst.strip_prefix("./")
    }
}
