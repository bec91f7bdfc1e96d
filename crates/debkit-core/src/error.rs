//! Build error taxonomy.
//!
//! Every variant names the offending path, member, or field so callers can
//! diagnose a failed build without inspecting internals. All errors are
//! fatal: there is no retry and no partial-success mode, and a failed build
//! must never be treated as a usable artifact.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that can abort a package build.
#[derive(Error, Debug)]
pub enum BuildError {
    /// A source file could not be opened or read.
    #[error("cannot read source {}: {source}", .path.display())]
    SourceRead {
        /// The source path that failed.
        path: PathBuf,
        /// The underlying I/O error.
        source: io::Error,
    },

    /// A destination path is missing the `./` relative-root marker.
    #[error("destination {path:?} does not start with ./")]
    InvalidDestination {
        /// The offending destination path.
        path: String,
    },

    /// A header or body could not be written into a tar member.
    #[error("cannot write {name} into archive: {source}")]
    ArchiveWrite {
        /// Name of the tar entry (or stream) being written.
        name: String,
        /// The underlying I/O error.
        source: io::Error,
    },

    /// A metadata field would corrupt the fixed control-record layout.
    #[error("field {field} contains a line break and would corrupt the control record")]
    Render {
        /// The control field whose value is malformed.
        field: &'static str,
    },

    /// The outer container header or a member could not be written.
    #[error("cannot write container member {member}: {source}")]
    ContainerWrite {
        /// The container member (or global header) being written.
        member: &'static str,
        /// The underlying I/O error.
        source: io::Error,
    },
}
