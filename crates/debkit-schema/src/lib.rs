//! Shared data model for debkit.
//!
//! Pure data: package metadata, file entries, and the build timestamp.
//! All behavior beyond parsing and accessor methods lives in `debkit-core`.

pub mod package;
pub mod timestamp;

// Re-exports
pub use package::{FileEntry, PackageError, PackageInfo};
pub use timestamp::BuildTimestamp;
