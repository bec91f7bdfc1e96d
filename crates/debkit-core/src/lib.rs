//! Deterministic `.deb` package construction.
//!
//! Builds a binary software-distribution package from caller-supplied
//! metadata and `(source, destination)` file entries: a classic ar container
//! holding `debian-binary`, `control.tar.gz`, and `data.tar.gz`, in that
//! order. Given identical inputs and an identical [`BuildTimestamp`], the
//! output is byte-identical across runs.
//!
//! The pipeline is strictly sequential: the data archive must finish first
//! because the control record needs its final installed size and complete
//! checksum ledger. Dependency resolution, signing, installation, and
//! repository interaction are collaborator concerns and live elsewhere.

use std::io::Write;

use tracing::debug;

use debkit_schema::{BuildTimestamp, FileEntry, PackageInfo};

pub mod container;
pub mod control;
pub mod data;
pub mod error;
mod gzip;

// Re-exports
pub use container::{ArWriter, write_container};
pub use control::{build_control_archive, render_control};
pub use data::{ChecksumLedger, DataArchive, build_data_archive};
pub use error::BuildError;

/// Build a package and write it to `out`, stamping every archive layer with
/// the current time.
///
/// # Errors
///
/// Any failure aborts the whole build; see [`BuildError`] for the taxonomy.
/// A failed build must not be treated as a usable artifact — the caller is
/// responsible for discarding a partially written sink.
pub fn write_package<W: Write>(
    info: &PackageInfo,
    files: &[FileEntry],
    out: W,
) -> Result<(), BuildError> {
    write_package_at(info, files, BuildTimestamp::now(), out)
}

/// Build a package with an explicit timestamp.
///
/// The timestamp is threaded through every tar header, gzip header, and
/// container member header, so equal inputs plus an equal timestamp yield
/// byte-identical output. Tests inject a fixed clock here.
///
/// # Errors
///
/// See [`write_package`].
pub fn write_package_at<W: Write>(
    info: &PackageInfo,
    files: &[FileEntry],
    timestamp: BuildTimestamp,
    out: W,
) -> Result<(), BuildError> {
    debug!(package = %info.name, files = files.len(), "building package");
    let archive = data::build_data_archive(files, timestamp)?;
    let control = control::build_control_archive(
        info,
        archive.installed_bytes,
        &archive.ledger,
        timestamp,
    )?;
    container::write_container(&control, &archive.bytes, timestamp, out)
}
