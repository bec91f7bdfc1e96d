//! Control archive construction.
//!
//! Renders the textual control record from [`PackageInfo`] and packs it,
//! together with the rendered checksum ledger, into `control.tar.gz` as
//! exactly two entries: `control` then `md5sums`.

use std::io;

use tar::{Builder, Header};
use tracing::debug;

use debkit_schema::{BuildTimestamp, PackageInfo};

use crate::data::ChecksumLedger;
use crate::error::BuildError;
use crate::gzip;

/// Append one `Field: value` line, refusing values that would break the
/// one-line-per-field layout.
fn field_line(out: &mut String, field: &'static str, value: &str) -> Result<(), BuildError> {
    if value.contains('\n') {
        return Err(BuildError::Render { field });
    }
    out.push_str(field);
    out.push_str(": ");
    out.push_str(value);
    out.push('\n');
    Ok(())
}

/// Join constraint expressions with `", "`, trimming stray blank padding.
/// An empty list renders as an empty field value.
fn join(items: &[String]) -> String {
    items.join(", ").trim_matches(' ').to_string()
}

/// Render the control record.
///
/// Field order is fixed; every field is emitted even when its value is
/// empty. The installed size is the byte total truncated to kibibytes.
/// Rendering is purely a function of its inputs: no locale-, time-, or
/// environment-dependent formatting.
///
/// # Errors
///
/// Returns [`BuildError::Render`] naming the field whose value contains a
/// line break.
pub fn render_control(info: &PackageInfo, installed_bytes: u64) -> Result<String, BuildError> {
    let mut out = String::new();
    field_line(&mut out, "Package", &info.name)?;
    field_line(&mut out, "Version", &info.version)?;
    field_line(&mut out, "Section", &info.section)?;
    field_line(&mut out, "Priority", &info.priority)?;
    field_line(&mut out, "Architecture", &info.arch)?;
    field_line(&mut out, "Maintainer", &info.maintainer)?;
    field_line(&mut out, "Vendor", &info.vendor)?;
    field_line(&mut out, "Installed-Size", &(installed_bytes / 1024).to_string())?;
    field_line(&mut out, "Replaces", &info.replaces)?;
    field_line(&mut out, "Provides", &info.provides)?;
    field_line(&mut out, "Depends", &join(&info.depends))?;
    field_line(&mut out, "Conflicts", &join(&info.conflicts))?;
    field_line(&mut out, "Homepage", &info.homepage)?;
    field_line(&mut out, "Description", &info.description)?;
    Ok(out)
}

/// Append one regular-file text entry with the fixed 0o644 mode.
fn append_text(
    tar: &mut Builder<impl io::Write>,
    name: &str,
    body: &[u8],
    timestamp: BuildTimestamp,
) -> Result<(), BuildError> {
    let archive_write = |source| BuildError::ArchiveWrite {
        name: name.to_string(),
        source,
    };
    let mut header = Header::new_gnu();
    header.set_path(name).map_err(archive_write)?;
    header.set_size(body.len() as u64);
    header.set_mode(0o644);
    header.set_uid(0);
    header.set_gid(0);
    header.set_mtime(timestamp.secs());
    header.set_entry_type(tar::EntryType::Regular);
    header.set_cksum();
    tar.append(&header, body).map_err(archive_write)
}

/// Build `control.tar.gz` from the rendered control record and the checksum
/// ledger produced by the data archive builder.
///
/// # Errors
///
/// Returns [`BuildError::Render`] for a malformed metadata field and
/// [`BuildError::ArchiveWrite`] on any header or body write failure. Never
/// returns a partial or malformed control archive as success.
pub fn build_control_archive(
    info: &PackageInfo,
    installed_bytes: u64,
    ledger: &ChecksumLedger,
    timestamp: BuildTimestamp,
) -> Result<Vec<u8>, BuildError> {
    let control = render_control(info, installed_bytes)?;

    let mut tar = Builder::new(gzip::encoder(timestamp));
    append_text(&mut tar, "control", control.as_bytes(), timestamp)?;
    append_text(&mut tar, "md5sums", ledger.render().as_bytes(), timestamp)?;

    let stream_write = |source| BuildError::ArchiveWrite {
        name: "control.tar.gz".to_string(),
        source,
    };
    let encoder = tar.into_inner().map_err(stream_write)?;
    let bytes = encoder.finish().map_err(stream_write)?;

    debug!(package = %info.name, compressed = bytes.len(), "control archive finished");
    Ok(bytes)
}
