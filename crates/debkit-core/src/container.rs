//! Outer ar(5) container assembly.
//!
//! The final `.deb` is a classic ar archive holding three members in a
//! fixed, semantically required order: `debian-binary`, `control.tar.gz`,
//! `data.tar.gz`. The two tar blobs are treated as opaque bytes. No crate
//! in our stack writes this format, so the 60-byte fixed-width member
//! headers are emitted by hand.

use std::io::Write;

use tracing::debug;

use debkit_schema::BuildTimestamp;

use crate::error::BuildError;

/// Global ar magic.
const AR_MAGIC: &[u8; 8] = b"!<arch>\n";

/// Header terminator bytes.
const AR_HEADER_END: &str = "`\n";

/// Fixed member mode, rendered in octal.
const AR_MODE: u32 = 0o644;

/// Sequential writer for classic ar archives.
///
/// Members are stored back to back, each preceded by a fixed-width header
/// (name:16, mtime:12, uid:6, gid:6, mode:8, size:10, terminator:2) and
/// padded to 2-byte alignment with a single `\n`.
#[derive(Debug)]
pub struct ArWriter<W: Write> {
    out: W,
}

impl<W: Write> ArWriter<W> {
    /// Start a new archive, emitting the global `!<arch>\n` header.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::ContainerWrite`] if the header cannot be
    /// written.
    pub fn new(mut out: W) -> Result<Self, BuildError> {
        out.write_all(AR_MAGIC)
            .map_err(|source| BuildError::ContainerWrite {
                member: "global header",
                source,
            })?;
        Ok(Self { out })
    }

    /// Append one named member.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::ContainerWrite`] naming the member on any
    /// header, body, or padding write failure.
    pub fn append(
        &mut self,
        member: &'static str,
        timestamp: BuildTimestamp,
        body: &[u8],
    ) -> Result<(), BuildError> {
        let container_write = |source| BuildError::ContainerWrite { member, source };

        let header = format!(
            "{member:<16}{mtime:<12}{uid:<6}{gid:<6}{mode:<8o}{size:<10}{end}",
            mtime = timestamp.secs(),
            uid = 0,
            gid = 0,
            mode = AR_MODE,
            size = body.len(),
            end = AR_HEADER_END,
        );
        debug_assert_eq!(header.len(), 60);

        self.out.write_all(header.as_bytes()).map_err(container_write)?;
        self.out.write_all(body).map_err(container_write)?;
        // Member data is 2-byte aligned
        if body.len() % 2 == 1 {
            self.out.write_all(b"\n").map_err(container_write)?;
        }
        Ok(())
    }
}

/// Assemble the final container: `debian-binary` (`2.0\n`), then the
/// control archive, then the data archive, in that exact order.
///
/// # Errors
///
/// Returns [`BuildError::ContainerWrite`] naming the member (or the global
/// header) on any write failure.
pub fn write_container<W: Write>(
    control_tar_gz: &[u8],
    data_tar_gz: &[u8],
    timestamp: BuildTimestamp,
    out: W,
) -> Result<(), BuildError> {
    let mut ar = ArWriter::new(out)?;
    ar.append("debian-binary", timestamp, b"2.0\n")?;
    ar.append("control.tar.gz", timestamp, control_tar_gz)?;
    ar.append("data.tar.gz", timestamp, data_tar_gz)?;
    debug!(
        control = control_tar_gz.len(),
        data = data_tar_gz.len(),
        "container assembled"
    );
    Ok(())
}
