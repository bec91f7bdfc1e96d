//! Data archive construction.
//!
//! Streams each source file into `data.tar.gz`, accumulating the installed
//! byte total and one MD5 ledger line per regular file. Directories named by
//! entries are skipped without error; the first failure aborts the build.

use std::fs::File;
use std::io::{self, Read};
use std::os::unix::fs::PermissionsExt;

use md5::{Digest, Md5};
use tar::{Builder, Header};
use tracing::debug;

use debkit_schema::{BuildTimestamp, FileEntry};

use crate::error::BuildError;
use crate::gzip;

/// Ordered `(hex digest, install-relative path)` pairs, one per packaged
/// regular file, in input order.
///
/// Consumed verbatim by the control archive builder; never reordered.
#[derive(Debug, Clone, Default)]
pub struct ChecksumLedger {
    entries: Vec<(String, String)>,
}

impl ChecksumLedger {
    fn push(&mut self, digest: String, path: String) {
        self.entries.push((digest, path));
    }

    /// Number of ledger lines.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` when no regular file has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The recorded `(digest, path)` pairs, in input order.
    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    /// Render the ledger as `md5sums` text: one `"<digest>  <path>\n"` line
    /// per entry, in input order.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (digest, path) in &self.entries {
            out.push_str(digest);
            out.push_str("  ");
            out.push_str(path);
            out.push('\n');
        }
        out
    }
}

/// Output of the data archive builder.
#[derive(Debug)]
pub struct DataArchive {
    /// The finished `data.tar.gz` byte stream.
    pub bytes: Vec<u8>,
    /// One checksum line per packaged regular file.
    pub ledger: ChecksumLedger,
    /// Total uncompressed byte footprint of all packaged regular files.
    pub installed_bytes: u64,
}

/// Reader adapter that feeds every byte it yields into an MD5 context, so
/// the ledger digest is computed from exactly the bytes written into the
/// archive, in a single pass over the file.
struct DigestReader<R> {
    inner: R,
    digest: Md5,
}

impl<R> DigestReader<R> {
    fn new(inner: R) -> Self {
        Self {
            inner,
            digest: Md5::new(),
        }
    }

    fn into_hex(self) -> String {
        hex::encode(self.digest.finalize())
    }
}

impl<R: Read> Read for DigestReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.digest.update(&buf[..n]);
        Ok(n)
    }
}

/// Write the destination path into the GNU header verbatim.
///
/// `Header::set_path` drops the leading `./` component, but installers
/// expect data-member names exactly as declared (`./usr/bin/tool`), so the
/// name bytes are copied straight into the header field.
fn write_dest_path(header: &mut Header, dst: &str) -> io::Result<()> {
    let bytes = dst.as_bytes();
    let Some(gnu) = header.as_gnu_mut() else {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "destination requires a GNU header",
        ));
    };
    if bytes.len() > gnu.name.len() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "destination path exceeds 100 bytes",
        ));
    }
    gnu.name[..bytes.len()].copy_from_slice(bytes);
    Ok(())
}

/// Build `data.tar.gz` from the file entries, in input order.
///
/// Each regular file becomes one tar entry carrying its destination path,
/// on-disk size, its own permission bits, and the shared build timestamp.
/// The size is stat'ed up front because tar is size-before-body; nothing is
/// buffered beyond the compressed output itself.
///
/// # Errors
///
/// Returns [`BuildError::SourceRead`] if a source cannot be opened or
/// stat'ed, [`BuildError::InvalidDestination`] if a destination lacks the
/// `./` root marker, and [`BuildError::ArchiveWrite`] on any header or body
/// write failure. Any error aborts the whole build; no partial archive is
/// returned.
pub fn build_data_archive(
    files: &[FileEntry],
    timestamp: BuildTimestamp,
) -> Result<DataArchive, BuildError> {
    let mut tar = Builder::new(gzip::encoder(timestamp));
    let mut ledger = ChecksumLedger::default();
    let mut installed_bytes: u64 = 0;

    for entry in files {
        let source_read = |source| BuildError::SourceRead {
            path: entry.src.clone(),
            source,
        };
        let file = File::open(&entry.src).map_err(source_read)?;
        let meta = file.metadata().map_err(source_read)?;
        if meta.is_dir() {
            debug!(src = %entry.src.display(), "skipping directory entry");
            continue;
        }

        let rel = entry
            .install_path()
            .ok_or_else(|| BuildError::InvalidDestination {
                path: entry.dst.clone(),
            })?;

        let archive_write = |source| BuildError::ArchiveWrite {
            name: entry.dst.clone(),
            source,
        };
        let mut header = Header::new_gnu();
        write_dest_path(&mut header, &entry.dst).map_err(archive_write)?;
        header.set_size(meta.len());
        // Permission bits travel through verbatim, not normalized.
        header.set_mode(meta.permissions().mode() & 0o7777);
        header.set_uid(0);
        header.set_gid(0);
        header.set_mtime(timestamp.secs());
        header.set_cksum();

        let mut reader = DigestReader::new(file);
        tar.append(&header, &mut reader).map_err(archive_write)?;

        installed_bytes += meta.len();
        ledger.push(reader.into_hex(), rel.to_string());
        debug!(dst = %entry.dst, size = meta.len(), "packed file");
    }

    let stream_write = |source| BuildError::ArchiveWrite {
        name: "data.tar.gz".to_string(),
        source,
    };
    let encoder = tar.into_inner().map_err(stream_write)?;
    let bytes = encoder.finish().map_err(stream_write)?;

    debug!(
        files = ledger.len(),
        installed_bytes,
        compressed = bytes.len(),
        "data archive finished"
    );
    Ok(DataArchive {
        bytes,
        ledger,
        installed_bytes,
    })
}
