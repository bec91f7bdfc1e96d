//! Deterministic gzip framing shared by both tar members.

use flate2::write::GzEncoder;
use flate2::{Compression, GzBuilder};

use debkit_schema::BuildTimestamp;

/// Gzip encoder with a pinned header: mtime comes from the shared build
/// timestamp and the OS byte is fixed at 255 (unknown), so identical inputs
/// produce identical compressed streams on any host.
pub(crate) fn encoder(timestamp: BuildTimestamp) -> GzEncoder<Vec<u8>> {
    GzBuilder::new()
        .mtime(timestamp.secs() as u32)
        .operating_system(255)
        .write(Vec::new(), Compression::default())
}
