//! Build timestamp shared by every archive layer.

use serde::{Deserialize, Serialize};

/// A single point in time, captured once at the start of a build and stamped
/// into every header of every archive layer.
///
/// Threaded explicitly through the pipeline rather than read ambiently:
/// identical inputs plus an identical timestamp yield byte-identical output,
/// and tests can inject a fixed clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildTimestamp(u64);

impl BuildTimestamp {
    /// Capture the current wall-clock time.
    ///
    /// # Panics
    ///
    /// Panics if the system clock is set before the UNIX epoch.
    pub fn now() -> Self {
        Self(
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_secs(),
        )
    }

    /// Build a timestamp from raw seconds since the UNIX epoch.
    pub fn from_secs(secs: u64) -> Self {
        Self(secs)
    }

    /// Seconds since the UNIX epoch.
    pub fn secs(self) -> u64 {
        self.0
    }
}
