//! Error types for document patching

use gigpulse_snapshot::StoreError;
use std::path::PathBuf;

/// Document patch failure
#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    /// Tracking document does not exist
    #[error("tracking document not found: {}", .0.display())]
    Missing(PathBuf),

    /// Tracking document could not be read
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Patched document could not be written
    #[error(transparent)]
    Write(#[from] StoreError),
}

impl TrackerError {
    #[inline]
    #[must_use]
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing(_))
    }
}
