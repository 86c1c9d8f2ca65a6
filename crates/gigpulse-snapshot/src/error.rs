//! Error types for snapshot, session and report stores

use std::path::PathBuf;

/// Errors raised while reading or writing pipeline files
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// File does not exist
    #[error("not found: {}", .0.display())]
    NotFound(PathBuf),

    /// IO error on a specific path
    #[error("io error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File exists but is not the JSON we expect
    #[error("malformed json in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    /// Build an IO error, mapping `NotFound` to the dedicated variant
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::NotFound(path)
        } else {
            Self::Io { path, source }
        }
    }

    /// Build a JSON error for path
    pub fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.into(),
            source,
        }
    }

    /// Check if the error only means "nothing stored yet"
    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
