//! Pipeline error types

use gigpulse_extract::{ExtractError, FetchError};
use gigpulse_notify::{NotifyError, SendError};
use gigpulse_snapshot::StoreError;
use gigpulse_synth::SynthError;
use gigpulse_tracker::TrackerError;
use std::path::PathBuf;

/// Invalid or unreadable configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid value for {name}: '{value}' ({reason})")]
    InvalidValue {
        name: &'static str,
        value: String,
        reason: String,
    },

    /// A setting that only works together with another one
    #[error("incomplete configuration: {0}")]
    Incomplete(String),

    /// An HTTP client could not be built from the settings
    #[error("client setup failed: {0}")]
    Client(String),
}

impl ConfigError {
    pub(crate) fn invalid(name: &'static str, value: impl Into<String>, reason: impl ToString) -> Self {
        Self::InvalidValue {
            name,
            value: value.into(),
            reason: reason.to_string(),
        }
    }
}

impl From<FetchError> for ConfigError {
    fn from(err: FetchError) -> Self {
        Self::Client(err.to_string())
    }
}

impl From<SendError> for ConfigError {
    fn from(err: SendError) -> Self {
        Self::Client(err.to_string())
    }
}

impl From<SynthError> for ConfigError {
    fn from(err: SynthError) -> Self {
        Self::Client(err.to_string())
    }
}

/// A stage that did not complete
#[derive(Debug, thiserror::Error)]
pub enum StageError {
    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Notify(#[from] NotifyError),

    #[error(transparent)]
    Tracker(#[from] TrackerError),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// A collaborator the stage needs was not configured
    #[error("{0} is not configured")]
    NotConfigured(&'static str),

    /// An earlier stage did not leave what this one consumes
    #[error("missing input: {0}")]
    MissingInput(String),
}

impl StageError {
    /// The marketplace session needs a manual re-login
    #[inline]
    #[must_use]
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::Extract(e) if e.is_auth_expired())
    }
}
