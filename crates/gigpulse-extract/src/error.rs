//! Error types for dashboard extraction

use gigpulse_snapshot::{Platform, SectionFailure, StoreError};

/// Failure to load one page
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Transport-level failure (DNS, TLS, connection reset)
    #[error("network error: {0}")]
    Network(String),

    /// Request exceeded its time budget
    #[error("request timed out")]
    Timeout,

    /// Server answered with a non-success status
    #[error("http {status} from {url}")]
    Status { status: u16, url: String },

    /// Page URL could not be built
    #[error("invalid url: {0}")]
    InvalidUrl(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Network(err.to_string())
        }
    }
}

/// Errors surfaced by a platform extraction
///
/// Everything below the section level is absorbed into the snapshot; only
/// these two outcomes escape.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    /// Saved session no longer valid (landed on a login page, or no session on disk)
    #[error("{platform}: auth_expired ({reason})")]
    AuthExpired { platform: Platform, reason: String },

    /// Every section fell back to its default
    #[error("{platform}: no section could be extracted ({} failures)", failures.len())]
    NothingExtracted {
        platform: Platform,
        failures: Vec<SectionFailure>,
    },

    /// Snapshot or session file could not be written
    #[error("{platform}: store error: {source}")]
    Store {
        platform: Platform,
        #[source]
        source: StoreError,
    },
}

impl ExtractError {
    /// Check if this is the session-expiry signal
    #[inline]
    #[must_use]
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::AuthExpired { .. })
    }

    /// Platform the error belongs to
    #[inline]
    #[must_use]
    pub fn platform(&self) -> Platform {
        match self {
            Self::AuthExpired { platform, .. }
            | Self::NothingExtracted { platform, .. }
            | Self::Store { platform, .. } => *platform,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_expired_display_names_signal() {
        let err = ExtractError::AuthExpired {
            platform: Platform::Upwork,
            reason: "redirected to /ab/account-security/login".into(),
        };
        assert!(err.is_auth_expired());
        assert_eq!(err.platform(), Platform::Upwork);
        assert!(err.to_string().starts_with("upwork: auth_expired"));
    }

    #[test]
    fn nothing_extracted_counts_failures() {
        let err = ExtractError::NothingExtracted {
            platform: Platform::Fiverr,
            failures: vec![SectionFailure {
                section: "orders".into(),
                error: "http 500".into(),
            }],
        };
        assert!(!err.is_auth_expired());
        assert!(err.to_string().contains("1 failures"));
    }
}
