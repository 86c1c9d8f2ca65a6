//! Error types for chat delivery

/// Failure of a single send call
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SendError {
    /// Channel rejected the rich-text markup
    #[error("formatting rejected: {0}")]
    Format(String),

    /// Channel answered but refused the message
    #[error("channel api error: {description}")]
    Api {
        status: Option<u16>,
        description: String,
    },

    /// Request never got an answer
    #[error("transport error: {0}")]
    Transport(String),

    /// Request exceeded its time budget
    #[error("send timed out")]
    Timeout,
}

impl SendError {
    /// Check if a plain-text resend may succeed
    #[inline]
    #[must_use]
    pub fn is_format_error(&self) -> bool {
        matches!(self, Self::Format(_))
    }

    /// Check if the same request may succeed on retry
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) | Self::Timeout => true,
            Self::Api { status, .. } => status.map_or(true, |s| s == 429 || s >= 500),
            Self::Format(_) => false,
        }
    }
}

impl From<reqwest::Error> for SendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            // Strip the URL, it carries the bot token
            Self::Transport(err.without_url().to_string())
        }
    }
}

/// Delivery aborted
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// A chunk exhausted its attempts; later chunks were not sent
    #[error("chunk {index}/{total} not delivered after {attempts} attempts: {source}")]
    ChunkFailed {
        /// 1-based chunk number
        index: usize,
        total: usize,
        attempts: u32,
        /// Chunks delivered before the failure
        sent: usize,
        #[source]
        source: SendError,
    },

    /// Channel could not be constructed
    #[error("channel misconfigured: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retry_classification() {
        assert!(SendError::Timeout.is_retryable());
        assert!(SendError::Transport("reset".into()).is_retryable());
        assert!(SendError::Api { status: Some(502), description: "bad gateway".into() }.is_retryable());
        assert!(SendError::Api { status: Some(429), description: "slow down".into() }.is_retryable());
        assert!(!SendError::Api { status: Some(400), description: "chat not found".into() }.is_retryable());
        assert!(!SendError::Format("can't parse entities".into()).is_retryable());
    }

    #[test]
    fn chunk_failure_message() {
        let err = NotifyError::ChunkFailed {
            index: 2,
            total: 3,
            attempts: 3,
            sent: 1,
            source: SendError::Timeout,
        };
        assert_eq!(err.to_string(), "chunk 2/3 not delivered after 3 attempts: send timed out");
    }
}
