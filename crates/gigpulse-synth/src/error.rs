//! Error types for brief synthesis
//!
//! None of these reach the pipeline: every one of them sends the
//! synthesizer down the deterministic template path.

/// Primary-path failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SynthError {
    /// No API key configured
    #[error("generative service not configured")]
    NotConfigured,

    /// Request never got an answer
    #[error("transport error: {0}")]
    Transport(String),

    /// Request exceeded its time budget
    #[error("generation timed out")]
    Timeout,

    /// Service answered with an error status
    #[error("service error {status}: {message}")]
    Api { status: u16, message: String },

    /// Response body had an unexpected shape
    #[error("malformed response: {0}")]
    Decode(String),

    /// Service returned no text
    #[error("empty output")]
    EmptyOutput,

    /// Output is missing skeleton sections
    #[error("output missing sections: {}", .0.join(", "))]
    MissingSections(Vec<String>),
}

impl From<reqwest::Error> for SynthError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_sections_lists_names() {
        let err = SynthError::MissingSections(vec!["UPWORK".into(), "PRIORITIES".into()]);
        assert_eq!(err.to_string(), "output missing sections: UPWORK, PRIORITIES");
    }
}
