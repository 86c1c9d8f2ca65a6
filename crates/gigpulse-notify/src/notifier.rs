//! Chunked delivery with retries
//!
//! Each chunk is sent with rich formatting first. A formatting rejection
//! triggers one immediate plain-text resend; any other failure is retried
//! after a fixed delay until the attempt budget runs out. The first chunk
//! that runs out aborts the delivery.

use crate::channel::{ChatChannel, ParseMode};
use crate::chunk::split_message;
use crate::error::{NotifyError, SendError};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Delivery tuning
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifierConfig {
    /// Hard per-message character limit
    pub limit: usize,
    /// Attempts per chunk, including the first
    pub max_attempts: u32,
    /// Pause between attempts of the same chunk
    #[serde(with = "millis")]
    pub retry_delay: Duration,
    /// Pause between successive chunks
    #[serde(with = "millis")]
    pub chunk_gap: Duration,
    /// Rich-text mode for first attempts
    pub parse_mode: Option<ParseMode>,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            limit: 4096,
            max_attempts: 3,
            retry_delay: Duration::from_secs(2),
            chunk_gap: Duration::from_secs(1),
            parse_mode: Some(ParseMode::Markdown),
        }
    }
}

impl NotifierConfig {
    /// No pauses (tests, manual sends)
    #[must_use]
    pub fn immediate() -> Self {
        Self {
            retry_delay: Duration::ZERO,
            chunk_gap: Duration::ZERO,
            ..Self::default()
        }
    }

    #[inline]
    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub(super) fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        #[allow(clippy::cast_possible_truncation)]
        s.serialize_u64(d.as_millis() as u64)
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}

/// Outcome of a successful delivery
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub chunks_sent: usize,
    /// Chunks that went out as plain text after a formatting rejection
    pub plain_text_fallbacks: usize,
}

/// Delivers arbitrarily long text through a [`ChatChannel`]
#[derive(Debug)]
pub struct Notifier<C> {
    channel: C,
    config: NotifierConfig,
}

impl<C: ChatChannel> Notifier<C> {
    #[inline]
    #[must_use]
    pub fn new(channel: C, config: NotifierConfig) -> Self {
        Self { channel, config }
    }

    /// Underlying channel
    #[inline]
    #[must_use]
    pub fn channel(&self) -> &C {
        &self.channel
    }

    /// Send every chunk of `text` in order
    ///
    /// Empty text sends nothing and succeeds with zero chunks.
    pub async fn deliver(&self, text: &str) -> Result<DeliveryReport, NotifyError> {
        let chunks = split_message(text, self.config.limit);
        let total = chunks.len();
        let mut report = DeliveryReport::default();

        for (idx, chunk) in chunks.iter().enumerate() {
            if idx > 0 && !self.config.chunk_gap.is_zero() {
                tokio::time::sleep(self.config.chunk_gap).await;
            }

            match self.send_chunk(chunk, idx + 1, total).await {
                Ok(plain) => {
                    report.chunks_sent += 1;
                    if plain {
                        report.plain_text_fallbacks += 1;
                    }
                }
                Err((attempts, source)) => {
                    tracing::error!(
                        chunk = idx + 1,
                        total,
                        attempts,
                        error = %source,
                        "Chunk delivery failed, aborting"
                    );
                    return Err(NotifyError::ChunkFailed {
                        index: idx + 1,
                        total,
                        attempts,
                        sent: report.chunks_sent,
                        source,
                    });
                }
            }
        }

        tracing::info!(chunks = report.chunks_sent, "Message delivered");
        Ok(report)
    }

    /// Returns whether the chunk fell back to plain text
    async fn send_chunk(
        &self,
        chunk: &str,
        index: usize,
        total: usize,
    ) -> Result<bool, (u32, SendError)> {
        let max_attempts = self.config.max_attempts.max(1);
        let mut mode = self.config.parse_mode;
        let mut plain = false;
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            let err = match self.channel.send(chunk, mode).await {
                Ok(()) => return Ok(plain),
                Err(err) => err,
            };

            if mode.is_some() && err.is_format_error() {
                tracing::warn!(chunk = index, total, error = %err, "Formatting rejected, resending as plain text");
                mode = None;
                plain = true;
                // the plain resend does not spend an attempt
                attempt -= 1;
                continue;
            }

            if attempt >= max_attempts || !err.is_retryable() {
                return Err((attempt, err));
            }
            tracing::warn!(chunk = index, total, attempt, error = %err, "Send failed, retrying");
            if !self.config.retry_delay.is_zero() {
                tokio::time::sleep(self.config.retry_delay).await;
            }
        }
    }
}
