//! Randomized pauses between page navigations
//!
//! Back-to-back requests from a logged-in session look automated; every
//! navigation after the first waits a random delay within `[min_ms, max_ms]`.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Navigation delay bounds, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Throttle {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl Throttle {
    /// Delay drawn from `[min_ms, max_ms]`
    #[inline]
    #[must_use]
    pub fn new(min_ms: u64, max_ms: u64) -> Self {
        Self {
            min_ms: min_ms.min(max_ms),
            max_ms: max_ms.max(min_ms),
        }
    }

    /// No delay at all (tests, manual reruns)
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        Self { min_ms: 0, max_ms: 0 }
    }

    /// Next delay to apply
    #[must_use]
    pub fn next_delay(&self) -> Duration {
        if self.max_ms <= self.min_ms {
            return Duration::from_millis(self.min_ms);
        }
        Duration::from_millis(rand::rng().random_range(self.min_ms..=self.max_ms))
    }

    /// Sleep for the next delay
    pub async fn pause(&self) {
        let delay = self.next_delay();
        if !delay.is_zero() {
            tracing::debug!(delay_ms = delay.as_millis() as u64, "Throttling navigation");
            tokio::time::sleep(delay).await;
        }
    }
}

impl Default for Throttle {
    fn default() -> Self {
        Self::new(3_000, 8_000)
    }
}
