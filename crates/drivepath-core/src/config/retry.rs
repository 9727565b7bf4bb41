//! Transient-fault retry configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Exponential backoff with jitter.
///
/// The delay before retry `n` (0-based) is
/// `base_delay_ms * 2^n + uniform(0, max_jitter_ms)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of retries after the first attempt.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Base delay in milliseconds.
    #[serde(default = "default_base_delay")]
    pub base_delay_ms: u64,
    /// Upper bound of the random jitter in milliseconds.
    #[serde(default = "default_max_jitter")]
    pub max_jitter_ms: u64,
}

impl RetryConfig {
    /// Deterministic part of the delay before the given retry.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u64.saturating_pow(attempt);
        Duration::from_millis(self.base_delay_ms.saturating_mul(factor))
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay(),
            max_jitter_ms: default_max_jitter(),
        }
    }
}

fn default_max_attempts() -> u32 {
    5
}

fn default_base_delay() -> u64 {
    200
}

fn default_max_jitter() -> u64 {
    200
}
