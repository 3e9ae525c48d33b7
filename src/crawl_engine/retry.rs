use std::time::Duration;

use crate::config::ScrapeConfig;
use crate::utils::constants::MAX_RETRY_DELAY_MS;

/// Bounded exponential backoff for page loads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts after the first one
    pub max_retries: u8,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl RetryPolicy {
    #[must_use]
    pub fn from_config(config: &ScrapeConfig) -> Self {
        Self {
            max_retries: config.max_page_retries(),
            base_delay: config.retry_base_delay(),
            max_delay: Duration::from_millis(MAX_RETRY_DELAY_MS),
        }
    }

    /// Delay before retry number `retry` (0-based): base, 2x base, 4x base, ...
    #[must_use]
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = 1u32.checked_shl(retry).unwrap_or(u32::MAX);
        self.base_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }

    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        u32::from(self.max_retries) + 1
    }
}
