//! Retry policy utilities for API requests.

use crate::config::NetworkConfig;
use crate::error::ApiError;
use std::time::Duration;

/// Bounded exponential-backoff retry policy used by `ApiClient`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Upper bound on total attempts, including the initial request.
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub initial_backoff: Duration,
    /// Multiplier applied to the delay after each retry.
    pub factor: u32,
    /// Maximum allowed delay between retry attempts.
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_backoff: Duration::from_millis(250),
            factor: 4,
            max_backoff: Duration::from_secs(30),
        }
    }
}

impl From<&NetworkConfig> for RetryPolicy {
    fn from(network: &NetworkConfig) -> Self {
        Self {
            max_attempts: network.max_attempts.max(1),
            initial_backoff: Duration::from_millis(network.initial_backoff_ms),
            factor: network.backoff_factor.max(1),
            max_backoff: Duration::from_millis(network.max_backoff_ms),
        }
    }
}

impl RetryPolicy {
    /// Decide whether another retry attempt should be scheduled.
    pub(super) fn should_retry(&self, err: &ApiError, attempt: u32) -> bool {
        attempt.saturating_add(1) < self.max_attempts && err.is_transient()
    }

    /// Compute retry delay, respecting `Retry-After` when present.
    pub(super) fn retry_delay_for(&self, attempt: u32, err: &ApiError) -> Duration {
        if let Some(seconds) = err.retry_after_secs() {
            return Duration::from_secs(seconds.clamp(1, 300));
        }
        let pow = self.factor.saturating_pow(attempt);
        let millis = self
            .initial_backoff
            .as_millis()
            .saturating_mul(pow as u128)
            .min(self.max_backoff.as_millis());
        Duration::from_millis(millis as u64)
    }
}
