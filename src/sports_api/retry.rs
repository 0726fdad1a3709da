use crate::sports_api::types::{ApiError, SportsCloudError};
use std::time::Duration;

/// Retry configuration for a single logical request
///
/// Defaults: 3 attempts in total, first retry after 1 second, doubling per
/// retry up to 30 seconds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of counted calls, including the first one (at least 1)
    pub max_attempts: u32,
    /// Delay before the first retry
    pub base_delay: Duration,
    /// Upper bound for any single delay
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the attempt cap (builder pattern); values below 1 are raised to 1
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Set the base delay (builder pattern)
    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    /// Set the delay cap (builder pattern)
    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    /// Delay before retry number `retry` (1-based): `base * 2^(retry-1)`, capped
    pub fn delay_for_retry(&self, retry: u32) -> Duration {
        let exponent = retry.saturating_sub(1).min(31);
        let delay = self
            .base_delay
            .checked_mul(1u32 << exponent)
            .unwrap_or(self.max_delay);
        delay.min(self.max_delay)
    }

    /// Fresh state for one logical request
    pub fn start(&self) -> RetryState {
        RetryState {
            attempt: 0,
            max_attempts: self.max_attempts.max(1),
            backoff: self.delay_for_retry(1),
            policy: self.clone(),
        }
    }
}

/// Progress of one logical request through its retry budget
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryState {
    /// Counted calls made so far
    pub attempt: u32,
    pub max_attempts: u32,
    /// Delay to wait before the next retry
    pub backoff: Duration,
    policy: RetryPolicy,
}

impl RetryState {
    /// Record a counted call
    pub fn record_attempt(&mut self) {
        self.attempt += 1;
    }

    pub fn is_exhausted(&self) -> bool {
        self.attempt >= self.max_attempts
    }

    /// Delay to wait before the next attempt, or `None` when the budget is spent
    ///
    /// After `n` counted calls this is `delay_for_retry(n)`; `backoff` then
    /// holds the delay for the retry after that.
    pub fn next_backoff(&mut self) -> Option<Duration> {
        if self.is_exhausted() {
            return None;
        }
        let delay = self.policy.delay_for_retry(self.attempt);
        self.backoff = self.policy.delay_for_retry(self.attempt + 1);
        Some(delay)
    }
}

/// Status codes the retry loop treats as transient
pub fn is_retryable_status(status: u16) -> bool {
    matches!(status, 429 | 500..=599)
}

/// Map a non-success HTTP status onto the error taxonomy
///
/// 401 means the token was rejected, 429 and 5xx are transient, every other
/// status (4xx, unexpected 1xx/3xx) is fatal.
pub fn classify_status(status: u16, message: String) -> SportsCloudError {
    let err = ApiError::Http { status, message };
    match status {
        401 => SportsCloudError::AuthExpired(err),
        s if is_retryable_status(s) => SportsCloudError::Transient(err),
        _ => SportsCloudError::Fatal(err),
    }
}
