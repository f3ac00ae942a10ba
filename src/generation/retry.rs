//! Deadline and retry policy for generation calls
//!
//! Every attempt runs under a fixed deadline. Only timeouts are retried, and
//! only `max_retries` times; any other failure ends the call immediately.

use crate::errors::{AdvisoryError, GenerationError};
use std::time::Duration;
use tokio::time::timeout;

/// Default per-attempt deadline (15 seconds)
pub const DEFAULT_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(15);

/// Default retries after the first timed out attempt
pub const DEFAULT_MAX_RETRIES: u32 = 1;

/// Timeout-only retry policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Deadline for a single attempt
    attempt_timeout: Duration,

    /// Extra attempts allowed after a timeout
    max_retries: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl RetryPolicy {
    /// 15 second deadline, one retry
    pub fn new() -> Self {
        Self {
            attempt_timeout: DEFAULT_ATTEMPT_TIMEOUT,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    pub fn with_config(attempt_timeout: Duration, max_retries: u32) -> Self {
        Self {
            attempt_timeout,
            max_retries,
        }
    }

    /// Run `operation` until it succeeds, fails without timing out, or the
    /// retry budget is spent
    pub async fn execute<F, Fut, T>(&self, mut operation: F) -> Result<T, AdvisoryError>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T, GenerationError>>,
    {
        let max_attempts = self.max_attempts();
        let mut attempt = 0;

        loop {
            attempt += 1;

            let error = match timeout(self.attempt_timeout, operation()).await {
                Ok(Ok(value)) => return Ok(value),
                Ok(Err(e)) if !e.is_timeout() => return Err(AdvisoryError::Transport(e)),
                Ok(Err(e)) => e,
                Err(_) => GenerationError::Timeout {
                    duration_ms: self.timeout_ms(),
                },
            };

            if attempt >= max_attempts {
                return Err(AdvisoryError::Timeout {
                    attempts: attempt,
                    timeout_ms: self.timeout_ms(),
                });
            }

            tracing::warn!(attempt, max_attempts, "{}; retrying", error);
        }
    }

    /// First attempt plus retries
    pub fn max_attempts(&self) -> u32 {
        self.max_retries + 1
    }

    pub fn attempt_timeout(&self) -> Duration {
        self.attempt_timeout
    }

    fn timeout_ms(&self) -> u64 {
        self.attempt_timeout.as_millis() as u64
    }
}
