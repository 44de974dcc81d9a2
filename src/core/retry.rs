//! Retry executor with exponential backoff.

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{ConfigError, TaskError};

/// Backoff policy for [`RetryExecutor`].
///
/// Total attempts are `max_retries + 1`. The wait before retry `n` (1-based)
/// is `initial_delay * backoff_multiplier^(n - 1)`. No jitter is applied.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Retries allowed after the first attempt.
    pub max_retries: u32,
    /// Wait before the first retry.
    pub initial_delay: Duration,
    /// Factor applied to the wait after every retry.
    pub backoff_multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(100),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// Check that the multiplier is finite and at least one.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Invalid`] naming `backoff_multiplier`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.backoff_multiplier.is_finite() || self.backoff_multiplier < 1.0 {
            return Err(ConfigError::invalid(
                "backoff_multiplier",
                format!("must be a finite number >= 1, got {}", self.backoff_multiplier),
            ));
        }
        Ok(())
    }

    /// Wait inserted before retry number `retry` (1-based). Saturates at
    /// [`Duration::MAX`].
    pub fn delay_for(&self, retry: u32) -> Duration {
        let mut delay = self.initial_delay;
        for _ in 1..retry {
            delay = scale(delay, self.backoff_multiplier);
        }
        delay
    }
}

// Scaled in whole nanoseconds so integral factors stay exact.
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn scale(delay: Duration, factor: f64) -> Duration {
    let nanos = (delay.as_nanos() as f64 * factor).round();
    if nanos >= Duration::MAX.as_nanos() as f64 {
        return Duration::MAX;
    }
    let nanos = nanos as u128;
    let secs = u64::try_from(nanos / 1_000_000_000).unwrap_or(u64::MAX);
    Duration::new(secs, (nanos % 1_000_000_000) as u32)
}

/// Re-invokes a fallible async operation until it succeeds or the retry
/// budget runs out.
#[derive(Debug, Clone)]
pub struct RetryExecutor {
    policy: RetryPolicy,
}

impl RetryExecutor {
    /// Create an executor from a validated policy.
    ///
    /// # Errors
    ///
    /// Returns the policy's validation error.
    pub fn new(policy: RetryPolicy) -> Result<Self, ConfigError> {
        policy.validate()?;
        Ok(Self { policy })
    }

    /// The policy this executor applies.
    pub const fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Run `task`, retrying failures with backoff.
    ///
    /// The waits are `tokio::time::sleep` suspensions and never block the
    /// thread.
    ///
    /// # Errors
    ///
    /// [`TaskError::RetryExhausted`] carrying the error from the last attempt.
    pub async fn execute<F, Fut, T, E>(&self, mut task: F) -> Result<T, TaskError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut attempts: u32 = 0;
        let mut delay = self.policy.initial_delay;
        loop {
            attempts += 1;
            match task().await {
                Ok(value) => {
                    if attempts > 1 {
                        debug!(attempts, "task succeeded after retrying");
                    }
                    return Ok(value);
                }
                Err(last) if attempts > self.policy.max_retries => {
                    warn!(attempts, "retry budget exhausted");
                    return Err(TaskError::RetryExhausted { attempts, last });
                }
                Err(_) => {
                    debug!(attempt = attempts, ?delay, "attempt failed, backing off");
                    tokio::time::sleep(delay).await;
                    delay = scale(delay, self.policy.backoff_multiplier);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multiplier_below_one_is_rejected() {
        let policy = RetryPolicy {
            backoff_multiplier: 0.5,
            ..RetryPolicy::default()
        };
        assert!(RetryExecutor::new(policy).is_err());

        let policy = RetryPolicy {
            backoff_multiplier: f64::NAN,
            ..RetryPolicy::default()
        };
        assert!(policy.validate().is_err());
    }

    #[test]
    fn delay_schedule_grows_geometrically() {
        let policy = RetryPolicy {
            max_retries: 4,
            initial_delay: Duration::from_millis(10),
            backoff_multiplier: 2.0,
        };
        assert_eq!(policy.delay_for(1), Duration::from_millis(10));
        assert_eq!(policy.delay_for(2), Duration::from_millis(20));
        assert_eq!(policy.delay_for(3), Duration::from_millis(40));
    }

    #[test]
    fn delay_saturates_instead_of_overflowing() {
        let policy = RetryPolicy {
            max_retries: 200,
            initial_delay: Duration::from_secs(1),
            backoff_multiplier: 10.0,
        };
        assert_eq!(policy.delay_for(100), Duration::MAX);
    }
}
