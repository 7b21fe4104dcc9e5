use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tracing::warn;

use crate::errors::{FetchError, RetryError};

/// Bounded exponential backoff.
///
/// The delay after attempt `n` is `multiplier * 2^(n-1)` clamped to
/// `[min_delay, max_delay]`. A loop stops after `max_attempts` tries, or earlier
/// when the next sleep would take it past `max_elapsed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub multiplier: Duration,
    pub min_delay: Duration,
    pub max_delay: Duration,
    pub max_elapsed: Duration,
}

impl RetryPolicy {
    pub const DEFAULT_MAX_ELAPSED: Duration = Duration::from_secs(60);

    pub const fn new(max_attempts: u32, min_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts,
            multiplier: Duration::from_secs(1),
            min_delay,
            max_delay,
            max_elapsed: Self::DEFAULT_MAX_ELAPSED,
        }
    }

    /// Per-page policy for source scraping: 3 attempts, 1s..6s.
    pub const fn source_default() -> Self {
        Self::new(3, Duration::from_secs(1), Duration::from_secs(6))
    }

    /// Per-address policy for balance lookups: 5 attempts, 1s..10s.
    pub const fn balance_default() -> Self {
        Self::new(5, Duration::from_secs(1), Duration::from_secs(10))
    }

    /// Single attempt, no waiting.
    pub const fn once() -> Self {
        Self {
            max_attempts: 1,
            multiplier: Duration::ZERO,
            min_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            max_elapsed: Duration::ZERO,
        }
    }

    pub fn with_max_elapsed(mut self, max_elapsed: Duration) -> Self {
        self.max_elapsed = max_elapsed;
        self
    }

    /// Sleep before the attempt following failed attempt number `attempt` (1-based).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        let raw = self.multiplier.saturating_mul(1u32 << exponent);
        raw.max(self.min_delay).min(self.max_delay)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::source_default()
    }
}

/// Run `op` until it succeeds or `policy` gives up.
///
/// `label` only shows up in log events (usually the URL or address).
pub async fn retry_with_backoff<T, F, Fut>(
    policy: &RetryPolicy,
    label: &str,
    mut op: F,
) -> Result<T, RetryError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let started = Instant::now();
    let mut attempt = 0;

    loop {
        attempt += 1;
        let error = match op().await {
            Ok(value) => return Ok(value),
            Err(error) => error,
        };

        if attempt >= max_attempts {
            return Err(RetryError::Exhausted {
                attempts: attempt,
                last: error,
            });
        }

        let delay = policy.delay_after(attempt);
        let ends_at = started.elapsed().checked_add(delay);
        if ends_at.map_or(true, |t| t > policy.max_elapsed) {
            return Err(RetryError::BudgetSpent {
                attempts: attempt,
                budget: policy.max_elapsed,
                last: error,
            });
        }

        warn!(
            label,
            attempt,
            max_attempts,
            delay_ms = delay.as_millis() as u64,
            error = %error,
            "request failed, backing off"
        );
        tokio::time::sleep(delay).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn status_error() -> FetchError {
        FetchError::Status {
            url: "https://example.org".to_string(),
            status: 500,
        }
    }

    #[test]
    fn test_delays_grow_exponentially_and_cap() {
        let policy = RetryPolicy::balance_default();
        let delays: Vec<u64> = (1..=6).map(|n| policy.delay_after(n).as_secs()).collect();
        assert_eq!(delays, vec![1, 2, 4, 8, 10, 10]);
    }

    #[test]
    fn test_min_delay_applies_to_first_retry() {
        let mut policy = RetryPolicy::new(3, Duration::from_secs(2), Duration::from_secs(6));
        policy.multiplier = Duration::from_millis(100);
        assert_eq!(policy.delay_after(1), Duration::from_secs(2));
        assert_eq!(policy.delay_after(30), Duration::from_secs(6));
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_after_transient_failures() {
        let calls = &AtomicU32::new(0);
        let result = retry_with_backoff(&RetryPolicy::balance_default(), "addr", || async move {
            if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(status_error())
            } else {
                Ok(42u64)
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausts_attempt_budget() {
        let calls = &AtomicU32::new(0);
        let result: Result<(), _> = retry_with_backoff(&RetryPolicy::source_default(), "page", || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(status_error())
        })
        .await;

        match result {
            Err(RetryError::Exhausted { attempts, .. }) => assert_eq!(attempts, 3),
            other => panic!("expected exhaustion, got {:?}", other),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stops_when_elapsed_budget_would_be_exceeded() {
        let policy = RetryPolicy::balance_default().with_max_elapsed(Duration::from_secs(5));
        let result: Result<(), _> =
            retry_with_backoff(&policy, "addr", || async { Err(status_error()) }).await;

        // sleeps of 1s and 2s fit, the 4s one would end at 7s
        match result {
            Err(RetryError::BudgetSpent { attempts, budget, .. }) => {
                assert_eq!(attempts, 3);
                assert_eq!(budget, Duration::from_secs(5));
            }
            other => panic!("expected budget exhaustion, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_oversized_delays_spend_the_budget() {
        let policy = RetryPolicy::new(4, Duration::MAX, Duration::MAX).with_max_elapsed(Duration::MAX);
        let calls = &AtomicU32::new(0);
        let result: Result<(), _> = retry_with_backoff(&policy, "addr", || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            // elapsed plus a Duration::MAX delay no longer fits
            tokio::time::sleep(Duration::from_secs(1)).await;
            Err(status_error())
        })
        .await;

        assert!(matches!(result, Err(RetryError::BudgetSpent { attempts: 1, .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_once_never_sleeps() {
        let result: Result<(), _> =
            retry_with_backoff(&RetryPolicy::once(), "probe", || async { Err(status_error()) }).await;
        assert_eq!(result.unwrap_err().attempts(), 1);
    }
}
