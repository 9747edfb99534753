use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use common::config::RetrySettings;
use tracing::{error, info, warn};

/// Bounded retry with exponential backoff, applied explicitly per call site.
///
/// Holds no state between calls. The delay after failed attempt `n` (1-based)
/// is `initial * 2^(n-1)`, capped at `max_backoff`; jitter adds up to 25 %.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    max_attempts: u32,
    initial_backoff: Duration,
    max_backoff: Duration,
    jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(2), Duration::from_secs(10))
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, initial_backoff: Duration, max_backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_backoff,
            max_backoff,
            jitter: false,
        }
    }

    pub fn from_settings(settings: &RetrySettings) -> Self {
        Self::new(
            settings.max_attempts,
            settings.initial_backoff,
            settings.max_backoff,
        )
        .with_jitter(settings.jitter)
    }

    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt.saturating_sub(1)).unwrap_or(u32::MAX);
        let delay = self
            .initial_backoff
            .checked_mul(factor)
            .unwrap_or(self.max_backoff)
            .min(self.max_backoff);

        if self.jitter {
            delay.mul_f64(1.0 + fastrand::f64() * 0.25)
        } else {
            delay
        }
    }

    /// Retries every error.
    pub async fn run<T, E, F, Fut>(&self, label: &str, op: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        self.run_if(label, op, |_| true).await
    }

    /// Retries errors accepted by `retryable`; anything else, and the error of
    /// the final attempt, is returned unchanged.
    pub async fn run_if<T, E, F, Fut, P>(&self, label: &str, mut op: F, retryable: P) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
        P: Fn(&E) -> bool,
    {
        let mut attempt = 1;
        loop {
            match op().await {
                Ok(value) => {
                    if attempt > 1 {
                        info!("{} succeeded on attempt {}/{}", label, attempt, self.max_attempts);
                    }
                    return Ok(value);
                }
                Err(e) if !retryable(&e) => {
                    warn!("{} failed with a non-retryable error: {}", label, e);
                    return Err(e);
                }
                Err(e) if attempt >= self.max_attempts => {
                    error!("{} failed after {} attempts: {}", label, attempt, e);
                    return Err(e);
                }
                Err(e) => {
                    let delay = self.backoff(attempt);
                    warn!(
                        "{} failed (attempt {}/{}): {}. Retrying in {:?}",
                        label, attempt, self.max_attempts, e, delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast() -> RetryPolicy {
        RetryPolicy::new(3, Duration::from_millis(1), Duration::from_millis(5))
    }

    #[test]
    fn test_backoff_schedule_is_capped() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff(1), Duration::from_secs(2));
        assert_eq!(policy.backoff(2), Duration::from_secs(4));
        assert_eq!(policy.backoff(3), Duration::from_secs(8));
        assert_eq!(policy.backoff(4), Duration::from_secs(10));
        assert_eq!(policy.backoff(40), Duration::from_secs(10));
    }

    #[test]
    fn test_jitter_stays_within_bounds() {
        let policy = RetryPolicy::default().with_jitter(true);
        for _ in 0..100 {
            let d = policy.backoff(1);
            assert!(d >= Duration::from_secs(2) && d <= Duration::from_millis(2500));
        }
    }

    #[tokio::test]
    async fn test_no_retry_on_first_success() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let result: Result<u32, String> = fast()
            .run("op", move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(7)
            })
            .await;

        assert_eq!(result, Ok(7));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_exhaustion_reraises_last_error_unchanged() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let result: Result<(), String> = fast()
            .run("op", move || async move {
                let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
                Err(format!("boom #{}", n))
            })
            .await;

        assert_eq!(result, Err("boom #3".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_recovers_mid_way() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let result: Result<&str, String> = fast()
            .run("op", move || async move {
                if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err("flaky".to_string())
                } else {
                    Ok("ok")
                }
            })
            .await;

        assert_eq!(result, Ok("ok"));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_non_retryable_errors_short_circuit() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let result: Result<(), String> = fast()
            .run_if(
                "op",
                move || async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err("fatal".to_string())
                },
                |e: &String| e != "fatal",
            )
            .await;

        assert_eq!(result, Err("fatal".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_at_least_one_attempt() {
        assert_eq!(RetryPolicy::new(0, Duration::ZERO, Duration::ZERO).max_attempts(), 1);
    }
}
