//! Exponential backoff with optional jitter.

use super::strategy::{BackoffStrategy, RetryOn, Transient};
use async_trait::async_trait;
use std::error::Error;
use std::future::Future;
use std::time::Duration;

const DEFAULT_MAX_RETRIES: u32 = 3;
const DEFAULT_INITIAL_DELAY: Duration = Duration::from_millis(1000);
const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(60);
const DEFAULT_MULTIPLIER: f64 = 2.0;

/// Exponential backoff strategy.
///
/// Delays between retries grow as `initial_delay * multiplier^attempt`,
/// capped at `max_delay`. With the defaults (3 retries, 1s, doubling, no
/// jitter) a persistently failing operation waits 1s, 2s and 4s before
/// giving up after its fourth invocation.
///
/// # Formula
///
/// For attempt `n` (0-indexed after first failure):
/// ```text
/// base_delay = initial_delay * (multiplier ^ n)
/// jittered = base_delay + base_delay * jitter * random(-1, +1)
/// final_delay = min(jittered, max_delay)
/// ```
///
/// # Examples
///
/// ```rust
/// use faceyoga_core::retry::{BackoffStrategy, ExponentialBackoff, RetryOn};
/// use std::time::Duration;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let backoff = ExponentialBackoff::builder()
///     .max_retries(5)
///     .initial_delay(Duration::from_millis(100))
///     .max_delay(Duration::from_secs(30))
///     .retry_on(RetryOn::Any)
///     .build();
///
/// let result = backoff.execute(|| async {
///     Ok::<_, std::io::Error>(42)
/// }).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ExponentialBackoff {
    max_retries: u32,
    initial_delay: Duration,
    max_delay: Duration,
    multiplier: f64,
    jitter: f64,
    retry_on: RetryOn,
}

impl ExponentialBackoff {
    /// Create a new builder for configuring exponential backoff.
    pub fn builder() -> ExponentialBackoffBuilder {
        ExponentialBackoffBuilder::default()
    }

    /// A strategy that never retries: one invocation, no sleeping.
    pub fn none() -> Self {
        Self::builder().max_retries(0).build()
    }

    /// The delay before the first retry.
    pub fn initial_delay(&self) -> Duration {
        self.initial_delay
    }

    /// The full sequence of waits a persistently failing operation goes through.
    pub fn schedule(&self) -> Vec<Duration> {
        (0..self.max_retries)
            .filter_map(|attempt| self.next_delay(attempt))
            .collect()
    }
}

impl Default for ExponentialBackoff {
    /// Defaults:
    /// - `max_retries`: 3
    /// - `initial_delay`: 1s
    /// - `max_delay`: 60s
    /// - `multiplier`: 2.0
    /// - `jitter`: 0.0
    /// - `retry_on`: transient failures only
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            initial_delay: DEFAULT_INITIAL_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
            multiplier: DEFAULT_MULTIPLIER,
            jitter: 0.0,
            retry_on: RetryOn::Transient,
        }
    }
}

#[async_trait]
impl BackoffStrategy for ExponentialBackoff {
    async fn execute<F, Fut, T, E>(&self, operation: F) -> Result<T, E>
    where
        F: Fn() -> Fut + Send + Sync,
        Fut: Future<Output = Result<T, E>> + Send,
        T: Send,
        E: Error + Transient + Send + Sync + 'static,
    {
        let mut attempt = 0;
        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(err) if !self.should_retry(&err, attempt) => return Err(err),
                Err(err) if attempt >= self.max_retries => return Err(err),
                Err(err) => {
                    let delay = self.next_delay(attempt);
                    #[cfg(feature = "tracing")]
                    tracing::warn!(
                        attempt = attempt + 1,
                        max_retries = self.max_retries,
                        delay_ms = delay.map(|d| d.as_millis() as u64),
                        error = %err,
                        "Operation failed, retrying"
                    );
                    #[cfg(not(feature = "tracing"))]
                    let _ = err;
                    if let Some(delay) = delay {
                        tokio::time::sleep(delay).await;
                    }
                    attempt += 1;
                }
            }
        }
    }

    fn next_delay(&self, attempt: u32) -> Option<Duration> {
        // attempt 0 is the wait before the first retry
        let base_delay = self.initial_delay.as_secs_f64() * self.multiplier.powi(attempt as i32);

        let jittered = if self.jitter > 0.0 {
            let jitter_amount = base_delay * self.jitter * (rand::random::<f64>() - 0.5) * 2.0;
            base_delay + jitter_amount
        } else {
            base_delay
        };

        Some(Duration::from_secs_f64(
            jittered.min(self.max_delay.as_secs_f64()),
        ))
    }

    fn max_retries(&self) -> u32 {
        self.max_retries
    }

    fn retry_on(&self) -> RetryOn {
        self.retry_on
    }
}

/// Builder for configuring `ExponentialBackoff`.
///
/// ```rust
/// use faceyoga_core::retry::ExponentialBackoff;
/// use std::time::Duration;
///
/// let backoff = ExponentialBackoff::builder()
///     .max_retries(5)
///     .initial_delay(Duration::from_millis(100))
///     .multiplier(1.5)
///     .jitter(0.1)
///     .build();
/// ```
#[derive(Debug, Default)]
pub struct ExponentialBackoffBuilder {
    max_retries: Option<u32>,
    initial_delay: Option<Duration>,
    max_delay: Option<Duration>,
    multiplier: Option<f64>,
    jitter: Option<f64>,
    retry_on: Option<RetryOn>,
}

impl ExponentialBackoffBuilder {
    /// Set the maximum number of retry attempts. Default: 3
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }

    /// Set the initial delay before the first retry. Default: 1s
    pub fn initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = Some(delay);
        self
    }

    /// Set the maximum delay between retries. Default: 60s
    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = Some(delay);
        self
    }

    /// Set the exponential multiplier. Default: 2.0
    pub fn multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = Some(multiplier);
        self
    }

    /// Set the jitter factor, clamped to `0.0..=1.0`. Default: 0.0
    ///
    /// A jitter of 0.1 lets each delay vary by ±10%.
    pub fn jitter(mut self, jitter: f64) -> Self {
        self.jitter = Some(jitter.clamp(0.0, 1.0));
        self
    }

    /// Choose which failures are retried. Default: [`RetryOn::Transient`]
    pub fn retry_on(mut self, retry_on: RetryOn) -> Self {
        self.retry_on = Some(retry_on);
        self
    }

    /// Build the `ExponentialBackoff` instance, defaulting unset parameters.
    pub fn build(self) -> ExponentialBackoff {
        ExponentialBackoff {
            max_retries: self.max_retries.unwrap_or(DEFAULT_MAX_RETRIES),
            initial_delay: self.initial_delay.unwrap_or(DEFAULT_INITIAL_DELAY),
            max_delay: self.max_delay.unwrap_or(DEFAULT_MAX_DELAY),
            multiplier: self.multiplier.unwrap_or(DEFAULT_MULTIPLIER),
            jitter: self.jitter.unwrap_or(0.0),
            retry_on: self.retry_on.unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn transient() -> io::Error {
        io::Error::new(io::ErrorKind::ConnectionReset, "connection reset")
    }

    fn permanent() -> io::Error {
        io::Error::new(io::ErrorKind::InvalidInput, "bad input")
    }

    #[test]
    fn test_exponential_delay_calculation() {
        let backoff = ExponentialBackoff::default();

        assert_eq!(backoff.next_delay(0).unwrap(), Duration::from_millis(1000));
        assert_eq!(backoff.next_delay(1).unwrap(), Duration::from_millis(2000));
        assert_eq!(backoff.next_delay(2).unwrap(), Duration::from_millis(4000));
        assert_eq!(
            backoff.schedule(),
            vec![
                Duration::from_millis(1000),
                Duration::from_millis(2000),
                Duration::from_millis(4000)
            ]
        );
    }

    #[test]
    fn test_max_delay_cap() {
        let backoff = ExponentialBackoff {
            max_retries: 100,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(5),
            multiplier: 10.0,
            jitter: 0.0,
            retry_on: RetryOn::Any,
        };

        for attempt in 5..10 {
            let delay = backoff.next_delay(attempt).unwrap();
            assert!(
                delay <= Duration::from_secs(5),
                "Delay at attempt {} ({:?}) exceeded max_delay",
                attempt,
                delay
            );
        }
    }

    #[tokio::test]
    async fn test_retry_success_on_third_attempt() {
        let backoff = ExponentialBackoff::builder()
            .max_retries(5)
            .initial_delay(Duration::from_millis(1))
            .build();

        let attempts = Arc::new(AtomicU32::new(0));
        let attempts_clone = Arc::clone(&attempts);

        let result = backoff
            .execute(|| {
                let attempts = Arc::clone(&attempts_clone);
                async move {
                    let current = attempts.fetch_add(1, Ordering::SeqCst);
                    if current < 2 { Err(transient()) } else { Ok(42) }
                }
            })
            .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_invocations_are_budget_plus_one() {
        for budget in 0..5u32 {
            let backoff = ExponentialBackoff::builder()
                .max_retries(budget)
                .initial_delay(Duration::from_millis(1))
                .build();

            let attempts = Arc::new(AtomicU32::new(0));
            let attempts_clone = Arc::clone(&attempts);

            let result = backoff
                .execute(|| {
                    let attempts = Arc::clone(&attempts_clone);
                    async move {
                        attempts.fetch_add(1, Ordering::SeqCst);
                        Err::<(), _>(transient())
                    }
                })
                .await;

            assert!(result.is_err());
            assert_eq!(attempts.load(Ordering::SeqCst), budget + 1);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_budget_does_not_wait() {
        let backoff = ExponentialBackoff::none();
        let start = tokio::time::Instant::now();

        let result = backoff
            .execute(|| async { Err::<(), _>(transient()) })
            .await;

        assert!(result.is_err());
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_total_wait_doubles_from_initial_delay() {
        let backoff = ExponentialBackoff::default();
        let start = tokio::time::Instant::now();

        let result = backoff
            .execute(|| async { Err::<(), _>(transient()) })
            .await;

        assert!(result.is_err());
        // 1s + 2s + 4s
        assert_eq!(start.elapsed(), Duration::from_secs(7));
    }

    #[tokio::test]
    async fn test_final_error_is_returned_unchanged() {
        let backoff = ExponentialBackoff::builder()
            .max_retries(1)
            .initial_delay(Duration::from_millis(1))
            .build();

        let err = backoff
            .execute(|| async { Err::<(), _>(transient()) })
            .await
            .unwrap_err();

        assert_eq!(err.kind(), io::ErrorKind::ConnectionReset);
        assert_eq!(err.to_string(), "connection reset");
    }

    #[tokio::test]
    async fn test_permanent_failure_is_not_retried() {
        let backoff = ExponentialBackoff::builder()
            .max_retries(5)
            .initial_delay(Duration::from_millis(1))
            .build();

        let attempts = Arc::new(AtomicU32::new(0));
        let attempts_clone = Arc::clone(&attempts);

        let result = backoff
            .execute(|| {
                let attempts = Arc::clone(&attempts_clone);
                async move {
                    attempts.fetch_add(1, Ordering::SeqCst);
                    Err::<(), _>(permanent())
                }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retry_on_any_retries_permanent_failures() {
        let backoff = ExponentialBackoff::builder()
            .max_retries(2)
            .initial_delay(Duration::from_millis(1))
            .retry_on(RetryOn::Any)
            .build();

        let attempts = Arc::new(AtomicU32::new(0));
        let attempts_clone = Arc::clone(&attempts);

        let result = backoff
            .execute(|| {
                let attempts = Arc::clone(&attempts_clone);
                async move {
                    attempts.fetch_add(1, Ordering::SeqCst);
                    Err::<(), _>(permanent())
                }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_jitter_variation() {
        let backoff = ExponentialBackoff::builder()
            .max_retries(10)
            .initial_delay(Duration::from_secs(1))
            .jitter(0.5)
            .build();

        let delays: Vec<_> = (0..20).map(|_| backoff.next_delay(0).unwrap()).collect();

        for delay in &delays {
            let millis = delay.as_millis();
            assert!(
                (500..=1500).contains(&millis),
                "Delay with 50% jitter should be in range [500ms, 1500ms], got {}ms",
                millis
            );
        }

        let all_same = delays.windows(2).all(|w| w[0] == w[1]);
        assert!(!all_same, "With randomization, delays should vary");
    }

    #[test]
    fn test_builder_defaults() {
        let backoff = ExponentialBackoff::builder().build();

        assert_eq!(backoff.max_retries, 3);
        assert_eq!(backoff.initial_delay, Duration::from_millis(1000));
        assert_eq!(backoff.max_delay, Duration::from_secs(60));
        assert_eq!(backoff.multiplier, 2.0);
        assert_eq!(backoff.jitter, 0.0);
        assert_eq!(backoff.retry_on, RetryOn::Transient);
    }

    #[test]
    fn test_jitter_clamped() {
        assert_eq!(ExponentialBackoff::builder().jitter(2.0).build().jitter, 1.0);
        assert_eq!(ExponentialBackoff::builder().jitter(-0.5).build().jitter, 0.0);
    }

    #[tokio::test]
    async fn test_immediate_success() {
        let backoff = ExponentialBackoff::default();

        let result = backoff
            .execute(|| async { Ok::<_, io::Error>(42) })
            .await;

        assert_eq!(result.unwrap(), 42);
    }
}
