//! Retry strategies and failure classification.

use async_trait::async_trait;
use std::error::Error;
use std::future::Future;
use std::time::Duration;

/// Classifies a failure as worth retrying or not.
///
/// Transport hiccups (dropped connections, timeouts, overloaded upstreams)
/// are transient. Validation failures and rejections by the backend are
/// not, and retrying them only delays the inevitable error.
pub trait Transient {
    /// Returns `true` if repeating the same call could succeed.
    fn is_transient(&self) -> bool;
}

impl Transient for std::io::Error {
    fn is_transient(&self) -> bool {
        use std::io::ErrorKind;
        matches!(
            self.kind(),
            ErrorKind::TimedOut
                | ErrorKind::Interrupted
                | ErrorKind::WouldBlock
                | ErrorKind::ConnectionReset
                | ErrorKind::ConnectionAborted
                | ErrorKind::ConnectionRefused
                | ErrorKind::BrokenPipe
                | ErrorKind::UnexpectedEof
        )
    }
}

/// Which failures a strategy is allowed to retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RetryOn {
    /// Only failures whose [`Transient::is_transient`] returns `true`.
    #[default]
    Transient,
    /// Every failure, regardless of cause.
    Any,
}

impl RetryOn {
    /// Apply the policy to a concrete failure.
    pub fn permits<E: Transient + ?Sized>(self, error: &E) -> bool {
        match self {
            RetryOn::Transient => error.is_transient(),
            RetryOn::Any => true,
        }
    }
}

/// A strategy for retrying failed operations with backoff.
///
/// Implementations determine when to retry, how long to wait between attempts,
/// and when to give up. The final failure is handed back to the caller as-is.
///
/// # Examples
///
/// ```rust
/// use faceyoga_core::retry::{BackoffStrategy, ExponentialBackoff};
/// use std::time::Duration;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let backoff = ExponentialBackoff::builder()
///     .max_retries(3)
///     .initial_delay(Duration::from_millis(100))
///     .build();
///
/// let result = backoff.execute(|| async {
///     Ok::<_, std::io::Error>(42)
/// }).await?;
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait BackoffStrategy: Send + Sync {
    /// Execute an operation with retry logic.
    ///
    /// The operation is called repeatedly until it succeeds, a failure the
    /// policy refuses to retry occurs, or the retry budget is exhausted. A
    /// budget of zero still invokes the operation once.
    ///
    /// # Returns
    /// - `Ok(T)`: The successful result
    /// - `Err(E)`: The final error, unchanged
    async fn execute<F, Fut, T, E>(&self, operation: F) -> Result<T, E>
    where
        F: Fn() -> Fut + Send + Sync,
        Fut: Future<Output = Result<T, E>> + Send,
        T: Send,
        E: Error + Transient + Send + Sync + 'static;

    /// Determine if an error is retryable on the given attempt (0-indexed).
    ///
    /// Default implementation consults the strategy's [`RetryOn`] policy.
    fn should_retry(&self, error: &(dyn Transient + Send + Sync), attempt: u32) -> bool {
        let _ = attempt;
        self.retry_on().permits(error)
    }

    /// Calculate the delay before the next retry attempt.
    ///
    /// Called after a failure and before sleeping: `next_delay(0)` is the
    /// wait before the second invocation.
    fn next_delay(&self, attempt: u32) -> Option<Duration>;

    /// Maximum number of retries after the initial attempt.
    ///
    /// With `max_retries() == 3` the operation runs at most 4 times.
    fn max_retries(&self) -> u32;

    /// The failure classes this strategy retries.
    fn retry_on(&self) -> RetryOn {
        RetryOn::Transient
    }
}
