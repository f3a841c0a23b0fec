//! Retrying remote operations with exponential backoff.
//!
//! An operation is re-invoked after a failure only when the active
//! [`RetryOn`] policy allows it. Under the default policy that means the
//! failure reports itself [`Transient`]; a rejected request fails on the
//! first attempt.
//!
//! # Key Types
//!
//! - [`BackoffStrategy`] - Runs an operation under a retry budget
//! - [`ExponentialBackoff`] - Doubling delays, capped, with optional jitter
//! - [`Transient`] - Classification of failures worth retrying
//! - [`RetryOn`] - Transient-only or unconditional retry
//!
//! # Examples
//!
//! ```rust
//! use faceyoga_core::retry::{BackoffStrategy, ExponentialBackoff, RetryOn};
//! use std::io;
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let backoff = ExponentialBackoff::builder()
//!     .max_retries(3)
//!     .initial_delay(Duration::from_millis(100))
//!     .retry_on(RetryOn::Transient)
//!     .build();
//!
//! // Rejected immediately: `InvalidInput` is not transient.
//! let result = backoff.execute(|| async {
//!     Err::<(), _>(io::Error::new(io::ErrorKind::InvalidInput, "missing course id"))
//! }).await;
//! assert!(result.is_err());
//! # Ok(())
//! # }
//! ```

mod exponential;
mod strategy;

pub use exponential::{ExponentialBackoff, ExponentialBackoffBuilder};
pub use strategy::{BackoffStrategy, RetryOn, Transient};
