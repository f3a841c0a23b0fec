#![deny(unsafe_code)]
#![warn(missing_docs)]

//! Core building blocks for the faceyoga client.
//!
//! This crate has no knowledge of courses, exercises or the hosted backend.
//! It provides:
//!
//! - **Retry with exponential backoff** via [`BackoffStrategy`](retry::BackoffStrategy),
//!   restricted to transient failures by default
//! - **A generic keyed collection cache** via [`Collection`](cache::Collection) and
//!   [`KeyedCollection`](cache::KeyedCollection)
//! - **The store lifecycle** (loading, reconcile, error capture) via [`Store`](store::Store)
//! - **Declarative error boundaries** via the `error_boundary!` macro
//!
//! # Examples
//!
//! ```rust
//! use faceyoga_core::prelude::*;
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let backoff = ExponentialBackoff::builder()
//!     .max_retries(3)
//!     .initial_delay(Duration::from_millis(100))
//!     .build();
//!
//! let rows = backoff.execute(|| async {
//!     Ok::<_, std::io::Error>(vec!["jaw release", "cheek lift"])
//! }).await?;
//!
//! let store: Store<Vec<&str>> = Store::default();
//! store.update(|cached| *cached = rows);
//! assert_eq!(store.read(Vec::len), 2);
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod error;
pub mod retry;
pub mod store;

/// Convenient re-exports of commonly used items.
pub mod prelude {
    pub use crate::cache::{Collection, Identified, KeyedCollection};
    pub use crate::error_boundary;
    pub use crate::retry::{
        BackoffStrategy, ExponentialBackoff, ExponentialBackoffBuilder, RetryOn, Transient,
    };
    pub use crate::store::{Snapshot, Store, UserFacing};
}
