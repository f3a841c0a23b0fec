//! Data access for each backend table and service
//!
//! Every method follows the same convention:
//!
//! 1. required identifiers are checked before any call is made and reported
//!    as [`Error::InvalidRequest`], which is never retried;
//! 2. reads, updates, upserts and deletes run under the client's retry
//!    policy, inserts run once so a lost response cannot duplicate a row;
//! 3. remote failures are logged and wrapped with a short description of
//!    what failed, e.g. "Failed to fetch courses". Auth failures keep the
//!    auth service's own wording.

pub mod auth;
pub mod courses;
pub mod exercises;
pub mod profiles;
pub mod progress;
pub mod storage;

pub use auth::Auth;
pub use courses::Courses;
pub use exercises::Exercises;
pub use profiles::Profiles;
pub use progress::Progress;
pub use storage::Storage;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::client::Client;
use crate::error::{Error, Result};

/// Base trait for API resources.
pub trait Resource {
    /// Get a reference to the client.
    fn client(&self) -> &Client;
}

/// Fail with `message` when `value` is blank.
pub(crate) fn require(value: &str, message: &'static str) -> Result<()> {
    if value.trim().is_empty() {
        tracing::debug!(reason = message, "Request validation failed");
        return Err(Error::invalid(message));
    }
    Ok(())
}

/// A partial update stamped with the modification time.
#[derive(Debug, Serialize)]
pub(crate) struct Stamped<'a, T: Serialize> {
    #[serde(flatten)]
    fields: &'a T,
    updated_at: DateTime<Utc>,
}

impl<'a, T: Serialize> Stamped<'a, T> {
    pub(crate) fn now(fields: &'a T) -> Self {
        Self {
            fields,
            updated_at: Utc::now(),
        }
    }
}
