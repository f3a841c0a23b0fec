//! HTTP provider trait for abstracting the hosted backend
//!
//! Resources only ever talk to an `HttpProvider`, so tests and alternative
//! deployments (self-hosted gateway, local emulator) can swap the transport
//! while keeping the resource code unchanged.

use crate::{
    error::Result,
    http::{Method, RequestBuilder, Response},
};
use async_trait::async_trait;
use std::fmt;

/// Provider trait for making HTTP requests to the backend.
///
/// Implementations own authentication with the project key and the
/// construction of absolute URLs from service paths such as
/// `/rest/v1/courses` or `/auth/v1/token`.
#[async_trait]
pub trait HttpProvider: Send + Sync + fmt::Debug {
    /// Make a request and return the raw response.
    ///
    /// # Arguments
    ///
    /// * `method` - HTTP method (GET, POST, etc.)
    /// * `path` - Service path (e.g., "/rest/v1/exercises")
    /// * `body` - Optional request body (will be serialized to JSON)
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be built or sent. Error
    /// statuses are returned inside the `Response`.
    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&(dyn erased_serde::Serialize + Send + Sync)>,
    ) -> Result<Response>;

    /// Create a `RequestBuilder` carrying the provider's authentication.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be constructed.
    fn create_request(&self, method: Method, path: &str) -> Result<RequestBuilder>;

    /// Get the provider name for debugging/logging.
    fn provider_name(&self) -> &'static str;

    /// Get the base URL for this provider.
    fn base_url(&self) -> &str;

    /// Cast to `std::any::Any` for downcasting to concrete types.
    fn as_any(&self) -> &dyn std::any::Any;
}

/// Serialize a body to JSON bytes.
pub(crate) fn serialize_body(
    body: &(dyn erased_serde::Serialize + Send + Sync),
) -> Result<Vec<u8>> {
    serde_json::to_vec(body).map_err(crate::error::Error::Serialization)
}
