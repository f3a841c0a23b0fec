//! HTTP response handling

use bytes::Bytes;
use http::{HeaderMap, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::error::{Error, Result};

/// HTTP response wrapper.
#[derive(Debug)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
    elapsed: Duration,
}

impl Response {
    /// Create a new response.
    pub fn new(status: StatusCode, headers: HeaderMap, body: Bytes, elapsed: Duration) -> Self {
        Self {
            status,
            headers,
            body,
            elapsed,
        }
    }

    /// Get the status code.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Get the headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Get the raw body bytes.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Time elapsed for the request/response cycle.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Get the body as a string.
    pub fn text(&self) -> Result<String> {
        String::from_utf8(self.body.to_vec()).map_err(|e| Error::ResponseValidation(e.to_string()))
    }

    /// Parse the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(Error::Serialization)
    }

    /// Check if the response is successful (2xx status).
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Check if the response is an error (4xx or 5xx status).
    pub fn is_error(&self) -> bool {
        self.status.is_client_error() || self.status.is_server_error()
    }

    /// The request id the backend assigned, if any.
    pub fn request_id(&self) -> Option<&str> {
        self.headers
            .get("sb-request-id")
            .or_else(|| self.headers.get("x-request-id"))
            .and_then(|v| v.to_str().ok())
    }

    /// Convert an error status into an [`Error`], passing successful responses through.
    pub fn ensure_success(self) -> Result<Self> {
        if self.is_error() {
            return Err(Error::from_response(
                self.status.as_u16(),
                &String::from_utf8_lossy(&self.body),
                &self.headers,
            ));
        }
        Ok(self)
    }

    /// Parse a successful response, converting HTTP errors to client errors.
    ///
    /// ```rust,no_run
    /// # use faceyoga::http::Response;
    /// # use faceyoga::Course;
    /// # fn example(response: Response) -> faceyoga::Result<()> {
    /// let courses: Vec<Course> = response.parse_result()?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn parse_result<T: DeserializeOwned>(self) -> Result<T> {
        self.ensure_success()?.json()
    }
}
