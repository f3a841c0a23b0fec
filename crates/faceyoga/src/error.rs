//! Error types for the faceyoga client
//!
//! Remote failures are mapped from HTTP status and the backend's structured
//! error bodies into one enum, built with `thiserror`. Data-access methods wrap
//! failures with a short, human-readable context ("Failed to fetch courses")
//! that stores surface to users.

use faceyoga_core::error_boundary;
use faceyoga_core::retry::Transient;
use faceyoga_core::store::UserFacing;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for operations that can fail with a faceyoga error.
pub type Result<T> = std::result::Result<T, Error>;

/// Code the table API returns when a single-row read matched no rows.
pub const NO_ROWS_CODE: &str = "PGRST116";

/// Postgres unique-constraint violation.
pub const UNIQUE_VIOLATION_CODE: &str = "23505";

/// Main error type for the faceyoga client.
#[derive(Debug, Error)]
pub enum Error {
    /// The backend rejected the request as malformed (400).
    #[error("Bad request: {message}")]
    BadRequest {
        /// Error message from the backend
        message: String,
        /// Backend error code, if any
        code: Option<String>,
    },

    /// Authentication failed (401).
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Row-level rules or storage policies denied access (403).
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Nothing matched (404, or a single-row read with zero rows).
    #[error("Not found: {message}")]
    NotFound {
        /// Error message from the backend
        message: String,
        /// Backend error code, e.g. `PGRST116`
        code: Option<String>,
    },

    /// Uniqueness or foreign-key conflict (409).
    #[error("Conflict: {message}")]
    Conflict {
        /// Error message from the backend
        message: String,
        /// Backend error code, e.g. `23505`
        code: Option<String>,
    },

    /// Payload failed backend validation (422).
    #[error("Unprocessable entity: {0}")]
    UnprocessableEntity(String),

    /// Rate limit exceeded (429).
    #[error("Rate limit exceeded")]
    RateLimit {
        /// Time to wait before retrying, if provided
        retry_after: Option<Duration>,
    },

    /// Server-side failure (500+).
    #[error("Internal server error: {0}")]
    InternalServerError(String),

    /// Status codes not covered above.
    #[error("API error (status {status}): {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error message
        message: String,
        /// Backend error code, if any
        code: Option<String>,
        /// Request ID for debugging
        request_id: Option<String>,
    },

    /// Response body did not match the expected shape.
    #[error("Failed to parse response: {0}")]
    ResponseValidation(String),

    /// Network or connection error.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Request timeout.
    #[error("Request timeout after {0:?}")]
    Timeout(Duration),

    /// Input rejected before any remote call was made.
    #[error("{0}")]
    InvalidRequest(String),

    /// Invalid URL provided.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// HTTP client configuration or initialization error.
    #[error("HTTP client error: {0}")]
    HttpClient(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Missing required configuration.
    #[error("Missing required configuration: {0}")]
    MissingConfig(String),

    /// An operation with a human-readable description of what failed.
    #[error("{context}: {source}")]
    WithContext {
        /// What was being attempted, e.g. "Failed to fetch courses"
        context: String,
        /// Underlying error
        #[source]
        source: Box<Error>,
    },

    /// Other errors not covered by specific variants.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

error_boundary!(reqwest::Error => Error, |e| {
    if e.is_timeout() {
        Error::Timeout(Duration::ZERO)
    } else if e.is_decode() {
        Error::ResponseValidation(e.to_string())
    } else if e.is_builder() {
        Error::HttpClient(e.to_string())
    } else {
        Error::Connection(e.to_string())
    }
});

error_boundary!(url::ParseError => Error, |e| {
    Error::InvalidUrl(e.to_string())
});

// Missing required fields on `New*` builders.
error_boundary!(derive_builder::UninitializedFieldError => Error, |e| {
    Error::InvalidRequest(e.to_string())
});

impl Error {
    /// Create an error from an HTTP response status and body.
    pub fn from_response(status: u16, body: &str, headers: &http::HeaderMap) -> Self {
        let (message, code) = match serde_json::from_str::<ApiErrorBody>(body) {
            Ok(parsed) => parsed.into_parts(body),
            Err(_) => (body.to_string(), None),
        };

        match status {
            400 => Error::BadRequest { message, code },
            401 => Error::Authentication(message),
            403 => Error::PermissionDenied(message),
            404 => Error::NotFound { message, code },
            // single-row reads answer 406 when zero rows matched
            406 if code.as_deref() == Some(NO_ROWS_CODE) => Error::NotFound { message, code },
            409 => Error::Conflict { message, code },
            422 => Error::UnprocessableEntity(message),
            429 => Error::RateLimit {
                retry_after: headers
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|s| s.parse::<u64>().ok())
                    .map(Duration::from_secs),
            },
            s if s >= 500 => Error::InternalServerError(message),
            _ => Error::ApiError {
                status,
                message,
                code,
                request_id: headers
                    .get("x-request-id")
                    .or_else(|| headers.get("sb-request-id"))
                    .and_then(|v| v.to_str().ok())
                    .map(String::from),
            },
        }
    }

    /// Check if this error is worth retrying.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::RateLimit { .. } => true,
            Error::InternalServerError(_) => true,
            Error::Connection(_) => true,
            Error::Timeout(_) => true,
            Error::ApiError { status, .. } => *status == 408,
            Error::WithContext { source, .. } => source.is_retryable(),
            _ => false,
        }
    }

    /// The backend error code, looking through added context.
    pub fn code(&self) -> Option<&str> {
        match self {
            Error::BadRequest { code, .. }
            | Error::NotFound { code, .. }
            | Error::Conflict { code, .. }
            | Error::ApiError { code, .. } => code.as_deref(),
            Error::WithContext { source, .. } => source.code(),
            _ => None,
        }
    }

    /// Whether a single-row read matched nothing.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::NotFound { .. } => true,
            Error::WithContext { source, .. } => source.is_not_found(),
            _ => self.code() == Some(NO_ROWS_CODE),
        }
    }

    /// Whether a single-row read matched zero rows.
    ///
    /// Narrower than [`is_not_found`](Self::is_not_found): a 404 for a
    /// missing table or route carries a different code and is not "no rows".
    pub fn is_no_rows(&self) -> bool {
        self.code() == Some(NO_ROWS_CODE)
    }

    /// Whether a write collided with a uniqueness constraint.
    pub fn is_conflict(&self) -> bool {
        match self {
            Error::Conflict { .. } => true,
            Error::WithContext { source, .. } => source.is_conflict(),
            _ => self.code() == Some(UNIQUE_VIOLATION_CODE),
        }
    }

    /// Get retry delay if this is a rate limit error with retry-after.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Error::RateLimit { retry_after } => *retry_after,
            Error::WithContext { source, .. } => source.retry_after(),
            _ => None,
        }
    }

    /// Add context to an error.
    pub fn context<C>(self, context: C) -> Self
    where
        C: std::fmt::Display,
    {
        Error::WithContext {
            context: context.to_string(),
            source: Box::new(self),
        }
    }

    /// Shorthand for a validation failure.
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Error::InvalidRequest(message.into())
    }
}

impl Transient for Error {
    fn is_transient(&self) -> bool {
        self.is_retryable()
    }
}

impl UserFacing for Error {
    /// The outermost context when one was added, otherwise the full message.
    fn user_message(&self) -> String {
        match self {
            Error::WithContext { context, .. } => context.clone(),
            other => other.to_string(),
        }
    }
}

/// Extension for attaching context to results.
pub trait ResultExt<T> {
    /// Wrap the error with a description of the failed operation.
    fn context(self, context: &'static str) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: &'static str) -> Result<T> {
        self.map_err(|e| {
            tracing::error!(error = %e, "{context}");
            e.context(context)
        })
    }
}

// The table API, auth service and storage service each shape errors differently.
#[derive(Debug, serde::Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_code: Option<String>,
    #[serde(default)]
    code: Option<serde_json::Value>,
    #[serde(default)]
    details: Option<String>,
}

impl ApiErrorBody {
    fn into_parts(self, raw: &str) -> (String, Option<String>) {
        let code = self.error_code.or(match self.code {
            Some(serde_json::Value::String(s)) => Some(s),
            _ => None,
        });
        let message = self
            .message
            .or(self.msg)
            .or(self.error_description)
            .or(self.error)
            .or(self.details)
            .unwrap_or_else(|| raw.to_string());
        (message, code)
    }
}
