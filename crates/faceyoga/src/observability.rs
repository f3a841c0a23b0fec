//! Structured logging for calls against the backend
//!
//! Every request sent by [`RequestBuilder`](crate::http::RequestBuilder) is
//! logged through a [`CallLog`] with the same field names, so a subscriber can
//! filter on `service`, `target` and `status` across tables, buckets and the
//! auth service.

use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// The backend service a request path belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    /// Table access under `/rest/v1`.
    Rest,
    /// Sign-in, sign-up and sessions under `/auth/v1`.
    Auth,
    /// File storage under `/storage/v1`.
    Storage,
    /// Anything else.
    Other,
}

impl Service {
    /// Classify a request path.
    pub fn of(path: &str) -> Self {
        if path.starts_with("/rest/") {
            Service::Rest
        } else if path.starts_with("/auth/") {
            Service::Auth
        } else if path.starts_with("/storage/") {
            Service::Storage
        } else {
            Service::Other
        }
    }

    /// Name used in log fields.
    pub fn as_str(self) -> &'static str {
        match self {
            Service::Rest => "rest",
            Service::Auth => "auth",
            Service::Storage => "storage",
            Service::Other => "other",
        }
    }
}

/// What a path addresses inside its service: the table, the auth endpoint
/// or the storage bucket.
pub fn target_of(path: &str) -> &str {
    let mut segments = path.trim_start_matches('/').split('/').skip(2);
    match Service::of(path) {
        Service::Storage => {
            // object/<bucket>/... or object/public/<bucket>/...
            let _ = segments.next();
            match segments.next() {
                Some("public") => segments.next().unwrap_or(""),
                Some(bucket) => bucket,
                None => "",
            }
        }
        Service::Rest | Service::Auth => segments.next().unwrap_or(""),
        Service::Other => path,
    }
}

/// The machine-readable code of a failure body, if it carries one.
///
/// Table errors use `code` (`PGRST116`, `23505`); the auth service uses
/// `error_code` or `error`.
pub fn failure_code(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    ["code", "error_code", "error"]
        .iter()
        .find_map(|key| match value.get(key)? {
            serde_json::Value::String(code) => Some(code.clone()),
            serde_json::Value::Number(code) => Some(code.to_string()),
            _ => None,
        })
}

/// One call against the backend, from send to response.
#[derive(Debug)]
pub struct CallLog {
    service: Service,
    target: String,
    method: String,
    started: Instant,
}

impl CallLog {
    /// Log that a call is being sent and start timing it.
    pub fn begin(method: &str, path: &str, body_size: Option<usize>) -> Self {
        let call = Self {
            service: Service::of(path),
            target: target_of(path).to_string(),
            method: method.to_string(),
            started: Instant::now(),
        };
        debug!(
            service = call.service.as_str(),
            target = %call.target,
            method = %call.method,
            body_size,
            "Calling backend"
        );
        call
    }

    /// The service this call went to.
    pub fn service(&self) -> Service {
        self.service
    }

    /// Table, auth endpoint or bucket.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Time since the call was sent.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Log the response to this call.
    pub fn finish(&self, status: u16, body: &[u8]) {
        let elapsed_ms = self.elapsed().as_millis();
        if (200..300).contains(&status) {
            info!(
                service = self.service.as_str(),
                target = %self.target,
                method = %self.method,
                status,
                elapsed_ms,
                body_size = body.len(),
                "Backend call succeeded"
            );
        } else {
            warn!(
                service = self.service.as_str(),
                target = %self.target,
                method = %self.method,
                status,
                elapsed_ms,
                code = failure_code(body).as_deref(),
                "Backend call failed"
            );
        }
    }
}

/// Install a `fmt` subscriber filtered by `RUST_LOG`, defaulting to `info`.
///
/// Returns an error if a global subscriber is already set.
#[cfg(feature = "trace")]
#[cfg_attr(docsrs, doc(cfg(feature = "trace")))]
pub fn init_tracing() -> crate::Result<()> {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|e| crate::Error::Other(anyhow::anyhow!("Failed to install tracing subscriber: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("/rest/v1/courses", Service::Rest, "courses")]
    #[case("/rest/v1/section_exercises", Service::Rest, "section_exercises")]
    #[case("/auth/v1/token", Service::Auth, "token")]
    #[case("/storage/v1/object/progress/u-1/1700000000000.jpg", Service::Storage, "progress")]
    #[case("/storage/v1/object/public/avatars/u-1/avatar.png", Service::Storage, "avatars")]
    #[case("/health", Service::Other, "/health")]
    fn test_path_classification(#[case] path: &str, #[case] service: Service, #[case] target: &str) {
        assert_eq!(Service::of(path), service);
        assert_eq!(target_of(path), target);
    }

    #[test]
    fn test_failure_code() {
        assert_eq!(
            failure_code(br#"{"code":"PGRST116","message":"no rows"}"#).as_deref(),
            Some("PGRST116")
        );
        assert_eq!(
            failure_code(br#"{"error":"invalid_grant","error_description":"bad"}"#).as_deref(),
            Some("invalid_grant")
        );
        assert_eq!(failure_code(br#"{"code":400,"msg":"bad"}"#).as_deref(), Some("400"));
        assert_eq!(failure_code(b"<html>gateway</html>"), None);
    }

    #[test]
    fn test_call_log_times_the_call() {
        let call = CallLog::begin("GET", "/rest/v1/exercises", None);
        std::thread::sleep(Duration::from_millis(10));
        call.finish(200, b"[]");

        assert_eq!(call.service(), Service::Rest);
        assert_eq!(call.target(), "exercises");
        assert!(call.elapsed().as_millis() >= 10);
    }

    #[cfg(feature = "trace")]
    #[test]
    fn test_init_tracing_installs_once() {
        assert!(init_tracing().is_ok());
        assert!(init_tracing().is_err());
    }
}
