//! HTTP request builder
//!
//! Besides plain headers and bodies, the builder knows the query and header
//! conventions of the table API: `col=eq.value` filters, `order=col.desc`,
//! the single-object `Accept` header and the `Prefer` header for returning
//! written rows and merging on conflict.

use super::Response;
use crate::error::{Error, Result};
use crate::observability::CallLog;
use bytes::Bytes;
use http::{HeaderMap, HeaderName, HeaderValue, Method, header};
use serde::Serialize;
use std::time::Duration;
use url::Url;

const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";
const RETURN_REPRESENTATION: &str = "return=representation";
const MERGE_DUPLICATES: &str = "resolution=merge-duplicates,return=representation";

/// Sort direction for `order`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    /// Smallest first.
    Ascending,
    /// Largest first.
    Descending,
}

impl Order {
    fn as_str(self) -> &'static str {
        match self {
            Order::Ascending => "asc",
            Order::Descending => "desc",
        }
    }
}

/// Builder for HTTP requests.
///
/// One builder issues one request. Retries are layered on top by rebuilding
/// the request for every attempt.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    method: Method,
    url: Url,
    headers: HeaderMap,
    body: Option<Bytes>,
    timeout: Duration,
    pub(crate) http_client: Option<reqwest::Client>,
}

impl RequestBuilder {
    /// Create a new request builder.
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: None,
            timeout: crate::DEFAULT_TIMEOUT,
            http_client: None,
        }
    }

    /// Set the HTTP client to use
    pub(crate) fn with_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Set a header from already-validated parts.
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Set a header, returning an error if the name or value is invalid.
    pub fn try_header(self, key: impl AsRef<str>, value: impl AsRef<str>) -> Result<Self> {
        let key = key.as_ref();
        let value = value.as_ref();

        let name = key
            .parse::<HeaderName>()
            .map_err(|e| Error::HttpClient(format!("Invalid header name '{}': {}", key, e)))?;
        let value = value
            .parse::<HeaderValue>()
            .map_err(|e| Error::HttpClient(format!("Invalid header value for '{}': {}", key, e)))?;

        Ok(self.header(name, value))
    }

    /// Authenticate as `token`, replacing any previous bearer.
    pub fn bearer(self, token: &str) -> Result<Self> {
        self.try_header(header::AUTHORIZATION.as_str(), format!("Bearer {token}"))
    }

    /// Append a query parameter.
    pub fn query(mut self, key: &str, value: &str) -> Self {
        self.url.query_pairs_mut().append_pair(key, value);
        self
    }

    /// Columns to return, e.g. `*` or `*,exercise:exercises(*)`.
    pub fn select(self, columns: &str) -> Self {
        self.query("select", columns)
    }

    /// Keep rows whose `column` equals `value`.
    pub fn eq(self, column: &str, value: &str) -> Self {
        self.query(column, &format!("eq.{value}"))
    }

    /// Sort rows by `column`.
    pub fn order(self, column: &str, order: Order) -> Self {
        self.query("order", &format!("{column}.{}", order.as_str()))
    }

    /// Expect exactly one row back as an object rather than an array.
    ///
    /// Zero matching rows makes the backend answer with `PGRST116`, which
    /// surfaces as [`Error::NotFound`].
    pub fn single(self) -> Self {
        self.header(header::ACCEPT, HeaderValue::from_static(SINGLE_OBJECT))
    }

    /// Ask for the written rows in the response body.
    pub fn returning(self) -> Self {
        self.header(
            HeaderName::from_static("prefer"),
            HeaderValue::from_static(RETURN_REPRESENTATION),
        )
    }

    /// Turn an insert into an upsert that merges on `on_conflict` columns.
    pub fn upsert(self, on_conflict: Option<&str>) -> Self {
        let builder = self.header(
            HeaderName::from_static("prefer"),
            HeaderValue::from_static(MERGE_DUPLICATES),
        );
        match on_conflict {
            Some(columns) => builder.query("on_conflict", columns),
            None => builder,
        }
    }

    /// Serialize `body` as the JSON payload.
    pub fn json<T: Serialize + ?Sized>(self, body: &T) -> Result<Self> {
        let bytes = serde_json::to_vec(body)?;
        Ok(self
            .header(
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/json"),
            )
            .body(bytes))
    }

    /// Set the request body.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Send the request once and get a response.
    ///
    /// Error statuses are returned as a [`Response`]; use
    /// [`Response::parse_result`] to turn them into errors.
    pub async fn send(self) -> Result<Response> {
        let client = self
            .http_client
            .ok_or_else(|| Error::HttpClient("No HTTP client configured".to_string()))?;

        let call = CallLog::begin(
            self.method.as_str(),
            self.url.path(),
            self.body.as_ref().map(Bytes::len),
        );

        let mut req = client
            .request(self.method.clone(), self.url.as_str())
            .timeout(self.timeout)
            .headers(self.headers);

        if let Some(body) = self.body {
            req = req.body(body);
        }

        let resp = match req.send().await {
            Ok(resp) => resp,
            Err(e) if e.is_timeout() => return Err(Error::Timeout(self.timeout)),
            Err(e) => return Err(Error::Connection(e.to_string())),
        };

        let status = resp.status();
        let headers = resp.headers().clone();
        let body = resp
            .bytes()
            .await
            .map_err(|e| Error::Connection(e.to_string()))?;

        call.finish(status.as_u16(), &body);

        Ok(Response::new(status, headers, body, call.elapsed()))
    }

    /// Get the method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Get the URL.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Get the headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Get the timeout.
    pub fn timeout_duration(&self) -> Duration {
        self.timeout
    }
}
