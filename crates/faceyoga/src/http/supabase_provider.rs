//! HTTP provider for a hosted Supabase project
//!
//! Every request carries the project's anon key twice: as the `apikey`
//! header the gateway routes on, and as the default bearer token. Signed-in
//! calls replace the bearer with the user's access token.

use super::{HttpProvider, Method, RequestBuilder, provider::serialize_body};
use crate::error::{Error, Result};
use async_trait::async_trait;
use http::{HeaderMap, HeaderName, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use std::{sync::Arc, time::Duration};
use url::Url;

/// HTTP provider for the table, auth and storage services of one project.
///
/// # Example
///
/// ```rust,no_run
/// use faceyoga::http::SupabaseHttpProvider;
///
/// let provider = SupabaseHttpProvider::builder()
///     .url("https://project.supabase.co")
///     .anon_key("eyJhbGciOi...")
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct SupabaseHttpProvider {
    pub(crate) inner: Arc<ProviderInner>,
}

#[derive(Debug)]
pub(crate) struct ProviderInner {
    pub(crate) http_client: reqwest::Client,
    pub(crate) base_url: Url,
    pub(crate) anon_key: SecretString,
    pub(crate) timeout: Duration,
    pub(crate) default_headers: HeaderMap,
}

impl SupabaseHttpProvider {
    /// Create a new builder for configuring the provider.
    pub fn builder() -> SupabaseHttpProviderBuilder {
        SupabaseHttpProviderBuilder::default()
    }

    fn build_request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let url = self.inner.base_url.join(path).map_err(|e| {
            Error::InvalidUrl(format!(
                "Failed to construct URL from path '{}': {}",
                path, e
            ))
        })?;

        let anon_key = self.inner.anon_key.expose_secret();
        let mut builder = RequestBuilder::new(method, url)
            .with_client(self.inner.http_client.clone())
            .timeout(self.inner.timeout)
            .try_header("apikey", anon_key)?
            .bearer(anon_key)?;

        for (key, value) in &self.inner.default_headers {
            builder = builder.header(key.clone(), value.clone());
        }

        Ok(builder)
    }
}

#[async_trait]
impl HttpProvider for SupabaseHttpProvider {
    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&(dyn erased_serde::Serialize + Send + Sync)>,
    ) -> Result<super::Response> {
        let mut builder = self.build_request(method, path)?;

        if let Some(body) = body {
            let body_bytes = serialize_body(body)?;
            builder = builder
                .header(
                    http::header::CONTENT_TYPE,
                    HeaderValue::from_static("application/json"),
                )
                .body(body_bytes);
        }

        builder.send().await
    }

    fn create_request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        self.build_request(method, path)
    }

    fn provider_name(&self) -> &'static str {
        "supabase"
    }

    fn base_url(&self) -> &str {
        self.inner.base_url.as_str()
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

/// Builder for creating a `SupabaseHttpProvider`.
#[derive(Default)]
pub struct SupabaseHttpProviderBuilder {
    url: Option<String>,
    anon_key: Option<SecretString>,
    timeout: Option<Duration>,
    default_headers: HeaderMap,
}

impl SupabaseHttpProviderBuilder {
    /// Set the project URL, e.g. `https://<ref>.supabase.co`.
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Set the project's public anon key.
    pub fn anon_key(mut self, anon_key: impl Into<String>) -> Self {
        self.anon_key = Some(SecretString::new(anon_key.into().into_boxed_str()));
        self
    }

    /// Set the request timeout.
    ///
    /// Defaults to 30 seconds.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Add a custom header to include with every request.
    ///
    /// # Errors
    ///
    /// Returns an error if the header name or value is invalid.
    pub fn header(mut self, key: impl AsRef<str>, value: impl AsRef<str>) -> Result<Self> {
        let key = key.as_ref();
        let name = key
            .parse::<HeaderName>()
            .map_err(|e| Error::HttpClient(format!("Invalid header name '{}': {}", key, e)))?;
        let value = value
            .as_ref()
            .parse::<HeaderValue>()
            .map_err(|e| Error::HttpClient(format!("Invalid header value for '{}': {}", key, e)))?;

        self.default_headers.insert(name, value);
        Ok(self)
    }

    /// Add every header of `headers` to each request.
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.default_headers.extend(headers);
        self
    }

    /// Build the provider with the configured settings.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The URL or anon key is missing
    /// - The URL is invalid or not http(s)
    /// - HTTP client creation fails
    pub fn build(self) -> Result<SupabaseHttpProvider> {
        let Self {
            url,
            anon_key,
            timeout,
            default_headers,
        } = self;

        let url = url.ok_or_else(|| Error::MissingConfig("project URL".to_string()))?;
        let anon_key = anon_key.ok_or_else(|| Error::MissingConfig("anon key".to_string()))?;

        if url.trim().is_empty() {
            return Err(Error::InvalidUrl("Base URL cannot be empty".to_string()));
        }

        let base_url: Url = url.trim().parse()?;
        match base_url.scheme() {
            "http" | "https" => {}
            scheme => {
                return Err(Error::InvalidUrl(format!(
                    "Invalid URL scheme '{}'. Only 'http' and 'https' are supported.",
                    scheme
                )));
            }
        }

        let timeout = timeout.unwrap_or(crate::DEFAULT_TIMEOUT);
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(format!("faceyoga-rust/{}", crate::VERSION))
            .build()
            .map_err(|e| Error::HttpClient(e.to_string()))?;

        Ok(SupabaseHttpProvider {
            inner: Arc::new(ProviderInner {
                http_client,
                base_url,
                anon_key,
                timeout,
                default_headers,
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn provider() -> SupabaseHttpProvider {
        SupabaseHttpProvider::builder()
            .url("https://project.supabase.co")
            .anon_key("anon-key")
            .build()
            .unwrap()
    }

    #[test]
    fn test_build_request_carries_project_key() {
        let request = provider()
            .build_request(Method::GET, "/rest/v1/courses")
            .unwrap();

        assert_eq!(request.url().as_str(), "https://project.supabase.co/rest/v1/courses");
        assert_eq!(request.headers()["apikey"], "anon-key");
        assert_eq!(request.headers()["authorization"], "Bearer anon-key");
    }

    #[test]
    fn test_missing_key_is_missing_config() {
        let result = SupabaseHttpProvider::builder()
            .url("https://project.supabase.co")
            .build();
        assert_matches!(result, Err(Error::MissingConfig(_)));
    }

    #[test]
    fn test_missing_url_is_missing_config() {
        let result = SupabaseHttpProvider::builder().anon_key("k").build();
        assert_matches!(result, Err(Error::MissingConfig(_)));
    }

    #[test]
    fn test_rejects_non_http_scheme() {
        let result = SupabaseHttpProvider::builder()
            .url("ftp://project.supabase.co")
            .anon_key("k")
            .build();

        match result {
            Err(Error::InvalidUrl(msg)) => assert!(msg.contains("ftp")),
            other => panic!("Expected InvalidUrl, got {other:?}"),
        }
    }

    #[test]
    fn test_rejects_blank_url() {
        let result = SupabaseHttpProvider::builder()
            .url("   ")
            .anon_key("k")
            .build();
        assert_matches!(result, Err(Error::InvalidUrl(msg)) if msg.contains("empty"));
    }

    #[test]
    fn test_default_headers_are_applied() {
        let provider = SupabaseHttpProvider::builder()
            .url("https://project.supabase.co")
            .anon_key("k")
            .header("x-client-info", "faceyoga-rust")
            .unwrap()
            .build()
            .unwrap();

        let request = provider.create_request(Method::GET, "/auth/v1/user").unwrap();
        assert_eq!(request.headers()["x-client-info"], "faceyoga-rust");
        assert_eq!(provider.provider_name(), "supabase");
    }

    #[tokio::test]
    async fn test_request_sends_json_body() {
        use wiremock::matchers::{body_json, header, method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/exercises"))
            .and(header("apikey", "k"))
            .and(header("content-type", "application/json"))
            .and(body_json(serde_json::json!({ "title": "Neck Toner" })))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let provider: Arc<dyn HttpProvider> = Arc::new(
            SupabaseHttpProvider::builder()
                .url(server.uri())
                .anon_key("k")
                .build()
                .unwrap(),
        );
        assert!(provider.as_any().downcast_ref::<SupabaseHttpProvider>().is_some());

        let body = serde_json::json!({ "title": "Neck Toner" });
        let response = provider
            .request(Method::POST, "/rest/v1/exercises", Some(&body))
            .await
            .unwrap();
        assert_eq!(response.status(), http::StatusCode::CREATED);
    }
}
