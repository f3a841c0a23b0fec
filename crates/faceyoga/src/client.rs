//! Main client implementation for the face yoga backend

use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use faceyoga_core::retry::{BackoffStrategy, ExponentialBackoff, RetryOn};
use secrecy::{ExposeSecret, SecretString};

use crate::{
    config::ClientConfig,
    error::{Error, Result},
    http::{HttpProvider, RequestBuilder, SupabaseHttpProvider},
    resources::{Auth, Courses, Exercises, Profiles, Progress, Storage},
    types::{Session, User},
};

/// Main client for the face yoga backend.
///
/// Cloning is cheap; clones share the connection pool and the signed-in
/// session.
///
/// # Example
///
/// ```rust,no_run
/// use faceyoga::Client;
///
/// # async fn example() -> faceyoga::Result<()> {
/// let client = Client::new("https://project.supabase.co", "anon-key")?;
/// let courses = client.courses().list().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    /// HTTP provider for making requests
    provider: Arc<dyn HttpProvider>,
    /// Retry policy for reads, updates, upserts and deletes
    backoff: ExponentialBackoff,
    /// Web app origin for redirect URLs
    site_url: Option<String>,
    /// Signed-in session, if any
    session: RwLock<Option<Session>>,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("provider", &self.inner.provider)
            .field("backoff", &self.inner.backoff)
            .field("site_url", &self.inner.site_url)
            .field("signed_in", &self.session().is_some())
            .finish()
    }
}

impl Client {
    /// Create a client for a project URL and anon key.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or the HTTP client cannot be built.
    pub fn new(url: impl Into<String>, anon_key: impl Into<String>) -> Result<Self> {
        Self::builder().url(url).anon_key(anon_key).build()
    }

    /// Create a client from `FACEYOGA_*` / `SUPABASE_*` environment variables.
    #[cfg(feature = "env")]
    pub fn from_env() -> Result<Self> {
        Self::from_config(ClientConfig::from_env()?)
    }

    /// Create a new client builder for advanced configuration.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// Create a client with a custom HTTP provider and the default retry policy.
    pub fn from_provider(provider: Arc<dyn HttpProvider>) -> Self {
        Self::from_parts(provider, ExponentialBackoff::default(), None)
    }

    /// Create a client from a configuration object.
    pub fn from_config(config: ClientConfig) -> Result<Self> {
        let backoff = config.backoff();
        let mut provider_builder = SupabaseHttpProvider::builder()
            .timeout(config.timeout)
            .headers(config.default_headers);

        if let Some(url) = config.url {
            provider_builder = provider_builder.url(url);
        }
        if let Some(anon_key) = config.anon_key {
            provider_builder = provider_builder.anon_key(anon_key.expose_secret());
        }

        let provider = Arc::new(provider_builder.build()?);
        Ok(Self::from_parts(provider, backoff, config.site_url))
    }

    fn from_parts(
        provider: Arc<dyn HttpProvider>,
        backoff: ExponentialBackoff,
        site_url: Option<String>,
    ) -> Self {
        Self {
            inner: Arc::new(ClientInner {
                provider,
                backoff,
                site_url,
                session: RwLock::new(None),
            }),
        }
    }

    // Built per call: each resource owns a clone of the client.

    /// Courses, their sections and section membership.
    pub fn courses(&self) -> Courses {
        Courses::new(self.clone())
    }

    /// The exercise catalogue.
    pub fn exercises(&self) -> Exercises {
        Exercises::new(self.clone())
    }

    /// User profiles.
    pub fn profiles(&self) -> Profiles {
        Profiles::new(self.clone())
    }

    /// Progress photos.
    pub fn progress(&self) -> Progress {
        Progress::new(self.clone())
    }

    /// File storage buckets.
    pub fn storage(&self) -> Storage {
        Storage::new(self.clone())
    }

    /// Sign-in, sign-up and session management.
    pub fn auth(&self) -> Auth {
        Auth::new(self.clone())
    }

    /// The signed-in session, if any.
    pub fn session(&self) -> Option<Session> {
        self.inner
            .session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The signed-in user, if any.
    pub fn current_user(&self) -> Option<User> {
        self.session().map(|session| session.user)
    }

    /// Install a session, e.g. one restored from disk. `None` signs out locally.
    pub fn set_session(&self, session: Option<Session>) {
        *self
            .inner
            .session
            .write()
            .unwrap_or_else(PoisonError::into_inner) = session;
    }

    pub(crate) fn access_token(&self) -> Option<SecretString> {
        self.inner
            .session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|session| SecretString::new(session.access_token.clone().into_boxed_str()))
    }

    /// Create a request builder, authenticated as the signed-in user if any.
    pub(crate) fn request(&self, method: http::Method, path: &str) -> Result<RequestBuilder> {
        let builder = self.inner.provider.create_request(method, path)?;
        match self.access_token() {
            Some(token) => builder.bearer(token.expose_secret()),
            None => Ok(builder),
        }
    }

    /// Run `operation` under the client's retry policy.
    pub(crate) async fn retrying<F, Fut, T>(&self, operation: F) -> Result<T>
    where
        F: Fn() -> Fut + Send + Sync,
        Fut: Future<Output = Result<T>> + Send,
        T: Send,
    {
        self.inner.backoff.execute(operation).await
    }

    /// The retry policy applied to retried operations.
    pub fn backoff(&self) -> &ExponentialBackoff {
        &self.inner.backoff
    }

    /// Get the base URL of the project.
    pub fn base_url(&self) -> &str {
        self.inner.provider.base_url()
    }

    /// Web app origin used for redirects, if configured.
    pub fn site_url(&self) -> Option<&str> {
        self.inner.site_url.as_deref()
    }

    /// Get the provider name (for debugging)
    pub fn provider_name(&self) -> &'static str {
        self.inner.provider.provider_name()
    }
}

/// Builder for creating a configured Client.
#[derive(Default)]
pub struct ClientBuilder {
    config: ClientConfig,
}

impl ClientBuilder {
    /// Set the project URL.
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.config.url = Some(url.into());
        self
    }

    /// Set the anon key.
    pub fn anon_key(mut self, anon_key: impl Into<String>) -> Self {
        self.config.anon_key = Some(SecretString::new(anon_key.into().into_boxed_str()));
        self
    }

    /// Set the web app origin used for redirects.
    pub fn site_url(mut self, site_url: impl Into<String>) -> Self {
        self.config.site_url = Some(site_url.into());
        self
    }

    /// Set the default timeout for requests.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the maximum number of retries.
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.config.max_retries = max_retries;
        self
    }

    /// Set the delay before the first retry.
    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.config.retry_delay = delay;
        self
    }

    /// Choose which failures are retried.
    pub fn retry_on(mut self, retry_on: RetryOn) -> Self {
        self.config.retry_on = retry_on;
        self
    }

    /// Add a custom default header.
    ///
    /// # Errors
    ///
    /// Returns an error if the header name or value is invalid.
    pub fn default_header(mut self, key: impl AsRef<str>, value: impl AsRef<str>) -> Result<Self> {
        let key = key.as_ref();
        let name: http::HeaderName = key
            .parse()
            .map_err(|_| Error::HttpClient(format!("Invalid header name '{key}'")))?;
        let value: http::HeaderValue = value
            .as_ref()
            .parse()
            .map_err(|_| Error::HttpClient(format!("Invalid header value for '{key}'")))?;

        self.config.default_headers.insert(name, value);
        Ok(self)
    }

    /// Build the client with the configured options.
    pub fn build(self) -> Result<Client> {
        Client::from_config(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn client() -> Client {
        Client::new("https://project.supabase.co", "anon-key").unwrap()
    }

    fn session() -> Session {
        Session {
            access_token: "user-token".to_string(),
            refresh_token: "refresh".to_string(),
            token_type: "bearer".to_string(),
            expires_in: 3600,
            expires_at: None,
            user: User {
                id: "u-1".to_string(),
                email: Some("maya@example.com".to_string()),
                created_at: None,
                user_metadata: serde_json::Value::Null,
            },
        }
    }

    #[test]
    fn test_client_builder() {
        let client = Client::builder()
            .url("https://project.supabase.co")
            .anon_key("anon-key")
            .site_url("https://faceyoga.app")
            .timeout(Duration::from_secs(5))
            .max_retries(1)
            .build()
            .unwrap();

        assert_eq!(client.base_url(), "https://project.supabase.co/");
        assert_eq!(client.site_url(), Some("https://faceyoga.app"));
        assert_eq!(client.backoff().max_retries(), 1);
        assert_eq!(client.provider_name(), "supabase");
    }

    #[test]
    fn test_client_requires_anon_key() {
        let result = Client::builder().url("https://project.supabase.co").build();
        assert_matches!(result, Err(Error::MissingConfig(_)));
    }

    #[test]
    fn test_client_is_dropped_after_resource_use() {
        let client = client();
        let inner = Arc::downgrade(&client.inner);

        let courses = client.courses();
        let _ = client.exercises();
        let _ = client.profiles();
        let _ = client.progress();
        let _ = client.storage();
        let _ = client.auth();
        drop(client);
        assert!(inner.upgrade().is_some());

        drop(courses);
        assert!(inner.upgrade().is_none());
    }

    #[test]
    fn test_requests_use_session_token_when_signed_in() {
        let client = client();
        let anon = client.request(http::Method::GET, "/rest/v1/courses").unwrap();
        assert_eq!(anon.headers()["authorization"], "Bearer anon-key");

        client.set_session(Some(session()));
        let signed_in = client.request(http::Method::GET, "/rest/v1/courses").unwrap();
        assert_eq!(signed_in.headers()["authorization"], "Bearer user-token");
        assert_eq!(signed_in.headers()["apikey"], "anon-key");
    }

    #[test]
    fn test_clones_share_session() {
        let first = client();
        let second = first.clone();

        first.set_session(Some(session()));
        assert_eq!(second.current_user().unwrap().id, "u-1");

        second.set_session(None);
        assert!(first.session().is_none());
    }

    #[test]
    fn test_debug_does_not_leak_tokens() {
        let client = client();
        client.set_session(Some(session()));
        let rendered = format!("{client:?}");
        assert!(!rendered.contains("user-token"));
        assert!(rendered.contains("signed_in: true"));
    }
}
