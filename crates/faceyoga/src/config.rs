//! Configuration for the faceyoga client

use faceyoga_core::retry::{ExponentialBackoff, RetryOn};
use http::HeaderMap;
use secrecy::SecretString;
use std::time::Duration;

use crate::{DEFAULT_MAX_RETRIES, DEFAULT_RETRY_DELAY, DEFAULT_TIMEOUT};

/// Configuration for the faceyoga client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Project URL, e.g. `https://<ref>.supabase.co`
    pub url: Option<String>,

    /// Public anon key of the project
    pub anon_key: Option<SecretString>,

    /// Origin of the web app, used to build OAuth and email redirect URLs
    pub site_url: Option<String>,

    /// Default timeout for requests
    pub timeout: Duration,

    /// Retries after the first attempt for retried operations
    pub max_retries: u32,

    /// Delay before the first retry; doubles on every further retry
    pub retry_delay: Duration,

    /// Which failures are retried
    pub retry_on: RetryOn,

    /// Custom headers to include with every request
    pub default_headers: HeaderMap,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: None,
            anon_key: None,
            site_url: None,
            timeout: DEFAULT_TIMEOUT,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay: DEFAULT_RETRY_DELAY,
            retry_on: RetryOn::Transient,
            default_headers: HeaderMap::new(),
        }
    }
}

impl ClientConfig {
    /// Create a configuration for a project URL and anon key.
    pub fn new(url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            anon_key: Some(SecretString::new(anon_key.into().into_boxed_str())),
            ..Default::default()
        }
    }

    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is read first if present;
    /// variables already set in the process win. This will look for:
    /// - `FACEYOGA_URL` or `SUPABASE_URL` for the project URL
    /// - `FACEYOGA_ANON_KEY` or `SUPABASE_ANON_KEY` for the anon key
    /// - `FACEYOGA_SITE_URL` for OAuth redirects
    /// - `FACEYOGA_TIMEOUT` for request timeout (in seconds)
    /// - `FACEYOGA_MAX_RETRIES` for the retry budget
    /// - `FACEYOGA_RETRY_DELAY_MS` for the initial retry delay
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingConfig`](crate::Error::MissingConfig) when the
    /// project URL or anon key is not set.
    #[cfg(feature = "env")]
    pub fn from_env() -> Result<Self, crate::error::Error> {
        use crate::error::Error;
        use std::env;

        let _ = dotenvy::dotenv();

        let var = |primary: &str, fallback: &str| {
            env::var(primary)
                .or_else(|_| env::var(fallback))
                .ok()
                .filter(|value| !value.trim().is_empty())
        };

        let url = var("FACEYOGA_URL", "SUPABASE_URL").ok_or_else(|| {
            Error::MissingConfig("FACEYOGA_URL or SUPABASE_URL must be set".to_string())
        })?;
        let anon_key = var("FACEYOGA_ANON_KEY", "SUPABASE_ANON_KEY").ok_or_else(|| {
            Error::MissingConfig("FACEYOGA_ANON_KEY or SUPABASE_ANON_KEY must be set".to_string())
        })?;

        let mut config = Self::new(url, anon_key);

        if let Ok(site_url) = env::var("FACEYOGA_SITE_URL") {
            config.site_url = Some(site_url);
        }

        if let Ok(timeout_str) = env::var("FACEYOGA_TIMEOUT")
            && let Ok(timeout_secs) = timeout_str.parse::<u64>()
        {
            config.timeout = Duration::from_secs(timeout_secs);
        }

        if let Ok(max_retries_str) = env::var("FACEYOGA_MAX_RETRIES")
            && let Ok(max_retries) = max_retries_str.parse::<u32>()
        {
            config.max_retries = max_retries;
        }

        if let Ok(delay_str) = env::var("FACEYOGA_RETRY_DELAY_MS")
            && let Ok(delay_ms) = delay_str.parse::<u64>()
        {
            config.retry_delay = Duration::from_millis(delay_ms);
        }

        Ok(config)
    }

    /// The backoff policy described by this configuration.
    pub fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoff::builder()
            .max_retries(self.max_retries)
            .initial_delay(self.retry_delay)
            .multiplier(2.0)
            .retry_on(self.retry_on)
            .build()
    }

    /// Merge this configuration with another, with the other taking precedence.
    pub fn merge(mut self, other: ClientConfig) -> Self {
        if other.url.is_some() {
            self.url = other.url;
        }
        if other.anon_key.is_some() {
            self.anon_key = other.anon_key;
        }
        if other.site_url.is_some() {
            self.site_url = other.site_url;
        }
        if other.timeout != DEFAULT_TIMEOUT {
            self.timeout = other.timeout;
        }
        if other.max_retries != DEFAULT_MAX_RETRIES {
            self.max_retries = other.max_retries;
        }
        if other.retry_delay != DEFAULT_RETRY_DELAY {
            self.retry_delay = other.retry_delay;
        }
        if other.retry_on != RetryOn::Transient {
            self.retry_on = other.retry_on;
        }
        for (key, value) in other.default_headers.iter() {
            self.default_headers.insert(key.clone(), value.clone());
        }

        self
    }
}

/// Builder for creating ClientConfig with a fluent API.
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

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

    /// Set the request timeout.
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

    /// Add a default header.
    ///
    /// # Errors
    ///
    /// Returns an error if the header name or value is invalid.
    pub fn default_header(
        mut self,
        key: impl AsRef<str>,
        value: impl AsRef<str>,
    ) -> crate::Result<Self> {
        let key = key.as_ref();
        let name: http::HeaderName = key
            .parse()
            .map_err(|_| crate::Error::HttpClient(format!("Invalid header name '{key}'")))?;
        let value: http::HeaderValue = value
            .as_ref()
            .parse()
            .map_err(|_| crate::Error::HttpClient(format!("Invalid header value for '{key}'")))?;

        self.config.default_headers.insert(name, value);
        Ok(self)
    }

    /// Build the configuration.
    pub fn build(self) -> ClientConfig {
        self.config
    }
}
