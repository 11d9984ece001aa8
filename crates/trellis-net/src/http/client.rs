//! The reqwest client shared by every page request.

use std::sync::Arc;
use std::time::Duration;

use reqwest::redirect::Policy;
use trellis_core::logging::targets;

use super::page::PageRequest;
use crate::error::Result;
use crate::fetch::{FetchResult, QueryParams};

/// Configuration for the HTTP client.
#[derive(Clone, Debug)]
pub struct HttpClientConfig {
    /// Request timeout.
    pub timeout: Duration,
    /// Connect timeout.
    pub connect_timeout: Duration,
    /// Maximum number of redirects to follow (0 disables redirects).
    pub max_redirects: usize,
    /// User agent sent with every page request.
    pub user_agent: String,
    /// Bearer token sent with every page request.
    pub bearer_token: Option<String>,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            max_redirects: 10,
            user_agent: format!("Trellis/{} (Rust)", env!("CARGO_PKG_VERSION")),
            bearer_token: None,
        }
    }
}

/// Builder for an [`HttpClient`].
///
/// ```ignore
/// let client = HttpClient::builder()
///     .timeout(Duration::from_secs(15))
///     .bearer_token(session.token())
///     .default_header("Accept-Language", "en")?
///     .build()?;
/// ```
pub struct HttpClientBuilder {
    config: HttpClientConfig,
    default_headers: http::HeaderMap,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClientBuilder {
    /// Create a new builder with default configuration.
    pub fn new() -> Self {
        Self {
            config: HttpClientConfig::default(),
            default_headers: http::HeaderMap::new(),
        }
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the connect timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Set the maximum number of redirects to follow.
    pub fn max_redirects(mut self, max: usize) -> Self {
        self.config.max_redirects = max;
        self
    }

    /// Set the user agent string.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Authenticate every page request with a bearer token.
    pub fn bearer_token(mut self, token: impl Into<String>) -> Self {
        self.config.bearer_token = Some(token.into());
        self
    }

    /// Add a header sent with every page request.
    pub fn default_header(mut self, name: &str, value: &str) -> Result<Self> {
        let name = http::HeaderName::from_bytes(name.as_bytes())?;
        let value = http::HeaderValue::from_str(value)?;
        self.default_headers.insert(name, value);
        Ok(self)
    }

    /// Build the HTTP client.
    pub fn build(self) -> Result<HttpClient> {
        let redirect = match self.config.max_redirects {
            0 => Policy::none(),
            max => Policy::limited(max),
        };

        let client = reqwest::Client::builder()
            .timeout(self.config.timeout)
            .connect_timeout(self.config.connect_timeout)
            .redirect(redirect)
            .user_agent(&self.config.user_agent)
            .default_headers(self.default_headers)
            .build()?;

        Ok(HttpClient {
            inner: Arc::new(HttpClientInner {
                client,
                config: self.config,
            }),
        })
    }
}

struct HttpClientInner {
    client: reqwest::Client,
    config: HttpClientConfig,
}

/// A cheaply cloneable HTTP client that fetches JSON pages.
///
/// Clones share the same connection pool and configuration.
#[derive(Clone)]
pub struct HttpClient {
    inner: Arc<HttpClientInner>,
}

impl HttpClient {
    /// Create a new HTTP client with default configuration.
    pub fn new() -> Result<Self> {
        HttpClientBuilder::new().build()
    }

    /// Create a builder for configuring a new HTTP client.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::new()
    }

    /// Get the client's configuration.
    pub fn config(&self) -> &HttpClientConfig {
        &self.inner.config
    }

    /// Fetch one page: GET `url` with `params` appended to its query string
    /// and decode the body as JSON.
    ///
    /// Every failure, including an unparsable URL, is reported inside the
    /// returned [`FetchResult`].
    pub async fn fetch_page(&self, url: &str, params: &QueryParams) -> FetchResult {
        match PageRequest::new(url, params) {
            Ok(request) => {
                request
                    .send(&self.inner.client, self.inner.config.bearer_token.as_deref())
                    .await
            }
            Err(err) => {
                tracing::warn!(target: targets::HTTP, url, error = %err, "invalid page URL");
                FetchResult::failure(err)
            }
        }
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("timeout", &self.inner.config.timeout)
            .field("max_redirects", &self.inner.config.max_redirects)
            .field("authenticated", &self.inner.config.bearer_token.is_some())
            .finish()
    }
}
