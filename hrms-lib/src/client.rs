//! Main HrmsClient

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use url::Url;

use crate::error::{ApiError, Error};
use crate::retry::RetryConfig;

/// Base URL used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api/";

/// The client for the HRMS REST API.
///
/// This client is cheap to clone (uses `Arc` internally) and can be shared
/// across tasks.
///
/// # Example
///
/// ```ignore
/// use hrms_lib::HrmsClient;
///
/// let client = HrmsClient::builder()
///     .base_url("http://localhost:8000/api/")
///     .timeout(Duration::from_secs(10))
///     .build()?;
///
/// let employees = client.list_employees(None).await?;
/// ```
#[derive(Clone)]
pub struct HrmsClient {
    pub(crate) inner: Arc<HrmsClientInner>,
}

pub(crate) struct HrmsClientInner {
    pub(crate) base_url: Url,
    pub(crate) http_client: Client,
    pub(crate) timeout: Option<Duration>,
    pub(crate) retry: RetryConfig,
}

impl HrmsClient {
    /// Creates a new builder for constructing a client.
    pub fn builder() -> HrmsClientBuilder<Missing> {
        HrmsClientBuilder::new()
    }

    /// The API root every endpoint path is resolved against.
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    pub fn retry_config(&self) -> &RetryConfig {
        &self.inner.retry
    }
}

impl std::fmt::Debug for HrmsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HrmsClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("timeout", &self.inner.timeout)
            .finish()
    }
}

// =============================================================================
// Typestate Builder
// =============================================================================

/// Marker type for missing required builder fields.
pub struct Missing;

/// Marker type for set builder fields.
pub struct Set<T>(T);

/// Builder for constructing an [`HrmsClient`].
///
/// `base_url` is required and enforced at compile time.
pub struct HrmsClientBuilder<BaseUrl> {
    base_url: BaseUrl,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    retry: RetryConfig,
    http_client: Option<Client>,
}

impl HrmsClientBuilder<Missing> {
    pub fn new() -> Self {
        Self {
            base_url: Missing,
            timeout: None,
            connect_timeout: None,
            retry: RetryConfig::default(),
            http_client: None,
        }
    }

    /// Sets the API root, e.g. `http://localhost:8000/api/`.
    ///
    /// A missing trailing slash is added so endpoint paths resolve below it.
    pub fn base_url(self, url: impl Into<String>) -> HrmsClientBuilder<Set<String>> {
        HrmsClientBuilder {
            base_url: Set(url.into()),
            timeout: self.timeout,
            connect_timeout: self.connect_timeout,
            retry: self.retry,
            http_client: self.http_client,
        }
    }
}

impl Default for HrmsClientBuilder<Missing> {
    fn default() -> Self {
        Self::new()
    }
}

impl<U> HrmsClientBuilder<U> {
    /// Sets the per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the connection timeout, applied when building the HTTP client.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    pub fn retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Sets a custom HTTP client. If not set, a default one is created.
    pub fn http_client(mut self, client: Client) -> Self {
        self.http_client = Some(client);
        self
    }
}

impl HrmsClientBuilder<Set<String>> {
    /// Builds the [`HrmsClient`].
    ///
    /// Fails when the base URL does not parse or the HTTP client cannot be
    /// created.
    pub fn build(self) -> Result<HrmsClient, Error> {
        let mut raw = self.base_url.0.trim().to_string();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        let base_url = Url::parse(&raw)?;

        let http_client = match self.http_client {
            Some(client) => client,
            None => {
                let mut builder = Client::builder();
                if let Some(timeout) = self.connect_timeout {
                    builder = builder.connect_timeout(timeout);
                }
                builder.build().map_err(ApiError::from)?
            }
        };

        Ok(HrmsClient {
            inner: Arc::new(HrmsClientInner {
                base_url,
                http_client,
                timeout: self.timeout,
                retry: self.retry,
            }),
        })
    }
}
