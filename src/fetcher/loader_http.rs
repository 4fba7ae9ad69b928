//! HTTP client for the venue's symbol loader
//!
//! One `GET {base}/Loader.aspx?ParTree=15131S&i={identifier}` per call, carrying the
//! configured User-Agent. Transport failures and non-success statuses become
//! [`FetchError`]s that keep the request URL and, when a response arrived, its status
//! and body.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::Client;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::config::CrawlConfig;
use crate::crawler::rate_limit::RateLimiter;
use crate::fetcher::{loader_url, DocumentFetcher, FetchError, FetchResult, LOADER_PATH};
use crate::identifier::SymbolIdentifier;
use crate::metrics::{self, HttpRequestMetrics};

/// HTTP connect timeout (seconds) - time to establish TCP connection
const HTTP_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Loader client
pub struct LoaderHttpClient {
    client: Client,
    base_url: String,
    rate_limiter: Option<Arc<RateLimiter>>,
}

impl LoaderHttpClient {
    /// Create a client with an explicit User-Agent and request timeout
    ///
    /// # Errors
    /// Returns `InvalidRequest` if the User-Agent is not a valid header value or the
    /// underlying client cannot be built.
    pub fn new(
        base_url: impl Into<String>,
        user_agent: &str,
        timeout: Duration,
    ) -> FetchResult<Self> {
        let mut headers = HeaderMap::new();
        let agent = HeaderValue::from_str(user_agent)
            .map_err(|e| FetchError::InvalidRequest(format!("invalid user agent: {e}")))?;
        headers.insert(USER_AGENT, agent);

        let client = Client::builder()
            .default_headers(headers)
            .connect_timeout(Duration::from_secs(HTTP_CONNECT_TIMEOUT_SECS).min(timeout))
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::InvalidRequest(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            rate_limiter: None,
        })
    }

    /// Create a client from the crawl configuration
    pub fn from_config(config: &CrawlConfig) -> FetchResult<Self> {
        Self::new(config.base_url.clone(), &config.user_agent, config.timeout)
    }

    /// Consult `limiter` before every request
    pub fn with_rate_limiter(mut self, limiter: Arc<RateLimiter>) -> Self {
        self.rate_limiter = Some(limiter);
        self
    }

    async fn wait_for_permit(&self) -> FetchResult<()> {
        if let Some(limiter) = &self.rate_limiter {
            let start = Instant::now();
            limiter
                .acquire()
                .await
                .map_err(|e| FetchError::RateLimiter(e.to_string()))?;
            metrics::record_rate_limit_wait(start.elapsed(), limiter.available());
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentFetcher for LoaderHttpClient {
    async fn fetch(&self, identifier: &SymbolIdentifier) -> FetchResult<String> {
        let url = loader_url(&self.base_url, identifier);

        self.wait_for_permit().await?;

        debug!(identifier = %identifier, url = %url, "Requesting symbol page");
        let request_metrics = HttpRequestMetrics::start(LOADER_PATH);

        let response = match self.client.get(&url).send().await {
            Ok(resp) => resp,
            Err(e) if e.is_timeout() => {
                request_metrics.record_network_error("timeout");
                return Err(FetchError::Timeout { url });
            }
            Err(e) => {
                request_metrics.record_network_error("connection");
                return Err(FetchError::Connection {
                    url,
                    message: e.to_string(),
                });
            }
        };

        let status = response.status();
        request_metrics.record_complete(status.as_u16());

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(
                identifier = %identifier,
                status = status.as_u16(),
                "Symbol loader returned an error status"
            );
            return Err(FetchError::Status {
                url,
                status: status.as_u16(),
                body,
            });
        }

        match response.text().await {
            Ok(body) => Ok(body),
            Err(e) if e.is_timeout() => Err(FetchError::Timeout { url }),
            Err(e) => Err(FetchError::Body {
                url,
                message: e.to_string(),
            }),
        }
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }
}
