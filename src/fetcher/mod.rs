//! Symbol page fetchers

use crate::identifier::SymbolIdentifier;
use async_trait::async_trait;

pub mod loader_http;

/// Loader endpoint path, relative to the venue base URL
pub const LOADER_PATH: &str = "/Loader.aspx";

/// Fixed `ParTree` value selecting the energy-symbol page template
pub const PAR_TREE: &str = "15131S";

/// Fetch errors
///
/// Every variant names the request URL so a failed identifier can be reported with
/// the exact request that was made.
#[derive(Debug, Clone, thiserror::Error)]
pub enum FetchError {
    /// No response within the configured timeout
    #[error("request to {url} timed out")]
    Timeout {
        /// Request URL
        url: String,
    },

    /// DNS, TCP or TLS failure before a response arrived
    #[error("connection error for {url}: {message}")]
    Connection {
        /// Request URL
        url: String,
        /// Transport error text
        message: String,
    },

    /// The server answered with a non-success status
    #[error("HTTP {status} from {url}")]
    Status {
        /// Request URL
        url: String,
        /// Status code
        status: u16,
        /// Response body, possibly empty
        body: String,
    },

    /// The response body could not be read
    #[error("failed to read response body from {url}: {message}")]
    Body {
        /// Request URL
        url: String,
        /// Read error text
        message: String,
    },

    /// Rate limiter refused or was closed
    #[error("rate limiter error: {0}")]
    RateLimiter(String),

    /// The request could not be built
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl FetchError {
    /// Request URL, when known
    pub fn url(&self) -> Option<&str> {
        match self {
            FetchError::Timeout { url }
            | FetchError::Connection { url, .. }
            | FetchError::Status { url, .. }
            | FetchError::Body { url, .. } => Some(url),
            FetchError::RateLimiter(_) | FetchError::InvalidRequest(_) => None,
        }
    }

    /// Response status, when a response arrived
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Response body, when a response arrived
    pub fn response_body(&self) -> Option<&str> {
        match self {
            FetchError::Status { body, .. } => Some(body),
            _ => None,
        }
    }

    /// Whether repeating the same request may succeed
    ///
    /// Timeouts, connection failures, 429 and 5xx responses are transient; other
    /// client errors are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Timeout { .. }
            | FetchError::Connection { .. }
            | FetchError::Body { .. } => true,
            FetchError::Status { status, .. } => *status == 429 || *status >= 500,
            FetchError::RateLimiter(_) | FetchError::InvalidRequest(_) => false,
        }
    }
}

/// Result type for fetch operations
pub type FetchResult<T> = Result<T, FetchError>;

/// Retrieves the page of one symbol
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    /// Fetch the raw page body for `identifier`
    ///
    /// Implementations make exactly one request; retrying is the caller's decision.
    async fn fetch(&self, identifier: &SymbolIdentifier) -> FetchResult<String>;

    /// Base URL requests are sent to
    fn base_url(&self) -> &str;
}

/// Full loader URL for an identifier
pub fn loader_url(base_url: &str, identifier: &SymbolIdentifier) -> String {
    format!(
        "{}{}?ParTree={}&i={}",
        base_url.trim_end_matches('/'),
        LOADER_PATH,
        PAR_TREE,
        identifier
    )
}
