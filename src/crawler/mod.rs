//! Crawl orchestration
//!
//! The crawler turns a [`CrawlConfig`] into a [`CrawlResult`]:
//!
//! 1. **Validation**: the configuration is checked before any request
//! 2. **Enumeration**: load types in order, each over a fresh date range
//! 3. **Fetch and extract**: one page per identifier via a [`DocumentFetcher`]
//! 4. **Isolation**: failed fetches are reported through the [`events::EventSink`]
//!    and skipped
//!
//! # Quick Start
//!
//! ```no_run
//! use energy_symbol_crawler::config::CrawlConfig;
//! use energy_symbol_crawler::crawler::{crawl, events::TracingSink};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = CrawlConfig::default().with_dates("1400/01/01", "1400/01/31")?;
//! let result = crawl(&config, &TracingSink).await?;
//! println!("{} records, {} failures", result.entries.len(), result.failures.len());
//! # Ok(())
//! # }
//! ```
//!
//! # Components
//!
//! - [`executor`] - The [`Crawler`] with retry, concurrency and shutdown policies
//! - [`events`] - Log events as data and their sinks
//! - [`result`] - Crawl output types
//! - [`progress`] - Progress and ETA tracking
//! - [`rate_limit`] - Client-side request rate limiting
//! - [`config`] - Policy constants and backoff calculation

pub mod config;
pub mod events;
pub mod executor;
pub mod progress;
pub mod rate_limit;
pub mod result;

pub use executor::Crawler;
pub use rate_limit::{RateLimitError, RateLimiter};
pub use result::{CrawlFailure, CrawlResult, CrawledSymbol};

use crate::config::{ConfigError, CrawlConfig};
use crate::fetcher::loader_http::LoaderHttpClient;
use crate::fetcher::{DocumentFetcher, FetchError};
use events::EventSink;
use std::sync::Arc;

/// Crawl errors
///
/// Per-identifier fetch failures are not errors of the crawl; they are collected in
/// [`CrawlResult::failures`].
#[derive(Debug, thiserror::Error)]
pub enum CrawlError {
    /// Configuration rejected before the first request
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// The HTTP client could not be built
    #[error("fetcher setup failed: {0}")]
    Fetcher(#[from] FetchError),

    /// Rate limiter setup failed
    #[error("rate limiter error: {0}")]
    RateLimit(#[from] RateLimitError),
}

/// Crawl `config` sequentially against the venue with default policies
pub async fn crawl(config: &CrawlConfig, sink: &dyn EventSink) -> Result<CrawlResult, CrawlError> {
    config.validate()?;
    let fetcher: Arc<dyn DocumentFetcher> = Arc::new(LoaderHttpClient::from_config(config)?);
    Crawler::new(fetcher).run(config, sink).await
}
