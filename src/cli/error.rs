//! CLI error types and conversions

use crate::calendar::CalendarError;
use crate::config::ConfigError;
use crate::crawler::{CrawlError, RateLimitError};
use crate::fetcher::FetchError;
use crate::identifier::IdentifierError;
use crate::output::OutputError;

/// CLI errors
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Identifier error
    #[error("identifier error: {0}")]
    IdentifierError(#[from] IdentifierError),

    /// Configuration error
    #[error("configuration error: {0}")]
    ConfigError(#[from] ConfigError),

    /// Date error
    #[error("date error: {0}")]
    CalendarError(#[from] CalendarError),

    /// Crawl error
    #[error("crawl error: {0}")]
    CrawlError(#[from] CrawlError),

    /// Fetcher error
    #[error("fetcher error: {0}")]
    FetchError(#[from] FetchError),

    /// Rate limiter error
    #[error("rate limit error: {0}")]
    RateLimitError(#[from] RateLimitError),

    /// Output error
    #[error("output error: {0}")]
    OutputError(#[from] OutputError),

    /// Invalid argument
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}
