//! # Energy Symbol Crawler Library
//!
//! Collects daily electricity-contract pages from the Tehran Stock Exchange symbol
//! loader and turns each page into a structured record: contract header metadata plus
//! the table of trades for that contract.
//!
//! ## Features
//!
//! - **Solar Hijri dates**: arithmetic Shamsi calendar with inclusive, restartable ranges
//! - **Deterministic identifiers**: one 17-character symbol per (load type, delivery date)
//! - **Failure isolation**: a failed page is reported and skipped, the crawl carries on
//! - **Two-stage extraction**: anchor search followed by bounded value capture
//! - **Optional policies**: retries with backoff, bounded concurrency, client-side rate limiting
//!
//! ## Quick Start
//!
//! ```no_run
//! use energy_symbol_crawler::config::CrawlConfig;
//! use energy_symbol_crawler::crawler::{events::TracingSink, Crawler};
//! use energy_symbol_crawler::fetcher::loader_http::LoaderHttpClient;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = CrawlConfig::default().with_dates("1400/01/01", "1400/01/07")?;
//! let fetcher = Arc::new(LoaderHttpClient::from_config(&config)?);
//!
//! let result = Crawler::new(fetcher).run(&config, &TracingSink).await?;
//! for entry in &result.entries {
//!     println!("{} {} trades", entry.identifier, entry.record.trades.len());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`calendar`] - Shamsi dates and date ranges
//! - [`config`] - Crawl configuration and validation
//! - [`identifier`] - Symbol identifier generation
//! - [`fetcher`] - Page retrieval from the symbol loader
//! - [`extractor`] - Header and trade-row extraction
//! - [`crawler`] - Load type × date orchestration
//! - [`output`] - JSON and CSV writers

#![warn(missing_docs)]
#![warn(clippy::all)]

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Solar Hijri calendar dates
pub mod calendar;

/// CLI command implementations
pub mod cli;

/// Crawl configuration
pub mod config;

/// Crawl orchestration
pub mod crawler;

/// Symbol page extraction
pub mod extractor;

/// Symbol page fetchers
pub mod fetcher;

/// Symbol identifier generation
pub mod identifier;

/// Prometheus metrics
pub mod metrics;

/// Result writers
pub mod output;

/// Graceful shutdown coordination shared across modules
pub mod shutdown;

// Re-export commonly used types
pub use calendar::{CalendarDate, DateRange};
pub use config::{CrawlConfig, LoadType};
pub use identifier::SymbolIdentifier;

/// Header metadata and trades of one symbol page
///
/// Every field is the raw text captured from the page; fields whose marker was not
/// found are empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolRecord {
    /// Contract start date
    pub start_date: String,
    /// Contract end date
    pub end_date: String,
    /// Expiry date
    pub expire_date: String,
    /// Stuff code
    pub stuff_code: String,
    /// Load type as displayed by the venue
    pub load_type: String,
    /// Contract title
    pub title: String,
    /// Delivery hours
    pub hours: String,
    /// Energy symbol
    pub energy_symbol: String,
    /// Validity start (Gregorian)
    pub start_validity: String,
    /// Validity end (Gregorian)
    pub end_validity: String,
    /// Validity start (Shamsi)
    pub start_validity_shamsi: String,
    /// Validity end (Shamsi)
    pub end_validity_shamsi: String,
    /// Instrument code
    pub ins_code: String,
    /// Open-symbol flag
    pub open_symbol: String,
    /// Trades in page order
    pub trades: Vec<TradeRow>,
}

/// One row of the trade-history table, as raw text
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeRow {
    /// Trade date
    pub date: String,
    /// Closing price
    pub end: String,
    /// Lowest price
    pub lowest: String,
    /// Highest price
    pub highest: String,
    /// Number of trades
    pub amount: String,
    /// Traded volume
    pub volume: String,
    /// Traded value
    pub cost: String,
}

/// Numeric columns of a [`TradeRow`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeValues {
    /// Closing price
    pub end: Decimal,
    /// Lowest price
    pub lowest: Decimal,
    /// Highest price
    pub highest: Decimal,
    /// Number of trades
    pub amount: Decimal,
    /// Traded volume
    pub volume: Decimal,
    /// Traded value
    pub cost: Decimal,
}

/// A trade column that is not a decimal number
#[derive(Debug, thiserror::Error)]
#[error("invalid {column} value '{raw}': {source}")]
pub struct TradeValueError {
    /// Column name
    pub column: &'static str,
    /// Text as captured from the page
    pub raw: String,
    /// Decimal parse failure
    #[source]
    pub source: rust_decimal::Error,
}

impl TradeRow {
    /// Convert the numeric columns, ignoring thousands separators
    pub fn numeric(&self) -> Result<TradeValues, TradeValueError> {
        Ok(TradeValues {
            end: parse_decimal("end", &self.end)?,
            lowest: parse_decimal("lowest", &self.lowest)?,
            highest: parse_decimal("highest", &self.highest)?,
            amount: parse_decimal("amount", &self.amount)?,
            volume: parse_decimal("volume", &self.volume)?,
            cost: parse_decimal("cost", &self.cost)?,
        })
    }
}

fn parse_decimal(column: &'static str, raw: &str) -> Result<Decimal, TradeValueError> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| *c != ',' && *c != '\u{066C}')
        .collect();
    Decimal::from_str(&cleaned).map_err(|source| TradeValueError {
        column,
        raw: raw.to_string(),
        source,
    })
}
