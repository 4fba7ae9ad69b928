//! Crawl results

use crate::calendar::CalendarDate;
use crate::identifier::SymbolIdentifier;
use crate::SymbolRecord;
use serde::{Deserialize, Serialize};

/// A record together with the identifier it was fetched for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrawledSymbol {
    /// Source identifier
    pub identifier: SymbolIdentifier,
    /// Load-type name
    pub load_type: String,
    /// Delivery date
    pub date: CalendarDate,
    /// Extracted page contents
    pub record: SymbolRecord,
}

/// An identifier that produced no record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrawlFailure {
    /// Identifier that failed
    pub identifier: SymbolIdentifier,
    /// Load-type name
    pub load_type: String,
    /// Delivery date
    pub date: CalendarDate,
    /// Error text
    pub error: String,
}

/// Everything a crawl produced, in crawl order (load type, then date)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CrawlResult {
    /// One entry per identifier whose page was fetched
    pub entries: Vec<CrawledSymbol>,
    /// One entry per identifier whose fetch failed
    pub failures: Vec<CrawlFailure>,
    /// Identifiers attempted
    pub attempted: u64,
    /// Whether the crawl stopped early on shutdown
    pub interrupted: bool,
}

impl CrawlResult {
    /// Records in crawl order
    pub fn records(&self) -> impl Iterator<Item = &SymbolRecord> + '_ {
        self.entries.iter().map(|entry| &entry.record)
    }

    /// Consume the result, keeping only the records
    pub fn into_records(self) -> Vec<SymbolRecord> {
        self.entries.into_iter().map(|entry| entry.record).collect()
    }

    /// Total trade rows across all records
    pub fn trade_count(&self) -> usize {
        self.records().map(|r| r.trades.len()).sum()
    }

    /// Whether every attempted identifier produced a record
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty() && !self.interrupted
    }
}
