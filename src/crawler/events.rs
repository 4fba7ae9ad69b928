//! Crawl log events as data
//!
//! The crawler never logs directly. It hands every notable step to an [`EventSink`]
//! as a [`CrawlEvent`]; [`TracingSink`] forwards them to `tracing`, [`MemorySink`]
//! keeps them for inspection.

use crate::identifier::SymbolIdentifier;
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Event severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Per-item detail
    Debug,
    /// Normal progress
    Info,
    /// Recovered problem
    Warn,
    /// Failed item
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Debug => "debug",
            Severity::Info => "info",
            Severity::Warn => "warn",
            Severity::Error => "error",
        };
        f.write_str(s)
    }
}

/// One notable step of a crawl
#[derive(Debug, Clone, PartialEq)]
pub enum CrawlEvent {
    /// The crawl passed validation and is about to fetch
    Started {
        /// Identifiers to attempt
        total: u64,
        /// Configured load types
        load_types: usize,
        /// Days in the date window
        days: u64,
    },
    /// An identifier is about to be fetched
    Attempt {
        /// Position in crawl order, starting at 1
        counter: u64,
        /// Load-type name
        load_type: String,
        /// Identifier being fetched
        identifier: SymbolIdentifier,
    },
    /// A transient failure will be retried
    Retrying {
        /// Identifier being fetched
        identifier: SymbolIdentifier,
        /// Retry number, starting at 1
        attempt: u32,
        /// Configured retry limit
        max_retries: u32,
        /// Delay before the retry
        backoff: Duration,
        /// Error that triggered the retry
        error: String,
    },
    /// The fetch failed for good; the identifier is skipped
    FetchFailed {
        /// Position in crawl order
        counter: u64,
        /// Load-type name
        load_type: String,
        /// Identifier that failed
        identifier: SymbolIdentifier,
        /// Request URL, if one was made
        request: Option<String>,
        /// Response status, if a response arrived
        status: Option<u16>,
        /// Response body, if a response arrived
        response: Option<String>,
        /// Error text
        error: String,
    },
    /// No header marker matched; the record is kept with empty fields
    MalformedDocument {
        /// Position in crawl order
        counter: u64,
        /// Identifier whose page did not parse
        identifier: SymbolIdentifier,
        /// Page length in bytes
        body_len: usize,
    },
    /// Some header markers were absent
    IncompleteHeader {
        /// Identifier concerned
        identifier: SymbolIdentifier,
        /// Missing marker names
        missing: Vec<&'static str>,
    },
    /// An identifier produced a record
    Completed {
        /// Position in crawl order
        counter: u64,
        /// Identifier crawled
        identifier: SymbolIdentifier,
        /// Trade rows on the page
        trades: usize,
    },
    /// Periodic progress summary
    Progress {
        /// Identifiers attempted
        attempted: u64,
        /// Identifiers in the crawl
        total: u64,
        /// Formatted summary
        summary: String,
    },
    /// Shutdown was requested; remaining identifiers are skipped
    Interrupted {
        /// Identifiers attempted before the stop
        attempted: u64,
        /// Identifiers in the crawl
        total: u64,
    },
    /// The crawl is over
    Finished {
        /// Identifiers attempted
        attempted: u64,
        /// Records produced
        records: usize,
        /// Identifiers that failed
        failures: usize,
        /// Wall-clock duration
        elapsed: Duration,
    },
}

impl CrawlEvent {
    /// Severity of this event
    pub fn severity(&self) -> Severity {
        match self {
            CrawlEvent::Completed { .. } | CrawlEvent::IncompleteHeader { .. } => Severity::Debug,
            CrawlEvent::Started { .. }
            | CrawlEvent::Attempt { .. }
            | CrawlEvent::Progress { .. }
            | CrawlEvent::Finished { .. } => Severity::Info,
            CrawlEvent::Retrying { .. }
            | CrawlEvent::MalformedDocument { .. }
            | CrawlEvent::Interrupted { .. } => Severity::Warn,
            CrawlEvent::FetchFailed { .. } => Severity::Error,
        }
    }

    /// One-line human message
    pub fn message(&self) -> String {
        match self {
            CrawlEvent::Started {
                total,
                load_types,
                days,
            } => format!("Starting crawl of {total} symbols ({load_types} load types x {days} days)"),
            CrawlEvent::Attempt {
                counter,
                load_type,
                identifier,
            } => format!("{counter},{load_type},{identifier}"),
            CrawlEvent::Retrying {
                identifier,
                attempt,
                max_retries,
                backoff,
                error,
            } => format!(
                "Retry {attempt}/{max_retries} for {identifier} in {}ms: {error}",
                backoff.as_millis()
            ),
            CrawlEvent::FetchFailed {
                identifier, error, ..
            } => format!("Failed to fetch {identifier}: {error}"),
            CrawlEvent::MalformedDocument { identifier, .. } => {
                format!("No header fields found on page for {identifier}")
            }
            CrawlEvent::IncompleteHeader {
                identifier,
                missing,
            } => format!("Page for {identifier} is missing {}", missing.join(", ")),
            CrawlEvent::Completed {
                identifier, trades, ..
            } => format!("Crawled {identifier} ({trades} trades)"),
            CrawlEvent::Progress { summary, .. } => summary.clone(),
            CrawlEvent::Interrupted { attempted, total } => {
                format!("Crawl interrupted after {attempted}/{total} symbols")
            }
            CrawlEvent::Finished {
                attempted,
                records,
                failures,
                elapsed,
            } => format!(
                "Crawl finished: {attempted} attempted, {records} records, {failures} failed in {:.1}s",
                elapsed.as_secs_f64()
            ),
        }
    }

    /// Structured fields as name/value pairs
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        match self {
            CrawlEvent::Started {
                total,
                load_types,
                days,
            } => vec![
                ("total", total.to_string()),
                ("load_types", load_types.to_string()),
                ("days", days.to_string()),
            ],
            CrawlEvent::Attempt {
                counter,
                load_type,
                identifier,
            } => vec![
                ("counter", counter.to_string()),
                ("load_type", load_type.clone()),
                ("identifier", identifier.to_string()),
            ],
            CrawlEvent::Retrying {
                identifier,
                attempt,
                backoff,
                ..
            } => vec![
                ("identifier", identifier.to_string()),
                ("attempt", attempt.to_string()),
                ("backoff_ms", backoff.as_millis().to_string()),
            ],
            CrawlEvent::FetchFailed {
                counter,
                load_type,
                identifier,
                request,
                status,
                response,
                error,
            } => {
                let mut fields = vec![
                    ("counter", counter.to_string()),
                    ("load_type", load_type.clone()),
                    ("identifier", identifier.to_string()),
                    ("error", error.clone()),
                ];
                if let Some(request) = request {
                    fields.push(("request", request.clone()));
                }
                if let Some(status) = status {
                    fields.push(("status", status.to_string()));
                }
                if let Some(response) = response {
                    fields.push(("response", response.clone()));
                }
                fields
            }
            CrawlEvent::MalformedDocument {
                counter,
                identifier,
                body_len,
            } => vec![
                ("counter", counter.to_string()),
                ("identifier", identifier.to_string()),
                ("body_len", body_len.to_string()),
            ],
            CrawlEvent::IncompleteHeader {
                identifier,
                missing,
            } => vec![
                ("identifier", identifier.to_string()),
                ("missing", missing.join(",")),
            ],
            CrawlEvent::Completed {
                counter,
                identifier,
                trades,
            } => vec![
                ("counter", counter.to_string()),
                ("identifier", identifier.to_string()),
                ("trades", trades.to_string()),
            ],
            CrawlEvent::Progress {
                attempted, total, ..
            }
            | CrawlEvent::Interrupted { attempted, total } => vec![
                ("attempted", attempted.to_string()),
                ("total", total.to_string()),
            ],
            CrawlEvent::Finished {
                attempted,
                records,
                failures,
                elapsed,
            } => vec![
                ("attempted", attempted.to_string()),
                ("records", records.to_string()),
                ("failures", failures.to_string()),
                ("elapsed_ms", elapsed.as_millis().to_string()),
            ],
        }
    }
}

/// Receiver of crawl events
pub trait EventSink: Send + Sync {
    /// Handle one event
    fn emit(&self, event: &CrawlEvent);
}

impl<T: EventSink + ?Sized> EventSink for Arc<T> {
    fn emit(&self, event: &CrawlEvent) {
        (**self).emit(event)
    }
}

impl<T: EventSink + ?Sized> EventSink for &T {
    fn emit(&self, event: &CrawlEvent) {
        (**self).emit(event)
    }
}

/// Forwards events to `tracing` at their severity
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: &CrawlEvent) {
        let message = event.message();
        match event {
            CrawlEvent::Attempt {
                counter,
                load_type,
                identifier,
            } => tracing::info!(
                counter = counter,
                load_type = %load_type,
                identifier = %identifier,
                "{}",
                message
            ),
            CrawlEvent::FetchFailed {
                counter,
                load_type,
                identifier,
                request,
                status,
                response,
                ..
            } => tracing::error!(
                counter = counter,
                load_type = %load_type,
                identifier = %identifier,
                request = request.as_deref().unwrap_or("-"),
                status = status.unwrap_or(0),
                response = response.as_deref().unwrap_or(""),
                "{}",
                message
            ),
            _ => match event.severity() {
                Severity::Debug => tracing::debug!("{}", message),
                Severity::Info => tracing::info!("{}", message),
                Severity::Warn => tracing::warn!("{}", message),
                Severity::Error => tracing::error!("{}", message),
            },
        }
    }
}

/// Keeps every event in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<CrawlEvent>>,
}

impl MemorySink {
    /// Empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events received so far
    pub fn events(&self) -> Vec<CrawlEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Events at exactly `severity`
    pub fn with_severity(&self, severity: Severity) -> Vec<CrawlEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.severity() == severity)
            .collect()
    }
}

impl EventSink for MemorySink {
    fn emit(&self, event: &CrawlEvent) {
        match self.events.lock() {
            Ok(mut events) => events.push(event.clone()),
            Err(poisoned) => poisoned.into_inner().push(event.clone()),
        }
    }
}

/// Forwards every event to two sinks in order
pub struct TeeSink<A, B> {
    first: A,
    second: B,
}

impl<A: EventSink, B: EventSink> TeeSink<A, B> {
    /// Combine two sinks
    pub fn new(first: A, second: B) -> Self {
        Self { first, second }
    }
}

impl<A: EventSink, B: EventSink> EventSink for TeeSink<A, B> {
    fn emit(&self, event: &CrawlEvent) {
        self.first.emit(event);
        self.second.emit(event);
    }
}
