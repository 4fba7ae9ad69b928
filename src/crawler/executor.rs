//! Crawl executor
//!
//! Walks load types in configured order and, for each, a fresh traversal of the date
//! window. Every (load type, date) pair is attempted once (plus optional retries for
//! transient errors). A failed fetch is reported and skipped; only an invalid
//! configuration stops the crawl, and it does so before the first request.

use crate::calendar::CalendarDate;
use crate::config::CrawlConfig;
use crate::crawler::config::{calculate_backoff, DEFAULT_CONCURRENCY, DEFAULT_MAX_RETRIES};
use crate::crawler::events::{CrawlEvent, EventSink};
use crate::crawler::progress::{ProgressState, ProgressTracker};
use crate::crawler::result::{CrawlFailure, CrawlResult, CrawledSymbol};
use crate::crawler::CrawlError;
use crate::extractor::extract_with_report;
use crate::fetcher::{DocumentFetcher, FetchError};
use crate::identifier::SymbolIdentifier;
use crate::metrics::{self, SymbolOutcome};
use crate::shutdown::SharedShutdown;
use futures_util::{stream, StreamExt};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// One (load type, date) pair to crawl
struct WorkItem<'a> {
    index: usize,
    load_type: &'a str,
    date: CalendarDate,
    identifier: SymbolIdentifier,
}

enum Outcome {
    Crawled(CrawledSymbol),
    Failed(CrawlFailure),
    Skipped,
}

/// Drives a crawl against a [`DocumentFetcher`]
pub struct Crawler {
    fetcher: Arc<dyn DocumentFetcher>,
    max_retries: u32,
    concurrency: usize,
    progress_tracker: ProgressTracker,
    shutdown: Option<SharedShutdown>,
}

impl Crawler {
    /// Sequential crawler without retries
    pub fn new(fetcher: Arc<dyn DocumentFetcher>) -> Self {
        Self {
            fetcher,
            max_retries: DEFAULT_MAX_RETRIES,
            concurrency: DEFAULT_CONCURRENCY,
            progress_tracker: ProgressTracker::default(),
            shutdown: None,
        }
    }

    /// Set maximum number of retries for transient fetch errors
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Allow up to `concurrency` requests in flight (at least 1)
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Attach a shared shutdown handle for graceful cancellation.
    pub fn with_shutdown(mut self, shutdown: SharedShutdown) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    /// Override progress tracking configuration.
    pub fn with_progress_tracker(mut self, tracker: ProgressTracker) -> Self {
        self.progress_tracker = tracker;
        self
    }

    /// Crawl every identifier of `config`
    ///
    /// Results are in crawl order regardless of concurrency.
    ///
    /// # Errors
    /// Only configuration errors are returned; fetch errors end up in
    /// [`CrawlResult::failures`].
    pub async fn run(
        &self,
        config: &CrawlConfig,
        sink: &dyn EventSink,
    ) -> Result<CrawlResult, CrawlError> {
        config.validate()?;

        let started = Instant::now();
        let days = config.date_range().len();
        let total = config.total_identifiers();
        sink.emit(&CrawlEvent::Started {
            total,
            load_types: config.load_types.len(),
            days,
        });

        let items = config
            .load_types
            .iter()
            .flat_map(|load_type| {
                config
                    .date_range()
                    .into_iter()
                    .map(move |date| (load_type, date))
            })
            .enumerate()
            .map(|(index, (load_type, date))| WorkItem {
                index,
                load_type: &load_type.name,
                date,
                identifier: SymbolIdentifier::generate(config, &load_type.code, &date),
            });

        let counter = AtomicU64::new(0);
        let progress = Mutex::new(self.progress_tracker.create_state(total));

        let mut outcomes: Vec<(usize, Outcome)> = stream::iter(items)
            .map(|item| self.process(item, &counter, &progress, sink))
            .buffer_unordered(self.concurrency)
            .collect()
            .await;
        outcomes.sort_by_key(|(index, _)| *index);

        let mut result = CrawlResult::default();
        for (_, outcome) in outcomes {
            match outcome {
                Outcome::Crawled(entry) => result.entries.push(entry),
                Outcome::Failed(failure) => result.failures.push(failure),
                Outcome::Skipped => result.interrupted = true,
            }
        }
        result.attempted = counter.load(Ordering::SeqCst);

        if result.interrupted {
            sink.emit(&CrawlEvent::Interrupted {
                attempted: result.attempted,
                total,
            });
        }

        sink.emit(&CrawlEvent::Finished {
            attempted: result.attempted,
            records: result.entries.len(),
            failures: result.failures.len(),
            elapsed: started.elapsed(),
        });

        Ok(result)
    }

    async fn process(
        &self,
        item: WorkItem<'_>,
        counter: &AtomicU64,
        progress: &Mutex<ProgressState>,
        sink: &dyn EventSink,
    ) -> (usize, Outcome) {
        if self.shutdown_requested() {
            return (item.index, Outcome::Skipped);
        }

        let count = counter.fetch_add(1, Ordering::SeqCst) + 1;
        sink.emit(&CrawlEvent::Attempt {
            counter: count,
            load_type: item.load_type.to_string(),
            identifier: item.identifier.clone(),
        });

        let outcome = match self.fetch_with_retry(&item.identifier, sink).await {
            Ok(body) => {
                let extraction = extract_with_report(&body);
                if extraction.is_malformed() {
                    sink.emit(&CrawlEvent::MalformedDocument {
                        counter: count,
                        identifier: item.identifier.clone(),
                        body_len: body.len(),
                    });
                    metrics::record_symbol(item.load_type, SymbolOutcome::Malformed, 0);
                } else {
                    if !extraction.is_complete() {
                        sink.emit(&CrawlEvent::IncompleteHeader {
                            identifier: item.identifier.clone(),
                            missing: extraction.missing_fields.clone(),
                        });
                    }
                    metrics::record_symbol(
                        item.load_type,
                        SymbolOutcome::Crawled,
                        extraction.record.trades.len(),
                    );
                }
                sink.emit(&CrawlEvent::Completed {
                    counter: count,
                    identifier: item.identifier.clone(),
                    trades: extraction.record.trades.len(),
                });
                Outcome::Crawled(CrawledSymbol {
                    identifier: item.identifier,
                    load_type: item.load_type.to_string(),
                    date: item.date,
                    record: extraction.record,
                })
            }
            Err(e) => {
                sink.emit(&CrawlEvent::FetchFailed {
                    counter: count,
                    load_type: item.load_type.to_string(),
                    identifier: item.identifier.clone(),
                    request: e.url().map(str::to_string),
                    status: e.status(),
                    response: e.response_body().map(str::to_string),
                    error: e.to_string(),
                });
                metrics::record_symbol(item.load_type, SymbolOutcome::Failed, 0);
                Outcome::Failed(CrawlFailure {
                    identifier: item.identifier,
                    load_type: item.load_type.to_string(),
                    date: item.date,
                    error: e.to_string(),
                })
            }
        };

        let summary = {
            let mut state = match progress.lock() {
                Ok(state) => state,
                Err(poisoned) => poisoned.into_inner(),
            };
            state.set_phase(Some(item.load_type));
            state.record(matches!(outcome, Outcome::Crawled(_)));
            if state.should_emit_update() {
                state.mark_emitted();
                Some((state.attempted, state.total_expected, state.format_progress()))
            } else {
                None
            }
        };
        if let Some((attempted, total, summary)) = summary {
            sink.emit(&CrawlEvent::Progress {
                attempted,
                total,
                summary,
            });
        }

        (item.index, outcome)
    }

    /// Fetch once, retrying transient errors up to `max_retries` times
    async fn fetch_with_retry(
        &self,
        identifier: &SymbolIdentifier,
        sink: &dyn EventSink,
    ) -> Result<String, FetchError> {
        let mut retry_count = 0;
        loop {
            match self.fetcher.fetch(identifier).await {
                Ok(body) => return Ok(body),
                Err(e) if e.is_retryable() && retry_count < self.max_retries => {
                    let backoff = calculate_backoff(retry_count);
                    retry_count += 1;
                    sink.emit(&CrawlEvent::Retrying {
                        identifier: identifier.clone(),
                        attempt: retry_count,
                        max_retries: self.max_retries,
                        backoff,
                        error: e.to_string(),
                    });
                    metrics::record_retry_backoff(backoff, retry_count);
                    if !self.wait_backoff(backoff).await {
                        return Err(e);
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Sleep for `backoff`; returns false if shutdown interrupted the wait
    async fn wait_backoff(&self, backoff: Duration) -> bool {
        if self.shutdown_requested() {
            return false;
        }
        if let Some(shutdown) = &self.shutdown {
            tokio::select! {
                _ = tokio::time::sleep(backoff) => {},
                _ = shutdown.wait_for_shutdown() => return false,
            }
        } else {
            tokio::time::sleep(backoff).await;
        }
        true
    }

    fn shutdown_requested(&self) -> bool {
        self.shutdown
            .as_ref()
            .map(|s| s.is_shutdown_requested())
            .unwrap_or(false)
    }
}
