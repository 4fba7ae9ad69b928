//! Crawl observability metrics
//!
//! Counters and histograms for loader requests, retries, rate-limiter waits and crawl
//! outcomes. Recording is always cheap: without an installed exporter the `metrics`
//! macros are no-ops. [`init_metrics`] installs a Prometheus scrape endpoint.

use metrics::{
    counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram, Unit,
};
use metrics_exporter_prometheus::PrometheusBuilder;
use once_cell::sync::Lazy;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Global metrics registry initialization flag
static METRICS_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Correlation ID generator for request tracing
static CORRELATION_COUNTER: Lazy<AtomicU64> = Lazy::new(|| AtomicU64::new(0));

/// Metrics setup errors
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    /// The Prometheus exporter could not be installed
    #[error("failed to install Prometheus exporter: {0}")]
    Install(String),
}

/// Initialize metrics system with Prometheus exporter
///
/// Idempotent: later calls are ignored once an exporter is installed.
///
/// # Arguments
/// * `addr` - Socket address to bind the scrape endpoint (e.g., "127.0.0.1:9090")
pub fn init_metrics(addr: SocketAddr) -> Result<(), MetricsError> {
    if METRICS_INITIALIZED.load(Ordering::SeqCst) {
        debug!("Metrics already initialized, skipping");
        return Ok(());
    }

    info!("Initializing metrics system on {}", addr);

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| MetricsError::Install(e.to_string()))?;

    describe_counter!(
        "loader_requests_total",
        Unit::Count,
        "Total number of requests made to the symbol loader"
    );

    describe_histogram!(
        "loader_request_duration_seconds",
        Unit::Seconds,
        "Symbol loader request duration in seconds"
    );

    describe_counter!(
        "crawler_retries_total",
        Unit::Count,
        "Total number of retry attempts"
    );

    describe_histogram!(
        "crawler_retry_backoff_seconds",
        Unit::Seconds,
        "Duration of retry backoff in seconds"
    );

    describe_histogram!(
        "rate_limit_queue_wait_seconds",
        Unit::Seconds,
        "Time spent waiting for rate limit permits"
    );

    describe_gauge!(
        "rate_limit_permits_available",
        Unit::Count,
        "Currently available rate limit permits"
    );

    describe_counter!(
        "crawler_symbols_total",
        Unit::Count,
        "Symbols processed, labelled by load type and outcome"
    );

    describe_counter!(
        "crawler_trades_total",
        Unit::Count,
        "Trade rows extracted"
    );

    METRICS_INITIALIZED.store(true, Ordering::SeqCst);
    info!("Metrics system initialized successfully on {}", addr);
    Ok(())
}

/// Generate a new correlation ID for request tracing
pub fn generate_correlation_id() -> String {
    let id = CORRELATION_COUNTER.fetch_add(1, Ordering::Relaxed) + 1;
    format!("req-{id:08x}")
}

/// Timing and outcome of one loader request
pub struct HttpRequestMetrics {
    endpoint: String,
    start_time: Instant,
    correlation_id: String,
}

impl HttpRequestMetrics {
    /// Start recording a new request
    pub fn start(endpoint: impl Into<String>) -> Self {
        let endpoint = endpoint.into();
        let correlation_id = generate_correlation_id();

        debug!(
            correlation_id = %correlation_id,
            endpoint = %endpoint,
            "Starting HTTP request metrics"
        );

        Self {
            endpoint,
            start_time: Instant::now(),
            correlation_id,
        }
    }

    /// Record a response with `status_code`
    pub fn record_complete(&self, status_code: u16) {
        let duration = self.start_time.elapsed();

        counter!(
            "loader_requests_total",
            "endpoint" => self.endpoint.clone(),
            "status" => status_code.to_string(),
        )
        .increment(1);

        histogram!(
            "loader_request_duration_seconds",
            "endpoint" => self.endpoint.clone(),
        )
        .record(duration.as_secs_f64());

        debug!(
            correlation_id = %self.correlation_id,
            endpoint = %self.endpoint,
            status = status_code,
            duration_ms = duration.as_millis(),
            "HTTP request completed"
        );
    }

    /// Record a transport failure (no status code)
    pub fn record_network_error(&self, kind: &'static str) {
        let duration = self.start_time.elapsed();

        counter!(
            "loader_requests_total",
            "endpoint" => self.endpoint.clone(),
            "status" => kind,
        )
        .increment(1);

        histogram!(
            "loader_request_duration_seconds",
            "endpoint" => self.endpoint.clone(),
        )
        .record(duration.as_secs_f64());

        warn!(
            correlation_id = %self.correlation_id,
            endpoint = %self.endpoint,
            kind = kind,
            duration_ms = duration.as_millis(),
            "Network error recorded"
        );
    }

    /// Get the correlation ID for this request
    pub fn correlation_id(&self) -> &str {
        &self.correlation_id
    }
}

/// Record retry backoff duration
pub fn record_retry_backoff(duration: Duration, attempt: u32) {
    counter!(
        "crawler_retries_total",
        "attempt" => attempt.to_string(),
    )
    .increment(1);

    histogram!(
        "crawler_retry_backoff_seconds",
        "attempt" => attempt.to_string(),
    )
    .record(duration.as_secs_f64());

    debug!(
        attempt = attempt,
        backoff_ms = duration.as_millis(),
        "Retry backoff recorded"
    );
}

/// Record time spent waiting for a rate-limit permit
pub fn record_rate_limit_wait(wait: Duration, available: usize) {
    histogram!("rate_limit_queue_wait_seconds").record(wait.as_secs_f64());
    gauge!("rate_limit_permits_available").set(available as f64);

    if wait.as_millis() > 100 {
        debug!(
            wait_ms = wait.as_millis(),
            available = available,
            "Rate limit permit acquired after wait"
        );
    }
}

/// Outcome of one identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolOutcome {
    /// Page fetched and extracted
    Crawled,
    /// Page fetched but no header marker matched
    Malformed,
    /// Fetch failed after all attempts
    Failed,
}

impl SymbolOutcome {
    fn as_str(self) -> &'static str {
        match self {
            SymbolOutcome::Crawled => "crawled",
            SymbolOutcome::Malformed => "malformed",
            SymbolOutcome::Failed => "failed",
        }
    }
}

/// Record the outcome of one identifier
pub fn record_symbol(load_type: &str, outcome: SymbolOutcome, trades: usize) {
    counter!(
        "crawler_symbols_total",
        "load_type" => load_type.to_string(),
        "outcome" => outcome.as_str(),
    )
    .increment(1);

    if trades > 0 {
        counter!(
            "crawler_trades_total",
            "load_type" => load_type.to_string(),
        )
        .increment(trades as u64);
    }
}

/// Check if metrics system is initialized
pub fn is_initialized() -> bool {
    METRICS_INITIALIZED.load(Ordering::SeqCst)
}
