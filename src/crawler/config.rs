//! Crawl policy constants

use std::time::Duration;

/// Retries per identifier when none are requested.
/// Zero keeps the one-attempt-per-identifier behaviour of a plain crawl.
pub const DEFAULT_MAX_RETRIES: u32 = 0;

/// Upper bound accepted for `--max-retries`
pub const MAX_RETRIES_LIMIT: u32 = 10;

/// Initial backoff delay in milliseconds.
pub const INITIAL_BACKOFF_MS: u64 = 1000; // 1 second

/// Maximum backoff delay in milliseconds.
pub const MAX_BACKOFF_MS: u64 = 30000; // 30 seconds

/// In-flight requests when none are requested (strictly sequential)
pub const DEFAULT_CONCURRENCY: usize = 1;

/// Upper bound accepted for `--concurrency`
pub const MAX_CONCURRENCY: usize = 16;

/// Emit a progress event every N attempted identifiers
pub const PROGRESS_EVENT_INTERVAL: u64 = 25;

/// Calculate exponential backoff delay
pub fn calculate_backoff(retry_count: u32) -> Duration {
    let factor = 2u64.saturating_pow(retry_count);
    let delay_ms = INITIAL_BACKOFF_MS.saturating_mul(factor);
    let delay_ms = delay_ms.min(MAX_BACKOFF_MS);
    Duration::from_millis(delay_ms)
}
