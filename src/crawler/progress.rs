//! Progress tracking for long-running crawls.
//!
//! A crawl knows its total up front (load types × days), so progress is purely
//! count-based: percentage, rate and an ETA derived from the identifiers attempted so
//! far.

use std::time::{Duration, Instant};

const DEFAULT_UPDATE_INTERVAL: Duration = Duration::from_secs(60);
const MIN_CRAWL_DURATION: Duration = Duration::from_secs(30);

/// Lightweight builder that controls update cadence.
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    update_interval: Duration,
    min_percentage_step: f64,
}

impl ProgressTracker {
    /// Create a tracker with custom interval and percentage step.
    pub fn new(update_interval: Duration, min_percentage_step: f64) -> Self {
        Self {
            update_interval,
            min_percentage_step,
        }
    }

    /// Emit a progress update every `step` percent of the crawl.
    pub fn with_percentage_step(mut self, step: f64) -> Self {
        self.min_percentage_step = step;
        self
    }

    /// Build a [`ProgressState`] configured with the tracker defaults.
    pub fn create_state(&self, total_expected: u64) -> ProgressState {
        let mut state = ProgressState::new(total_expected);
        state.update_interval = self.update_interval;
        state.min_percentage_step = self.min_percentage_step;
        state
    }
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new(DEFAULT_UPDATE_INTERVAL, 10.0)
    }
}

/// Progress of one crawl
#[derive(Debug, Clone)]
pub struct ProgressState {
    /// Identifiers attempted so far.
    pub attempted: u64,
    /// Identifiers that produced a record.
    pub succeeded: u64,
    /// Identifiers whose fetch failed.
    pub failed: u64,
    /// Identifiers the crawl will attempt.
    pub total_expected: u64,
    /// When the crawl started.
    pub start_time: Instant,
    /// Last time progress was reported.
    pub last_update: Instant,
    /// Minimum interval between progress updates.
    pub update_interval: Duration,
    /// Identifiers per second.
    pub current_rate: f64,
    /// Load type currently being crawled.
    pub current_phase: Option<String>,
    /// Last reported completion percentage.
    pub last_reported_percentage: f64,
    /// Minimum percentage delta required to emit a new update.
    pub min_percentage_step: f64,
}

impl ProgressState {
    /// Create a state with default intervals.
    pub fn new(total_expected: u64) -> Self {
        let now = Instant::now();
        Self {
            attempted: 0,
            succeeded: 0,
            failed: 0,
            total_expected,
            start_time: now,
            last_update: now,
            update_interval: DEFAULT_UPDATE_INTERVAL,
            current_rate: 0.0,
            current_phase: None,
            last_reported_percentage: 0.0,
            min_percentage_step: 10.0,
        }
    }

    /// Count one finished identifier.
    pub fn record(&mut self, success: bool) {
        self.attempted = self.attempted.saturating_add(1);
        if success {
            self.succeeded = self.succeeded.saturating_add(1);
        } else {
            self.failed = self.failed.saturating_add(1);
        }
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.current_rate = self.attempted as f64 / elapsed;
        }
    }

    /// Whether a progress update should be emitted based on time or percentage.
    pub fn should_emit_update(&self) -> bool {
        if self.attempted == 0 {
            return false;
        }

        if self.percentage() - self.last_reported_percentage >= self.min_percentage_step {
            return true;
        }

        self.start_time.elapsed() >= MIN_CRAWL_DURATION
            && self.last_update.elapsed() >= self.update_interval
    }

    /// Call after emitting a progress event to reset timers and cached percentage.
    pub fn mark_emitted(&mut self) {
        self.last_update = Instant::now();
        self.last_reported_percentage = self.percentage();
    }

    /// Set descriptive phase label (e.g., "Peak").
    pub fn set_phase<S: Into<String>>(&mut self, phase: Option<S>) {
        self.current_phase = phase.map(|s| s.into());
    }

    /// Completion percentage (0-100).
    pub fn percentage(&self) -> f64 {
        if self.total_expected == 0 {
            return 100.0;
        }
        (self.attempted as f64 / self.total_expected as f64 * 100.0).min(100.0)
    }

    /// Estimate remaining time from the current rate.
    pub fn estimate_remaining(&self) -> Option<Duration> {
        if self.current_rate <= 0.0 {
            return None;
        }
        let remaining = self.total_expected.saturating_sub(self.attempted);
        (remaining > 0).then(|| Duration::from_secs_f64(remaining as f64 / self.current_rate))
    }

    /// Human-readable progress string for logging.
    pub fn format_progress(&self) -> String {
        let mut parts = vec![format!(
            "[PROGRESS] Crawled {}/{} symbols - {:.1}% complete",
            self.attempted,
            self.total_expected,
            self.percentage()
        )];

        if self.failed > 0 {
            parts.push(format!("({} failed)", self.failed));
        }

        if let Some(phase) = &self.current_phase {
            parts.push(format!("[{phase}]"));
        }

        if self.current_rate > 0.0 {
            parts.push(format!("at {:.1} symbols/sec", self.current_rate));
        }

        if let Some(remaining) = self.estimate_remaining() {
            parts.push(format!("- ~{} remaining", format_duration(remaining)));
        }

        parts.join(" ")
    }
}

fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs < 60 {
        format!("{secs}s")
    } else if secs < 3600 {
        format!("{}m", secs / 60)
    } else {
        format!("{:.1}h", secs as f64 / 3600.0)
    }
}
