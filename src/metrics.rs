//! Performance metrics collection for the highlighting pipeline
//!
//! Metrics are stored in-memory and can be queried by embedders or logged at
//! the end of a run.
//!
//! ## Metrics Tracked
//!
//! - Tokens decoded from semantic streams
//! - Lexical tokens adapted from compiler tokens, and compiler tokens dropped
//!   for having no highlight mapping
//! - Lexical tokens occluded during merging
//! - Spans produced by the stapler
//! - Files rendered and failed
//! - Per-stage timings
//!
//! ## Design
//!
//! - Lock-free atomic counters for per-token updates
//! - DashMap for low-contention timing storage, keeping only the most recent
//!   samples per stage

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;

/// Timing samples kept per stage; older samples are discarded
pub const MAX_TIMING_SAMPLES: usize = 1024;

/// Global metrics registry (singleton)
static METRICS: once_cell::sync::Lazy<Arc<Metrics>> = once_cell::sync::Lazy::new(|| Arc::new(Metrics::new()));

/// Get the global metrics instance
pub fn metrics() -> &'static Arc<Metrics> {
    &METRICS
}

/// Pipeline metrics registry
#[derive(Debug)]
pub struct Metrics {
    decoded_tokens: AtomicU64,
    lexical_tokens: AtomicU64,
    dropped_compiler_tokens: AtomicU64,
    occluded_tokens: AtomicU64,
    stapled_spans: AtomicU64,

    files_rendered: AtomicU64,
    highlight_failures: AtomicU64,

    // stage name -> most recent durations in microseconds
    stage_timings: DashMap<String, VecDeque<u64>>,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            decoded_tokens: AtomicU64::new(0),
            lexical_tokens: AtomicU64::new(0),
            dropped_compiler_tokens: AtomicU64::new(0),
            occluded_tokens: AtomicU64::new(0),
            stapled_spans: AtomicU64::new(0),
            files_rendered: AtomicU64::new(0),
            highlight_failures: AtomicU64::new(0),
            stage_timings: DashMap::new(),
        }
    }

    pub fn record_decoded_tokens(&self, count: u64) {
        self.decoded_tokens.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_lexical_tokens(&self, count: u64) {
        self.lexical_tokens.fetch_add(count, Ordering::Relaxed);
    }

    /// Records compiler tokens skipped for having no highlight mapping
    pub fn record_dropped_compiler_tokens(&self, count: u64) {
        self.dropped_compiler_tokens.fetch_add(count, Ordering::Relaxed);
    }

    /// Records lexical tokens that lost a collision with a semantic token
    pub fn record_occluded_tokens(&self, count: u64) {
        self.occluded_tokens.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_stapled_spans(&self, count: u64) {
        self.stapled_spans.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_file_rendered(&self) {
        self.files_rendered.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_highlight_failure(&self) {
        self.highlight_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Records the timing of a pipeline stage
    ///
    /// # Arguments
    /// * `stage` - Name of the stage (e.g., "decode", "staple")
    /// * `duration` - Duration of the stage
    pub fn record_timing(&self, stage: &str, duration: Duration) {
        let micros = duration.as_micros() as u64;

        let mut samples = self.stage_timings.entry(stage.to_string()).or_default();
        if samples.len() == MAX_TIMING_SAMPLES {
            samples.pop_front();
        }
        samples.push_back(micros);
    }

    /// Gets summary statistics for a stage
    pub fn stage_stats(&self, stage: &str) -> Option<StageStats> {
        self.stage_timings.get(stage).map(|timings| {
            let mut sorted: Vec<u64> = timings.value().iter().copied().collect();
            sorted.sort_unstable();

            let count = sorted.len();
            if count == 0 {
                return StageStats::default();
            }

            let sum: u64 = sorted.iter().sum();
            let p95_idx = (count as f64 * 0.95) as usize;

            StageStats {
                count,
                min_micros: sorted[0],
                max_micros: sorted[count - 1],
                mean_micros: sum / count as u64,
                p50_micros: sorted[count / 2],
                p95_micros: sorted[p95_idx.min(count - 1)],
            }
        })
    }

    /// Names of the stages with recorded timings, sorted
    pub fn stages(&self) -> Vec<String> {
        let mut names: Vec<String> = self.stage_timings.iter().map(|entry| entry.key().clone()).collect();
        names.sort();
        names
    }

    /// Fraction of lexical tokens that were occluded (0.0 to 1.0)
    pub fn occlusion_rate(&self) -> f64 {
        let lexical = self.lexical_tokens.load(Ordering::Relaxed);
        if lexical == 0 {
            0.0
        } else {
            self.occluded_tokens.load(Ordering::Relaxed) as f64 / lexical as f64
        }
    }

    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            decoded_tokens: self.decoded_tokens.load(Ordering::Relaxed),
            lexical_tokens: self.lexical_tokens.load(Ordering::Relaxed),
            dropped_compiler_tokens: self.dropped_compiler_tokens.load(Ordering::Relaxed),
            occluded_tokens: self.occluded_tokens.load(Ordering::Relaxed),
            occlusion_rate: self.occlusion_rate(),
            stapled_spans: self.stapled_spans.load(Ordering::Relaxed),
            files_rendered: self.files_rendered.load(Ordering::Relaxed),
            highlight_failures: self.highlight_failures.load(Ordering::Relaxed),
        }
    }

    /// Resets all metrics (useful for testing)
    pub fn reset(&self) {
        self.decoded_tokens.store(0, Ordering::Relaxed);
        self.lexical_tokens.store(0, Ordering::Relaxed);
        self.dropped_compiler_tokens.store(0, Ordering::Relaxed);
        self.occluded_tokens.store(0, Ordering::Relaxed);
        self.stapled_spans.store(0, Ordering::Relaxed);
        self.files_rendered.store(0, Ordering::Relaxed);
        self.highlight_failures.store(0, Ordering::Relaxed);
        self.stage_timings.clear();
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Statistics for a single stage
#[derive(Debug, Clone, Default)]
pub struct StageStats {
    pub count: usize,
    pub min_micros: u64,
    pub max_micros: u64,
    pub mean_micros: u64,
    pub p50_micros: u64, // Median
    pub p95_micros: u64,
}

/// Summary of all counters
#[derive(Debug, Clone, serde::Serialize)]
pub struct MetricsSummary {
    pub decoded_tokens: u64,
    pub lexical_tokens: u64,
    pub dropped_compiler_tokens: u64,
    pub occluded_tokens: u64,
    pub occlusion_rate: f64,
    pub stapled_spans: u64,
    pub files_rendered: u64,
    pub highlight_failures: u64,
}

/// RAII guard for automatic timing measurement
///
/// Records the duration of a scope when dropped.
///
/// # Example
///
/// ```
/// use lsp_highlight::metrics::TimingGuard;
///
/// fn my_stage() {
///     let _guard = TimingGuard::new("my_stage");
///     // ... do work ...
///     // Duration automatically recorded when _guard is dropped
/// }
/// ```
pub struct TimingGuard {
    stage: &'static str,
    start: Instant,
}

impl TimingGuard {
    pub fn new(stage: &'static str) -> Self {
        Self {
            stage,
            start: Instant::now(),
        }
    }
}

impl Drop for TimingGuard {
    fn drop(&mut self) {
        metrics().record_timing(self.stage, self.start.elapsed());
    }
}
