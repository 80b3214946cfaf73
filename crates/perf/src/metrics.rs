//! Metrics collection for layout pass timings

use crate::timing::TimerCategory;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Mutex, OnceLock};

static GLOBAL_METRICS: OnceLock<Mutex<LayoutMetrics>> = OnceLock::new();

/// Process-wide metrics collector fed by [`PerfTimer`](crate::PerfTimer).
///
/// Only timing samples live here; layout state never does.
pub fn global_metrics() -> &'static Mutex<LayoutMetrics> {
    GLOBAL_METRICS.get_or_init(|| Mutex::new(LayoutMetrics::new()))
}

pub fn reset_global_metrics() {
    if let Ok(mut metrics) = global_metrics().lock() {
        metrics.reset();
    }
}

/// Timing samples per category, bounded to `max_samples` each
#[derive(Debug, Clone)]
pub struct LayoutMetrics {
    measure_times: Vec<f64>,
    arrange_times: Vec<f64>,
    propagate_times: Vec<f64>,
    /// Uncategorized timings keyed by timer name
    general_times: HashMap<String, Vec<f64>>,
    max_samples: usize,
    enabled: bool,
}

impl LayoutMetrics {
    pub fn new() -> Self {
        Self {
            measure_times: Vec::new(),
            arrange_times: Vec::new(),
            propagate_times: Vec::new(),
            general_times: HashMap::new(),
            max_samples: 1000,
            enabled: true,
        }
    }

    pub fn with_max_samples(mut self, max: usize) -> Self {
        self.max_samples = max;
        self
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Record a timing into the bucket of its category
    pub fn record_timing(&mut self, name: &str, duration_ms: f64, category: TimerCategory) {
        if !self.enabled {
            return;
        }

        let max = self.max_samples;
        let samples = match category {
            TimerCategory::Measure => &mut self.measure_times,
            TimerCategory::Arrange => &mut self.arrange_times,
            TimerCategory::Propagate => &mut self.propagate_times,
            TimerCategory::General => self.general_times.entry(name.to_string()).or_default(),
        };
        push_bounded(samples, duration_ms, max);

        tracing::trace!(
            target: "perf::layout",
            name,
            ?category,
            duration_ms,
            "timing recorded"
        );
    }

    pub fn summary(&self) -> LayoutTimingSummary {
        LayoutTimingSummary {
            measure_stats: TimingStats::from_samples(&self.measure_times),
            arrange_stats: TimingStats::from_samples(&self.arrange_times),
            propagate_stats: TimingStats::from_samples(&self.propagate_times),
            general_stats: self
                .general_times
                .iter()
                .map(|(name, times)| (name.clone(), TimingStats::from_samples(times)))
                .collect(),
            total_measures: self.measure_times.len(),
            total_arranges: self.arrange_times.len(),
        }
    }

    pub fn reset(&mut self) {
        self.measure_times.clear();
        self.arrange_times.clear();
        self.propagate_times.clear();
        self.general_times.clear();
    }

    pub fn arrange_times(&self) -> &[f64] {
        &self.arrange_times
    }

    pub fn measure_times(&self) -> &[f64] {
        &self.measure_times
    }
}

impl Default for LayoutMetrics {
    fn default() -> Self {
        Self::new()
    }
}

fn push_bounded(samples: &mut Vec<f64>, value: f64, max: usize) {
    if max == 0 {
        return;
    }
    if samples.len() >= max {
        samples.remove(0);
    }
    samples.push(value);
}

/// Summary of recorded layout timings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutTimingSummary {
    pub measure_stats: TimingStats,
    pub arrange_stats: TimingStats,
    pub propagate_stats: TimingStats,
    pub general_stats: HashMap<String, TimingStats>,
    pub total_measures: usize,
    pub total_arranges: usize,
}

/// Statistical summary of timing data
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimingStats {
    pub count: usize,
    pub min_ms: f64,
    pub max_ms: f64,
    pub mean_ms: f64,
    pub median_ms: f64,
    pub p95_ms: f64,
    pub total_ms: f64,
}

impl TimingStats {
    pub fn from_samples(samples: &[f64]) -> Self {
        if samples.is_empty() {
            return Self::default();
        }

        let count = samples.len();
        let mut sorted = samples.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let total_ms: f64 = samples.iter().sum();
        let median_ms = if count % 2 == 0 {
            (sorted[count / 2 - 1] + sorted[count / 2]) / 2.0
        } else {
            sorted[count / 2]
        };

        Self {
            count,
            min_ms: sorted[0],
            max_ms: sorted[count - 1],
            mean_ms: total_ms / count as f64,
            median_ms,
            p95_ms: percentile(&sorted, 95.0),
            total_ms,
        }
    }
}

/// Linear-interpolated percentile of sorted samples
fn percentile(sorted: &[f64], p: f64) -> f64 {
    match sorted.len() {
        0 => 0.0,
        1 => sorted[0],
        len => {
            let rank = (p / 100.0) * (len - 1) as f64;
            let lower = rank.floor() as usize;
            let upper = (rank.ceil() as usize).min(len - 1);
            let fraction = rank - lower as f64;
            sorted[lower] + fraction * (sorted[upper] - sorted[lower])
        }
    }
}
