//! Scope timers for layout passes

use std::time::Instant;

/// A timer that measures elapsed time from creation to drop.
///
/// With the `telemetry` feature the elapsed time is traced and recorded into
/// [`global_metrics`](crate::global_metrics) when the timer is dropped.
///
/// # Example
///
/// ```rust
/// use perf::PerfTimer;
///
/// fn measure_table() {
///     let _timer = PerfTimer::measure("table");
///     // ... measurement ...
/// }
/// ```
pub struct PerfTimer {
    name: &'static str,
    start: Instant,
    #[cfg(feature = "telemetry")]
    category: TimerCategory,
}

/// Kind of layout work being timed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerCategory {
    /// Bottom-up natural size measurement
    Measure,
    /// Top-down arrangement pass
    Arrange,
    /// Climb from a changed node to its layout root
    Propagate,
    /// Anything else
    General,
}

impl PerfTimer {
    /// Create a general timer. The timer starts immediately.
    #[inline]
    pub fn new(name: &'static str) -> Self {
        Self::with_category(name, TimerCategory::General)
    }

    #[inline]
    #[cfg(feature = "telemetry")]
    pub fn with_category(name: &'static str, category: TimerCategory) -> Self {
        Self {
            name,
            start: Instant::now(),
            category,
        }
    }

    #[inline]
    #[cfg(not(feature = "telemetry"))]
    pub fn with_category(name: &'static str, _category: TimerCategory) -> Self {
        Self {
            name,
            start: Instant::now(),
        }
    }

    #[inline]
    pub fn measure(name: &'static str) -> Self {
        Self::with_category(name, TimerCategory::Measure)
    }

    #[inline]
    pub fn arrange(name: &'static str) -> Self {
        Self::with_category(name, TimerCategory::Arrange)
    }

    #[inline]
    pub fn propagate(name: &'static str) -> Self {
        Self::with_category(name, TimerCategory::Propagate)
    }

    /// Elapsed time in milliseconds
    #[inline]
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Stop without recording and return the elapsed milliseconds
    #[inline]
    pub fn stop(self) -> f64 {
        let elapsed = self.elapsed_ms();
        std::mem::forget(self);
        elapsed
    }
}

#[cfg(feature = "telemetry")]
impl Drop for PerfTimer {
    fn drop(&mut self) {
        let elapsed_ms = self.elapsed_ms();

        tracing::trace!(
            target: "perf",
            name = self.name,
            elapsed_ms = elapsed_ms,
            "timer completed"
        );

        if let Ok(mut metrics) = crate::global_metrics().lock() {
            metrics.record_timing(self.name, elapsed_ms, self.category);
        }
    }
}

/// Time the rest of the enclosing scope.
///
/// ```rust
/// use perf::{time_scope, TimerCategory};
///
/// fn relayout() {
///     time_scope!("relayout", TimerCategory::Arrange);
/// }
/// ```
#[macro_export]
macro_rules! time_scope {
    ($name:expr) => {
        let _timer = $crate::PerfTimer::new($name);
    };
    ($name:expr, $category:expr) => {
        let _timer = $crate::PerfTimer::with_category($name, $category);
    };
}
