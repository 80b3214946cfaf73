//! Layout Pass Telemetry
//!
//! Timing infrastructure for the layout engine:
//! - RAII scope timers for measurement, arrangement and propagation
//! - A metrics collector with per-category samples and summaries
//!
//! # Feature Flags
//!
//! - `telemetry` (default): timers record into the global collector
//!
//! # Example
//!
//! ```rust
//! use perf::{global_metrics, PerfTimer};
//!
//! fn arrange_window() {
//!     let _timer = PerfTimer::arrange("window");
//!     // ... arrange pass ...
//! }
//!
//! arrange_window();
//! let summary = global_metrics().lock().unwrap().summary();
//! assert_eq!(summary.arrange_stats.count, summary.total_arranges);
//! ```

mod metrics;
mod timing;

pub use metrics::*;
pub use timing::*;
