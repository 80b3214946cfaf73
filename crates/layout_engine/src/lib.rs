//! Layout Engine - grid sizing, arrangement and layout scheduling
//!
//! This crate turns a [`widget_tree::WidgetTree`] into concrete frames:
//! - Measurement computes natural sizes bottom-up, cached per node
//! - Track sizing distributes each container axis among its tracks
//! - Arrangement places children top-down, one frame per visible occupant
//! - Scheduling defers requests behind suspended or unloaded nodes and
//!   coalesces requests raised while a pass runs
//!
//! All scheduling state lives in a [`LayoutContext`]; [`LayoutEngine`] bundles
//! one with the tree it lays out.

mod arrange;
mod config;
mod engine;
mod error;
mod measure;
mod propagation;
mod scheduler;
mod track_sizer;

pub use arrange::*;
pub use config::*;
pub use engine::*;
pub use error::*;
pub use measure::*;
pub use propagation::*;
pub use scheduler::*;
pub use track_sizer::*;
