//! Widget Tree - layout nodes, grid containers and native widget capabilities
//!
//! This crate holds the abstract control tree that the layout engine works on.
//! Nodes live in a generational arena and refer to each other by [`NodeId`]:
//! - Leaves wrap a native widget that can be measured and placed
//! - Containers own a grid of child slots plus per-axis scaling flags
//!
//! Every mutation clears the natural-size cache of the affected node and of its
//! parent, so the next measurement never sees stale content.

mod capability;
mod error;
mod fixed_widget;
mod geometry;
mod grid;
mod node;
mod node_id;
mod tree;

pub use capability::*;
pub use error::*;
pub use fixed_widget::*;
pub use geometry::*;
pub use grid::*;
pub use node::*;
pub use node_id::*;
pub use tree::*;
