//! Error types for widget tree operations

use crate::NodeId;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("Node {0} is not a container")]
    NotAContainer(NodeId),

    #[error("Node {0} is not a leaf")]
    NotALeaf(NodeId),

    #[error("Cell ({col}, {row}) is outside a {cols}x{rows} grid")]
    CellOutOfRange {
        col: usize,
        row: usize,
        cols: usize,
        rows: usize,
    },

    #[error("Track {index} is outside an axis of {count} tracks")]
    TrackOutOfRange { index: usize, count: usize },

    #[error("Node {child} is not a child of container {container}")]
    NotAChild { container: NodeId, child: NodeId },

    #[error("Adding {child} to {container} would make a node its own ancestor")]
    CycleDetected { container: NodeId, child: NodeId },
}

pub type Result<T> = std::result::Result<T, TreeError>;
