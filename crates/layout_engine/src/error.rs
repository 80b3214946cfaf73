//! Error types for layout engine

use thiserror::Error;
use widget_tree::NodeId;

#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("Widget tree error: {0}")]
    Tree(#[from] widget_tree::TreeError),

    #[error("Resume without matching suspend on node {0}")]
    NotSuspended(NodeId),

    #[error("Invalid layout configuration: {0}")]
    InvalidConfig(String),

    #[error("Configuration parse error: {0}")]
    ConfigParse(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, LayoutError>;
