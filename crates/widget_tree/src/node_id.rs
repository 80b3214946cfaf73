//! Generational node handles

use serde::{Deserialize, Serialize};
use std::fmt;

/// Handle to a node in a [`WidgetTree`](crate::WidgetTree).
///
/// A handle pairs an arena slot with the generation the slot had when the node
/// was created. Once the node is destroyed the slot may be reused, but the old
/// handle keeps its stale generation and no longer resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

impl NodeId {
    pub(crate) const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Slot index in the arena
    pub fn index(&self) -> usize {
        self.index as usize
    }

    /// Generation of the slot when this handle was issued
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}
