//! Layout nodes stored in the arena

use crate::{CellPos, GridContainer, NativeEvents, NativeWidget, NodeId, Rect, Size, UserSize};
use serde::{Deserialize, Serialize};

/// Whether a node is attached to a live native window
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoadState {
    /// Not attached; layout requests are deferred
    #[default]
    Unloaded,
    /// Attached, load in progress; layout requests are deferred
    Loading,
    /// Live; layout runs
    Loaded,
}

/// Memoized natural size and the available size it was measured for
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeasureCache {
    pub available: Size,
    pub size: Size,
}

/// Leaf or container payload of a node
#[derive(Debug)]
pub enum NodeKind {
    /// Wraps a native widget
    Leaf(Box<dyn NativeWidget>),
    /// Owns a grid of child nodes
    Container(GridContainer),
}

/// A node in the widget tree
#[derive(Debug)]
pub struct Node {
    pub(crate) kind: NodeKind,
    pub(crate) parent: Option<NodeId>,
    /// Slot in the parent grid
    pub(crate) cell: Option<CellPos>,
    pub(crate) visible: bool,
    pub(crate) user_size: UserSize,
    pub(crate) min_size: Size,
    pub(crate) max_size: Size,
    measure_cache: Option<MeasureCache>,
    /// Last frame assigned by the arrange pass
    frame: Option<Rect>,
    layout_dirty: bool,
    pub(crate) layout_boundary: bool,
    pub(crate) auto_size: bool,
    pub(crate) load_state: LoadState,
}

impl Node {
    pub(crate) fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            parent: None,
            cell: None,
            visible: true,
            user_size: UserSize::AUTO,
            min_size: Size::ZERO,
            max_size: Size::UNCONSTRAINED,
            measure_cache: None,
            frame: None,
            layout_dirty: true,
            layout_boundary: false,
            auto_size: false,
            load_state: LoadState::Unloaded,
        }
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn is_container(&self) -> bool {
        matches!(self.kind, NodeKind::Container(_))
    }

    pub fn grid(&self) -> Option<&GridContainer> {
        match &self.kind {
            NodeKind::Container(grid) => Some(grid),
            NodeKind::Leaf(_) => None,
        }
    }

    pub(crate) fn grid_mut(&mut self) -> Option<&mut GridContainer> {
        match &mut self.kind {
            NodeKind::Container(grid) => Some(grid),
            NodeKind::Leaf(_) => None,
        }
    }

    pub fn widget(&self) -> Option<&dyn NativeWidget> {
        match &self.kind {
            NodeKind::Leaf(widget) => Some(widget.as_ref()),
            NodeKind::Container(_) => None,
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn cell(&self) -> Option<CellPos> {
        self.cell
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn user_size(&self) -> UserSize {
        self.user_size
    }

    pub fn min_size(&self) -> Size {
        self.min_size
    }

    pub fn max_size(&self) -> Size {
        self.max_size
    }

    /// Stops the propagation climb (e.g. a scroll viewport)
    pub fn is_layout_boundary(&self) -> bool {
        self.layout_boundary
    }

    /// Resizes itself to its content before being arranged
    pub fn is_auto_size(&self) -> bool {
        self.auto_size
    }

    pub fn load_state(&self) -> LoadState {
        self.load_state
    }

    pub fn is_loaded(&self) -> bool {
        self.load_state == LoadState::Loaded
    }

    /// Cached natural size, if it was measured for exactly `available`
    pub fn cached_measure(&self, available: Size) -> Option<Size> {
        self.measure_cache
            .filter(|cache| cache.available == available)
            .map(|cache| cache.size)
    }

    pub fn measure_cache(&self) -> Option<MeasureCache> {
        self.measure_cache
    }

    pub fn store_measure(&mut self, available: Size, size: Size) {
        self.measure_cache = Some(MeasureCache { available, size });
    }

    pub(crate) fn clear_measure(&mut self) {
        self.measure_cache = None;
    }

    pub fn frame(&self) -> Option<Rect> {
        self.frame
    }

    /// Record a newly assigned frame; returns whether it differs from the last
    pub fn record_frame(&mut self, frame: Rect) -> bool {
        let changed = self.frame != Some(frame);
        self.frame = Some(frame);
        changed
    }

    /// Forget the last frame so the next arrange pass places the node again
    pub(crate) fn reset_frame(&mut self) {
        self.frame = None;
    }

    /// Push a frame to the native widget or panel backing this node
    pub fn place_native(&mut self, frame: Rect, events: &mut NativeEvents) {
        match &mut self.kind {
            NodeKind::Leaf(widget) => widget.set_frame(frame, events),
            NodeKind::Container(grid) => {
                if let Some(panel) = grid.native.as_mut() {
                    panel.set_frame(frame, events);
                }
            }
        }
    }

    /// Children need re-arranging even if the frame did not change
    pub fn is_layout_dirty(&self) -> bool {
        self.layout_dirty
    }

    pub fn mark_layout_dirty(&mut self) {
        self.layout_dirty = true;
    }

    pub fn clear_layout_dirty(&mut self) {
        self.layout_dirty = false;
    }
}
