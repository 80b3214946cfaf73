//! Capability interfaces implemented by native widget bindings
//!
//! The layout engine never depends on concrete widget types. A platform
//! binding exposes exactly what layout needs:
//! - [`Measurable`]: report a natural size for an available size
//! - [`Arrangeable`]: accept a frame assigned by the arrange pass
//! - [`Scalable`]: per-axis scaling flags of a grid

use crate::{Axis, NodeId, Rect, Result, Size};
use std::fmt::Debug;

/// Native measurement hook.
///
/// Must be idempotent: the same widget state and available size always yield
/// the same result.
pub trait Measurable {
    fn measure(&self, available: Size) -> Size;
}

/// Native placement hook.
pub trait Arrangeable {
    /// Move/resize the native widget. `frame` is in the coordinate space of the
    /// parent container.
    ///
    /// Bindings report side effects of the resize (for example a label that
    /// re-wrapped and now wants a different height) through `events`.
    fn set_frame(&mut self, frame: Rect, events: &mut NativeEvents);
}

/// A native widget wrapped by a leaf node
pub trait NativeWidget: Measurable + Arrangeable + Debug {}

impl<T: Measurable + Arrangeable + Debug> NativeWidget for T {}

/// Native panel backing a container; only ever placed, never measured
pub trait NativePanel: Arrangeable + Debug {}

impl<T: Arrangeable + Debug> NativePanel for T {}

/// Scaling flags of a grid, per axis
pub trait Scalable {
    /// Number of tracks on an axis
    fn track_count(&self, axis: Axis) -> usize;

    /// Whether a track is explicitly marked scaling
    fn is_scaling(&self, axis: Axis, index: usize) -> bool;

    fn set_scaling(&mut self, axis: Axis, index: usize, scale: bool) -> Result<()>;

    /// The track that absorbs slack when no track on the axis is explicitly
    /// scaling: the last one. `None` as soon as any track is marked.
    fn implicit_scale_track(&self, axis: Axis) -> Option<usize> {
        let count = self.track_count(axis);
        if count == 0 || (0..count).any(|i| self.is_scaling(axis, i)) {
            None
        } else {
            Some(count - 1)
        }
    }

    /// Explicit or implicit scaling
    fn is_effective_scaling(&self, axis: Axis, index: usize) -> bool {
        self.is_scaling(axis, index) || self.implicit_scale_track(axis) == Some(index)
    }
}

/// Notifications raised by native bindings while a frame is being applied.
///
/// Native resize callbacks arrive synchronously on the UI thread in the middle
/// of an arrange pass. Rather than calling back into the engine, bindings record
/// them here and the engine coalesces them once the pass is done.
#[derive(Debug, Default)]
pub struct NativeEvents {
    /// Node whose frame is being applied
    current: Option<NodeId>,
    size_changed: Vec<NodeId>,
}

impl NativeEvents {
    /// Events raised while applying the frame of `node`
    pub fn for_node(node: NodeId) -> Self {
        Self {
            current: Some(node),
            size_changed: Vec::new(),
        }
    }

    /// The natural size of the widget being placed changed
    pub fn natural_size_changed(&mut self) {
        if let Some(node) = self.current {
            self.size_changed(node);
        }
    }

    /// The natural size of `node` changed as a side effect of the resize
    pub fn size_changed(&mut self, node: NodeId) {
        if !self.size_changed.contains(&node) {
            self.size_changed.push(node);
        }
    }

    pub fn take(&mut self) -> Vec<NodeId> {
        std::mem::take(&mut self.size_changed)
    }
}
