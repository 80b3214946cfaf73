//! Layout engine facade
//!
//! Owns a widget tree together with its [`LayoutContext`] and wires every
//! mutation through invalidation into a layout request.

use crate::measure::natural_size;
use crate::{propagation, LayoutConfig, LayoutContext, LayoutStats, Result};
use perf::PerfTimer;
use widget_tree::{
    Insets, NativePanel, NativeWidget, Node, NodeId, Rect, Size, Spacing, UserSize, WidgetTree,
};

/// A widget tree plus the scheduling state that lays it out
#[derive(Debug, Default)]
pub struct LayoutEngine {
    tree: WidgetTree,
    ctx: LayoutContext,
}

impl LayoutEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: LayoutConfig) -> Result<Self> {
        Ok(Self {
            tree: WidgetTree::new(),
            ctx: LayoutContext::with_config(config)?,
        })
    }

    pub fn tree(&self) -> &WidgetTree {
        &self.tree
    }

    /// Direct tree access. Mutations made here only invalidate caches; call
    /// [`request_layout`](Self::request_layout) to have them arranged.
    pub fn tree_mut(&mut self) -> &mut WidgetTree {
        &mut self.tree
    }

    pub fn context(&self) -> &LayoutContext {
        &self.ctx
    }

    pub fn config(&self) -> &LayoutConfig {
        self.ctx.config()
    }

    pub fn stats(&self) -> &LayoutStats {
        self.ctx.stats()
    }

    pub fn reset_stats(&mut self) {
        self.ctx.reset_stats();
    }

    pub fn node(&self, id: NodeId) -> Result<&Node> {
        Ok(self.tree.node(id)?)
    }

    /// Last frame assigned to `id`, local to its parent
    pub fn frame(&self, id: NodeId) -> Option<Rect> {
        self.tree.get(id).and_then(Node::frame)
    }

    // ========== Creation ==========

    pub fn create_leaf<W: NativeWidget + 'static>(&mut self, widget: W) -> NodeId {
        self.tree.create_leaf(widget)
    }

    /// Create a container carrying the configured default padding, spacing and
    /// orientation
    pub fn create_container(&mut self, cols: usize, rows: usize) -> Result<NodeId> {
        let id = self.tree.create_container(cols, rows);
        let config = self.ctx.config();
        let (padding, spacing, flipped) = (
            config.default_padding,
            config.default_spacing,
            config.flipped_by_default,
        );
        self.tree.set_padding(id, padding)?;
        self.tree.set_spacing(id, spacing)?;
        self.tree.set_flipped(id, flipped)?;
        Ok(id)
    }

    pub fn set_native_panel<P: NativePanel + 'static>(
        &mut self,
        container: NodeId,
        panel: P,
    ) -> Result<()> {
        self.tree.set_native_panel(container, panel)?;
        Ok(())
    }

    /// Destroy a node; its former parent is laid out again
    pub fn destroy(&mut self, id: NodeId) -> Result<()> {
        let parent = self.tree.node(id)?.parent();
        self.tree.destroy(id)?;
        self.ctx.forget(id);
        if let Some(parent) = parent {
            self.request_layout(parent);
        }
        Ok(())
    }

    // ========== Mutation API ==========

    /// Place `child` at `(col, row)`; returns the released previous occupant
    pub fn add(
        &mut self,
        container: NodeId,
        child: NodeId,
        col: usize,
        row: usize,
    ) -> Result<Option<NodeId>> {
        let previous_parent = self.tree.node(child)?.parent();
        let displaced = self.tree.add(container, child, col, row)?;

        let mut origins = vec![child];
        if let Some(previous) = previous_parent.filter(|p| *p != container) {
            origins.push(previous);
        }
        self.request_layout_many(&origins);
        Ok(displaced)
    }

    pub fn move_child(
        &mut self,
        container: NodeId,
        child: NodeId,
        col: usize,
        row: usize,
    ) -> Result<Option<NodeId>> {
        let displaced = self.tree.move_child(container, child, col, row)?;
        self.request_layout(container);
        Ok(displaced)
    }

    pub fn remove(&mut self, container: NodeId, child: NodeId) -> Result<()> {
        self.tree.remove(container, child)?;
        self.request_layout(container);
        Ok(())
    }

    pub fn resize_grid(&mut self, container: NodeId, cols: usize, rows: usize) -> Result<Vec<NodeId>> {
        let released = self.tree.resize_grid(container, cols, rows)?;
        self.request_layout(container);
        Ok(released)
    }

    pub fn set_column_scale(&mut self, container: NodeId, col: usize, scale: bool) -> Result<()> {
        self.tree.set_column_scale(container, col, scale)?;
        self.request_layout(container);
        Ok(())
    }

    pub fn set_row_scale(&mut self, container: NodeId, row: usize, scale: bool) -> Result<()> {
        self.tree.set_row_scale(container, row, scale)?;
        self.request_layout(container);
        Ok(())
    }

    pub fn set_padding(&mut self, container: NodeId, padding: Insets) -> Result<()> {
        self.tree.set_padding(container, padding)?;
        self.request_layout(container);
        Ok(())
    }

    pub fn set_spacing(&mut self, container: NodeId, spacing: Spacing) -> Result<()> {
        self.tree.set_spacing(container, spacing)?;
        self.request_layout(container);
        Ok(())
    }

    pub fn set_flipped(&mut self, container: NodeId, flipped: bool) -> Result<()> {
        self.tree.set_flipped(container, flipped)?;
        self.request_layout(container);
        Ok(())
    }

    pub fn set_visible(&mut self, id: NodeId, visible: bool) -> Result<()> {
        self.tree.set_visible(id, visible)?;
        self.request_layout(id);
        Ok(())
    }

    pub fn set_user_size(&mut self, id: NodeId, size: UserSize) -> Result<()> {
        self.tree.set_user_size(id, size)?;
        self.request_layout(id);
        Ok(())
    }

    pub fn set_min_size(&mut self, id: NodeId, size: Size) -> Result<()> {
        self.tree.set_min_size(id, size)?;
        self.request_layout(id);
        Ok(())
    }

    pub fn set_max_size(&mut self, id: NodeId, size: Size) -> Result<()> {
        self.tree.set_max_size(id, size)?;
        self.request_layout(id);
        Ok(())
    }

    pub fn set_layout_boundary(&mut self, id: NodeId, boundary: bool) -> Result<()> {
        self.tree.set_layout_boundary(id, boundary)?;
        Ok(())
    }

    pub fn set_auto_size(&mut self, id: NodeId, auto_size: bool) -> Result<()> {
        self.tree.set_auto_size(id, auto_size)?;
        self.request_layout(id);
        Ok(())
    }

    /// Text, font or image of a leaf changed
    pub fn content_changed(&mut self, leaf: NodeId) -> Result<()> {
        self.tree.content_changed(leaf)?;
        self.request_layout(leaf);
        Ok(())
    }

    // ========== Measurement and scheduling ==========

    pub fn natural_size(&mut self, id: NodeId, available: Size) -> Result<Size> {
        self.tree.node(id)?;
        let _timer = PerfTimer::measure("natural_size");
        Ok(natural_size(&mut self.tree, &mut self.ctx, id, available))
    }

    pub fn request_layout(&mut self, id: NodeId) {
        self.request_layout_many(&[id]);
    }

    pub fn request_layout_many(&mut self, origins: &[NodeId]) {
        propagation::request_layout(&mut self.tree, &mut self.ctx, origins);
    }

    /// Defer layout of `id` and its subtree until the matching resume
    pub fn suspend_layout(&mut self, id: NodeId) -> Result<()> {
        self.tree.node(id)?;
        self.ctx.suspend(id);
        Ok(())
    }

    pub fn resume_layout(&mut self, id: NodeId) -> Result<()> {
        self.ctx.resume(&mut self.tree, id)
    }

    /// Run `batch` inside a suspend/resume bracket on `id`
    pub fn batch<T>(
        &mut self,
        id: NodeId,
        batch: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        self.suspend_layout(id)?;
        let result = batch(self);
        self.resume_layout(id)?;
        result
    }

    // ========== Native lifecycle ==========

    pub fn on_load(&mut self, id: NodeId) -> Result<()> {
        self.ctx.on_load(&mut self.tree, id)
    }

    pub fn on_load_complete(&mut self, id: NodeId) -> Result<()> {
        self.ctx.on_load_complete(&mut self.tree, id)
    }

    pub fn on_unload(&mut self, id: NodeId) -> Result<()> {
        self.ctx.on_unload(&mut self.tree, id)
    }

    pub fn native_resized(&mut self, id: NodeId, frame: Rect) -> Result<()> {
        self.ctx.native_resized(&mut self.tree, id, frame)
    }
}
