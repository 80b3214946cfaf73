//! Arrangement pass
//!
//! Top-down walk that turns track sizes into child frames. Frames are local to
//! the parent container. A child container is arranged in turn when its frame
//! changed or its subtree was invalidated; untouched subtrees are skipped.
//!
//! Native bindings may report natural size changes while a frame is applied.
//! Those are collected and handed back to the caller instead of being acted on
//! mid-pass.

use crate::measure::{content_hint, measure_children, natural_size, track_minimums, track_specs};
use crate::{size_tracks, track_offsets, LayoutContext, TrackInput};
use perf::PerfTimer;
use std::collections::HashSet;
use widget_tree::{Axis, NativeEvents, Node, NodeId, Point, Rect, Scalable, Size, WidgetTree};

/// One arrangement pass over a tree
pub struct ArrangePass<'a> {
    tree: &'a mut WidgetTree,
    ctx: &'a mut LayoutContext,
    /// Containers already arranged in this pass
    arranged: HashSet<NodeId>,
    size_changed: Vec<NodeId>,
}

impl<'a> ArrangePass<'a> {
    pub fn new(tree: &'a mut WidgetTree, ctx: &'a mut LayoutContext) -> Self {
        Self {
            tree,
            ctx,
            arranged: HashSet::new(),
            size_changed: Vec::new(),
        }
    }

    /// Arrange downward from a layout root.
    ///
    /// The root keeps its current frame. A root that was never placed gets its
    /// natural size at the origin, and an auto-size root is resized to its
    /// natural size before its children are placed.
    pub fn arrange_root(&mut self, root: NodeId) {
        let Some(node) = self.tree.get(root) else {
            return;
        };
        let current = node.frame();
        let auto_size = node.is_auto_size();

        if auto_size || current.is_none() {
            let natural = natural_size(self.tree, self.ctx, root, Size::UNCONSTRAINED);
            let origin = current.map(|frame| frame.origin()).unwrap_or_default();
            let frame = Rect::from_origin_size(origin, natural);
            tracing::debug!(node = %root, ?frame, auto_size, "root sized to content");
            self.apply_frame(root, frame);
        }

        if self.tree.get(root).is_some_and(Node::is_container) {
            self.arrange(root);
        }
    }

    /// Place the children of `container` inside its current frame
    pub fn arrange(&mut self, container: NodeId) {
        if !self.arranged.insert(container) {
            tracing::trace!(node = %container, "already arranged in this pass");
            return;
        }
        if let Some(blocker) = self.ctx.blocker(self.tree, container) {
            self.ctx.defer(blocker, container);
            return;
        }

        let Some(node) = self.tree.get(container) else {
            return;
        };
        let (Some(frame), Some(grid)) = (node.frame(), node.grid()) else {
            return;
        };
        let padding = grid.padding;
        let spacing = grid.spacing;
        let flipped = grid.flipped;
        let counts = [grid.cols(), grid.rows()];

        let content = content_hint(grid, frame.size());
        let children = measure_children(self.tree, self.ctx, container, content);

        let mut sizes: [Vec<f32>; 2] = Default::default();
        let mut offsets: [Vec<f32>; 2] = Default::default();
        let Some(grid) = self.tree.get(container).and_then(Node::grid) else {
            return;
        };
        for (slot, (axis, count)) in Axis::ALL.into_iter().zip(counts).enumerate() {
            let minimums = track_minimums(&children, count, axis);
            let input = TrackInput::new(
                track_specs(grid, &minimums, axis),
                grid.implicit_scale_track(axis),
                content.main(axis),
            );
            sizes[slot] = size_tracks(&input);
            offsets[slot] = track_offsets(&sizes[slot], padding.leading(axis), spacing.main(axis));
        }
        let [widths, heights] = &sizes;
        let [xs, ys] = &offsets;

        tracing::trace!(
            node = %container,
            columns = ?widths,
            rows = ?heights,
            "tracks sized"
        );

        for child in children.iter().filter(|child| child.visible) {
            let (col, row) = (child.cell.col, child.cell.row);
            let height = heights[row];
            let y = if flipped {
                frame.height - ys[row] - height
            } else {
                ys[row]
            };
            let child_frame = Rect::from_origin_size(
                Point::new(xs[col], y),
                Size::new(widths[col], height),
            );
            self.place(child.node, child_frame);
        }

        self.ctx.stats.containers_arranged += 1;
        if let Some(node) = self.tree.get_mut(container) {
            node.clear_layout_dirty();
        }
    }

    /// Assign a frame to a child and descend into it when needed. A child
    /// without a live native window is deferred until it loads again.
    fn place(&mut self, child: NodeId, frame: Rect) {
        if self.tree.get(child).is_some_and(|node| !node.is_loaded()) {
            if let Some(blocker) = self.ctx.blocker(self.tree, child) {
                self.ctx.defer(blocker, child);
            }
            return;
        }
        let changed = self.apply_frame(child, frame);
        let descend = self
            .tree
            .get(child)
            .is_some_and(|node| node.is_container() && (changed || node.is_layout_dirty()));
        if descend {
            self.arrange(child);
        }
    }

    /// Record a frame and push it to the native side if it changed
    fn apply_frame(&mut self, id: NodeId, frame: Rect) -> bool {
        let Some(node) = self.tree.get_mut(id) else {
            return false;
        };
        if !node.record_frame(frame) {
            return false;
        }

        let mut events = NativeEvents::for_node(id);
        node.place_native(frame, &mut events);
        tracing::trace!(node = %id, ?frame, "frame assigned");

        for changed in events.take() {
            if !self.size_changed.contains(&changed) {
                self.size_changed.push(changed);
            }
        }
        true
    }

    /// Nodes whose natural size changed while frames were applied
    pub fn finish(self) -> Vec<NodeId> {
        self.size_changed
    }
}

/// Run one pass over `roots`, outermost first. Returns the nodes that reported
/// a natural size change during the pass.
pub fn arrange_roots(
    tree: &mut WidgetTree,
    ctx: &mut LayoutContext,
    roots: &[NodeId],
) -> Vec<NodeId> {
    let _timer = PerfTimer::arrange("arrange_pass");

    let mut ordered: Vec<(usize, NodeId)> = roots
        .iter()
        .map(|&root| (tree.ancestors(root).len(), root))
        .collect();
    ordered.sort();
    ordered.dedup();

    ctx.stats.arrange_passes += 1;
    tracing::debug!(roots = ordered.len(), "arrangement pass");

    let mut pass = ArrangePass::new(tree, ctx);
    for (_, root) in ordered {
        pass.arrange_root(root);
    }
    pass.finish()
}
