//! Natural size measurement with a per-node cache
//!
//! Measurement runs bottom-up: a container's natural size is derived from the
//! natural sizes of its occupants. Each node memoizes the last available size
//! it was measured for together with the result. Mutators in the widget tree
//! clear that entry (see `WidgetTree::invalidate`), so a hit is never stale.

use crate::{LayoutContext, TrackSpec};
use widget_tree::{Axis, CellPos, GridContainer, Node, NodeId, Scalable, Size, WidgetTree};

/// An occupant of a grid together with its natural size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeasuredChild {
    pub cell: CellPos,
    pub node: NodeId,
    pub size: Size,
    pub visible: bool,
}

/// Natural size of `id` for the given available size.
///
/// Invisible nodes measure as zero. A user size overrides the available hint
/// and the measured value on its axis, and the result is clamped into the
/// node's `[min, max]` range.
pub fn natural_size(
    tree: &mut WidgetTree,
    ctx: &mut LayoutContext,
    id: NodeId,
    available: Size,
) -> Size {
    let Some(node) = tree.get(id) else {
        return Size::ZERO;
    };
    if !node.is_visible() {
        return Size::ZERO;
    }

    let user_size = node.user_size();
    let (min, max) = (node.min_size(), node.max_size());
    let hint = user_size.apply(available);

    if ctx.config().measure_cache_enabled {
        if let Some(size) = node.cached_measure(hint) {
            ctx.stats.measure_hits += 1;
            tracing::trace!(node = %id, ?size, "measure cache hit");
            return size;
        }
    }
    ctx.stats.measure_misses += 1;

    let measured = if node.is_container() {
        container_natural_size(tree, ctx, id, hint)
    } else {
        ctx.stats.native_measures += 1;
        node.widget()
            .map(|widget| widget.measure(hint))
            .unwrap_or_default()
    };
    let size = user_size.apply(measured).clamp(min, max);

    if let Some(node) = tree.get_mut(id) {
        node.store_measure(hint, size);
    }
    tracing::trace!(node = %id, ?hint, ?size, "measured");
    size
}

/// Sum of track minimums plus spacing and padding, per axis
fn container_natural_size(
    tree: &mut WidgetTree,
    ctx: &mut LayoutContext,
    id: NodeId,
    available: Size,
) -> Size {
    let Some(grid) = tree.get(id).and_then(Node::grid) else {
        return Size::ZERO;
    };
    let padding = grid.padding;
    let spacing = grid.spacing;
    let counts = [grid.cols(), grid.rows()];
    let hint = content_hint(grid, available);

    let children = measure_children(tree, ctx, id, hint);

    let mut size = Size::ZERO;
    for (axis, count) in Axis::ALL.into_iter().zip(counts) {
        let tracks: f32 = track_minimums(&children, count, axis).iter().sum();
        size.set_main(axis, tracks + spacing.total(axis, count) + padding.total(axis));
    }
    size
}

/// Room left for the tracks of `grid` inside `outer` once padding and
/// spacing are taken out. Occupants are measured against this size both when
/// the container is measured and when it is arranged.
pub fn content_hint(grid: &GridContainer, outer: Size) -> Size {
    let mut content = outer.deflate(grid.padding);
    for (axis, count) in Axis::ALL.into_iter().zip([grid.cols(), grid.rows()]) {
        let room = (content.main(axis) - grid.spacing.total(axis, count)).max(0.0);
        content.set_main(axis, room);
    }
    content
}

/// Measure every occupant of a container against its content size
pub fn measure_children(
    tree: &mut WidgetTree,
    ctx: &mut LayoutContext,
    container: NodeId,
    content: Size,
) -> Vec<MeasuredChild> {
    let occupants: Vec<(CellPos, NodeId)> = match tree.get(container).and_then(Node::grid) {
        Some(grid) => grid.occupants().collect(),
        None => return Vec::new(),
    };

    occupants
        .into_iter()
        .map(|(cell, node)| {
            let visible = tree.get(node).is_some_and(Node::is_visible);
            let size = natural_size(tree, ctx, node, content);
            MeasuredChild {
                cell,
                node,
                size,
                visible,
            }
        })
        .collect()
}

/// Largest natural size per track on an axis, 0 for empty tracks
pub fn track_minimums(children: &[MeasuredChild], count: usize, axis: Axis) -> Vec<f32> {
    let mut minimums = vec![0.0f32; count];
    for child in children.iter().filter(|child| child.visible) {
        if let Some(slot) = minimums.get_mut(child.cell.track(axis)) {
            *slot = slot.max(child.size.main(axis));
        }
    }
    minimums
}

/// Track sizing input for one axis of a grid
pub fn track_specs(grid: &GridContainer, minimums: &[f32], axis: Axis) -> Vec<TrackSpec> {
    minimums
        .iter()
        .enumerate()
        .map(|(index, &min)| TrackSpec {
            min,
            scaling: grid.is_scaling(axis, index),
            explicit: None,
        })
        .collect()
}
