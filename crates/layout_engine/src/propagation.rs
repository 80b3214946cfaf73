//! Layout request propagation
//!
//! A request names the node whose content or geometry changed. The walker
//! climbs from there to the layout root, the topmost container or the first
//! layout boundary on the way, clearing the cached natural size of every
//! container it passes. Arrangement then runs top-down from the root.
//!
//! Requests raised while a pass is running are never served recursively. They
//! are queued and served by follow-up passes once the current pass is done,
//! bounded by `LayoutConfig::max_followup_passes`.

use crate::arrange::arrange_roots;
use crate::LayoutContext;
use perf::PerfTimer;
use widget_tree::{NodeId, WidgetTree};

/// Find the layout root for a request from `origin`.
///
/// Starts at `origin` when it is a container, otherwise at its parent. A
/// parentless leaf has no root.
pub fn layout_root(tree: &mut WidgetTree, origin: NodeId) -> Option<NodeId> {
    let node = tree.get(origin)?;
    let mut current = if node.is_container() {
        origin
    } else {
        node.parent()?
    };

    loop {
        tree.invalidate_node(current);
        let node = tree.get(current)?;
        if node.is_layout_boundary() {
            break;
        }
        match node.parent() {
            Some(parent) => current = parent,
            None => break,
        }
    }
    Some(current)
}

/// Request layout for a batch of origins.
///
/// Blocked origins are deferred; the rest are served by a single pass over
/// their layout roots. Requests carried over from an earlier trigger are
/// served along with them.
pub fn request_layout(tree: &mut WidgetTree, ctx: &mut LayoutContext, origins: &[NodeId]) {
    if ctx.in_pass() {
        for origin in origins {
            ctx.queue_reentrant(*origin);
        }
        return;
    }

    let _timer = PerfTimer::propagate("request_layout");
    let mut queue = ctx.take_leftover();
    for origin in origins {
        if !queue.contains(origin) {
            queue.push(*origin);
        }
    }

    let mut roots = Vec::new();
    collect_roots(tree, ctx, &queue, &mut roots);
    if !roots.is_empty() {
        run_passes(tree, ctx, roots);
    }
}

/// Arrange directly from `node` without climbing, e.g. after the platform
/// resized its native window.
pub fn arrange_from(tree: &mut WidgetTree, ctx: &mut LayoutContext, node: NodeId) {
    if ctx.in_pass() {
        ctx.queue_reentrant(node);
        return;
    }
    if let Some(blocker) = ctx.blocker(tree, node) {
        ctx.defer(blocker, node);
        return;
    }

    let _timer = PerfTimer::propagate("arrange_from");
    let leftover = ctx.take_leftover();
    let mut roots = vec![node];
    collect_roots(tree, ctx, &leftover, &mut roots);
    run_passes(tree, ctx, roots);
}

/// Defer blocked origins and resolve the layout roots of the others
fn collect_roots(
    tree: &mut WidgetTree,
    ctx: &mut LayoutContext,
    origins: &[NodeId],
    roots: &mut Vec<NodeId>,
) {
    for &origin in origins {
        if !tree.is_alive(origin) {
            continue;
        }
        if let Some(blocker) = ctx.blocker(tree, origin) {
            ctx.defer(blocker, origin);
            continue;
        }
        if let Some(root) = layout_root(tree, origin) {
            if !roots.contains(&root) {
                roots.push(root);
            }
        }
    }
}

/// Run a pass over `roots`, then follow-up passes for whatever changed size
/// while it ran.
fn run_passes(tree: &mut WidgetTree, ctx: &mut LayoutContext, roots: Vec<NodeId>) {
    run_pass(tree, ctx, &roots);

    let mut followups = 0;
    loop {
        let requests = ctx.take_reentrant();
        if requests.is_empty() {
            break;
        }
        // The natural size of every reporting node changed
        for origin in &requests {
            tree.invalidate(*origin);
        }
        if followups >= ctx.config().max_followup_passes {
            tracing::warn!(
                requests = requests.len(),
                max_followup_passes = ctx.config().max_followup_passes,
                "follow-up limit reached, carrying requests to the next trigger"
            );
            ctx.set_leftover(requests);
            break;
        }
        followups += 1;
        ctx.stats.followup_passes += 1;

        let mut roots = Vec::new();
        collect_roots(tree, ctx, &requests, &mut roots);
        tracing::debug!(followup = followups, roots = roots.len(), "follow-up pass");
        if !roots.is_empty() {
            run_pass(tree, ctx, &roots);
        }
    }
}

fn run_pass(tree: &mut WidgetTree, ctx: &mut LayoutContext, roots: &[NodeId]) {
    ctx.begin_pass();
    let size_changed = arrange_roots(tree, ctx, roots);
    ctx.end_pass();

    for node in size_changed {
        ctx.queue_reentrant(node);
    }
}
