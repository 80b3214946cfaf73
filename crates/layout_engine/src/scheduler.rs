//! Layout scheduling: suspension, deferral and load lifecycle
//!
//! A [`LayoutContext`] is passed into every engine entry point and carries all
//! scheduling state. Nothing here is process-wide.
//!
//! A layout request is deferred when something on the path from its origin to
//! the top of the tree blocks it:
//! - a node that is not loaded yet (the topmost such node becomes the blocker)
//! - otherwise a suspended node (the outermost one becomes the blocker)
//!
//! Deferred origins are stored per blocker and dispatched again when the
//! blocker resumes or finishes loading. Dispatching re-checks the path, so a
//! request deferred under an outer suspension moves to an inner one that is
//! still held.

use crate::{propagation, LayoutConfig, LayoutError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use widget_tree::{LoadState, NodeId, Rect, WidgetTree};

/// Layout instrumentation counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutStats {
    /// Arrangement passes run, follow-up passes included
    pub arrange_passes: u64,
    /// Containers whose children were placed
    pub containers_arranged: u64,
    /// Natural-size queries answered from the cache
    pub measure_hits: u64,
    /// Natural-size queries that had to compute
    pub measure_misses: u64,
    /// Calls into native measurement hooks
    pub native_measures: u64,
    /// Requests parked behind a suspended or unloaded node
    pub deferred_requests: u64,
    /// Requests raised during a pass and folded into a follow-up
    pub coalesced_requests: u64,
    /// Follow-up passes run for coalesced requests
    pub followup_passes: u64,
}

impl LayoutStats {
    /// Measurement cache hit ratio (0.0 to 1.0)
    pub fn hit_ratio(&self) -> f32 {
        let total = self.measure_hits + self.measure_misses;
        if total == 0 {
            0.0
        } else {
            self.measure_hits as f32 / total as f32
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Scheduling state for one widget tree
#[derive(Debug, Default)]
pub struct LayoutContext {
    config: LayoutConfig,
    /// Suspend depth per node
    suspended: HashMap<NodeId, u32>,
    /// Deferred origins keyed by the node blocking them
    pending: HashMap<NodeId, Vec<NodeId>>,
    in_pass: bool,
    /// Requests raised while a pass was running
    reentrant: Vec<NodeId>,
    /// Requests left over after the last follow-up pass
    leftover: Vec<NodeId>,
    pub(crate) stats: LayoutStats,
}

impl LayoutContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context with a validated configuration
    pub fn with_config(config: LayoutConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::default()
        })
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn stats(&self) -> &LayoutStats {
        &self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats.reset();
    }

    // ========== Suspension ==========

    /// Suspend layout for `node` and its subtree. Returns the new depth.
    pub fn suspend(&mut self, node: NodeId) -> u32 {
        let depth = self.suspended.entry(node).or_insert(0);
        *depth += 1;
        tracing::debug!(node = %node, depth = *depth, "layout suspended");
        *depth
    }

    /// Undo one [`suspend`](Self::suspend). When the depth reaches zero, the
    /// requests deferred under `node` are dispatched as one pass.
    pub fn resume(&mut self, tree: &mut WidgetTree, node: NodeId) -> Result<()> {
        let depth = match self.suspended.get_mut(&node) {
            Some(depth) => depth,
            None => return Err(LayoutError::NotSuspended(node)),
        };
        *depth -= 1;
        let remaining = *depth;
        tracing::debug!(node = %node, depth = remaining, "layout resumed");

        if remaining == 0 {
            self.suspended.remove(&node);
            let origins = self.take_pending(node);
            if !origins.is_empty() {
                propagation::request_layout(tree, self, &origins);
            }
        }
        Ok(())
    }

    pub fn suspend_depth(&self, node: NodeId) -> u32 {
        self.suspended.get(&node).copied().unwrap_or(0)
    }

    pub fn is_suspended(&self, node: NodeId) -> bool {
        self.suspend_depth(node) > 0
    }

    /// Outermost suspended node among `node` and its ancestors
    pub fn suspension_blocker(&self, tree: &WidgetTree, node: NodeId) -> Option<NodeId> {
        std::iter::once(node)
            .chain(tree.ancestors(node))
            .filter(|id| self.is_suspended(*id))
            .last()
    }

    /// Node that keeps a request from `origin` from running now, if any
    pub fn blocker(&self, tree: &WidgetTree, origin: NodeId) -> Option<NodeId> {
        let unloaded = std::iter::once(origin)
            .chain(tree.ancestors(origin))
            .filter(|id| tree.get(*id).is_some_and(|node| !node.is_loaded()))
            .last();
        unloaded.or_else(|| self.suspension_blocker(tree, origin))
    }

    // ========== Pending requests ==========

    /// Park a request until `blocker` resumes or finishes loading
    pub fn defer(&mut self, blocker: NodeId, origin: NodeId) {
        let origins = self.pending.entry(blocker).or_default();
        if !origins.contains(&origin) {
            origins.push(origin);
        }
        self.stats.deferred_requests += 1;
        tracing::debug!(origin = %origin, blocker = %blocker, "layout request deferred");
    }

    /// Whether requests are parked behind `node`
    pub fn has_pending(&self, node: NodeId) -> bool {
        self.pending.get(&node).is_some_and(|origins| !origins.is_empty())
    }

    /// Number of parked requests across all blockers
    pub fn pending_count(&self) -> usize {
        self.pending.values().map(Vec::len).sum()
    }

    pub(crate) fn take_pending(&mut self, blocker: NodeId) -> Vec<NodeId> {
        self.pending.remove(&blocker).unwrap_or_default()
    }

    /// Drop every request parked behind or raised from `nodes`
    pub(crate) fn drop_pending(&mut self, nodes: &[NodeId]) {
        for node in nodes {
            self.pending.remove(node);
        }
        for origins in self.pending.values_mut() {
            origins.retain(|origin| !nodes.contains(origin));
        }
        self.pending.retain(|_, origins| !origins.is_empty());
        self.leftover.retain(|origin| !nodes.contains(origin));
    }

    /// Forget all scheduling state of a destroyed node
    pub(crate) fn forget(&mut self, node: NodeId) {
        self.suspended.remove(&node);
        self.drop_pending(&[node]);
    }

    // ========== Pass bookkeeping ==========

    pub fn in_pass(&self) -> bool {
        self.in_pass
    }

    pub(crate) fn begin_pass(&mut self) {
        self.in_pass = true;
    }

    pub(crate) fn end_pass(&mut self) {
        self.in_pass = false;
    }

    /// Fold a request raised during a pass into the next follow-up
    pub(crate) fn queue_reentrant(&mut self, origin: NodeId) {
        if !self.reentrant.contains(&origin) {
            self.reentrant.push(origin);
        }
        self.stats.coalesced_requests += 1;
    }

    pub(crate) fn take_reentrant(&mut self) -> Vec<NodeId> {
        std::mem::take(&mut self.reentrant)
    }

    pub(crate) fn set_leftover(&mut self, origins: Vec<NodeId>) {
        self.leftover = origins;
    }

    pub(crate) fn take_leftover(&mut self) -> Vec<NodeId> {
        std::mem::take(&mut self.leftover)
    }

    /// Requests carried over to the next trigger
    pub fn leftover(&self) -> &[NodeId] {
        &self.leftover
    }

    // ========== Load lifecycle ==========

    /// The native window of `node` started loading; layout stays deferred
    pub fn on_load(&mut self, tree: &mut WidgetTree, node: NodeId) -> Result<()> {
        tree.set_subtree_load_state(node, LoadState::Loading)?;
        tracing::debug!(node = %node, "load started");
        Ok(())
    }

    /// Loading finished: mark the subtree live and run one pass covering
    /// `node` and every request that waited for it.
    pub fn on_load_complete(&mut self, tree: &mut WidgetTree, node: NodeId) -> Result<()> {
        let subtree = tree.descendants(node)?;
        tree.set_subtree_load_state(node, LoadState::Loaded)?;

        let mut origins = Vec::new();
        for id in &subtree {
            if *id != node && self.is_suspended(*id) {
                continue;
            }
            for origin in self.take_pending(*id) {
                if !origins.contains(&origin) {
                    origins.push(origin);
                }
            }
        }
        if !origins.contains(&node) {
            origins.push(node);
        }

        tracing::debug!(node = %node, requests = origins.len(), "load complete");
        propagation::request_layout(tree, self, &origins);
        Ok(())
    }

    /// The native window of `node` went away
    pub fn on_unload(&mut self, tree: &mut WidgetTree, node: NodeId) -> Result<()> {
        let subtree = tree.descendants(node)?;
        tree.set_subtree_load_state(node, LoadState::Unloaded)?;
        self.drop_pending(&subtree);
        tracing::debug!(node = %node, "unloaded");
        Ok(())
    }

    /// The platform resized the native window or panel of `node`. The frame is
    /// recorded and the node's children are arranged inside it.
    ///
    /// An auto-size node stops following its content from here on; the
    /// platform frame is kept until the host sets auto-size again.
    pub fn native_resized(
        &mut self,
        tree: &mut WidgetTree,
        node: NodeId,
        frame: Rect,
    ) -> Result<()> {
        if tree.node(node)?.is_auto_size() {
            tree.set_auto_size(node, false)?;
            tracing::debug!(node = %node, "auto-size released by native resize");
        }
        let target = tree.node_mut(node)?;
        target.record_frame(frame);
        target.mark_layout_dirty();
        let is_container = target.is_container();
        tracing::debug!(node = %node, ?frame, "native resize");

        if is_container {
            propagation::arrange_from(tree, self, node);
        }
        Ok(())
    }
}
