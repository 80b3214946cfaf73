//! Widget tree storage and mutation
//!
//! Nodes live in a generational arena. A container holds child handles in its
//! grid and each child holds a single parent handle, both resolved through the
//! arena, so there are no owning back-references.
//!
//! Every content-mutating operation calls [`WidgetTree::invalidate`], which
//! clears the natural-size cache of the node and of its parent. Ancestors above
//! the parent are refreshed lazily when the layout engine climbs the tree.

use crate::{
    Axis, CellPos, GridContainer, Insets, LoadState, NativePanel, NativeWidget, Node, NodeId,
    NodeKind, Result, Scalable, Size, Spacing, TreeError, UserSize,
};

#[derive(Debug)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// Arena of layout nodes
#[derive(Debug, Default)]
pub struct WidgetTree {
    slots: Vec<Slot>,
    free_list: Vec<usize>,
}

impl WidgetTree {
    /// Create an empty tree
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live nodes
    pub fn len(&self) -> usize {
        self.slots.len() - self.free_list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the handle still refers to a live node
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.slots
            .get(id.index())
            .filter(|slot| slot.generation == id.generation())
            .and_then(|slot| slot.node.as_ref())
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.slots
            .get_mut(id.index())
            .filter(|slot| slot.generation == id.generation())
            .and_then(|slot| slot.node.as_mut())
    }

    pub fn node(&self, id: NodeId) -> Result<&Node> {
        self.get(id).ok_or(TreeError::NodeNotFound(id))
    }

    pub fn node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.get_mut(id).ok_or(TreeError::NodeNotFound(id))
    }

    pub fn grid(&self, id: NodeId) -> Result<&GridContainer> {
        self.node(id)?.grid().ok_or(TreeError::NotAContainer(id))
    }

    fn grid_mut(&mut self, id: NodeId) -> Result<&mut GridContainer> {
        self.node_mut(id)?
            .grid_mut()
            .ok_or(TreeError::NotAContainer(id))
    }

    fn insert(&mut self, node: Node) -> NodeId {
        if let Some(index) = self.free_list.pop() {
            let slot = &mut self.slots[index];
            slot.generation = slot.generation.wrapping_add(1);
            slot.node = Some(node);
            NodeId::new(index as u32, slot.generation)
        } else {
            self.slots.push(Slot {
                generation: 1,
                node: Some(node),
            });
            NodeId::new((self.slots.len() - 1) as u32, 1)
        }
    }

    /// Create a leaf wrapping a native widget
    pub fn create_leaf<W: NativeWidget + 'static>(&mut self, widget: W) -> NodeId {
        self.insert(Node::new(NodeKind::Leaf(Box::new(widget))))
    }

    /// Create an empty container with a fixed grid shape
    pub fn create_container(&mut self, cols: usize, rows: usize) -> NodeId {
        self.insert(Node::new(NodeKind::Container(GridContainer::new(cols, rows))))
    }

    /// Attach the native panel that receives the container's own frame
    pub fn set_native_panel<P: NativePanel + 'static>(
        &mut self,
        container: NodeId,
        panel: P,
    ) -> Result<()> {
        self.grid_mut(container)?.native = Some(Box::new(panel));
        Ok(())
    }

    /// Destroy a node. A container releases its children, which survive as
    /// parentless nodes and may be added elsewhere.
    pub fn destroy(&mut self, id: NodeId) -> Result<()> {
        self.node(id)?;
        self.detach(id)?;

        let children = self
            .get(id)
            .and_then(Node::grid)
            .map(GridContainer::children)
            .unwrap_or_default();
        for child in &children {
            self.release(*child);
        }

        let slot = &mut self.slots[id.index()];
        slot.node = None;
        self.free_list.push(id.index());

        tracing::debug!(node = %id, released = children.len(), "node destroyed");
        Ok(())
    }

    /// Place `child` into a grid cell.
    ///
    /// A child owned by another container is transferred. The previous
    /// occupant of the cell, if any, is released and returned. The child's
    /// subtree takes the load state of its new container.
    pub fn add(
        &mut self,
        container: NodeId,
        child: NodeId,
        col: usize,
        row: usize,
    ) -> Result<Option<NodeId>> {
        let pos = self.grid(container)?.check_cell(col, row)?;
        self.node(child)?;
        if child == container || self.is_ancestor(child, container) {
            return Err(TreeError::CycleDetected { container, child });
        }

        self.detach(child)?;
        let displaced = self.place(container, child, pos)?;
        Ok(displaced)
    }

    /// Move a child of `container` to another cell
    pub fn move_child(
        &mut self,
        container: NodeId,
        child: NodeId,
        col: usize,
        row: usize,
    ) -> Result<Option<NodeId>> {
        let pos = self.grid(container)?.check_cell(col, row)?;
        let from = self.child_cell(container, child)?;
        if from == pos {
            return Ok(None);
        }

        self.grid_mut(container)?.put(from, None);
        let displaced = self.place(container, child, pos)?;
        Ok(displaced)
    }

    /// Remove a child from its container. The child is released, not destroyed.
    pub fn remove(&mut self, container: NodeId, child: NodeId) -> Result<()> {
        self.child_cell(container, child)?;
        self.detach(child)
    }

    /// Reshape the grid. Out-of-range occupants are released and returned.
    pub fn resize_grid(
        &mut self,
        container: NodeId,
        cols: usize,
        rows: usize,
    ) -> Result<Vec<NodeId>> {
        let released = self.grid_mut(container)?.resize(cols, rows);
        for child in &released {
            self.release(*child);
        }
        self.invalidate(container);

        tracing::debug!(
            container = %container,
            cols,
            rows,
            released = released.len(),
            "grid resized"
        );
        Ok(released)
    }

    pub fn set_column_scale(&mut self, container: NodeId, col: usize, scale: bool) -> Result<()> {
        self.set_scale(container, Axis::Horizontal, col, scale)
    }

    pub fn set_row_scale(&mut self, container: NodeId, row: usize, scale: bool) -> Result<()> {
        self.set_scale(container, Axis::Vertical, row, scale)
    }

    fn set_scale(&mut self, container: NodeId, axis: Axis, index: usize, scale: bool) -> Result<()> {
        self.grid_mut(container)?.set_scaling(axis, index, scale)?;
        self.invalidate(container);
        Ok(())
    }

    pub fn set_padding(&mut self, container: NodeId, padding: Insets) -> Result<()> {
        self.grid_mut(container)?.padding = padding;
        self.invalidate(container);
        Ok(())
    }

    pub fn set_spacing(&mut self, container: NodeId, spacing: Spacing) -> Result<()> {
        self.grid_mut(container)?.spacing = spacing;
        self.invalidate(container);
        Ok(())
    }

    /// Choose bottom-up vertical coordinates for the container's children
    pub fn set_flipped(&mut self, container: NodeId, flipped: bool) -> Result<()> {
        self.grid_mut(container)?.flipped = flipped;
        self.node_mut(container)?.mark_layout_dirty();
        Ok(())
    }

    /// Toggle visibility. Invisible nodes keep their grid slot.
    pub fn set_visible(&mut self, id: NodeId, visible: bool) -> Result<()> {
        let node = self.node_mut(id)?;
        if node.visible != visible {
            node.visible = visible;
            self.invalidate(id);
        }
        Ok(())
    }

    pub fn set_user_size(&mut self, id: NodeId, size: UserSize) -> Result<()> {
        self.node_mut(id)?.user_size = size;
        self.invalidate(id);
        Ok(())
    }

    pub fn set_min_size(&mut self, id: NodeId, size: Size) -> Result<()> {
        self.node_mut(id)?.min_size = size;
        self.invalidate(id);
        Ok(())
    }

    pub fn set_max_size(&mut self, id: NodeId, size: Size) -> Result<()> {
        self.node_mut(id)?.max_size = size;
        self.invalidate(id);
        Ok(())
    }

    pub fn set_layout_boundary(&mut self, id: NodeId, boundary: bool) -> Result<()> {
        self.node_mut(id)?.layout_boundary = boundary;
        Ok(())
    }

    pub fn set_auto_size(&mut self, id: NodeId, auto_size: bool) -> Result<()> {
        self.node_mut(id)?.auto_size = auto_size;
        Ok(())
    }

    /// Hook for native bindings: text, font or image of a leaf changed
    pub fn content_changed(&mut self, leaf: NodeId) -> Result<()> {
        if self.node(leaf)?.is_container() {
            return Err(TreeError::NotALeaf(leaf));
        }
        self.invalidate(leaf);
        Ok(())
    }

    /// Set the load state of a node and all of its descendants
    pub fn set_subtree_load_state(&mut self, id: NodeId, state: LoadState) -> Result<()> {
        for node in self.descendants(id)? {
            if let Some(node) = self.get_mut(node) {
                node.load_state = state;
            }
        }
        Ok(())
    }

    /// Clear the cache of `id` and its parent and mark both dirty
    pub fn invalidate(&mut self, id: NodeId) {
        let parent = self.get(id).and_then(Node::parent);
        self.invalidate_node(id);
        if let Some(parent) = parent {
            self.invalidate_node(parent);
        }
    }

    /// Clear the cache of `id` alone and mark it dirty
    pub fn invalidate_node(&mut self, id: NodeId) {
        if let Some(node) = self.get_mut(id) {
            node.clear_measure();
            node.mark_layout_dirty();
        }
    }

    /// Parent chain of `id`, nearest first
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut chain = Vec::new();
        let mut current = self.get(id).and_then(Node::parent);
        while let Some(parent) = current {
            chain.push(parent);
            current = self.get(parent).and_then(Node::parent);
        }
        chain
    }

    /// Whether `ancestor` is a strict ancestor of `id`
    pub fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        self.ancestors(id).contains(&ancestor)
    }

    /// `id` and everything below it, pre-order
    pub fn descendants(&self, id: NodeId) -> Result<Vec<NodeId>> {
        self.node(id)?;
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            out.push(current);
            if let Some(grid) = self.get(current).and_then(Node::grid) {
                let mut children = grid.children();
                children.reverse();
                stack.extend(children);
            }
        }
        Ok(out)
    }

    fn child_cell(&self, container: NodeId, child: NodeId) -> Result<CellPos> {
        self.grid(container)?;
        let node = self.node(child)?;
        match (node.parent, node.cell) {
            (Some(parent), Some(cell)) if parent == container => Ok(cell),
            _ => Err(TreeError::NotAChild { container, child }),
        }
    }

    /// Put a parentless child into a cell, releasing any occupant
    fn place(&mut self, container: NodeId, child: NodeId, pos: CellPos) -> Result<Option<NodeId>> {
        let displaced = self.grid_mut(container)?.put(pos, Some(child));
        if let Some(old) = displaced {
            self.release(old);
        }

        let state = self.node(container)?.load_state;
        let node = self.node_mut(child)?;
        node.parent = Some(container);
        node.cell = Some(pos);
        node.reset_frame();
        self.set_subtree_load_state(child, state)?;
        self.invalidate(child);
        Ok(displaced)
    }

    /// Remove `id` from its parent grid, if it has one
    fn detach(&mut self, id: NodeId) -> Result<()> {
        let node = self.node(id)?;
        if let (Some(parent), Some(cell)) = (node.parent, node.cell) {
            if let Some(grid) = self.get_mut(parent).and_then(Node::grid_mut) {
                grid.put(cell, None);
            }
            self.invalidate(id);
            self.release(id);
        }
        Ok(())
    }

    /// Clear the parent link of a node whose slot was already vacated
    fn release(&mut self, id: NodeId) {
        if let Some(node) = self.get_mut(id) {
            node.parent = None;
            node.cell = None;
            node.reset_frame();
            node.mark_layout_dirty();
        }
    }
}
