//! Tree structure management operations for SeqTree.
//!
//! This module owns everything that touches parent/child links: pushing and
//! popping children with back-link bookkeeping, cache invalidation, sibling
//! and same-level navigation, the cached monoid fold, and the single-node
//! `rebalance` that every mutating algorithm relies on.

use tracing::trace;

use crate::error::{TreeError, TreeResult};
use crate::monoid::{Monoid, Size};
use crate::types::{InternalNode, LeafNode, NodeId, NodeRef, SeqTree, MAX_CHILDREN, NULL_NODE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Prev,
    Next,
}

impl<T> SeqTree<T> {
    // ============================================================================
    // ARENA ACCESS
    // ============================================================================

    pub(crate) fn leaf(&self, id: NodeId) -> TreeResult<&LeafNode<T>> {
        self.leaf_arena
            .get(id)
            .ok_or(TreeError::MissingNode(NodeRef::Leaf(id)))
    }

    pub(crate) fn leaf_mut(&mut self, id: NodeId) -> TreeResult<&mut LeafNode<T>> {
        self.leaf_arena
            .get_mut(id)
            .ok_or(TreeError::MissingNode(NodeRef::Leaf(id)))
    }

    pub(crate) fn internal(&self, id: NodeId) -> TreeResult<&InternalNode> {
        self.internal_arena
            .get(id)
            .ok_or(TreeError::MissingNode(NodeRef::Internal(id)))
    }

    pub(crate) fn internal_mut(&mut self, id: NodeId) -> TreeResult<&mut InternalNode> {
        self.internal_arena
            .get_mut(id)
            .ok_or(TreeError::MissingNode(NodeRef::Internal(id)))
    }

    /// Handle of the root internal node.
    pub fn root(&self) -> NodeRef {
        NodeRef::Internal(self.root)
    }

    /// Borrow an internal node, e.g. to inspect its slots.
    pub fn internal_node(&self, id: NodeId) -> TreeResult<&InternalNode> {
        self.internal(id)
    }

    /// Child of internal node `id` in `slot`.
    pub fn child_at(&self, id: NodeId, slot: usize) -> TreeResult<Option<NodeRef>> {
        self.internal(id)?.child_at(slot)
    }

    // ============================================================================
    // CHILD SLOT MANAGEMENT
    // ============================================================================

    /// Insert `child` into `parent` at `slot`, shifting later children right.
    ///
    /// Sets the back-links of every shifted child and invalidates the cached
    /// aggregates of `parent` and its ancestors. The caller is responsible for
    /// calling [`rebalance`](Self::rebalance) if `parent` becomes overfull.
    pub fn push_child(&mut self, parent: NodeId, child: NodeRef, slot: usize) -> TreeResult<()> {
        self.internal_mut(parent)?.push(child, slot)?;
        self.relink_children(parent, slot)?;
        self.invalidate_from(parent);
        Ok(())
    }

    /// Append `child` after the last occupied slot of `parent`.
    pub fn push_child_back(&mut self, parent: NodeId, child: NodeRef) -> TreeResult<()> {
        let slot = self.internal(parent)?.len();
        self.push_child(parent, child, slot)
    }

    /// Remove and return the child of `parent` at `slot`.
    ///
    /// The popped child is detached (no parent). The caller is responsible for
    /// calling [`rebalance`](Self::rebalance) if `parent` becomes underfull.
    pub fn pop_child(&mut self, parent: NodeId, slot: usize) -> TreeResult<NodeRef> {
        let popped = self.internal_mut(parent)?.pop(slot)?;
        self.set_links(popped, NULL_NODE, 0)?;
        self.relink_children(parent, slot)?;
        self.invalidate_from(parent);
        Ok(popped)
    }

    fn relink_children(&mut self, parent: NodeId, from: usize) -> TreeResult<()> {
        let slots = self.internal(parent)?.slots;
        for (slot, child) in slots.iter().enumerate().skip(from) {
            match child {
                Some(child) => self.set_links(*child, parent, slot)?,
                None => break,
            }
        }
        Ok(())
    }

    fn set_links(&mut self, node: NodeRef, parent: NodeId, index: usize) -> TreeResult<()> {
        match node {
            NodeRef::Leaf(id) => {
                let leaf = self.leaf_mut(id)?;
                leaf.parent = parent;
                leaf.index = index as u8;
            }
            NodeRef::Internal(id) => {
                let inode = self.internal_mut(id)?;
                inode.parent = parent;
                inode.index = index as u8;
            }
        }
        Ok(())
    }

    /// Allocate a detached internal node holding `children`.
    pub(crate) fn new_internal(&mut self, children: &[NodeRef]) -> TreeResult<NodeId> {
        let id = self.internal_arena.allocate(InternalNode::new());
        for child in children {
            self.push_child_back(id, *child)?;
        }
        Ok(id)
    }

    /// Allocate a detached leaf, ready for [`push_child`](Self::push_child).
    pub fn new_leaf(&mut self, data: T) -> NodeRef {
        NodeRef::Leaf(self.leaf_arena.allocate(LeafNode::new(data)))
    }

    /// Release a detached subtree, appending its payloads in sequence order.
    ///
    /// Pair with [`pop_child`](Self::pop_child): a popped node stays
    /// allocated until it is released or pushed back.
    pub fn free_subtree(&mut self, node: NodeRef, out: &mut Vec<T>) -> TreeResult<()> {
        match node {
            NodeRef::Leaf(id) => {
                let leaf = self
                    .leaf_arena
                    .deallocate(id)
                    .ok_or(TreeError::MissingNode(node))?;
                out.push(leaf.data);
            }
            NodeRef::Internal(id) => {
                let inode = self
                    .internal_arena
                    .deallocate(id)
                    .ok_or(TreeError::MissingNode(node))?;
                for child in inode.children() {
                    self.free_subtree(child, out)?;
                }
            }
        }
        Ok(())
    }

    // ============================================================================
    // MONOID CACHE
    // ============================================================================

    /// Mark the cached aggregates of `id` and every ancestor dirty.
    pub(crate) fn invalidate_from(&mut self, mut id: NodeId) {
        while let Some(inode) = self.internal_arena.get_mut(id) {
            inode.cache.get_mut().invalidate();
            id = inode.parent;
        }
    }

    /// Fold `monoid` over the leaves below `node`.
    ///
    /// Internal nodes answer from their cache when it is clean; otherwise the
    /// value is rebuilt from the children's own cached values and stored.
    pub fn get_field<M: Monoid<T>>(&self, node: NodeRef, monoid: &M) -> TreeResult<M::Value> {
        match node {
            NodeRef::Leaf(id) => Ok(monoid.measure(&self.leaf(id)?.data)),
            NodeRef::Internal(id) => {
                let inode = self.internal(id)?;
                let key = monoid.id();
                if let Some(value) = inode.cache.borrow().lookup::<M::Value>(key) {
                    return Ok(value);
                }

                let mut acc = monoid.identity();
                for child in inode.children() {
                    let value = self.get_field(child, monoid)?;
                    acc = monoid.combine(&acc, &value);
                }
                inode.cache.borrow_mut().store(key, acc.clone());
                Ok(acc)
            }
        }
    }

    /// Number of leaves below `node`.
    #[inline]
    pub fn size_of(&self, node: NodeRef) -> TreeResult<usize> {
        self.get_field(node, &Size)
    }

    // ============================================================================
    // NAVIGATION
    // ============================================================================

    /// Parent of `node`, `None` at the root or for a detached node.
    pub fn parent_of(&self, node: NodeRef) -> TreeResult<Option<NodeId>> {
        let parent = match node {
            NodeRef::Leaf(id) => self.leaf(id)?.parent,
            NodeRef::Internal(id) => self.internal(id)?.parent,
        };
        Ok((parent != NULL_NODE).then_some(parent))
    }

    /// Slot `node` occupies in its parent.
    pub fn slot_of(&self, node: NodeRef) -> TreeResult<usize> {
        let index = match node {
            NodeRef::Leaf(id) => self.leaf(id)?.index,
            NodeRef::Internal(id) => self.internal(id)?.index,
        };
        Ok(index as usize)
    }

    fn sibling(&self, node: NodeRef, direction: Direction) -> TreeResult<Option<NodeRef>> {
        let Some(parent) = self.parent_of(node)? else {
            return Ok(None);
        };
        let slot = self.slot_of(node)?;
        let target = match direction {
            Direction::Prev => slot.checked_sub(1),
            Direction::Next => Some(slot + 1).filter(|s| *s < MAX_CHILDREN),
        };
        match target {
            Some(target) => self.internal(parent)?.child_at(target),
            None => Ok(None),
        }
    }

    pub fn prev_sibling(&self, node: NodeRef) -> TreeResult<Option<NodeRef>> {
        self.sibling(node, Direction::Prev)
    }

    pub fn next_sibling(&self, node: NodeRef) -> TreeResult<Option<NodeRef>> {
        self.sibling(node, Direction::Next)
    }

    /// Nearest node at the same depth to the left of `node`.
    pub fn prev_node_at_same_level(&self, node: NodeRef) -> TreeResult<Option<NodeRef>> {
        self.node_at_same_level(node, Direction::Prev)
    }

    /// Nearest node at the same depth to the right of `node`.
    pub fn next_node_at_same_level(&self, node: NodeRef) -> TreeResult<Option<NodeRef>> {
        self.node_at_same_level(node, Direction::Next)
    }

    /// Climb until an ancestor has a sibling in `direction`, then descend the
    /// same number of levels along that sibling's near edge.
    fn node_at_same_level(&self, node: NodeRef, direction: Direction) -> TreeResult<Option<NodeRef>> {
        if let Some(sibling) = self.sibling(node, direction)? {
            return Ok(Some(sibling));
        }

        let mut levels = 0;
        let mut target = node;
        loop {
            let Some(parent) = self.parent_of(target)? else {
                return Ok(None);
            };
            levels += 1;
            target = NodeRef::Internal(parent);

            if let Some(sibling) = self.sibling(target, direction)? {
                let mut down = sibling;
                for _ in 0..levels {
                    let id = down.internal().ok_or_else(|| {
                        TreeError::corrupted_tree("Same-level walk", "ran into a leaf above the target depth")
                    })?;
                    let inode = self.internal(id)?;
                    let edge = match direction {
                        Direction::Prev => inode.last(),
                        Direction::Next => inode.first(),
                    };
                    down = edge.ok_or_else(|| {
                        TreeError::corrupted_tree("Same-level walk", "empty internal node below the root")
                    })?;
                }
                return Ok(Some(down));
            }
        }
    }

    /// Leftmost leaf, `None` for an empty tree.
    pub fn first_leaf(&self) -> TreeResult<Option<NodeId>> {
        self.edge_leaf(Direction::Prev)
    }

    /// Rightmost leaf, `None` for an empty tree.
    pub fn last_leaf(&self) -> TreeResult<Option<NodeId>> {
        self.edge_leaf(Direction::Next)
    }

    fn edge_leaf(&self, direction: Direction) -> TreeResult<Option<NodeId>> {
        let mut current = NodeRef::Internal(self.root);
        loop {
            match current {
                NodeRef::Leaf(id) => return Ok(Some(id)),
                NodeRef::Internal(id) => {
                    let inode = self.internal(id)?;
                    let next = match direction {
                        Direction::Prev => inode.first(),
                        Direction::Next => inode.last(),
                    };
                    match next {
                        Some(next) => current = next,
                        None => return Ok(None),
                    }
                }
            }
        }
    }

    /// Number of edges between the root and the leaves (0 when empty).
    pub fn height(&self) -> TreeResult<usize> {
        let mut height = 0;
        let mut current = self.internal(self.root)?.first();
        while let Some(node) = current {
            height += 1;
            current = match node {
                NodeRef::Leaf(_) => None,
                NodeRef::Internal(id) => self.internal(id)?.first(),
            };
        }
        Ok(height)
    }

    // ============================================================================
    // REBALANCING
    // ============================================================================

    /// Restore the 2-or-3-children invariant at `id`.
    ///
    /// Assumes every other node in the tree is already balanced. Fixing `id`
    /// may unbalance its parent or a sibling; those are repaired recursively
    /// before returning. Balanced nodes are left untouched.
    pub fn rebalance(&mut self, id: NodeId) -> TreeResult<()> {
        let inode = self.internal(id)?;
        let len = inode.len();
        let parent = inode.parent();

        match (len, parent) {
            (0, None) => Ok(()),
            (0, Some(parent)) => {
                let slot = self.slot_of(NodeRef::Internal(id))?;
                self.pop_child(parent, slot)?;
                self.internal_arena.deallocate(id);
                trace!(node = id, parent, "removed empty node");
                self.rebalance(parent)
            }
            (1, None) => self.collapse_root(),
            (1, Some(parent)) => self.merge_into_sibling(id, parent),
            (MAX_CHILDREN, None) => self.grow_root(),
            (MAX_CHILDREN, Some(parent)) => self.split(id, parent),
            _ => Ok(()),
        }
    }

    /// Root with a sole internal child absorbs that child's children.
    fn collapse_root(&mut self) -> TreeResult<()> {
        let root = self.root;
        let only = match self.internal(root)?.first() {
            Some(NodeRef::Internal(only)) => only,
            // A sole leaf is a one-element sequence, which is fine.
            _ => return Ok(()),
        };

        trace!(root, absorbed = only, "collapsing root");
        self.pop_child(root, 0)?;
        while !self.internal(only)?.is_empty() {
            let child = self.pop_child(only, 0)?;
            self.push_child_back(root, child)?;
        }
        self.internal_arena.deallocate(only);
        self.rebalance(root)
    }

    /// Move the sole child of `id` into a sibling and drop `id`.
    fn merge_into_sibling(&mut self, id: NodeId, parent: NodeId) -> TreeResult<()> {
        let node = NodeRef::Internal(id);
        let prev = self.prev_sibling(node)?.and_then(|n| n.internal());
        let next = self.next_sibling(node)?.and_then(|n| n.internal());

        // Prefer the next sibling unless it would end up larger than the previous one.
        let target = match (prev, next) {
            (Some(prev), Some(next)) => {
                if self.internal(next)?.len() <= self.internal(prev)?.len() {
                    (next, Direction::Next)
                } else {
                    (prev, Direction::Prev)
                }
            }
            (None, Some(next)) => (next, Direction::Next),
            (Some(prev), None) => (prev, Direction::Prev),
            (None, None) => {
                return Err(TreeError::corrupted_tree(
                    "Rebalance",
                    &format!("underfull node {} has no internal sibling", id),
                ))
            }
        };

        let moved = self.pop_child(id, 0)?;
        match target {
            (next, Direction::Next) => self.push_child(next, moved, 0)?,
            (prev, Direction::Prev) => self.push_child_back(prev, moved)?,
        }
        let receiver = target.0;
        trace!(node = id, receiver, "merged underfull node into sibling");

        let slot = self.slot_of(node)?;
        self.pop_child(parent, slot)?;
        self.internal_arena.deallocate(id);

        if self.internal(receiver)?.is_full() {
            self.rebalance(receiver)?;
        }
        if self.internal(parent)?.len() == 1 {
            self.rebalance(parent)?;
        }
        Ok(())
    }

    /// Move the last two children of an overfull `id` into a new right sibling.
    fn split(&mut self, id: NodeId, parent: NodeId) -> TreeResult<()> {
        let second = self.pop_child(id, 3)?;
        let first = self.pop_child(id, 2)?;
        let sibling = self.new_internal(&[first, second])?;

        let slot = self.slot_of(NodeRef::Internal(id))? + 1;
        self.push_child(parent, NodeRef::Internal(sibling), slot)?;
        trace!(node = id, sibling, parent, "split overfull node");
        self.rebalance(parent)
    }

    /// Overfull root keeps its id and gains a level: two new 2-child nodes.
    fn grow_root(&mut self) -> TreeResult<()> {
        let root = self.root;
        let d = self.pop_child(root, 3)?;
        let c = self.pop_child(root, 2)?;
        let b = self.pop_child(root, 1)?;
        let a = self.pop_child(root, 0)?;

        let left = self.new_internal(&[a, b])?;
        let right = self.new_internal(&[c, d])?;
        self.push_child_back(root, NodeRef::Internal(left))?;
        self.push_child_back(root, NodeRef::Internal(right))?;
        trace!(root, left, right, "root grew a level");
        Ok(())
    }
}
