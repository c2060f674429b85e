//! Node implementations for SeqTree.
//!
//! Slot management for a single internal node. These methods only move
//! `NodeRef`s around; fixing up the moved children's `parent`/`index` and
//! invalidating ancestor caches is the tree's job, since it owns the arenas.

use std::cell::RefCell;

use crate::cache::MonoidalCache;
use crate::error::{TreeError, TreeResult};
use crate::types::{InternalNode, LeafNode, NodeId, NodeRef, MAX_CHILDREN, NULL_NODE};

// ============================================================================
// LEAF NODE IMPLEMENTATION
// ============================================================================

impl<T> LeafNode<T> {
    /// Creates a detached leaf.
    pub fn new(data: T) -> Self {
        Self {
            data,
            parent: NULL_NODE,
            index: 0,
        }
    }

    pub fn data(&self) -> &T {
        &self.data
    }

    pub fn parent(&self) -> Option<NodeId> {
        (self.parent != NULL_NODE).then_some(self.parent)
    }

    pub fn into_data(self) -> T {
        self.data
    }
}

// ============================================================================
// INTERNAL NODE IMPLEMENTATION
// ============================================================================

impl InternalNode {
    /// Creates a detached node with no children.
    pub fn new() -> Self {
        Self {
            slots: [None; MAX_CHILDREN],
            len: 0,
            parent: NULL_NODE,
            index: 0,
            cache: RefCell::new(MonoidalCache::new()),
        }
    }

    /// Number of occupied slots.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Overfull, pending a split.
    pub fn is_full(&self) -> bool {
        self.len == MAX_CHILDREN
    }

    /// Underfull, pending a merge (or a collapse at the root).
    pub fn is_underfull(&self) -> bool {
        self.len < 2
    }

    pub fn parent(&self) -> Option<NodeId> {
        (self.parent != NULL_NODE).then_some(self.parent)
    }

    /// Child in `slot`, `None` for an empty slot.
    pub fn child_at(&self, slot: usize) -> TreeResult<Option<NodeRef>> {
        self.slots
            .get(slot)
            .copied()
            .ok_or(TreeError::InvalidSlot(slot))
    }

    pub fn first(&self) -> Option<NodeRef> {
        self.slots[0]
    }

    pub fn last(&self) -> Option<NodeRef> {
        self.len.checked_sub(1).and_then(|i| self.slots[i])
    }

    /// Occupied slots in order.
    pub fn children(&self) -> impl Iterator<Item = NodeRef> + '_ {
        self.slots[..self.len].iter().flatten().copied()
    }

    /// Insert `child` at `slot`, shifting later children one slot right.
    pub fn push(&mut self, child: NodeRef, slot: usize) -> TreeResult<()> {
        if self.len == MAX_CHILDREN {
            return Err(TreeError::CapacityExceeded);
        }
        if slot > self.len {
            return Err(TreeError::SkippedSlot {
                slot,
                len: self.len,
            });
        }

        self.slots[slot..=self.len].rotate_right(1);
        self.slots[slot] = Some(child);
        self.len += 1;
        Ok(())
    }

    /// Append `child` after the last occupied slot.
    pub fn push_back(&mut self, child: NodeRef) -> TreeResult<()> {
        self.push(child, self.len)
    }

    /// Remove and return the child at `slot`, shifting later children left.
    pub fn pop(&mut self, slot: usize) -> TreeResult<NodeRef> {
        if slot >= self.len {
            return Err(TreeError::NotFound {
                slot,
                len: self.len,
            });
        }

        let popped = self.slots[slot].take();
        self.slots[slot..self.len].rotate_left(1);
        self.len -= 1;
        popped.ok_or(TreeError::NotFound {
            slot,
            len: self.len,
        })
    }

    /// Remove and return the last child.
    pub fn pop_back(&mut self) -> TreeResult<NodeRef> {
        let slot = self.len.checked_sub(1).ok_or(TreeError::NotFound {
            slot: 0,
            len: 0,
        })?;
        self.pop(slot)
    }
}

impl Default for InternalNode {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaves(node: &InternalNode) -> Vec<NodeId> {
        node.children().map(|c| c.id()).collect()
    }

    #[test]
    fn test_push_shifts_right() {
        let mut node = InternalNode::new();
        node.push_back(NodeRef::Leaf(1)).unwrap();
        node.push_back(NodeRef::Leaf(3)).unwrap();
        node.push(NodeRef::Leaf(0), 0).unwrap();
        node.push(NodeRef::Leaf(2), 2).unwrap();

        assert_eq!(leaves(&node), vec![0, 1, 2, 3]);
        assert!(node.is_full());
        assert_eq!(node.last(), Some(NodeRef::Leaf(3)));
    }

    #[test]
    fn test_push_errors() {
        let mut node = InternalNode::new();
        assert_eq!(
            node.push(NodeRef::Leaf(0), 1),
            Err(TreeError::SkippedSlot { slot: 1, len: 0 })
        );
        for i in 0..4 {
            node.push_back(NodeRef::Leaf(i)).unwrap();
        }
        assert_eq!(node.push_back(NodeRef::Leaf(9)), Err(TreeError::CapacityExceeded));
    }

    #[test]
    fn test_pop_shifts_left() {
        let mut node = InternalNode::new();
        for i in 0..4 {
            node.push_back(NodeRef::Leaf(i)).unwrap();
        }
        assert_eq!(node.pop(1), Ok(NodeRef::Leaf(1)));
        assert_eq!(leaves(&node), vec![0, 2, 3]);
        assert_eq!(node.child_at(3), Ok(None));
        assert_eq!(node.pop_back(), Ok(NodeRef::Leaf(3)));
        assert_eq!(node.pop(0), Ok(NodeRef::Leaf(0)));
        assert_eq!(leaves(&node), vec![2]);
        assert!(node.is_underfull());
    }

    #[test]
    fn test_pop_and_slot_errors() {
        let mut node = InternalNode::new();
        node.push_back(NodeRef::Leaf(0)).unwrap();
        assert_eq!(node.pop(1), Err(TreeError::NotFound { slot: 1, len: 1 }));
        assert_eq!(node.child_at(4), Err(TreeError::InvalidSlot(4)));
        node.pop(0).unwrap();
        assert!(node.is_empty());
        assert_eq!(node.pop_back(), Err(TreeError::NotFound { slot: 0, len: 0 }));
    }

    #[test]
    fn test_leaf_node() {
        let leaf = LeafNode::new("x");
        assert_eq!(leaf.parent(), None);
        assert_eq!(*leaf.data(), "x");
        assert_eq!(leaf.into_data(), "x");
    }
}
