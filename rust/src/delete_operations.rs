//! DELETE operations for SeqTree.
//!
//! Range removal works in steps. Each step descends from the root to the
//! first element still to be removed, drops the largest piece it can (a whole
//! subtree, or a run of leaves under one parent), and rebalances that single
//! spot. Restarting from the root after every step means no parent or slot
//! read before a rebalance is ever reused after it.

use tracing::debug;

use crate::error::{TreeError, TreeResult};
use crate::types::{NodeId, NodeRef, SeqTree};

impl<T> SeqTree<T> {
    /// Remove `count` elements starting at `start`, returning them in order.
    ///
    /// Negative `start` counts from the end. `count` is clipped to the
    /// elements available after `start`.
    ///
    /// # Examples
    ///
    /// ```
    /// use treevec::SeqTree;
    ///
    /// let mut tree: SeqTree<i32> = (0..10).collect();
    /// assert_eq!(tree.remove(-3, 100).unwrap(), vec![7, 8, 9]);
    /// assert_eq!(tree.remove(2, 2).unwrap(), vec![2, 3]);
    /// assert_eq!(tree.iter().copied().collect::<Vec<_>>(), vec![0, 1, 4, 5, 6]);
    /// assert!(tree.remove(5, 1).is_err());
    /// ```
    pub fn remove(&mut self, start: isize, count: usize) -> TreeResult<Vec<T>> {
        let start = self.resolve_index(start, false)?;
        let mut count = count.min(self.len() - start);
        debug!(start, count, "removing range");

        let mut removed = Vec::with_capacity(count);
        while count > 0 {
            count -= self.remove_step(start, count, &mut removed)?;
        }
        Ok(removed)
    }

    /// Remove the first element at `index`, if any.
    pub fn remove_at(&mut self, index: isize) -> TreeResult<T> {
        self.remove(index, 1)?
            .pop()
            .ok_or_else(|| TreeError::corrupted_tree("Remove", "single removal produced nothing"))
    }

    /// One descent from the root; returns how many elements it removed.
    fn remove_step(&mut self, start: usize, count: usize, removed: &mut Vec<T>) -> TreeResult<usize> {
        let mut id = self.root;
        let mut offset = start;

        loop {
            let first = self.internal(id)?.first().ok_or_else(|| {
                TreeError::corrupted_tree("Remove", &format!("empty node {} on the removal path", id))
            })?;

            if offset == 0 {
                let size = self.size_of(NodeRef::Internal(id))?;
                if count >= size {
                    self.drop_node(id, removed)?;
                    return Ok(size);
                }

                if first.is_leaf() {
                    let mut dropped = 0;
                    while dropped < count && !self.internal(id)?.is_empty() {
                        let leaf = self.pop_child(id, 0)?;
                        self.free_subtree(leaf, removed)?;
                        dropped += 1;
                    }
                    self.rebalance(id)?;
                    return Ok(dropped);
                }

                let first_size = self.size_of(first)?;
                if count <= first_size {
                    id = Self::expect_internal(first)?;
                    continue;
                }

                let node = self.pop_child(id, 0)?;
                self.free_subtree(node, removed)?;
                self.rebalance(id)?;
                return Ok(first_size);
            }

            if first.is_leaf() {
                // The run to drop starts at `offset` inside this node.
                let mut dropped = 0;
                while dropped < count && self.internal(id)?.len() > offset {
                    let leaf = self.pop_child(id, offset)?;
                    self.free_subtree(leaf, removed)?;
                    dropped += 1;
                }
                self.rebalance(id)?;
                return Ok(dropped);
            }

            let child = self.child_containing(id, &mut offset)?;
            id = Self::expect_internal(child)?;
        }
    }

    /// Drop a whole subtree that lies inside the removal range.
    fn drop_node(&mut self, id: NodeId, removed: &mut Vec<T>) -> TreeResult<()> {
        match self.parent_of(NodeRef::Internal(id))? {
            None => {
                // The whole sequence goes; an empty root is valid.
                while !self.internal(id)?.is_empty() {
                    let child = self.pop_child(id, 0)?;
                    self.free_subtree(child, removed)?;
                }
                Ok(())
            }
            Some(parent) => {
                let slot = self.slot_of(NodeRef::Internal(id))?;
                let node = self.pop_child(parent, slot)?;
                self.free_subtree(node, removed)?;
                self.rebalance(parent)
            }
        }
    }

    fn expect_internal(node: NodeRef) -> TreeResult<NodeId> {
        node.internal().ok_or_else(|| {
            TreeError::corrupted_tree("Remove", "leaf found above the leaf level")
        })
    }
}
