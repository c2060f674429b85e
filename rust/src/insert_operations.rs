//! INSERT operations for SeqTree.
//!
//! Items are pushed one leaf at a time next to an anchor, and the anchor's
//! parent is rebalanced after every push, so at most one node is ever
//! overfull.

use tracing::debug;

use crate::error::TreeResult;
use crate::types::{NodeId, NodeRef, SeqTree};

impl<T> SeqTree<T> {
    /// Insert `items`, in order, before position `index`.
    ///
    /// `index == len()` appends; negative indices count from the end.
    ///
    /// # Examples
    ///
    /// ```
    /// use treevec::SeqTree;
    ///
    /// let mut tree: SeqTree<i32> = (0..5).collect();
    /// tree.insert(2, vec![20, 21]).unwrap();
    /// tree.insert(-1, vec![99]).unwrap();
    /// assert_eq!(tree.iter().copied().collect::<Vec<_>>(), vec![0, 1, 20, 21, 2, 3, 99, 4]);
    /// assert!(tree.insert(9, vec![1]).is_err());
    /// ```
    pub fn insert(&mut self, index: isize, items: Vec<T>) -> TreeResult<()> {
        let index = self.resolve_index(index, true)?;
        debug!(index, count = items.len(), "inserting items");

        let (mut parent, mut slot) = self.insertion_anchor(index)?;

        for item in items.into_iter().rev() {
            let leaf = self.new_leaf(item);
            self.push_child(parent, leaf, slot)?;
            self.rebalance(parent)?;

            // Rebalancing may have moved the new leaf; the next item goes before it.
            parent = self.parent_of(leaf)?.unwrap_or(self.root);
            slot = self.slot_of(leaf)?;
        }
        Ok(())
    }

    /// Append one element.
    pub fn push_back(&mut self, item: T) -> TreeResult<()> {
        let len = self.len() as isize;
        self.insert(len, vec![item])
    }

    /// Parent and slot a new leaf must take to land at `index`.
    fn insertion_anchor(&self, index: usize) -> TreeResult<(NodeId, usize)> {
        if index < self.len() {
            let leaf = NodeRef::Leaf(self.at_index(index as isize)?);
            let parent = self.parent_of(leaf)?.unwrap_or(self.root);
            return Ok((parent, self.slot_of(leaf)?));
        }

        // Appending: the deepest internal node on the right edge.
        let mut parent = self.root;
        while let Some(NodeRef::Internal(id)) = self.internal(parent)?.last() {
            parent = id;
        }
        Ok((parent, self.internal(parent)?.len()))
    }
}
