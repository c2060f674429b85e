//! Construction and initialization logic for SeqTree.
//!
//! Bulk building partitions the input by powers of two so that every
//! subtree of a given level has the same height and 2 or 3 children.

use tracing::debug;

use crate::arena::Arena;
use crate::error::TreeResult;
use crate::types::{InternalNode, NodeId, NodeRef, SeqTree};

impl<T> SeqTree<T> {
    /// Create an empty sequence: a root with zero children.
    ///
    /// # Examples
    ///
    /// ```
    /// use treevec::SeqTree;
    ///
    /// let tree = SeqTree::<i32>::new();
    /// assert!(tree.is_empty());
    /// ```
    pub fn new() -> Self {
        let mut internal_arena = Arena::new();
        let root = internal_arena.allocate(InternalNode::new());
        Self {
            root,
            leaf_arena: Arena::new(),
            internal_arena,
        }
    }

    /// Build a perfectly balanced tree over `items`, in order.
    ///
    /// # Examples
    ///
    /// ```
    /// use treevec::SeqTree;
    ///
    /// let tree = SeqTree::from_vec(vec!['a', 'b', 'c', 'd', 'e']);
    /// assert_eq!(tree.len(), 5);
    /// assert_eq!(tree.iter().collect::<String>(), "abcde");
    /// ```
    pub fn from_vec(items: Vec<T>) -> Self {
        let len = items.len();
        debug!(len, "bulk building tree");

        let mut tree = Self {
            root: 0,
            leaf_arena: Arena::with_capacity(len),
            internal_arena: Arena::with_capacity(len / 2 + 1),
        };
        let mut items = items.into_iter();
        tree.root = match tree.distribute(&mut items, len) {
            Ok(root) => root,
            // Freshly allocated nodes always resolve; fall back to an empty tree regardless.
            Err(_) => return Self::new(),
        };
        tree
    }

    /// Build the subtree over the next `len` items.
    ///
    /// `len` of 0 or 1 only occurs at the top level: an empty root, or a root
    /// holding a single leaf.
    fn distribute(&mut self, items: &mut impl Iterator<Item = T>, len: usize) -> TreeResult<NodeId> {
        if len <= 3 {
            let leaves: Vec<NodeRef> = items.take(len).map(|data| self.new_leaf(data)).collect();
            return self.new_internal(&leaves);
        }

        // Highest power of two not above len
        let half = 1usize << (usize::BITS - 1 - len.leading_zeros());
        let quart = half / 2;
        let rest = len - half;

        let children = if rest >= quart {
            vec![
                self.distribute(items, quart)?,
                self.distribute(items, quart)?,
                self.distribute(items, rest)?,
            ]
        } else {
            vec![
                self.distribute(items, quart)?,
                self.distribute(items, quart + rest)?,
            ]
        };
        let children: Vec<NodeRef> = children.into_iter().map(NodeRef::Internal).collect();
        self.new_internal(&children)
    }

    /// Drop every element, leaving an empty root.
    pub fn clear(&mut self) {
        self.leaf_arena.clear();
        self.internal_arena.clear();
        self.root = self.internal_arena.allocate(InternalNode::new());
    }
}

impl<T> Default for SeqTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FromIterator<T> for SeqTree<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_vec(iter.into_iter().collect())
    }
}

impl<T> From<Vec<T>> for SeqTree<T> {
    fn from(items: Vec<T>) -> Self {
        Self::from_vec(items)
    }
}
