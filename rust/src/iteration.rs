//! Iterator implementations for SeqTree.
//!
//! Iteration locates the starting leaf with one indexed descent and then
//! follows the same-level walk from leaf to leaf, so a full pass touches each
//! internal node a bounded number of times.

use std::iter::FusedIterator;

use tracing::warn;

use crate::error::TreeResult;
use crate::types::{NodeId, NodeRef, SeqTree};

// ============================================================================
// ITERATOR STRUCTS
// ============================================================================

/// Cursor over leaf handles: the current leaf and how many remain.
#[derive(Debug, Clone)]
pub struct Leaves<'a, T> {
    tree: &'a SeqTree<T>,
    current: Option<NodeId>,
    remaining: Option<usize>,
}

/// Iterator over element references in sequence order.
#[derive(Debug, Clone)]
pub struct Iter<'a, T> {
    leaves: Leaves<'a, T>,
}

// ============================================================================
// SEQTREE ITERATOR METHODS
// ============================================================================

impl<T> SeqTree<T> {
    /// Leaf handles over `[index, index + count)`.
    ///
    /// `count` of `None` runs to the end; a count past the end stops there.
    /// Fails with `IndexOutOfBounds` if `index` does not name an element.
    pub fn iterate(&self, index: isize, count: Option<usize>) -> TreeResult<Leaves<'_, T>> {
        if count == Some(0) {
            return Ok(Leaves::empty(self));
        }
        let start = self.at_index(index)?;
        Ok(Leaves {
            tree: self,
            current: Some(start),
            remaining: count,
        })
    }

    /// Element references over `[index, index + count)`.
    ///
    /// # Examples
    ///
    /// ```
    /// use treevec::SeqTree;
    ///
    /// let tree: SeqTree<i32> = (0..10).collect();
    /// let window: Vec<i32> = tree.iterate_data(-4, Some(2)).unwrap().copied().collect();
    /// assert_eq!(window, vec![6, 7]);
    /// assert!(tree.iterate_data(10, None).is_err());
    /// ```
    pub fn iterate_data(&self, index: isize, count: Option<usize>) -> TreeResult<Iter<'_, T>> {
        Ok(Iter {
            leaves: self.iterate(index, count)?,
        })
    }

    /// Every element in order. An empty tree yields nothing.
    ///
    /// A broken leaf walk ends the iteration early with a warning; use
    /// [`check_invariants`](SeqTree::check_invariants) to surface the cause.
    pub fn iter(&self) -> Iter<'_, T> {
        let first = match self.first_leaf() {
            Ok(first) => first,
            Err(error) => {
                warn!(%error, "first leaf lookup failed, iterating nothing");
                None
            }
        };
        Iter {
            leaves: Leaves {
                tree: self,
                current: first,
                remaining: None,
            },
        }
    }
}

impl<'a, T> IntoIterator for &'a SeqTree<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// ============================================================================
// LEAVES IMPLEMENTATION
// ============================================================================

impl<'a, T> Leaves<'a, T> {
    fn empty(tree: &'a SeqTree<T>) -> Self {
        Self {
            tree,
            current: None,
            remaining: Some(0),
        }
    }
}

impl<'a, T> Iterator for Leaves<'a, T> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == Some(0) {
            return None;
        }
        let leaf = self.current?;

        self.current = match self.tree.next_node_at_same_level(NodeRef::Leaf(leaf)) {
            Ok(next) => next.map(|node| node.id()),
            Err(error) => {
                warn!(%error, leaf, "leaf walk failed, ending iteration");
                None
            }
        };
        if let Some(remaining) = self.remaining.as_mut() {
            *remaining -= 1;
        }
        Some(leaf)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match (self.current, self.remaining) {
            (None, _) => (0, Some(0)),
            (Some(_), Some(remaining)) => (remaining.min(1), Some(remaining)),
            (Some(_), None) => (1, None),
        }
    }
}

impl<'a, T> FusedIterator for Leaves<'a, T> {}

// ============================================================================
// ITER IMPLEMENTATION
// ============================================================================

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let leaf = self.leaves.next()?;
        let tree = self.leaves.tree;
        match tree.data(leaf) {
            Ok(data) => Some(data),
            Err(error) => {
                warn!(%error, leaf, "leaf payload missing, ending iteration");
                self.leaves.current = None;
                None
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.leaves.size_hint()
    }
}

impl<'a, T> FusedIterator for Iter<'a, T> {}
