//! Core types and data structures for SeqTree.
//!
//! This module contains the node representations, handle types and
//! constants used throughout the tree implementation.

use std::cell::RefCell;

use crate::arena::Arena;
use crate::cache::MonoidalCache;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Slots per internal node. The fourth slot is only occupied transiently,
/// between a push and the rebalance that splits the node.
pub const MAX_CHILDREN: usize = 4;

// ============================================================================
// TYPE DEFINITIONS
// ============================================================================

/// Node ID type for arena-based allocation: slot index in the low 32 bits,
/// slot generation in the high 32 bits.
pub type NodeId = u64;

/// Sentinel for "no parent"
pub const NULL_NODE: NodeId = u64::MAX;

// ============================================================================
// CORE DATA STRUCTURES
// ============================================================================

/// Sequence container stored as the leaves of a 2-3 tree.
///
/// Every internal node has 2 or 3 children once an operation returns, and
/// all leaves sit at the same depth. Each internal node caches monoid
/// aggregates over its subtree; the built-in [`Size`](crate::Size) monoid
/// turns positional access into a walk of length O(log n).
///
/// # Examples
///
/// ```
/// use treevec::{SeqTree, Size};
///
/// let mut tree = SeqTree::from_vec((0..15).collect());
/// tree.remove(7, 1).unwrap();
/// tree.insert(0, vec![-1]).unwrap();
///
/// assert_eq!(tree.len(), 15);
/// assert_eq!(*tree.get(0).unwrap(), -1);
/// assert_eq!(*tree.get(-1).unwrap(), 14);
/// assert!(tree.is_balanced());
/// ```
///
/// # Performance Characteristics
///
/// - **Index lookup**: O(log n)
/// - **Insert/remove of one element**: O(log n)
/// - **Insert/remove of k elements**: O(k log n) worst case, whole subtrees
///   inside a removed range are dropped in one step
/// - **Prefix fold**: O(log n) once caches are warm
#[derive(Debug)]
pub struct SeqTree<T> {
    /// Root internal node. Its id never changes; growth and collapse
    /// happen beneath it.
    pub(crate) root: NodeId,
    pub(crate) leaf_arena: Arena<LeafNode<T>>,
    pub(crate) internal_arena: Arena<InternalNode>,
}

/// Leaf holding one element of the sequence.
#[derive(Debug, Clone)]
pub struct LeafNode<T> {
    pub(crate) data: T,
    pub(crate) parent: NodeId,
    /// Slot in the parent.
    pub(crate) index: u8,
}

/// Internal node with up to four densely packed child slots.
#[derive(Debug)]
pub struct InternalNode {
    pub(crate) slots: [Option<NodeRef>; MAX_CHILDREN],
    pub(crate) len: usize,
    pub(crate) parent: NodeId,
    /// Slot in the parent; meaningless at the root.
    pub(crate) index: u8,
    pub(crate) cache: RefCell<MonoidalCache>,
}

// ============================================================================
// ENUMS
// ============================================================================

/// Node reference that can be either a leaf or an internal node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeRef {
    Leaf(NodeId),
    Internal(NodeId),
}

impl NodeRef {
    /// Return the raw node ID.
    pub fn id(&self) -> NodeId {
        match *self {
            NodeRef::Leaf(id) | NodeRef::Internal(id) => id,
        }
    }

    /// Returns true if this reference points to a leaf node.
    pub fn is_leaf(&self) -> bool {
        matches!(self, NodeRef::Leaf(_))
    }

    /// The internal node id, if this is one.
    pub fn internal(&self) -> Option<NodeId> {
        match *self {
            NodeRef::Internal(id) => Some(id),
            NodeRef::Leaf(_) => None,
        }
    }
}
