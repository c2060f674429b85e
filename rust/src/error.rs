//! Error handling and result types for SeqTree operations.
//!
//! Every failure is synchronous and signalled immediately. Index errors are
//! legitimate out-of-range input; the slot errors are contract violations of
//! the node layer and should never surface from a correctly rebalanced tree.

use thiserror::Error;

use crate::types::NodeRef;

/// Error type for tree operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// Index (after negative-index resolution) is outside the valid range.
    #[error("Index out of bounds: {index} (len {len})")]
    IndexOutOfBounds { index: isize, len: usize },

    /// Child slot outside 0..=3.
    #[error("Invalid child slot: {0}")]
    InvalidSlot(usize),

    /// Attempt to push a fifth child onto an internal node.
    #[error("Cannot add more than 4 children to a node")]
    CapacityExceeded,

    /// Attempt to push past the end of the occupied slots.
    #[error("Cannot skip slots when pushing: slot {slot}, len {len}")]
    SkippedSlot { slot: usize, len: usize },

    /// Attempt to pop a slot that holds no child.
    #[error("Cannot pop, no child at slot {slot} (len {len})")]
    NotFound { slot: usize, len: usize },

    /// Handle does not resolve to a live node.
    #[error("Missing node: {0:?}")]
    MissingNode(NodeRef),

    /// Structural invariant violated.
    #[error("Corrupted tree: {0}")]
    CorruptedTree(String),
}

impl TreeError {
    /// Create an IndexOutOfBounds error
    pub fn out_of_bounds(index: isize, len: usize) -> Self {
        Self::IndexOutOfBounds { index, len }
    }

    /// Create a CorruptedTree error with context
    pub fn corrupted_tree(component: &str, details: &str) -> Self {
        Self::CorruptedTree(format!("{} corruption: {}", component, details))
    }

    /// Check if this error is an index error
    pub fn is_out_of_bounds(&self) -> bool {
        matches!(self, Self::IndexOutOfBounds { .. })
    }

    /// Check if this error comes from a handle whose node no longer exists
    pub fn is_stale_handle(&self) -> bool {
        matches!(self, Self::MissingNode(_))
    }

    /// Check if this error comes from child-slot bookkeeping
    pub fn is_slot_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidSlot(_)
                | Self::CapacityExceeded
                | Self::SkippedSlot { .. }
                | Self::NotFound { .. }
        )
    }
}

/// Result type for tree operations
pub type TreeResult<T> = Result<T, TreeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            TreeError::out_of_bounds(7, 3).to_string(),
            "Index out of bounds: 7 (len 3)"
        );
        assert_eq!(
            TreeError::CapacityExceeded.to_string(),
            "Cannot add more than 4 children to a node"
        );
        assert_eq!(
            TreeError::corrupted_tree("Depth", "leaf at 2, expected 3").to_string(),
            "Corrupted tree: Depth corruption: leaf at 2, expected 3"
        );
    }

    #[test]
    fn test_error_classification() {
        assert!(TreeError::out_of_bounds(-1, 0).is_out_of_bounds());
        assert!(TreeError::InvalidSlot(4).is_slot_error());
        assert!(TreeError::NotFound { slot: 2, len: 2 }.is_slot_error());
        assert!(!TreeError::CapacityExceeded.is_out_of_bounds());
    }
}
