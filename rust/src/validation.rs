//! Validation and debugging utilities for SeqTree.
//!
//! This module contains invariant checking and node counting used by the
//! tests and available to callers who want to assert tree health.

use crate::error::{TreeError, TreeResult};
use crate::types::{NodeId, NodeRef, SeqTree, MAX_CHILDREN, NULL_NODE};

/// What a recursive walk below one node found.
struct SubtreeReport {
    leaves: usize,
    internals: usize,
}

// ============================================================================
// VALIDATION METHODS
// ============================================================================

impl<T> SeqTree<T> {
    /// Check every structural invariant, returning the tree height.
    ///
    /// Verified: equal leaf depth, 2 or 3 children per non-root internal node,
    /// a root with at most 3 children whose sole child (if any) is a leaf,
    /// back-links matching slots, densely packed slots, cached sizes matching
    /// the reachable leaves, the same-level walk visiting every leaf, and
    /// arena allocation counts matching the reachable nodes.
    pub fn check_invariants(&self) -> TreeResult<usize> {
        let root = self.internal(self.root)?;
        if root.parent != NULL_NODE {
            return Err(TreeError::corrupted_tree(
                "Root",
                &format!("root {} has parent {}", self.root, root.parent),
            ));
        }

        let mut leaf_depth = None;
        let report = self.check_node(self.root, 0, &mut leaf_depth)?;

        self.check_arena_tree_consistency(&report)?;
        self.check_leaf_walk(report.leaves)?;

        Ok(leaf_depth.unwrap_or(0))
    }

    /// True when [`check_invariants`](Self::check_invariants) passes.
    pub fn is_balanced(&self) -> bool {
        self.check_invariants().is_ok()
    }

    /// Reachable `(leaves, internal nodes)`, the root included.
    pub fn count_nodes(&self) -> TreeResult<(usize, usize)> {
        let mut stack = vec![NodeRef::Internal(self.root)];
        let (mut leaves, mut internals) = (0, 0);
        while let Some(node) = stack.pop() {
            match node {
                NodeRef::Leaf(_) => leaves += 1,
                NodeRef::Internal(id) => {
                    internals += 1;
                    stack.extend(self.internal(id)?.children());
                }
            }
        }
        Ok((leaves, internals))
    }

    /// Depth of every leaf, left to right.
    pub fn leaf_depths(&self) -> TreeResult<Vec<usize>> {
        let mut depths = Vec::new();
        self.collect_leaf_depths(NodeRef::Internal(self.root), 0, &mut depths)?;
        Ok(depths)
    }

    fn collect_leaf_depths(&self, node: NodeRef, depth: usize, out: &mut Vec<usize>) -> TreeResult<()> {
        match node {
            NodeRef::Leaf(_) => out.push(depth),
            NodeRef::Internal(id) => {
                for child in self.internal(id)?.children() {
                    self.collect_leaf_depths(child, depth + 1, out)?;
                }
            }
        }
        Ok(())
    }

    fn check_node(&self, id: NodeId, depth: usize, leaf_depth: &mut Option<usize>) -> TreeResult<SubtreeReport> {
        let inode = self.internal(id)?;
        let len = inode.len();
        self.check_child_count(id, len)?;

        for (slot, child) in inode.slots.iter().enumerate() {
            if child.is_some() != (slot < len) {
                return Err(TreeError::corrupted_tree(
                    "Slot packing",
                    &format!("node {} has len {} but slot {} is {:?}", id, len, slot, child),
                ));
            }
        }

        let mut report = SubtreeReport { leaves: 0, internals: 1 };
        for (slot, child) in inode.children().enumerate() {
            if self.parent_of(child)? != Some(id) || self.slot_of(child)? != slot {
                return Err(TreeError::corrupted_tree(
                    "Back-link",
                    &format!(
                        "{:?} in slot {} of node {} records parent {:?} slot {}",
                        child,
                        slot,
                        id,
                        self.parent_of(child)?,
                        self.slot_of(child)?
                    ),
                ));
            }

            match child {
                NodeRef::Leaf(leaf) => {
                    self.leaf(leaf)?;
                    let depth = depth + 1;
                    match *leaf_depth {
                        None => *leaf_depth = Some(depth),
                        Some(expected) if expected != depth => {
                            return Err(TreeError::corrupted_tree(
                                "Leaf depth",
                                &format!("leaf {} at depth {}, expected {}", leaf, depth, expected),
                            ))
                        }
                        Some(_) => {}
                    }
                    report.leaves += 1;
                }
                NodeRef::Internal(child_id) => {
                    let below = self.check_node(child_id, depth + 1, leaf_depth)?;
                    report.leaves += below.leaves;
                    report.internals += below.internals;
                }
            }
        }

        let cached = self.size_of(NodeRef::Internal(id))?;
        if cached != report.leaves {
            return Err(TreeError::corrupted_tree(
                "Size cache",
                &format!("node {} caches size {} but holds {} leaves", id, cached, report.leaves),
            ));
        }
        Ok(report)
    }

    fn check_child_count(&self, id: NodeId, len: usize) -> TreeResult<()> {
        if id == self.root {
            if len >= MAX_CHILDREN {
                return Err(TreeError::corrupted_tree(
                    "Root",
                    &format!("root has {} children", len),
                ));
            }
            if len == 1 && !self.internal(id)?.first().map_or(false, |n| n.is_leaf()) {
                return Err(TreeError::corrupted_tree(
                    "Root",
                    "root has a sole internal child",
                ));
            }
            return Ok(());
        }

        if !(2..MAX_CHILDREN).contains(&len) {
            return Err(TreeError::corrupted_tree(
                "Child count",
                &format!("node {} has {} children", id, len),
            ));
        }
        Ok(())
    }

    /// Arena allocation must match the reachable structure exactly.
    fn check_arena_tree_consistency(&self, report: &SubtreeReport) -> TreeResult<()> {
        let leaf_count = self.leaf_arena.len();
        if leaf_count != report.leaves {
            return Err(TreeError::corrupted_tree(
                "Leaf arena",
                &format!("{} in tree vs {} in arena", report.leaves, leaf_count),
            ));
        }

        let internal_count = self.internal_arena.len();
        if internal_count != report.internals {
            return Err(TreeError::corrupted_tree(
                "Internal arena",
                &format!("{} in tree vs {} in arena", report.internals, internal_count),
            ));
        }
        Ok(())
    }

    /// The same-level walk from the first leaf must visit every leaf.
    fn check_leaf_walk(&self, leaves: usize) -> TreeResult<()> {
        let walked = self.iter().count();
        if walked != leaves {
            return Err(TreeError::corrupted_tree(
                "Leaf walk",
                &format!("walk visited {} of {} leaves", walked, leaves),
            ));
        }
        Ok(())
    }
}
