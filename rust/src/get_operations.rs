//! GET operations for SeqTree.
//!
//! Positional lookup descends from the root comparing the requested offset
//! against each child's cached Size, so a lookup costs one cached read per
//! visited child.

use tracing::warn;

use crate::error::{TreeError, TreeResult};
use crate::types::{NodeId, NodeRef, SeqTree};

impl<T> SeqTree<T> {
    /// Number of elements.
    ///
    /// A tree whose root cannot be read reports 0 and logs a warning.
    pub fn len(&self) -> usize {
        match self.size_of(self.root()) {
            Ok(len) => len,
            Err(error) => {
                warn!(%error, "root size unreadable, reporting empty");
                0
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.internal(self.root).map_or(true, |root| root.is_empty())
    }

    /// Resolve a possibly negative index against the current length.
    ///
    /// Negative indices count from the end. With `allow_end` the one-past-last
    /// position is accepted as well (for insertion).
    pub fn resolve_index(&self, index: isize, allow_end: bool) -> TreeResult<usize> {
        let len = self.len();
        let resolved = if index < 0 { len as isize + index } else { index };
        let upper = if allow_end { len as isize } else { len as isize - 1 };

        if resolved < 0 || resolved > upper {
            return Err(TreeError::out_of_bounds(index, len));
        }
        Ok(resolved as usize)
    }

    /// Handle of the leaf at `index`.
    ///
    /// # Examples
    ///
    /// ```
    /// use treevec::SeqTree;
    ///
    /// let mut tree = SeqTree::from_vec(vec![10, 20, 30]);
    /// let leaf = tree.at_index(-1).unwrap();
    /// assert_eq!(*tree.data(leaf).unwrap(), 30);
    /// tree.set_data(leaf, 33).unwrap();
    /// assert_eq!(*tree.get(2).unwrap(), 33);
    /// assert!(tree.at_index(3).is_err());
    /// ```
    pub fn at_index(&self, index: isize) -> TreeResult<NodeId> {
        let mut offset = self.resolve_index(index, false)?;
        let mut node = self.root();

        loop {
            match node {
                NodeRef::Leaf(id) => return Ok(id),
                NodeRef::Internal(id) => node = self.child_containing(id, &mut offset)?,
            }
        }
    }

    /// Child of `id` covering `offset`; `offset` becomes relative to that child.
    pub(crate) fn child_containing(&self, id: NodeId, offset: &mut usize) -> TreeResult<NodeRef> {
        for child in self.internal(id)?.children() {
            let size = self.size_of(child)?;
            if *offset < size {
                return Ok(child);
            }
            *offset -= size;
        }
        Err(TreeError::corrupted_tree(
            "Index lookup",
            &format!("offset {} past the end of node {}", offset, id),
        ))
    }

    /// Element at `index`.
    pub fn get(&self, index: isize) -> TreeResult<&T> {
        let leaf = self.at_index(index)?;
        self.data(leaf)
    }

    /// Mutable element at `index`.
    ///
    /// The cached aggregates above the leaf are invalidated up front, since
    /// any monoid may depend on the payload.
    pub fn get_mut(&mut self, index: isize) -> TreeResult<&mut T> {
        let leaf = self.at_index(index)?;
        self.data_mut(leaf)
    }

    /// Replace the element at `index`, returning the old one.
    pub fn set(&mut self, index: isize, value: T) -> TreeResult<T> {
        let leaf = self.at_index(index)?;
        self.set_data(leaf, value)
    }

    /// Payload of a leaf handle.
    pub fn data(&self, leaf: NodeId) -> TreeResult<&T> {
        Ok(&self.leaf(leaf)?.data)
    }

    /// Mutable payload of a leaf handle; invalidates the ancestors' caches.
    pub fn data_mut(&mut self, leaf: NodeId) -> TreeResult<&mut T> {
        let parent = self.leaf(leaf)?.parent;
        self.invalidate_from(parent);
        Ok(&mut self.leaf_mut(leaf)?.data)
    }

    /// Replace the payload of a leaf handle, returning the old one.
    pub fn set_data(&mut self, leaf: NodeId, value: T) -> TreeResult<T> {
        let slot = self.data_mut(leaf)?;
        Ok(std::mem::replace(slot, value))
    }
}
