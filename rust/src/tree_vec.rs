//! Array-style facade over [`SeqTree`].
//!
//! `TreeVec` translates the usual array vocabulary (push, pop, shift,
//! unshift, splice with clamped indices) into tree calls and reports every
//! completed mutation to its listeners.

use std::fmt;
use std::ops::Index;

use crate::error::TreeResult;
use crate::events::{Change, ListenerId, Listeners};
use crate::iteration::Iter;
use crate::monoid::Monoid;
use crate::types::SeqTree;

/// A growable sequence with O(log n) positional insert and remove.
///
/// # Examples
///
/// ```
/// use treevec::{Sum, TreeVec};
///
/// let mut list: TreeVec<i32> = (1..=5).collect();
/// list.push(6).unwrap();
/// assert_eq!(list.shift().unwrap(), Some(1));
///
/// let removed = list.splice(1, 2, vec![30, 40, 50]).unwrap();
/// assert_eq!(removed, vec![3, 4]);
/// assert_eq!(list, vec![2, 30, 40, 50, 5, 6]);
/// assert_eq!(list.fold_to(2, &Sum).unwrap(), 32);
/// ```
pub struct TreeVec<T> {
    tree: SeqTree<T>,
    listeners: Listeners,
}

impl<T> TreeVec<T> {
    pub fn new() -> Self {
        Self::from_tree(SeqTree::new())
    }

    fn from_tree(tree: SeqTree<T>) -> Self {
        Self {
            tree,
            listeners: Listeners::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Underlying tree, for aggregates and leaf handles.
    pub fn as_tree(&self) -> &SeqTree<T> {
        &self.tree
    }

    // ============================================================================
    // ELEMENT ACCESS
    // ============================================================================

    /// Element at `index`; negative indices count from the end.
    pub fn at(&self, index: isize) -> TreeResult<&T> {
        self.tree.get(index)
    }

    /// Element at `index`, or `None` past the end.
    pub fn get(&self, index: usize) -> Option<&T> {
        if index >= self.len() {
            return None;
        }
        self.tree.get(index as isize).ok()
    }

    /// Replace the element at `index`, returning the old one.
    pub fn set(&mut self, index: isize, value: T) -> TreeResult<T> {
        let resolved = self.tree.resolve_index(index, false)?;
        let old = self.tree.set(index, value)?;
        self.listeners.emit(Change::Updated { index: resolved });
        Ok(old)
    }

    // ============================================================================
    // ARRAY MUTATORS
    // ============================================================================

    pub fn push(&mut self, item: T) -> TreeResult<()> {
        self.extend_back(vec![item])
    }

    /// Append every item, in order.
    pub fn extend_back(&mut self, items: Vec<T>) -> TreeResult<()> {
        let len = self.len();
        self.insert_items(len, items)
    }

    /// Remove and return the last element.
    pub fn pop(&mut self) -> TreeResult<Option<T>> {
        match self.len() {
            0 => Ok(None),
            len => self.remove_items(len - 1, 1).map(|mut removed| removed.pop()),
        }
    }

    /// Remove and return the first element.
    pub fn shift(&mut self) -> TreeResult<Option<T>> {
        if self.is_empty() {
            return Ok(None);
        }
        self.remove_items(0, 1).map(|mut removed| removed.pop())
    }

    /// Insert `item` at the front.
    pub fn unshift(&mut self, item: T) -> TreeResult<()> {
        self.insert_items(0, vec![item])
    }

    /// Insert `item` before `index`; `index == len()` appends.
    pub fn insert(&mut self, index: isize, item: T) -> TreeResult<()> {
        let index = self.tree.resolve_index(index, true)?;
        self.insert_items(index, vec![item])
    }

    /// Remove `delete_count` elements at `at`, insert `items` there, and
    /// return the removed elements.
    ///
    /// Indices clamp the way array splices do: a negative `at` counts from
    /// the end and stops at 0, an `at` past the end appends, and
    /// `delete_count` stops at the end.
    pub fn splice(&mut self, at: isize, delete_count: usize, items: Vec<T>) -> TreeResult<Vec<T>> {
        let len = self.len();
        let start = if at < 0 {
            len.saturating_sub(at.unsigned_abs())
        } else {
            (at as usize).min(len)
        };
        let delete_count = delete_count.min(len - start);

        let removed = self.remove_items(start, delete_count)?;
        self.insert_items(start, items)?;
        Ok(removed)
    }

    /// Swap in `items` as the whole contents, returning the old ones.
    pub fn replace(&mut self, items: Vec<T>) -> TreeResult<Vec<T>> {
        let len = self.len();
        self.splice(0, len, items)
    }

    /// Shorten to `len` elements; longer lengths leave the sequence unchanged.
    pub fn truncate(&mut self, len: usize) -> TreeResult<()> {
        let current = self.len();
        if len < current {
            self.remove_items(len, current - len)?;
        }
        Ok(())
    }

    pub fn clear(&mut self) {
        let count = self.len();
        self.tree.clear();
        if count > 0 {
            self.listeners.emit(Change::Removed { index: 0, count });
        }
    }

    fn insert_items(&mut self, index: usize, items: Vec<T>) -> TreeResult<()> {
        let count = items.len();
        if count == 0 {
            return Ok(());
        }
        self.tree.insert(index as isize, items)?;
        self.listeners.emit(Change::Inserted { index, count });
        Ok(())
    }

    fn remove_items(&mut self, index: usize, count: usize) -> TreeResult<Vec<T>> {
        if count == 0 {
            return Ok(Vec::new());
        }
        let removed = self.tree.remove(index as isize, count)?;
        self.listeners.emit(Change::Removed {
            index,
            count: removed.len(),
        });
        Ok(removed)
    }

    // ============================================================================
    // AGGREGATES
    // ============================================================================

    /// Fold `monoid` over the first `index` elements.
    pub fn fold_to<M: Monoid<T>>(&self, index: usize, monoid: &M) -> TreeResult<M::Value> {
        self.tree.fold_to_index(index, monoid)
    }

    /// Fold `monoid` over every element.
    pub fn fold<M: Monoid<T>>(&self, monoid: &M) -> TreeResult<M::Value> {
        self.tree.fold(monoid)
    }

    /// Length of the longest prefix whose fold satisfies `take_while`.
    pub fn find_index<M, P>(&self, monoid: &M, take_while: P) -> TreeResult<usize>
    where
        M: Monoid<T>,
        P: Fn(&M::Value) -> bool,
    {
        self.tree.find_index(monoid, take_while)
    }

    // ============================================================================
    // ITERATION AND LISTENERS
    // ============================================================================

    pub fn iter(&self) -> Iter<'_, T> {
        self.tree.iter()
    }

    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.iter().cloned().collect()
    }

    /// Call `listener` after every completed mutation.
    pub fn subscribe<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&Change) + 'static,
    {
        self.listeners.add(listener)
    }

    /// Returns false if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl<T> Default for TreeVec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> From<Vec<T>> for TreeVec<T> {
    fn from(items: Vec<T>) -> Self {
        Self::from_tree(SeqTree::from_vec(items))
    }
}

impl<T> FromIterator<T> for TreeVec<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_tree(iter.into_iter().collect())
    }
}

impl<T> Index<usize> for TreeVec<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        match self.get(index) {
            Some(item) => item,
            None => panic!(
                "index out of bounds: the len is {} but the index is {}",
                self.len(),
                index
            ),
        }
    }
}

impl<'a, T> IntoIterator for &'a TreeVec<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: PartialEq> PartialEq for TreeVec<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<T: Eq> Eq for TreeVec<T> {}

impl<T: PartialEq> PartialEq<[T]> for TreeVec<T> {
    fn eq(&self, other: &[T]) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<T: PartialEq> PartialEq<Vec<T>> for TreeVec<T> {
    fn eq(&self, other: &Vec<T>) -> bool {
        self == other.as_slice()
    }
}

impl<T: PartialEq, const N: usize> PartialEq<[T; N]> for TreeVec<T> {
    fn eq(&self, other: &[T; N]) -> bool {
        self == other.as_slice()
    }
}

impl<T: fmt::Debug> fmt::Debug for TreeVec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monoid::Sum;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_array_mutators() {
        let mut list = TreeVec::new();
        assert_eq!(list.pop().unwrap(), None);
        assert_eq!(list.shift().unwrap(), None);

        list.push(1).unwrap();
        list.push(2).unwrap();
        list.unshift(0).unwrap();
        list.insert(-1, 9).unwrap();
        assert_eq!(list, [0, 1, 9, 2]);

        assert_eq!(list.pop().unwrap(), Some(2));
        assert_eq!(list.shift().unwrap(), Some(0));
        assert_eq!(list, [1, 9]);
        assert!(list.as_tree().is_balanced());
    }

    #[test]
    fn test_splice_clamps_like_arrays() {
        let mut list: TreeVec<i32> = (0..5).collect();
        assert_eq!(list.splice(-2, 10, vec![]).unwrap(), vec![3, 4]);
        assert_eq!(list.splice(-10, 1, vec![7]).unwrap(), vec![0]);
        assert_eq!(list.splice(50, 3, vec![8, 9]).unwrap(), Vec::<i32>::new());
        assert_eq!(list, [7, 1, 2, 8, 9]);
    }

    #[test]
    fn test_replace_truncate_clear() {
        let mut list: TreeVec<i32> = vec![1, 2, 3].into();
        assert_eq!(list.replace(vec![2, 4]).unwrap(), vec![1, 2, 3]);
        assert_eq!(list.fold(&Sum).unwrap(), 6);

        list.extend_back(vec![6, 8]).unwrap();
        list.truncate(10).unwrap();
        assert_eq!(list.len(), 4);
        list.truncate(1).unwrap();
        assert_eq!(list, [2]);

        list.clear();
        assert!(list.is_empty());
        assert_eq!(list.fold(&Sum).unwrap(), 0);
    }

    #[test]
    fn test_indexing() {
        let mut list: TreeVec<&str> = vec!["a", "b", "c"].into();
        assert_eq!(list[1], "b");
        assert_eq!(list.get(3), None);
        assert_eq!(*list.at(-1).unwrap(), "c");
        assert_eq!(list.set(-3, "z").unwrap(), "a");
        assert_eq!(list.to_vec(), vec!["z", "b", "c"]);
        assert_eq!(format!("{:?}", list), r#"["z", "b", "c"]"#);
    }

    #[test]
    #[should_panic(expected = "index out of bounds")]
    fn test_index_past_end_panics() {
        let list: TreeVec<i32> = vec![1].into();
        let _value = list[1];
    }

    #[test]
    fn test_change_events() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut list: TreeVec<i32> = (0..4).collect();
        let sink = Rc::clone(&log);
        let id = list.subscribe(move |change| sink.borrow_mut().push(*change));

        list.push(4).unwrap();
        list.splice(1, 2, vec![10]).unwrap();
        list.set(0, 5).unwrap();
        list.splice(0, 0, vec![]).unwrap();
        list.clear();

        assert_eq!(
            *log.borrow(),
            vec![
                Change::Inserted { index: 4, count: 1 },
                Change::Removed { index: 1, count: 2 },
                Change::Inserted { index: 1, count: 1 },
                Change::Updated { index: 0 },
                Change::Removed { index: 0, count: 4 },
            ]
        );

        assert!(list.unsubscribe(id));
        assert_eq!(list.listener_count(), 0);
        list.push(1).unwrap();
        assert_eq!(log.borrow().len(), 5);
    }

    #[test]
    fn test_failed_mutation_emits_nothing() {
        let hits = Rc::new(RefCell::new(0));
        let mut list: TreeVec<i32> = (0..3).collect();
        let counter = Rc::clone(&hits);
        list.subscribe(move |_| *counter.borrow_mut() += 1);

        assert!(list.set(3, 0).is_err());
        assert!(list.insert(5, 0).is_err());
        assert_eq!(*hits.borrow(), 0);
    }
}
