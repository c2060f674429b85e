//! Prefix folds for SeqTree.
//!
//! `fold_to_index` and `find_index` are the same walk seen from two sides:
//! descend from the root, accepting each child's whole cached contribution
//! while a predicate on the running criteria value still holds, and
//! descending into the first child that would break it.

use crate::error::{TreeError, TreeResult};
use crate::monoid::{Monoid, Size};
use crate::types::{NodeRef, SeqTree};

impl<T> SeqTree<T> {
    /// Walk the longest prefix whose `criteria` fold satisfies `take_while`.
    ///
    /// Returns the criteria fold and the `sum` fold over that prefix.
    /// `take_while` must be monotone along the sequence: once it fails for a
    /// prefix it must fail for every longer one.
    pub fn fold_to_find_value<C, S, P>(
        &self,
        criteria: &C,
        take_while: P,
        sum: &S,
    ) -> TreeResult<(C::Value, S::Value)>
    where
        C: Monoid<T>,
        S: Monoid<T>,
        P: Fn(&C::Value) -> bool,
    {
        let mut found = criteria.identity();
        let mut total = sum.identity();
        let mut node = self.root;

        'descend: loop {
            for child in self.internal(node)?.children() {
                let candidate = criteria.combine(&found, &self.get_field(child, criteria)?);
                if take_while(&candidate) {
                    found = candidate;
                    total = sum.combine(&total, &self.get_field(child, sum)?);
                    continue;
                }

                match child {
                    NodeRef::Leaf(_) => break 'descend,
                    NodeRef::Internal(id) => {
                        node = id;
                        continue 'descend;
                    }
                }
            }
            break;
        }

        Ok((found, total))
    }

    /// Fold `monoid` over the elements in `[0, index)`.
    ///
    /// # Examples
    ///
    /// ```
    /// use treevec::{SeqTree, Sum};
    ///
    /// let tree: SeqTree<i32> = (0..10).collect();
    /// assert_eq!(tree.fold_to_index(4, &Sum).unwrap(), 6);
    /// assert_eq!(tree.fold_to_index(10, &Sum).unwrap(), 45);
    /// assert!(tree.fold_to_index(11, &Sum).is_err());
    /// ```
    pub fn fold_to_index<M: Monoid<T>>(&self, index: usize, monoid: &M) -> TreeResult<M::Value> {
        let len = self.len();
        if index > len {
            return Err(TreeError::out_of_bounds(index as isize, len));
        }
        let (_, value) = self.fold_to_find_value(&Size, |count: &usize| *count <= index, monoid)?;
        Ok(value)
    }

    /// Number of leading elements whose `monoid` fold satisfies `take_while`.
    ///
    /// ```
    /// use treevec::{SeqTree, Sum};
    ///
    /// let tree: SeqTree<u32> = vec![5, 5, 5, 5].into();
    /// assert_eq!(tree.find_index(&Sum, |total: &u32| *total < 12).unwrap(), 2);
    /// ```
    pub fn find_index<M, P>(&self, monoid: &M, take_while: P) -> TreeResult<usize>
    where
        M: Monoid<T>,
        P: Fn(&M::Value) -> bool,
    {
        let (_, count) = self.fold_to_find_value(monoid, take_while, &Size)?;
        Ok(count)
    }

    /// Fold `monoid` over the whole sequence.
    pub fn fold<M: Monoid<T>>(&self, monoid: &M) -> TreeResult<M::Value> {
        self.get_field(self.root(), monoid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monoid::{FnMonoid, Sum};

    #[test]
    fn test_prefix_sum_excludes_index() {
        let tree: SeqTree<i32> = (0..10).collect();
        assert_eq!(tree.fold_to_index(4, &Sum).unwrap(), 6);
        assert_eq!(tree.fold_to_index(0, &Sum).unwrap(), 0);
    }

    #[test]
    fn test_prefix_sum_every_index() {
        for len in 0..40 {
            let tree: SeqTree<i64> = (1..=len).collect();
            for k in 0..=len {
                let expected: i64 = (1..=k).sum();
                assert_eq!(tree.fold_to_index(k as usize, &Sum).unwrap(), expected, "len {} k {}", len, k);
            }
            assert!(tree.fold_to_index(len as usize + 1, &Sum).unwrap_err().is_out_of_bounds());
        }
    }

    #[test]
    fn test_find_index_by_running_total() {
        let tree: SeqTree<u32> = vec![3, 1, 4, 1, 5, 9, 2, 6].into();
        assert_eq!(tree.find_index(&Sum, |t: &u32| *t <= 9).unwrap(), 4);
        assert_eq!(tree.find_index(&Sum, |t: &u32| *t < 3).unwrap(), 0);
        assert_eq!(tree.find_index(&Sum, |_: &u32| true).unwrap(), 8);
    }

    #[test]
    fn test_find_index_agrees_with_fold_to_index() {
        let tree: SeqTree<u32> = (0..100).collect();
        for k in 0..=100 {
            let prefix = tree.fold_to_index(k, &Sum).unwrap();
            let found = tree.find_index(&Sum, |t: &u32| *t <= prefix).unwrap();
            // Element 0 adds nothing, so the walk may run one past k at the front.
            assert!(found >= k, "k {} found {}", k, found);
            assert_eq!(tree.fold_to_index(found, &Sum).unwrap(), prefix);
        }
    }

    #[test]
    fn test_custom_monoid_prefix() {
        let tree: SeqTree<i32> = vec![4, -2, 9, 3, 7].into();
        let max = FnMonoid::new(i32::MIN, |a: &i32, b: &i32| *a.max(b), |x: &i32| *x);
        assert_eq!(tree.fold_to_index(2, &max).unwrap(), 4);
        assert_eq!(tree.fold_to_index(3, &max).unwrap(), 9);
        assert_eq!(tree.fold(&max).unwrap(), 9);
    }

    #[test]
    fn test_fold_after_mutation() {
        let mut tree: SeqTree<i32> = (0..20).collect();
        assert_eq!(tree.fold(&Sum).unwrap(), 190);
        tree.remove(0, 10).unwrap();
        assert_eq!(tree.fold(&Sum).unwrap(), 145);
        tree.insert(5, vec![1000]).unwrap();
        assert_eq!(tree.fold(&Sum).unwrap(), 1145);
        assert_eq!(tree.fold_to_index(6, &Sum).unwrap(), 10 + 11 + 12 + 13 + 14 + 1000);
    }

    #[test]
    fn test_empty_tree() {
        let tree = SeqTree::<i32>::new();
        assert_eq!(tree.fold(&Sum).unwrap(), 0);
        assert_eq!(tree.fold_to_index(0, &Sum).unwrap(), 0);
        assert_eq!(tree.find_index(&Sum, |_: &i32| true).unwrap(), 0);
    }
}
