use std::cell::Cell;
use std::rc::Rc;

use treevec::{FnMonoid, Monoid, MonoidId, NodeRef, SeqTree, Size};

/// Counts leaves, the same as `Size`, under its own cache key.
fn counting() -> FnMonoid<i32, usize> {
    FnMonoid::new(0, |a: &usize, b: &usize| a + b, |_: &i32| 1)
}

#[test]
fn test_cached_fold() {
    let tree: SeqTree<i32> = (0..11).collect();
    assert_eq!(tree.fold(&counting()).unwrap(), 11);
}

#[test]
fn test_cache_follows_insertion() {
    let mut tree: SeqTree<i32> = (0..11).collect();
    let count = counting();
    assert_eq!(tree.fold(&count).unwrap(), 11);
    tree.insert(0, vec![1, 2]).unwrap();
    assert_eq!(tree.fold(&count).unwrap(), 13);
}

#[test]
fn test_cache_follows_removal() {
    let mut tree: SeqTree<i32> = (0..11).collect();
    let count = counting();
    assert_eq!(tree.fold(&count).unwrap(), 11);
    tree.remove(0, 2).unwrap();
    assert_eq!(tree.fold(&count).unwrap(), 9);
}

/// Sum that records how many leaves it measured.
struct MeteredSum {
    measured: Rc<Cell<usize>>,
}

impl Monoid<i32> for MeteredSum {
    type Value = i64;

    fn identity(&self) -> i64 {
        0
    }

    fn combine(&self, a: &i64, b: &i64) -> i64 {
        a + b
    }

    fn measure(&self, data: &i32) -> i64 {
        self.measured.set(self.measured.get() + 1);
        *data as i64
    }

    fn id(&self) -> MonoidId {
        MonoidId::of::<Self>()
    }
}

#[test]
fn test_warm_cache_measures_nothing() {
    let measured = Rc::new(Cell::new(0));
    let sum = MeteredSum {
        measured: Rc::clone(&measured),
    };
    let tree: SeqTree<i32> = (0..64).collect();

    assert_eq!(tree.fold(&sum).unwrap(), 2016);
    assert_eq!(measured.get(), 64);

    assert_eq!(tree.fold(&sum).unwrap(), 2016);
    assert_eq!(measured.get(), 64);
}

#[test]
fn test_write_recomputes_only_the_dirty_path() {
    let measured = Rc::new(Cell::new(0));
    let sum = MeteredSum {
        measured: Rc::clone(&measured),
    };
    let mut tree: SeqTree<i32> = (0..64).collect();
    tree.fold(&sum).unwrap();
    measured.set(0);

    tree.set(10, 1000).unwrap();
    assert_eq!(tree.fold(&sum).unwrap(), 2016 - 10 + 1000);

    // Only the children of nodes on the root-to-leaf path are re-read.
    let height = tree.height().unwrap();
    assert!(measured.get() <= 3 * height, "measured {} leaves", measured.get());
}

#[test]
fn test_subtree_fields_agree_with_children() {
    let mut tree: SeqTree<i32> = (0..200).collect();
    tree.remove(50, 75).unwrap();
    tree.insert(10, (1000..1040).collect()).unwrap();

    let mut stack = vec![tree.root()];
    while let Some(node) = stack.pop() {
        if let NodeRef::Internal(id) = node {
            let children: Vec<NodeRef> = tree.internal_node(id).unwrap().children().collect();
            let total: usize = children.iter().map(|c| tree.get_field(*c, &Size).unwrap()).sum();
            assert_eq!(tree.get_field(node, &Size).unwrap(), total);
            stack.extend(children);
        }
    }
    assert_eq!(tree.len(), 165);
}

#[test]
fn test_distinct_closures_do_not_share_entries() {
    let tree: SeqTree<i32> = (1..=4).collect();
    let sum = FnMonoid::new(0, |a: &i32, b: &i32| a + b, |x: &i32| *x);
    let product = FnMonoid::new(1, |a: &i32, b: &i32| a * b, |x: &i32| *x);

    assert_eq!(tree.fold(&sum).unwrap(), 10);
    assert_eq!(tree.fold(&product).unwrap(), 24);
    assert_eq!(tree.fold(&sum).unwrap(), 10);
}

/// Number of payloads strictly above a threshold.
struct CountAbove(i32);

impl Monoid<i32> for CountAbove {
    type Value = usize;

    fn identity(&self) -> usize {
        0
    }

    fn combine(&self, a: &usize, b: &usize) -> usize {
        a + b
    }

    fn measure(&self, data: &i32) -> usize {
        usize::from(*data > self.0)
    }

    fn id(&self) -> MonoidId {
        MonoidId::keyed::<Self>(self.0 as u64)
    }
}

#[test]
fn test_parameterised_monoids_keep_separate_entries() {
    let mut tree: SeqTree<i32> = (0..10).collect();

    assert_eq!(tree.fold(&CountAbove(5)).unwrap(), 4);
    assert_eq!(tree.fold(&CountAbove(0)).unwrap(), 9);
    assert_eq!(tree.fold_to_index(6, &CountAbove(2)).unwrap(), 3);

    // Both entries are still correct after a write dirties the path.
    tree.set(9, -1).unwrap();
    assert_eq!(tree.fold(&CountAbove(5)).unwrap(), 3);
    assert_eq!(tree.fold(&CountAbove(0)).unwrap(), 8);
}
