use treevec::{NodeRef, SeqTree, Size, Sum, TreeError};

fn values(tree: &SeqTree<i32>) -> Vec<i32> {
    tree.iter().copied().collect()
}

fn fifteen() -> SeqTree<i32> {
    (0..15).collect()
}

#[test]
fn test_remove_single_from_fifteen() {
    let mut tree = fifteen();
    tree.remove(7, 1).unwrap();

    assert_eq!(values(&tree), (0..7).chain(8..15).collect::<Vec<_>>());
    assert_eq!(tree.get_field(tree.root(), &Size).unwrap(), 14);
    tree.check_invariants().unwrap();
}

#[test]
fn test_insert_single_into_fifteen() {
    let mut tree = fifteen();
    tree.insert(5, vec![66]).unwrap();

    let expected: Vec<i32> = (0..5).chain([66]).chain(5..15).collect();
    assert_eq!(values(&tree), expected);
    assert_eq!(tree.len(), 16);
    tree.check_invariants().unwrap();
}

#[test]
fn test_fill_then_empty() {
    let mut tree = SeqTree::from_vec(Vec::new());
    tree.insert(0, vec![1, 2, 3]).unwrap();
    tree.remove(0, 3).unwrap();

    assert_eq!(tree.len(), 0);
    assert_eq!(tree.internal_node(tree.root().id()).unwrap().len(), 0);
    tree.check_invariants().unwrap();
}

#[test]
fn test_rebalance_after_popping_both_children() {
    let mut tree = SeqTree::from_vec(vec![1, 2, 3, 4]);
    let root = tree.root().id();
    let parent = tree.child_at(root, 1).unwrap().unwrap().id();

    let mut dropped = Vec::new();
    for _ in 0..2 {
        let last = tree.internal_node(parent).unwrap().len() - 1;
        let leaf = tree.pop_child(parent, last).unwrap();
        tree.free_subtree(leaf, &mut dropped).unwrap();
    }
    tree.rebalance(parent).unwrap();

    assert_eq!(dropped, vec![4, 3]);
    assert!(tree.is_balanced());
    assert!(tree.child_at(root, 1).unwrap().unwrap().is_leaf());
}

#[test]
fn test_prefix_sum_of_first_four() {
    let tree: SeqTree<i32> = (0..11).collect();
    assert_eq!(tree.fold_to_index(4, &Sum).unwrap(), 6);
}

#[test]
fn test_build_every_size_is_balanced() {
    for len in 0..11 {
        let tree: SeqTree<i32> = (0..len).collect();
        assert!(tree.is_balanced());
        assert_eq!(tree.len(), len as usize);
    }
}

#[test]
fn test_push_leaf_at_right_edge() {
    let mut tree = SeqTree::from_vec(vec![0]);
    for i in 1..10 {
        let last = tree.last_leaf().unwrap().unwrap();
        let parent = tree.parent_of(NodeRef::Leaf(last)).unwrap().unwrap();
        let leaf = tree.new_leaf(i);
        tree.push_child_back(parent, leaf).unwrap();
        tree.rebalance(parent).unwrap();

        tree.check_invariants().unwrap();
        assert_eq!(tree.len(), i as usize + 1);
    }
    assert_eq!(values(&tree), (0..10).collect::<Vec<_>>());
}

#[test]
fn test_rebalance_empty_tree() {
    let mut tree = SeqTree::<i32>::new();
    let root = tree.root().id();
    tree.rebalance(root).unwrap();
    assert!(tree.is_balanced());
}

#[test]
fn test_same_level_neighbours() {
    let tree: SeqTree<i32> = (1..=10).collect();

    let eighth = NodeRef::Leaf(tree.at_index(8).unwrap());
    let prev = tree.prev_node_at_same_level(eighth).unwrap().unwrap();
    assert_eq!(*tree.data(prev.id()).unwrap(), 8);

    let second = NodeRef::Leaf(tree.at_index(1).unwrap());
    let first = tree.prev_node_at_same_level(second).unwrap().unwrap();
    assert_eq!(*tree.data(first.id()).unwrap(), 1);
    assert_eq!(tree.prev_node_at_same_level(first).unwrap(), None);
    assert_eq!(tree.prev_node_at_same_level(tree.root()).unwrap(), None);

    let tree: SeqTree<i32> = (1..=5).collect();
    let fourth = NodeRef::Leaf(tree.at_index(3).unwrap());
    let fifth = tree.next_node_at_same_level(fourth).unwrap().unwrap();
    assert_eq!(*tree.data(fifth.id()).unwrap(), 5);
    assert_eq!(tree.next_node_at_same_level(fifth).unwrap(), None);
    assert_eq!(tree.next_node_at_same_level(tree.root()).unwrap(), None);
}

#[test]
fn test_child_slots() {
    let tree = fifteen();
    let leaf = NodeRef::Leaf(tree.at_index(2).unwrap());
    let parent = tree.parent_of(leaf).unwrap().unwrap();

    let first = tree.child_at(parent, 0).unwrap().unwrap();
    let second = tree.child_at(parent, 1).unwrap().unwrap();
    assert_eq!(*tree.data(first.id()).unwrap(), 2);
    assert_eq!(*tree.data(second.id()).unwrap(), 3);
    assert_eq!(tree.child_at(parent, 4), Err(TreeError::InvalidSlot(4)));
}

#[test]
fn test_push_errors_leave_tree_usable() {
    let mut tree = SeqTree::from_vec(vec![0, 1, 2, 3]);
    let leaf = NodeRef::Leaf(tree.at_index(2).unwrap());
    let parent = tree.parent_of(leaf).unwrap().unwrap();

    let extra = tree.new_leaf(100);
    assert_eq!(
        tree.push_child(parent, extra, 3),
        Err(TreeError::SkippedSlot { slot: 3, len: 2 })
    );

    for value in [101, 102] {
        let leaf = tree.new_leaf(value);
        tree.push_child(parent, leaf, 1).unwrap();
    }
    assert_eq!(tree.push_child(parent, extra, 1), Err(TreeError::CapacityExceeded));
    assert_eq!(
        tree.pop_child(parent, 4).unwrap_err(),
        TreeError::NotFound { slot: 4, len: 4 }
    );

    tree.rebalance(parent).unwrap();
    tree.free_subtree(extra, &mut Vec::new()).unwrap();
    tree.check_invariants().unwrap();
    assert_eq!(values(&tree), vec![0, 1, 2, 102, 101, 3]);
}

#[test]
fn test_insert_in_middle_repeatedly() {
    let mut tree = fifteen();
    let parent = tree
        .parent_of(NodeRef::Leaf(tree.at_index(3).unwrap()))
        .unwrap()
        .unwrap();

    for _ in 0..3 {
        let leaf = tree.new_leaf(66);
        let slot = tree.internal_node(parent).unwrap().len().min(2);
        tree.push_child(parent, leaf, slot).unwrap();
        tree.rebalance(parent).unwrap();
        assert!(tree.is_balanced());
    }
    assert_eq!(tree.len(), 18);
}

#[test]
fn test_rebalance_is_idempotent_on_balanced_nodes() {
    let mut tree: SeqTree<i32> = (0..100).collect();
    let before = tree.count_nodes().unwrap();

    let mut stack = vec![tree.root()];
    let mut internals = Vec::new();
    while let Some(node) = stack.pop() {
        if let NodeRef::Internal(id) = node {
            internals.push(id);
            stack.extend(tree.internal_node(id).unwrap().children());
        }
    }
    for id in internals {
        tree.rebalance(id).unwrap();
    }

    assert_eq!(tree.count_nodes().unwrap(), before);
    assert_eq!(values(&tree), (0..100).collect::<Vec<_>>());
}

#[test]
fn test_leaf_handle_dies_with_its_leaf() {
    let mut tree = fifteen();
    let handle = tree.at_index(0).unwrap();
    assert_eq!(*tree.data(handle).unwrap(), 0);

    tree.remove(0, 1).unwrap();
    // The freed leaf slot is taken by the new element.
    tree.insert(2, vec![99]).unwrap();

    let err = tree.data(handle).unwrap_err();
    assert!(err.is_stale_handle());
    assert!(matches!(err, TreeError::MissingNode(NodeRef::Leaf(_))));
    assert!(tree.set_data(handle, 7).unwrap_err().is_stale_handle());
    assert_eq!(*tree.get(2).unwrap(), 99);
    tree.check_invariants().unwrap();
}

#[test]
fn test_leaf_handles_die_on_clear() {
    let mut tree = fifteen();
    let handles: Vec<_> = tree.iterate(0, None).unwrap().collect();
    tree.clear();
    tree.insert(0, (100..115).collect()).unwrap();

    for handle in handles {
        assert!(tree.data(handle).unwrap_err().is_stale_handle());
    }
    assert_eq!(values(&tree), (100..115).collect::<Vec<_>>());
}
