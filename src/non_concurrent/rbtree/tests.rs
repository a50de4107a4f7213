use std::sync::RwLock;

use proptest::prelude::*;

use super::node::NIL;
use super::*;

/// Pre-order `(key, color, depth)` of every node, for comparing tree shapes.
fn shape<K: Ord + Copy>(tree: &RBTree<K>) -> Vec<(K, Color, usize)> {
    let mut out = vec![];
    let mut stack: Vec<(NodeRef, usize)> = tree.root().into_iter().map(|r| (r, 0)).collect();
    while let Some((node, depth)) = stack.pop() {
        out.push((tree.key(node).unwrap(), tree.color(node).unwrap(), depth));
        if let Some(right) = tree.right(node) {
            stack.push((right, depth + 1));
        }
        if let Some(left) = tree.left(node) {
            stack.push((left, depth + 1));
        }
    }
    out
}

fn sorted<K: Ord + Copy>(tree: &RBTree<K>) -> Vec<K> {
    tree.to_sorted_vec(tree.len()).unwrap()
}

fn tree_of(keys: &[i32]) -> RBTree {
    let mut tree = RBTree::new();
    for &key in keys {
        tree.insert(key).unwrap();
    }
    tree
}

fn assert_valid<K: Ord + Copy + std::fmt::Debug>(tree: &RBTree<K>) {
    let height = tree.validate().unwrap_or_else(|e| panic!("invalid tree {tree:?}: {e}"));
    assert_eq!(height, tree.black_height());
}

#[test]
fn empty_tree() {
    let tree = RBTree::<i32>::new();

    assert!(tree.is_empty());
    assert_eq!(tree.len(), 0);
    assert_eq!(tree.root(), None);
    assert_eq!(tree.min(), None);
    assert_eq!(tree.max(), None);
    assert_eq!(tree.find(&1), None);
    assert_eq!(tree.to_sorted_vec(0), Ok(vec![]));
    assert_eq!(tree.validate(), Ok(0));
    assert_eq!(tree.black_height(), 0);
}

#[test]
fn try_new_gives_an_empty_tree() {
    let tree = RBTree::<u64>::try_new().unwrap();
    assert!(tree.is_empty());
    assert_valid(&tree);
}

#[test]
fn sentinel_is_black_and_self_linked() {
    let tree = tree_of(&[3, 1, 4, 1, 5]);
    let nil = tree.nil();

    assert!(tree.is_nil(nil));
    assert_eq!(tree.key(nil), None);
    assert_eq!(tree.arena[NIL].color, Color::Black);
    assert_eq!((tree.arena[NIL].parent, tree.arena[NIL].left, tree.arena[NIL].right), (NIL, NIL, NIL));
}

#[test]
fn insert_erase_scenario() {
    let mut tree = tree_of(&[10, 20, 5, 15]);
    assert_valid(&tree);

    assert_eq!(tree.remove(&10), Ok(10));

    assert_eq!(sorted(&tree), vec![5, 15, 20]);
    assert_eq!(tree.color(tree.root().unwrap()), Some(Color::Black));
    assert_valid(&tree);
}

#[test]
fn single_key() {
    let mut tree = RBTree::new();
    let seven = tree.insert(7).unwrap();

    assert_eq!(tree.min(), Some(seven));
    assert_eq!(tree.max(), Some(seven));
    assert_eq!(tree.root(), Some(seven));
    assert_eq!(tree.color(seven), Some(Color::Black));

    assert_eq!(tree.erase(seven), Ok(7));

    assert!(tree.is_empty());
    assert_eq!(tree.root, NIL);
    assert_valid(&tree);
}

#[test]
fn duplicates() {
    let mut tree = tree_of(&[5, 5, 5]);
    assert_eq!(sorted(&tree), vec![5, 5, 5]);
    assert_valid(&tree);

    tree.remove(&5).unwrap();
    assert_eq!(sorted(&tree), vec![5, 5]);
    assert_valid(&tree);
}

#[test]
fn duplicates_go_right() {
    let mut tree = RBTree::new();
    let first = tree.insert(1).unwrap();
    let second = tree.insert(1).unwrap();

    assert_eq!(tree.right(first), Some(second));
    assert_eq!(tree.left(first), None);
    assert_eq!(tree.parent(second), Some(first));
}

#[test]
fn erase_root_of_two_node_tree() {
    let mut tree = RBTree::new();
    let root = tree.insert(1).unwrap();
    let child = tree.insert(2).unwrap();
    assert_eq!(tree.color(child), Some(Color::Red));

    tree.erase(root).unwrap();

    assert_eq!(tree.root(), Some(child));
    assert_eq!(tree.color(child), Some(Color::Black));
    assert_eq!(tree.parent(child), None);
    assert_eq!(tree.len(), 1);
    assert_valid(&tree);
}

#[test]
fn insert_outer_child_rotates_grandparent() {
    let tree = tree_of(&[1, 2, 3]);
    assert_eq!(shape(&tree), vec![(2, Color::Black, 0), (1, Color::Red, 1), (3, Color::Red, 1)]);
}

#[test]
fn insert_inner_child_rotates_twice() {
    let tree = tree_of(&[3, 1, 2]);
    assert_eq!(shape(&tree), vec![(2, Color::Black, 0), (1, Color::Red, 1), (3, Color::Red, 1)]);
}

#[test]
fn insert_red_uncle_recolors() {
    let tree = tree_of(&[2, 1, 3, 4]);
    assert_eq!(
        shape(&tree),
        vec![(2, Color::Black, 0), (1, Color::Black, 1), (3, Color::Black, 1), (4, Color::Red, 2)]
    );
}

#[test]
fn ascending_and_descending_runs_stay_balanced() {
    let mut up = RBTree::new();
    let mut down = RBTree::new();
    for i in 0..1000 {
        up.insert(i).unwrap();
        down.insert(-i).unwrap();
    }
    assert_valid(&up);
    assert_valid(&down);

    // a red-black tree with n nodes has height at most 2*log2(n+1)
    let depth = shape(&up).iter().map(|&(_, _, d)| d).max().unwrap();
    assert!(depth < 20, "depth {depth} too large");

    assert_eq!(sorted(&up), (0..1000).collect::<Vec<_>>());
    assert_eq!(up.key(up.min().unwrap()), Some(0));
    assert_eq!(up.key(up.max().unwrap()), Some(999));
    assert_eq!(down.key(down.min().unwrap()), Some(-999));
}

#[test]
fn erase_everything_in_every_position() {
    let keys: Vec<i32> = (0..64).map(|i| (i * 37) % 64).collect();
    for victim in 0..64 {
        let mut tree = tree_of(&keys);
        tree.remove(&victim).unwrap();
        assert_valid(&tree);
        assert_eq!(sorted(&tree), (0..64).filter(|&k| k != victim).collect::<Vec<_>>());
    }
}

#[test]
fn erase_rejects_stale_handles() {
    let mut tree = tree_of(&[1, 2, 3]);
    let two = tree.find(&2).unwrap();
    tree.erase(two).unwrap();
    let before = shape(&tree);

    assert_eq!(tree.erase(two), Err(RBTreeError::InvalidArgument(InvalidArgument::StaleNode)));
    assert_eq!(shape(&tree), before);

    // the slot gets reused, but the old handle still doesn't match it
    let again = tree.insert(2).unwrap();
    assert_ne!(again, two);
    assert_eq!(tree.key(two), None);
    assert_eq!(tree.key(again), Some(2));
}

#[test]
fn erase_rejects_foreign_handles() {
    let mut a = tree_of(&[1, 2, 3]);
    let mut b = a.clone();
    let from_a = a.find(&2).unwrap();
    let before = shape(&b);

    assert_eq!(b.erase(from_a), Err(RBTreeError::InvalidArgument(InvalidArgument::ForeignNode)));
    assert_eq!(shape(&b), before);
    assert_eq!(a.erase(from_a), Ok(2));
}

#[test]
fn erase_rejects_the_sentinel() {
    let mut tree = tree_of(&[1]);
    let nil = tree.nil();

    assert_eq!(tree.erase(nil), Err(RBTreeError::InvalidArgument(InvalidArgument::Sentinel)));
    assert_eq!(tree.len(), 1);
}

#[test]
fn removing_a_missing_key_changes_nothing() {
    let mut tree = tree_of(&[8, 4, 12, 2, 6]);
    let before = shape(&tree);

    assert_eq!(tree.remove(&5), Err(RBTreeError::InvalidArgument(InvalidArgument::KeyNotFound)));
    assert_eq!(shape(&tree), before);
    assert_eq!(tree.len(), 5);
}

#[test]
fn export_requires_exact_capacity() {
    let tree = tree_of(&[3, 1, 2]);
    let mismatch = |provided| RBTreeError::InvalidArgument(InvalidArgument::CapacityMismatch { expected: 3, provided });

    assert_eq!(tree.to_sorted_vec(2), Err(mismatch(2)));
    assert_eq!(tree.to_sorted_vec(4), Err(mismatch(4)));
    assert_eq!(tree.to_sorted_vec(3), Ok(vec![1, 2, 3]));

    let mut short = [0; 2];
    assert_eq!(tree.copy_sorted_into(&mut short), Err(mismatch(2)));
    assert_eq!(short, [0, 0]);

    let mut exact = [0; 3];
    tree.copy_sorted_into(&mut exact).unwrap();
    assert_eq!(exact, [1, 2, 3]);
}

#[test]
fn empty_export_with_nonzero_capacity_is_an_error() {
    let tree = RBTree::<i32>::new();
    assert!(tree.to_sorted_vec(1).is_err());
}

#[test]
fn rotation_without_child_is_a_no_op() {
    let mut tree = tree_of(&[2, 1, 3]);
    let leaf = tree.find(&1).unwrap();
    let before = shape(&tree);

    assert_eq!(tree.rotate_left(leaf), Ok(false));
    assert_eq!(tree.rotate_right(leaf), Ok(false));
    assert_eq!(shape(&tree), before);
}

#[test]
fn rotations_move_links_but_not_colors() {
    let mut tree = tree_of(&[2, 1, 3]);
    let root = tree.root().unwrap();
    let before = shape(&tree);

    assert_eq!(tree.rotate_left(root), Ok(true));

    let three = tree.find(&3).unwrap();
    assert_eq!(tree.root(), Some(three));
    assert_eq!(tree.left(three), Some(root));
    assert_eq!(tree.color(three), Some(Color::Red));
    assert_eq!(tree.validate(), Err(InvariantViolation::RootNotBlack));
    assert_eq!(sorted(&tree), vec![1, 2, 3]);

    assert_eq!(tree.rotate_right(three), Ok(true));
    assert_eq!(shape(&tree), before);
    assert_valid(&tree);
}

#[test]
fn rotation_rejects_bad_handles() {
    let mut tree = tree_of(&[1]);
    let nil = tree.nil();
    assert_eq!(tree.rotate_left(nil), Err(RBTreeError::InvalidArgument(InvalidArgument::Sentinel)));
}

#[test]
fn clear_and_reuse() {
    let mut tree = tree_of(&(0..100).collect::<Vec<_>>());
    let fifty = tree.find(&50).unwrap();

    tree.clear();
    assert!(tree.is_empty());
    assert_eq!(tree.len(), 0);
    assert_eq!(tree.key(fifty), None);
    assert_valid(&tree);

    tree.insert(50).unwrap();
    assert_eq!(sorted(&tree), vec![50]);
    assert_valid(&tree);
}

#[test]
fn destroy_deep_tree() {
    let tree = tree_of(&(0..100_000).collect::<Vec<_>>());
    tree.destroy();

    RBTree::<i32>::new().destroy();
}

#[test]
fn debug_lists_keys_in_order() {
    let tree = tree_of(&[3, 1, 2, 2]);
    assert_eq!(format!("{tree:?}"), "[1, 2, 2, 3]");
}

#[test]
fn validate_catches_broken_colors() {
    let mut tree = tree_of(&[2, 1, 3]);
    let one = tree.find(&1).unwrap().id;
    tree.arena[one].color = Color::Black;

    assert!(matches!(tree.validate(), Err(InvariantViolation::BlackHeightMismatch { .. })));
}

#[test]
fn validate_catches_red_red() {
    let mut tree = tree_of(&[2, 1, 3, 4]);
    let three = tree.find(&3).unwrap().id;
    tree.arena[three].color = Color::Red;

    assert!(matches!(tree.validate(), Err(InvariantViolation::RedRedAdjacency { .. })));
}

#[test]
fn validate_catches_misordered_keys() {
    let mut tree = tree_of(&[2, 1, 3]);
    let one = tree.find(&1).unwrap().id;
    tree.arena[one].key = 5;

    assert!(matches!(tree.validate(), Err(InvariantViolation::OrderViolation { .. })));
}

#[test]
fn readers_and_writers_behind_a_lock() {
    const THREADS: i32 = 8;
    const PER_THREAD: i32 = 200;

    let tree = RwLock::new(RBTree::new());

    std::thread::scope(|s| {
        for t in 0..THREADS {
            let tree = &tree;
            s.spawn(move || {
                for i in 0..PER_THREAD {
                    tree.write().unwrap().insert(t * PER_THREAD + i).unwrap();
                    let reader = tree.read().unwrap();
                    assert!(reader.contains(&(t * PER_THREAD + i)));
                }
            });
        }
    });

    let tree = tree.into_inner().unwrap();
    assert_valid(&tree);
    assert_eq!(sorted(&tree), (0..THREADS * PER_THREAD).collect::<Vec<_>>());
}

#[derive(Debug, Clone)]
enum Op {
    Insert(i8),
    Remove(i8),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => any::<i8>().prop_map(|k| Op::Insert(k % 16)),
        2 => any::<i8>().prop_map(|k| Op::Remove(k % 16)),
    ]
}

proptest! {
    #[test]
    fn matches_a_sorted_vec(ops in prop::collection::vec(op(), 0..300)) {
        let mut tree = RBTree::new();
        let mut model: Vec<i8> = vec![];

        for op in ops {
            match op {
                Op::Insert(k) => {
                    tree.insert(k).unwrap();
                    let at = model.partition_point(|&m| m <= k);
                    model.insert(at, k);
                }
                Op::Remove(k) => match model.iter().position(|&m| m == k) {
                    Some(at) => {
                        prop_assert_eq!(tree.remove(&k), Ok(k));
                        model.remove(at);
                    }
                    None => {
                        let before = shape(&tree);
                        prop_assert!(tree.remove(&k).is_err());
                        prop_assert_eq!(shape(&tree), before);
                    }
                },
            }

            prop_assert!(tree.validate().is_ok(), "{:?}", tree.validate());
            prop_assert_eq!(tree.len(), model.len());
            prop_assert_eq!(sorted(&tree), model.clone());
        }
    }

    #[test]
    fn erase_in_any_order(
        (keys, order) in prop::collection::vec(any::<i32>(), 0..200)
            .prop_flat_map(|keys| (Just(keys.clone()), Just(keys).prop_shuffle()))
    ) {
        let mut tree = RBTree::new();
        for &k in &keys {
            tree.insert(k).unwrap();
        }

        let mut remaining = keys.clone();
        remaining.sort();
        for k in order {
            prop_assert_eq!(tree.remove(&k), Ok(k));
            let at = remaining.binary_search(&k).unwrap();
            remaining.remove(at);

            prop_assert!(tree.validate().is_ok(), "{:?}", tree.validate());
            prop_assert_eq!(sorted(&tree), remaining.clone());
        }
        prop_assert!(tree.is_empty());
        prop_assert_eq!(tree.root, NIL);
    }

    #[test]
    fn insert_then_erase_restores_contents(keys in prop::collection::vec(-50i32..50, 0..100), extra in -50i32..50) {
        let mut tree = RBTree::new();
        for &k in &keys {
            tree.insert(k).unwrap();
        }
        let before = sorted(&tree);

        let node = tree.insert(extra).unwrap();
        prop_assert_eq!(tree.erase(node), Ok(extra));

        prop_assert_eq!(sorted(&tree), before);
        prop_assert_eq!(tree.len(), keys.len());
        prop_assert!(tree.validate().is_ok());
    }
}
