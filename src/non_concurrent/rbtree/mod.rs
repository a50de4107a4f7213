//! An ordered multiset of scalar keys, backed by a red-black tree.
//!
//! Nodes live in an arena (`Vec`) and link to each other by index, with slot 0
//! reserved for the shared black sentinel ("nil") that stands in for every
//! missing child and for the parent of the root.

// PROVE: any node with height `h` has black height at least `h/2`
// PROVE: the subtree located at any node `x` contains at least `2^bh(x) - 1` nodes (use induction)
// LEMMA: An RBTree with `n` internal nodes has height at most `2*log₂(n+1)`

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use log::warn;

use crate::logging::Diagnostic;

mod error;
mod erase;
mod insert;
mod node;
mod rotate;
mod traverse;
mod validate;

#[cfg(test)]
mod tests;

pub use error::{InvalidArgument, InvariantViolation, RBTreeError};

use node::{Arena, NIL, NodeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    Red,
    Black,
}

/// Which child of a node we're talking about.
///
/// All the fixup cases come in mirrored pairs, so they're written once in terms of `Side`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Left,
    Right,
}

impl Side {
    fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

static NEXT_TREE_ID: AtomicUsize = AtomicUsize::new(0);

/// A handle to a node of a particular [`RBTree`].
///
/// Handles stay valid until the node they name is erased (or the tree is cleared).
/// Using a stale handle, or one from another tree, is reported as an
/// [`InvalidArgument`] instead of touching the wrong node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeRef {
    tree: usize,
    id: NodeId,
    generation: u32,
}

/// Red-black tree holding (possibly duplicate) keys in sorted order.
///
/// Equal keys are always placed in the right subtree of the node they tie
/// with, so duplicates come out of [`RBTree::to_sorted_vec`] in insertion order.
pub struct RBTree<K = i32> {
    arena: Arena<K>,
    root: NodeId,
    tree_id: usize,
}

fn next_tree_id() -> usize {
    NEXT_TREE_ID.fetch_add(1, Ordering::Relaxed)
}

impl<K: Ord + Copy + Default> RBTree<K> {
    /// Creates an empty tree.
    pub fn new() -> Self {
        Self {
            arena: Arena::new(K::default()),
            root: NIL,
            tree_id: next_tree_id(),
        }
    }

    /// Creates an empty tree, reporting a failed sentinel allocation instead of aborting.
    pub fn try_new() -> Result<Self, RBTreeError> {
        let arena = Arena::try_new(K::default()).map_err(|_| {
            warn!("{}", Diagnostic::TreeCreationFailed);
            RBTreeError::ResourceExhaustion
        })?;

        Ok(Self { arena, root: NIL, tree_id: next_tree_id() })
    }
}

impl<K: Ord + Copy + Default> Default for RBTree<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord + Copy> RBTree<K> {
    /// The number of keys in the tree, duplicates included.
    pub fn len(&self) -> usize {
        self.arena.live()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_nil()
    }

    /// The handle of the sentinel. It never names a key.
    pub fn nil(&self) -> NodeRef {
        self.handle(NIL)
    }

    pub fn is_nil(&self, node: NodeRef) -> bool {
        node.tree == self.tree_id && node.id.is_nil()
    }

    pub fn root(&self) -> Option<NodeRef> {
        self.real_handle(self.root)
    }

    pub fn key(&self, node: NodeRef) -> Option<K> {
        let id = self.resolve(node).ok()?;
        Some(self.arena[id].key)
    }

    pub fn color(&self, node: NodeRef) -> Option<Color> {
        let id = self.resolve(node).ok()?;
        Some(self.arena[id].color)
    }

    pub fn parent(&self, node: NodeRef) -> Option<NodeRef> {
        let id = self.resolve(node).ok()?;
        self.real_handle(self.arena[id].parent)
    }

    pub fn left(&self, node: NodeRef) -> Option<NodeRef> {
        let id = self.resolve(node).ok()?;
        self.real_handle(self.arena[id].left)
    }

    pub fn right(&self, node: NodeRef) -> Option<NodeRef> {
        let id = self.resolve(node).ok()?;
        self.real_handle(self.arena[id].right)
    }

    /// Finds a node holding `key`.
    ///
    /// With duplicates, this is the one closest to the root.
    pub fn find(&self, key: &K) -> Option<NodeRef> {
        let mut current = self.root;
        while !current.is_nil() {
            let node = &self.arena[current];
            current = match key.cmp(&node.key) {
                std::cmp::Ordering::Equal => return Some(self.handle(current)),
                std::cmp::Ordering::Less => node.left,
                std::cmp::Ordering::Greater => node.right,
            };
        }
        None
    }

    pub fn contains(&self, key: &K) -> bool {
        self.find(key).is_some()
    }

    /// The node holding the smallest key, or `None` if the tree is empty.
    pub fn min(&self) -> Option<NodeRef> {
        self.real_handle(self.min_in_subtree(self.root))
    }

    /// The node holding the largest key, or `None` if the tree is empty.
    pub fn max(&self) -> Option<NodeRef> {
        self.real_handle(self.max_in_subtree(self.root))
    }

    /// Number of black nodes on any path from the root (exclusive) down to the sentinel (inclusive).
    ///
    /// Only meaningful while the invariants hold, see [`RBTree::validate`].
    pub fn black_height(&self) -> usize {
        if self.root.is_nil() {
            return 0
        }

        let mut height = 0;
        let mut current = self.root;
        loop {
            current = self.arena[current].left;
            if self.arena[current].is_black() {
                height += 1;
            }
            if current.is_nil() {
                return height
            }
        }
    }

    /// Leftmost node under `node`. The sentinel maps to itself.
    fn min_in_subtree(&self, mut node: NodeId) -> NodeId {
        if node.is_nil() {
            return NIL
        }
        while !self.arena[node].left.is_nil() {
            node = self.arena[node].left;
        }
        node
    }

    /// Rightmost node under `node`. The sentinel maps to itself.
    fn max_in_subtree(&self, mut node: NodeId) -> NodeId {
        if node.is_nil() {
            return NIL
        }
        while !self.arena[node].right.is_nil() {
            node = self.arena[node].right;
        }
        node
    }

    fn child(&self, node: NodeId, side: Side) -> NodeId {
        match side {
            Side::Left => self.arena[node].left,
            Side::Right => self.arena[node].right,
        }
    }

    fn set_child(&mut self, node: NodeId, side: Side, child: NodeId) {
        match side {
            Side::Left => self.arena[node].left = child,
            Side::Right => self.arena[node].right = child,
        }
    }

    /// Which side of its parent `node` hangs off.
    ///
    /// NOTE: this works for the sentinel too, as long as its `parent` was pointed at the
    ///       node whose (missing) child it stands in for, which is what erase does.
    fn side_of(&self, node: NodeId) -> Side {
        let parent = self.arena[node].parent;
        if node == self.arena[parent].left { Side::Left } else { Side::Right }
    }

    fn handle(&self, id: NodeId) -> NodeRef {
        NodeRef {
            tree: self.tree_id,
            id,
            generation: self.arena[id].generation,
        }
    }

    fn real_handle(&self, id: NodeId) -> Option<NodeRef> {
        if id.is_nil() { None } else { Some(self.handle(id)) }
    }

    /// Turns a handle back into an arena index, if it still names one of our live nodes.
    fn resolve(&self, node: NodeRef) -> Result<NodeId, InvalidArgument> {
        if node.tree != self.tree_id {
            return Err(InvalidArgument::ForeignNode)
        }
        if node.id.is_nil() {
            return Err(InvalidArgument::Sentinel)
        }
        if !self.arena.is_live(node.id, node.generation) {
            return Err(InvalidArgument::StaleNode)
        }
        Ok(node.id)
    }
}

impl<K: Clone> Clone for RBTree<K> {
    /// The clone is a separate tree: handles into `self` are foreign to it.
    fn clone(&self) -> Self {
        Self {
            arena: self.arena.clone(),
            root: self.root,
            tree_id: next_tree_id(),
        }
    }
}

impl<K: Ord + Copy + fmt::Debug> fmt::Debug for RBTree<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys = f.debug_list();
        self.walk_in_order(|id| {
            keys.entry(&self.arena[id].key);
        }).map_err(|_| fmt::Error)?;
        keys.finish()
    }
}
