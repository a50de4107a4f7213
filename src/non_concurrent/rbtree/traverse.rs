use log::{debug, warn};

use crate::logging::Diagnostic;

use super::node::{NIL, NodeId};
use super::{InvalidArgument, RBTree, RBTreeError};

impl<K: Ord + Copy> RBTree<K> {
    /// Writes every key into `dest` in non-decreasing order.
    ///
    /// `dest` must have exactly [`RBTree::len`] slots, anything else is rejected
    /// (and `dest` is left as it was).
    pub fn copy_sorted_into(&self, dest: &mut [K]) -> Result<(), RBTreeError> {
        self.check_capacity(dest.len())?;

        let mut slots = dest.iter_mut();
        self.walk_in_order(|id| {
            if let Some(slot) = slots.next() {
                *slot = self.arena[id].key;
            }
        })
    }

    /// Collects every key, in non-decreasing order, into a vector of exactly `capacity` keys.
    ///
    /// `capacity` has to match [`RBTree::len`]: an empty result always means an empty tree.
    pub fn to_sorted_vec(&self, capacity: usize) -> Result<Vec<K>, RBTreeError> {
        self.check_capacity(capacity)?;

        let mut keys = Vec::new();
        keys.try_reserve_exact(capacity).map_err(|_| {
            warn!("{}", Diagnostic::AllocationFailed);
            RBTreeError::ResourceExhaustion
        })?;
        self.walk_in_order(|id| keys.push(self.arena[id].key))?;
        Ok(keys)
    }

    /// Erases every node, leaving an empty tree. Handles to the old nodes all go stale.
    pub fn clear(&mut self) {
        let freed = self.release_all();
        debug!("cleared tree, freed {freed} nodes");
    }

    /// Tears the tree down, releasing every node and then the sentinel.
    pub fn destroy(mut self) {
        let freed = self.release_all();
        debug!("destroying tree, freed {freed} nodes");
    }

    fn check_capacity(&self, provided: usize) -> Result<(), InvalidArgument> {
        match provided == self.len() {
            true => Ok(()),
            false => Err(InvalidArgument::CapacityMismatch { expected: self.len(), provided }),
        }
    }

    /// Upper bound on the number of nodes on a root-to-leaf path of a valid tree with `len` nodes.
    fn height_bound(&self) -> usize {
        let n = self.len() + 1;
        2 * (usize::BITS - n.leading_zeros()) as usize
    }

    /// Calls `visit` on every node in key order (left, self, right).
    ///
    /// Uses its own stack rather than recursion, so even a badly skewed tree (say, after a
    /// bunch of manual rotations) can't blow the call stack.
    pub(super) fn walk_in_order(&self, mut visit: impl FnMut(NodeId)) -> Result<(), RBTreeError> {
        let mut stack = Vec::new();
        stack.try_reserve(self.height_bound()).map_err(|_| {
            warn!("{}", Diagnostic::AllocationFailed);
            RBTreeError::ResourceExhaustion
        })?;

        let mut current = self.root;
        loop {
            while !current.is_nil() {
                stack.push(current);
                current = self.arena[current].left;
            }
            let Some(node) = stack.pop() else { break };
            visit(node);
            current = self.arena[node].right;
        }
        Ok(())
    }

    /// Frees every node, pre-order, with an explicit work-list. Returns how many were freed.
    fn release_all(&mut self) -> usize {
        let mut freed = 0;
        let mut stack = Vec::with_capacity(self.height_bound());
        if !self.root.is_nil() {
            stack.push(self.root);
        }

        while let Some(node) = stack.pop() {
            let (left, right) = (self.arena[node].left, self.arena[node].right);
            // right first, so the left subtree gets handled first
            if !right.is_nil() {
                stack.push(right);
            }
            if !left.is_nil() {
                stack.push(left);
            }
            self.arena.free(node);
            freed += 1;
        }

        self.root = NIL;
        freed
    }
}
