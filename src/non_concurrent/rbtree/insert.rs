use log::{trace, warn};

use crate::logging::Diagnostic;

use super::node::{NIL, NodeId};
use super::{Color, NodeRef, RBTree, RBTreeError};

impl<K: Ord + Copy> RBTree<K> {
    /// Inserts `key`, returning a handle to the new node.
    ///
    /// Duplicates are allowed: a key equal to an existing one goes into that node's right
    /// subtree. If the node can't be allocated, the tree is left untouched.
    pub fn insert(&mut self, key: K) -> Result<NodeRef, RBTreeError> {
        let z = self.arena.allocate(key).map_err(|_| {
            warn!("{}", Diagnostic::NodeCreationFailed);
            RBTreeError::ResourceExhaustion
        })?;

        let mut parent = NIL;
        let mut current = self.root;
        while !current.is_nil() {
            parent = current;
            current = if key < self.arena[current].key {
                self.arena[current].left
            } else {
                // ties go right
                self.arena[current].right
            };
        }

        self.arena[z].parent = parent;
        if parent.is_nil() {
            self.root = z;
        } else if key < self.arena[parent].key {
            self.arena[parent].left = z;
        } else {
            self.arena[parent].right = z;
        }

        self.insert_fixup(z);
        Ok(self.handle(z))
    }

    /// Restores the invariants after `z` was attached as a red leaf.
    ///
    /// A red leaf can only break "no red node has a red child", and only between `z` and its
    /// parent. Each pass either fixes it with at most two rotations, or pushes it two levels up.
    fn insert_fixup(&mut self, mut z: NodeId) {
        while z != self.root && self.arena[self.arena[z].parent].is_red() {
            // the parent is red, so it isn't the root, so the grandparent is a real node
            let parent = self.arena[z].parent;
            let grandparent = self.arena[parent].parent;
            let side = self.side_of(parent);
            let uncle = self.child(grandparent, side.opposite());

            if self.arena[uncle].is_red() {
                trace!("insert fixup at {z:?}: red uncle, recoloring");
                self.arena[parent].color = Color::Black;
                self.arena[uncle].color = Color::Black;
                self.arena[grandparent].color = Color::Red;
                z = grandparent;
                continue
            }

            if z == self.child(parent, side.opposite()) {
                trace!("insert fixup at {z:?}: inner child, rotating {side:?} at parent");
                z = parent;
                self.rotate(z, side);
            }

            trace!("insert fixup at {z:?}: outer child, rotating {:?} at grandparent", side.opposite());
            let parent = self.arena[z].parent;
            let grandparent = self.arena[parent].parent;
            self.arena[parent].color = Color::Black;
            self.arena[grandparent].color = Color::Red;
            self.rotate(grandparent, side.opposite());
        }

        let root = self.root;
        self.arena[root].color = Color::Black;
    }
}
