use log::trace;

use super::node::{NIL, NodeId};
use super::{Color, InvalidArgument, NodeRef, RBTree, RBTreeError};

impl<K: Ord + Copy> RBTree<K> {
    /// Removes the node behind `node` and returns its key.
    ///
    /// The handle (and any copy of it) is dead afterwards. The sentinel, handles from
    /// other trees, and handles to already-erased nodes are rejected without touching
    /// the tree.
    pub fn erase(&mut self, node: NodeRef) -> Result<K, RBTreeError> {
        let z = self.resolve(node)?;
        let key = self.arena[z].key;

        let (left, right) = (self.arena[z].left, self.arena[z].right);
        let mut removed_color = self.arena[z].color;

        // `x` is whatever ends up in the position a node was spliced out of
        let x = if left.is_nil() {
            self.transplant(z, right);
            right
        } else if right.is_nil() {
            self.transplant(z, left);
            left
        } else {
            // two children: the successor `y` (which has no left child) takes `z`'s place
            let y = self.min_in_subtree(right);
            removed_color = self.arena[y].color;
            let x = self.arena[y].right;

            if self.arena[y].parent == z {
                // NOTE: `x` may be the sentinel, and the fixup needs to find its way back up from it
                self.arena[x].parent = y;
            } else {
                self.transplant(y, x);
                self.arena[y].right = right;
                self.arena[right].parent = y;
            }

            self.transplant(z, y);
            self.arena[y].left = left;
            self.arena[left].parent = y;
            self.arena[y].color = self.arena[z].color;
            x
        };

        self.arena.free(z);

        // taking out a red node can't change any black-height
        if removed_color == Color::Black {
            self.erase_fixup(x);
        }

        // the sentinel's parent was only borrowed for the fixup
        self.arena[NIL].parent = NIL;
        Ok(key)
    }

    /// Removes one node holding `key` (the one [`RBTree::find`] would return) and returns the key.
    pub fn remove(&mut self, key: &K) -> Result<K, RBTreeError> {
        let node = self.find(key).ok_or(InvalidArgument::KeyNotFound)?;
        self.erase(node)
    }

    /// Puts `v` where `u` was, as far as `u`'s parent is concerned.
    ///
    /// `u` itself keeps its links, so the caller can still read its children.
    fn transplant(&mut self, u: NodeId, v: NodeId) {
        let parent = self.arena[u].parent;
        if u == self.root {
            self.root = v;
        } else if u == self.arena[parent].left {
            self.arena[parent].left = v;
        } else {
            self.arena[parent].right = v;
        }
        self.arena[v].parent = parent;
    }

    /// Restores equal black-heights after a black node was spliced out above `x`.
    ///
    /// `x` carries an "extra black" that gets pushed up the tree until it lands on a red
    /// node (which just turns black) or the root (where it can be dropped), or gets absorbed
    /// by a rotation.
    fn erase_fixup(&mut self, mut x: NodeId) {
        while x != self.root && self.arena[x].is_black() {
            let parent = self.arena[x].parent;
            let side = self.side_of(x);
            let mut sibling = self.child(parent, side.opposite());

            if self.arena[sibling].is_red() {
                trace!("erase fixup at {x:?}: red sibling, rotating {side:?} at parent");
                self.arena[sibling].color = Color::Black;
                self.arena[parent].color = Color::Red;
                self.rotate(parent, side);
                sibling = self.child(parent, side.opposite());
            }

            let near = self.child(sibling, side);
            let far = self.child(sibling, side.opposite());

            if self.arena[near].is_black() && self.arena[far].is_black() {
                trace!("erase fixup at {x:?}: black nephews, moving up");
                self.arena[sibling].color = Color::Red;
                x = parent;
                continue
            }

            if self.arena[far].is_black() {
                trace!("erase fixup at {x:?}: red near nephew, rotating at sibling");
                self.arena[near].color = Color::Black;
                self.arena[sibling].color = Color::Red;
                self.rotate(sibling, side.opposite());
                sibling = self.child(parent, side.opposite());
            }

            trace!("erase fixup at {x:?}: red far nephew, rotating {side:?} at parent");
            let far = self.child(sibling, side.opposite());
            self.arena[sibling].color = self.arena[parent].color;
            self.arena[parent].color = Color::Black;
            self.arena[far].color = Color::Black;
            self.rotate(parent, side);
            x = self.root;
        }

        self.arena[x].color = Color::Black;
    }
}
