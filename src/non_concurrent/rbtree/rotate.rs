use log::{debug, trace};

use crate::logging::Diagnostic;

use super::node::NodeId;
use super::{NodeRef, RBTree, RBTreeError, Side};

impl<K: Ord + Copy> RBTree<K> {
    /// Rotates the subtree at `node` to the left, promoting its right child into its place.
    ///
    /// This only rewires links: colors are left alone, so the red-black invariants are the
    /// caller's problem afterwards. Returns `Ok(false)` (and changes nothing) if `node` has
    /// no right child.
    pub fn rotate_left(&mut self, node: NodeRef) -> Result<bool, RBTreeError> {
        let x = self.resolve(node)?;
        let rotated = self.rotate(x, Side::Left);
        if !rotated {
            debug!("{}", Diagnostic::LeftRotateSkipped);
        }
        Ok(rotated)
    }

    /// Rotates the subtree at `node` to the right, promoting its left child into its place.
    ///
    /// See [`RBTree::rotate_left`].
    pub fn rotate_right(&mut self, node: NodeRef) -> Result<bool, RBTreeError> {
        let x = self.resolve(node)?;
        let rotated = self.rotate(x, Side::Right);
        if !rotated {
            debug!("{}", Diagnostic::RightRotateSkipped);
        }
        Ok(rotated)
    }

    /// Rotates toward `direction`: the child on the *other* side (`y`) takes `x`'s place,
    /// and `x` becomes `y`'s child on `direction`'s side.
    ///
    /// ```text
    ///        x                 y
    ///       / \               / \
    ///      a   y     ==>     x   c        (direction = Left)
    ///         / \           / \
    ///        b   c         a   b
    /// ```
    pub(super) fn rotate(&mut self, x: NodeId, direction: Side) -> bool {
        let y = self.child(x, direction.opposite());
        if x.is_nil() || y.is_nil() {
            return false
        }
        trace!("rotating {direction:?} at {x:?} (pivot {y:?})");

        // `b` moves across from `y` to `x`
        let inner = self.child(y, direction);
        self.set_child(x, direction.opposite(), inner);
        if !inner.is_nil() {
            self.arena[inner].parent = x;
        }

        // `y` takes over `x`'s slot in its parent
        let parent = self.arena[x].parent;
        self.arena[y].parent = parent;
        if x == self.root {
            self.root = y;
        } else if x == self.arena[parent].left {
            self.arena[parent].left = y;
        } else {
            self.arena[parent].right = y;
        }

        self.set_child(y, direction, x);
        self.arena[x].parent = y;
        true
    }
}
