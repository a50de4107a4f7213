use super::node::{NIL, NodeId};
use super::{InvariantViolation, RBTree};

/// A node waiting to be checked, along with the closest ancestors it must not cross.
struct Pending {
    node: NodeId,
    /// nearest ancestor this node is in the right subtree of (its key is a lower bound)
    lower: Option<NodeId>,
    /// nearest ancestor this node is in the left subtree of (its key is an upper bound)
    upper: Option<NodeId>,
}

impl<K: Ord + Copy> RBTree<K> {
    /// Checks every red-black and search-tree invariant, returning the tree's black-height.
    ///
    /// Besides the five red-black properties (black root, black sentinel, no red-red edges,
    /// equal black-heights, sorted keys) this also checks that parent links agree with
    /// child links and that every allocated node is reachable from the root.
    pub fn validate(&self) -> Result<usize, InvariantViolation> {
        let sentinel = &self.arena[NIL];
        if !sentinel.is_black() || !sentinel.parent.is_nil() || !sentinel.left.is_nil() || !sentinel.right.is_nil() {
            return Err(InvariantViolation::SentinelCorrupted)
        }

        if self.root.is_nil() {
            return match self.len() {
                0 => Ok(0),
                allocated => Err(InvariantViolation::LengthMismatch { reachable: 0, allocated }),
            }
        }
        if !self.arena[self.root].is_black() {
            return Err(InvariantViolation::RootNotBlack)
        }
        if !self.arena[self.root].parent.is_nil() {
            return Err(InvariantViolation::RootHasParent)
        }

        // pre-order pass: local checks, and remember the visiting order
        let mut order = Vec::with_capacity(self.len());
        let mut stack = vec![Pending { node: self.root, lower: None, upper: None }];
        while let Some(Pending { node, lower, upper }) = stack.pop() {
            // more reachable nodes than allocated ones means the links loop somewhere
            if order.len() == self.len() {
                return Err(InvariantViolation::LengthMismatch { reachable: order.len() + 1, allocated: self.len() })
            }
            order.push(node);

            let current = &self.arena[node];
            if let Some(lower) = lower.filter(|&l| current.key < self.arena[l].key) {
                return Err(InvariantViolation::OrderViolation { ancestor: self.handle(lower), child: self.handle(node) })
            }
            if let Some(upper) = upper.filter(|&u| current.key > self.arena[u].key) {
                return Err(InvariantViolation::OrderViolation { ancestor: self.handle(upper), child: self.handle(node) })
            }

            for (child, lower, upper) in [(current.right, Some(node), upper), (current.left, lower, Some(node))] {
                if child.is_nil() {
                    continue
                }
                if self.arena[child].parent != node {
                    return Err(InvariantViolation::BrokenParentLink { parent: self.handle(node), child: self.handle(child) })
                }
                if current.is_red() && self.arena[child].is_red() {
                    return Err(InvariantViolation::RedRedAdjacency { parent: self.handle(node), child: self.handle(child) })
                }
                stack.push(Pending { node: child, lower, upper });
            }
        }

        if order.len() != self.len() {
            return Err(InvariantViolation::LengthMismatch { reachable: order.len(), allocated: self.len() })
        }

        // children come after their parents in `order`, so walking it backwards sees them first
        let mut heights = vec![0usize; self.arena.capacity_used()];
        for &node in order.iter().rev() {
            let contribution = |child: NodeId| heights[child.0] + usize::from(self.arena[child].is_black());
            let (left, right) = (contribution(self.arena[node].left), contribution(self.arena[node].right));
            if left != right {
                return Err(InvariantViolation::BlackHeightMismatch { node: self.handle(node), left, right })
            }
            heights[node.0] = left;
        }

        Ok(heights[self.root.0])
    }
}
