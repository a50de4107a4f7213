use std::fmt;

use super::NodeRef;

#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RBTreeError {
    /// A node (or the sentinel) could not be allocated. The tree was not touched.
    ResourceExhaustion,
    /// The call was rejected before any mutation.
    InvalidArgument(InvalidArgument),
}

#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidArgument {
    /// The handle names the sentinel, which holds no key.
    Sentinel,
    /// The handle was produced by a different tree.
    ForeignNode,
    /// The node behind the handle has already been erased.
    StaleNode,
    KeyNotFound,
    /// The export destination does not have exactly one slot per stored key.
    CapacityMismatch { expected: usize, provided: usize },
}

impl From<InvalidArgument> for RBTreeError {
    fn from(value: InvalidArgument) -> Self {
        RBTreeError::InvalidArgument(value)
    }
}

impl fmt::Display for RBTreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RBTreeError::ResourceExhaustion => write!(f, "out of memory while allocating a tree node"),
            RBTreeError::InvalidArgument(arg) => write!(f, "invalid argument: {arg}"),
        }
    }
}

impl fmt::Display for InvalidArgument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidArgument::Sentinel => write!(f, "the sentinel node cannot be used here"),
            InvalidArgument::ForeignNode => write!(f, "node belongs to a different tree"),
            InvalidArgument::StaleNode => write!(f, "node has already been erased"),
            InvalidArgument::KeyNotFound => write!(f, "key is not in the tree"),
            InvalidArgument::CapacityMismatch { expected, provided } => {
                write!(f, "destination holds {provided} keys, but the tree has {expected}")
            }
        }
    }
}

impl std::error::Error for RBTreeError {}
impl std::error::Error for InvalidArgument {}

/// A broken red-black or search-tree invariant, as reported by [`RBTree::validate`].
///
/// [`RBTree::validate`]: super::RBTree::validate
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvariantViolation {
    RootNotBlack,
    RootHasParent,
    /// The sentinel is red, or one of its links no longer points at itself.
    SentinelCorrupted,
    RedRedAdjacency { parent: NodeRef, child: NodeRef },
    /// The two subtrees of `node` have different black-heights.
    BlackHeightMismatch { node: NodeRef, left: usize, right: usize },
    /// `child` is on the wrong side of `ancestor`.
    OrderViolation { ancestor: NodeRef, child: NodeRef },
    /// `child.parent` does not point back at `parent`.
    BrokenParentLink { parent: NodeRef, child: NodeRef },
    /// The number of reachable nodes differs from the number of allocated ones.
    LengthMismatch { reachable: usize, allocated: usize },
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvariantViolation::RootNotBlack => write!(f, "root is red"),
            InvariantViolation::RootHasParent => write!(f, "root has a parent"),
            InvariantViolation::SentinelCorrupted => write!(f, "sentinel is red or linked to a real node"),
            InvariantViolation::RedRedAdjacency { parent, child } => {
                write!(f, "red node {parent:?} has red child {child:?}")
            }
            InvariantViolation::BlackHeightMismatch { node, left, right } => {
                write!(f, "black-height of {node:?} differs between sides ({left} vs {right})")
            }
            InvariantViolation::OrderViolation { ancestor, child } => {
                write!(f, "{child:?} is on the wrong side of {ancestor:?}")
            }
            InvariantViolation::BrokenParentLink { parent, child } => {
                write!(f, "{child:?} does not link back to its parent {parent:?}")
            }
            InvariantViolation::LengthMismatch { reachable, allocated } => {
                write!(f, "{reachable} nodes reachable from the root, but {allocated} allocated")
            }
        }
    }
}

impl std::error::Error for InvariantViolation {}
