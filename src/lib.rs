#![forbid(unsafe_code)]

// not concurrent
pub mod non_concurrent;

// diagnostics
pub mod logging;

pub use non_concurrent::rbtree::{Color, InvalidArgument, InvariantViolation, NodeRef, RBTree, RBTreeError};
