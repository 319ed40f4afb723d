//! An implementation of an immutable, static K-D Tree over 2D points.
//!
//! Points are k-d sorted in place once, at build time, after which the tree answers
//! bounding-box ([`KDTree::range`]) and radius ([`KDTree::within`]) queries.

#![warn(missing_docs)]

mod builder;
mod index;

pub use builder::{KDTreeBuilder, DEFAULT_KDTREE_NODE_SIZE};
pub use index::KDTree;
