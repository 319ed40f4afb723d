//! Hierarchical, zoom-aware clustering of geographic points.
//!
//! An index is built once per point set. Points are projected to spherical Mercator and merged
//! greedily from the highest zoom level down: at each level, every node absorbs the unassigned
//! nodes within the cluster radius, so clusters nest strictly across zoom levels. Each level is
//! backed by its own [`KDTree`][crate::kdtree::KDTree].

mod builder;
mod index;
mod options;
mod result;

pub use builder::ClusterIndexBuilder;
pub use index::ClusterIndex;
pub use options::{
    ClusterOptions, ClusterParams, DEFAULT_EXTENT, DEFAULT_MAX_ZOOM, DEFAULT_MIN_POINTS,
    DEFAULT_MIN_ZOOM, DEFAULT_RADIUS_RATIO, MAX_ZOOM,
};
pub use result::{Cluster, ClusterId, ClusterResult, Leaf};

#[cfg(test)]
mod test;
