#![doc = include_str!("../README.md")]

pub mod cluster;
mod error;
pub mod indices;
pub mod kdtree;
mod mercator;
mod session;
mod r#type;
pub mod viewport;

pub use cluster::{Cluster, ClusterId, ClusterIndex, ClusterOptions, ClusterResult, Leaf};
pub use error::{ClusterError, Result};
pub use mercator::TILE_SIZE;
pub use r#type::{Coord, Point};
pub use session::{point_count_key, ClusteringSession};
pub use viewport::{
    bounding_box_zoom, region_to_bounding_box, viewport_zoom, BoundingBox, PixelSize, Region,
};
