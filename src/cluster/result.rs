use std::fmt;

use crate::r#type::Coord;

/// Identifier of a cluster within the [`ClusterIndex`][crate::cluster::ClusterIndex] that
/// produced it.
///
/// Ids carry the generation of their index: an id from one index never resolves against
/// another, even one built from identical points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClusterId {
    pub(crate) generation: u32,
    pub(crate) node: u32,
}

impl ClusterId {
    /// The packed value of this id, suitable as a stable rendering key.
    pub fn get(&self) -> u64 {
        ((self.generation as u64) << 32) | self.node as u64
    }
}

impl fmt::Display for ClusterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.get())
    }
}

/// An original input point, returned unaggregated.
#[derive(Debug, Clone, PartialEq)]
pub struct Leaf<T> {
    /// Insertion index of the point in the index
    pub index: usize,
    pub coordinate: Coord,
    pub payload: T,
}

/// An aggregate of nearby points at one zoom level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cluster {
    pub id: ClusterId,
    /// Weighted centroid of the clustered points
    pub coordinate: Coord,
    /// Number of original points nested under this cluster
    pub point_count: u32,
}

impl Cluster {
    /// The point count shortened for display: `"950"`, `"3.5k"`, `"12k"`.
    pub fn abbreviated_count(&self) -> String {
        let count = self.point_count;
        if count >= 10_000 {
            format!("{}k", (count as f64 / 1000.0).round())
        } else if count >= 1000 {
            format!("{}k", (count as f64 / 100.0).round() / 10.0)
        } else {
            count.to_string()
        }
    }
}

/// One entry of a clustering query: either a single point or a cluster.
#[derive(Debug, Clone, PartialEq)]
pub enum ClusterResult<T> {
    Leaf(Leaf<T>),
    Cluster(Cluster),
}

impl<T> ClusterResult<T> {
    /// Where to render this result.
    pub fn coordinate(&self) -> Coord {
        match self {
            Self::Leaf(leaf) => leaf.coordinate,
            Self::Cluster(cluster) => cluster.coordinate,
        }
    }

    pub fn cluster_id(&self) -> Option<ClusterId> {
        match self {
            Self::Leaf(_) => None,
            Self::Cluster(cluster) => Some(cluster.id),
        }
    }

    pub fn is_cluster(&self) -> bool {
        matches!(self, Self::Cluster(_))
    }

    /// The cluster's point count, or `0` for a leaf.
    pub fn point_count(&self) -> u32 {
        match self {
            Self::Leaf(_) => 0,
            Self::Cluster(cluster) => cluster.point_count,
        }
    }

    /// Number of original points this result stands for: `1` for a leaf.
    pub fn num_points(&self) -> u32 {
        match self {
            Self::Leaf(_) => 1,
            Self::Cluster(cluster) => cluster.point_count,
        }
    }
}
