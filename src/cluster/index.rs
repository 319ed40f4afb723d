use crate::cluster::{
    Cluster, ClusterId, ClusterIndexBuilder, ClusterParams, ClusterResult, Leaf,
};
use crate::kdtree::{KDTree, KDTreeBuilder};
use crate::mercator::{lat_y, lng_x, x_lng, y_lat};
use crate::r#type::{Coord, Point};
use crate::viewport::BoundingBox;

/// A point or cluster in the index arena.
///
/// Slots `0..num_points` are the input points themselves; clusters are appended after them in
/// the order they are formed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ClusterNode {
    /// Projected unit-square position; the weighted centroid for clusters
    pub(crate) x: f64,
    pub(crate) y: f64,
    pub(crate) num_points: u32,
    /// Zoom the node was formed at; `max_zoom + 1` for input points
    pub(crate) zoom: u32,
    /// Range of this node's children in `ClusterIndex::child_ids`, empty for input points
    pub(crate) children_start: u32,
    pub(crate) children_end: u32,
}

/// The nodes visible at one zoom level, spatially indexed by their projected position.
#[derive(Debug, Clone)]
pub(crate) struct Level {
    /// Arena ids of the nodes, in k-d tree insertion order
    pub(crate) nodes: Vec<u32>,
    pub(crate) tree: KDTree,
}

impl Level {
    pub(crate) fn new(ids: Vec<u32>, arena: &[ClusterNode], node_size: usize) -> Self {
        let mut builder = KDTreeBuilder::new_with_node_size(ids.len(), node_size);
        for &id in &ids {
            let node = &arena[id as usize];
            builder.add(node.x, node.y);
        }
        Self {
            nodes: ids,
            tree: builder.finish(),
        }
    }
}

/// An immutable, multi-resolution clustering of a fixed set of points.
///
/// Usually this will be created via [`ClusterIndexBuilder`][crate::cluster::ClusterIndexBuilder].
/// Any change to the point set requires building a new index. Queries never mutate the index,
/// so it can be shared between threads when `T` allows it.
#[derive(Debug, Clone)]
pub struct ClusterIndex<T> {
    pub(crate) params: ClusterParams,
    pub(crate) generation: u32,
    pub(crate) points: Vec<Point<T>>,
    pub(crate) nodes: Vec<ClusterNode>,
    pub(crate) child_ids: Vec<u32>,
    /// `levels[zoom - min_zoom]` for every zoom in `min_zoom..=max_zoom + 1`
    pub(crate) levels: Vec<Level>,
}

impl<T> ClusterIndex<T> {
    /// Build an index over `points`.
    pub fn new(points: impl IntoIterator<Item = Point<T>>, params: ClusterParams) -> Self {
        let points = points.into_iter();
        let mut builder = ClusterIndexBuilder::with_capacity(params, points.size_hint().0);
        for point in points {
            builder.add(point);
        }
        builder.finish()
    }

    /// The parameters this index was built with.
    pub fn params(&self) -> &ClusterParams {
        &self.params
    }

    /// The input points, in insertion order.
    pub fn points(&self) -> &[Point<T>] {
        &self.points
    }

    /// Number of input points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of clusters formed across all zoom levels.
    pub fn num_clusters(&self) -> usize {
        self.nodes.len() - self.points.len()
    }

    /// Resolve a cluster id from this index to its arena node.
    fn cluster_node(&self, cluster_id: ClusterId) -> Option<&ClusterNode> {
        if cluster_id.generation != self.generation {
            return None;
        }
        let slot = cluster_id.node as usize;
        if slot < self.points.len() {
            return None;
        }
        self.nodes.get(slot)
    }

    fn children_of(&self, node: &ClusterNode) -> &[u32] {
        &self.child_ids[node.children_start as usize..node.children_end as usize]
    }

    /// The zoom at which a cluster splits into its children.
    ///
    /// Returns `None` if the id does not belong to this index.
    pub fn expansion_zoom(&self, cluster_id: ClusterId) -> Option<u32> {
        self.cluster_node(cluster_id).map(|node| node.zoom + 1)
    }

    /// Every original point nested under a cluster, depth first.
    ///
    /// At most `max_leaves` points are returned when given. Unknown or stale ids (for example
    /// from an index built before the last rebuild) yield an empty result.
    pub fn expand(&self, cluster_id: ClusterId, max_leaves: Option<usize>) -> Vec<&Point<T>> {
        self.leaves(cluster_id, max_leaves.unwrap_or(usize::MAX), 0)
    }

    /// A page of the original points nested under a cluster, depth first.
    ///
    /// Skips the first `offset` points and returns at most `limit`.
    pub fn leaves(&self, cluster_id: ClusterId, limit: usize, offset: usize) -> Vec<&Point<T>> {
        let mut result = vec![];
        if let Some(node) = self.cluster_node(cluster_id) {
            let mut skipped = 0;
            self.append_leaves(&mut result, node, limit, offset, &mut skipped);
        }
        result
    }

    fn append_leaves<'a>(
        &'a self,
        result: &mut Vec<&'a Point<T>>,
        node: &ClusterNode,
        limit: usize,
        offset: usize,
        skipped: &mut usize,
    ) {
        for &child in self.children_of(node) {
            if result.len() >= limit {
                break;
            }

            let child = child as usize;
            if child >= self.points.len() {
                let child_node = &self.nodes[child];
                let count = child_node.num_points as usize;
                if *skipped + count <= offset {
                    // skip the whole cluster
                    *skipped += count;
                } else {
                    self.append_leaves(result, child_node, limit, offset, skipped);
                }
            } else if *skipped < offset {
                *skipped += 1;
            } else {
                result.push(&self.points[child]);
            }
        }
    }
}

impl<T: Clone> ClusterIndex<T> {
    /// Every cluster and unclustered point visible at `zoom` whose position lies in `bbox`.
    ///
    /// `bbox` may be denormalized: longitudes are wrapped modulo 360, latitudes are clamped, and
    /// spans of 360 degrees or more cover the whole world. Zooms outside the indexed range are
    /// clamped to it; any zoom above `max_zoom` returns unclustered points.
    ///
    /// Results are ordered deterministically for a given index, box and zoom.
    pub fn query(&self, bbox: &BoundingBox, zoom: u32) -> Vec<ClusterResult<T>> {
        let BoundingBox {
            west,
            south,
            east,
            north,
        } = *bbox;
        if !(west.is_finite() && south.is_finite() && east.is_finite() && north.is_finite()) {
            log::warn!("Rejecting cluster query with non-finite bounding box {:?}", bbox);
            return vec![];
        }

        let min_lat = south.clamp(-90.0, 90.0);
        let max_lat = north.clamp(-90.0, 90.0);
        // 180 stays 180 on either edge, so a box touching the antimeridian keeps its side
        let mut min_lng = if west == 180.0 {
            180.0
        } else {
            (west + 180.0).rem_euclid(360.0) - 180.0
        };
        let mut max_lng = if east == 180.0 {
            180.0
        } else {
            (east + 180.0).rem_euclid(360.0) - 180.0
        };

        let zoom = self.params.limit_zoom(zoom);
        let level = &self.levels[(zoom - self.params.min_zoom()) as usize];

        let ids = if east - west >= 360.0 {
            min_lng = -180.0;
            max_lng = 180.0;
            level.tree.range(0.0, lat_y(max_lat), 1.0, lat_y(min_lat))
        } else if min_lng > max_lng {
            // the box crosses the antimeridian: eastern part first, then the western part
            let mut ids = level
                .tree
                .range(lng_x(min_lng), lat_y(max_lat), 1.0, lat_y(min_lat));
            ids.extend(
                level
                    .tree
                    .range(0.0, lat_y(max_lat), lng_x(max_lng), lat_y(min_lat)),
            );
            ids
        } else {
            level.tree.range(
                lng_x(min_lng),
                lat_y(max_lat),
                lng_x(max_lng),
                lat_y(min_lat),
            )
        };

        log::trace!(
            "Cluster query [{}, {}, {}, {}] at zoom {} matched {} results",
            min_lng,
            min_lat,
            max_lng,
            max_lat,
            zoom,
            ids.len()
        );

        ids.into_iter()
            .map(|i| self.result(level.nodes[i] as usize))
            .collect()
    }

    /// The direct children of a cluster, one zoom level below it.
    ///
    /// Unknown or stale ids yield an empty result.
    pub fn children(&self, cluster_id: ClusterId) -> Vec<ClusterResult<T>> {
        match self.cluster_node(cluster_id) {
            Some(node) => self
                .children_of(node)
                .iter()
                .map(|&child| self.result(child as usize))
                .collect(),
            None => vec![],
        }
    }

    fn result(&self, slot: usize) -> ClusterResult<T> {
        if slot < self.points.len() {
            let point = &self.points[slot];
            ClusterResult::Leaf(Leaf {
                index: slot,
                coordinate: point.coordinate,
                payload: point.payload.clone(),
            })
        } else {
            let node = &self.nodes[slot];
            ClusterResult::Cluster(Cluster {
                id: ClusterId {
                    generation: self.generation,
                    node: slot as u32,
                },
                coordinate: Coord::new(x_lng(node.x), y_lat(node.y)),
                point_count: node.num_points,
            })
        }
    }
}
