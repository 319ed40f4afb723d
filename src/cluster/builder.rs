use std::sync::atomic::{AtomicU32, Ordering};

use crate::cluster::index::{ClusterIndex, ClusterNode, Level};
use crate::cluster::ClusterParams;
use crate::mercator::{lat_y, lng_x, wrap_longitude};
use crate::r#type::Point;

/// Source of index generations, which keep cluster ids from resolving across indexes.
static NEXT_GENERATION: AtomicU32 = AtomicU32::new(0);

/// A builder to create a [`ClusterIndex`].
///
/// ```
/// use geo_cluster::cluster::{ClusterIndexBuilder, ClusterOptions};
/// use geo_cluster::{BoundingBox, Point};
///
/// let params = ClusterOptions::default().with_radius(40.).resolve(400.).unwrap();
/// let mut builder = ClusterIndexBuilder::new(params);
/// builder.add(Point::new(-122.41, 37.77, "a"));
/// builder.add(Point::new(-122.42, 37.78, "b"));
/// builder.add(Point::new(2.35, 48.85, "c"));
/// let index = builder.finish();
///
/// // zoomed out, the two San Francisco points merge
/// assert_eq!(index.query(&BoundingBox::world(), 2).len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct ClusterIndexBuilder<T> {
    params: ClusterParams,
    points: Vec<Point<T>>,
}

impl<T> ClusterIndexBuilder<T> {
    /// Create a new, empty builder.
    pub fn new(params: ClusterParams) -> Self {
        Self::with_capacity(params, 0)
    }

    /// Create a new builder with room for `capacity` points.
    pub fn with_capacity(params: ClusterParams, capacity: usize) -> Self {
        Self {
            params,
            points: Vec::with_capacity(capacity),
        }
    }

    /// Add a point to the index, returning its insertion index.
    pub fn add(&mut self, point: Point<T>) -> usize {
        self.points.push(point);
        self.points.len() - 1
    }

    /// Consume this builder, clustering the points on every zoom level from `max_zoom` down to
    /// `min_zoom`.
    pub fn finish(self) -> ClusterIndex<T> {
        let params = self.params;
        let points = self.points;
        assert!(points.len() <= u32::MAX as usize);

        let non_finite = points.iter().filter(|p| !p.coordinate.is_finite()).count();
        if non_finite > 0 {
            log::warn!(
                "{} of {} points have non-finite coordinates and will never be returned by queries",
                non_finite,
                points.len()
            );
        }

        let mut nodes: Vec<ClusterNode> = points
            .iter()
            .map(|p| ClusterNode {
                x: lng_x(wrap_longitude(p.longitude())),
                y: lat_y(p.latitude()),
                num_points: 1,
                zoom: params.max_zoom() + 1,
                children_start: 0,
                children_end: 0,
            })
            .collect();
        let mut child_ids: Vec<u32> = vec![];

        // the unclustered level holds every input point; non-finite positions are left out of
        // the k-d trees, where they would break the partitioning for everyone else
        let leaves: Vec<u32> = (0..points.len() as u32)
            .filter(|&i| {
                let node = &nodes[i as usize];
                node.x.is_finite() && node.y.is_finite()
            })
            .collect();
        let mut levels = vec![Level::new(leaves, &nodes, params.node_size())];

        // cluster points on max zoom, then cluster the results on the previous zoom, etc.,
        // resulting in a cluster hierarchy across zoom levels
        for zoom in (params.min_zoom()..=params.max_zoom()).rev() {
            let previous = &levels[levels.len() - 1];
            let level_nodes = cluster(&params, previous, zoom, &mut nodes, &mut child_ids);
            levels.push(Level::new(level_nodes, &nodes, params.node_size()));
        }

        // levels[zoom - min_zoom]
        levels.reverse();

        let generation = NEXT_GENERATION.fetch_add(1, Ordering::Relaxed);
        log::debug!(
            "Built cluster index generation {} over {} points: {} clusters on zooms {}..={}",
            generation,
            points.len(),
            nodes.len() - points.len(),
            params.min_zoom(),
            params.max_zoom()
        );

        ClusterIndex {
            params,
            generation,
            points,
            nodes,
            child_ids,
            levels,
        }
    }
}

/// Greedily merge the nodes of `previous` that lie within the zoom radius of each other.
///
/// Returns the node ids visible at `zoom`. New clusters are appended to `nodes`, with their
/// children recorded in `child_ids`.
fn cluster(
    params: &ClusterParams,
    previous: &Level,
    zoom: u32,
    nodes: &mut Vec<ClusterNode>,
    child_ids: &mut Vec<u32>,
) -> Vec<u32> {
    let r = params.zoom_radius(zoom);
    let mut visited = vec![false; previous.nodes.len()];
    let mut next = Vec::with_capacity(previous.nodes.len());

    for i in 0..previous.nodes.len() {
        // each node is assigned at most once per zoom
        if visited[i] {
            continue;
        }
        visited[i] = true;

        let id = previous.nodes[i];
        let ClusterNode {
            x,
            y,
            num_points: origin_points,
            ..
        } = nodes[id as usize];

        let neighbor_ids = previous.tree.within(x, y, r);

        let mut num_points = origin_points as u64;
        for &k in &neighbor_ids {
            if !visited[k] {
                num_points += nodes[previous.nodes[k] as usize].num_points as u64;
            }
        }

        if num_points > origin_points as u64 && num_points >= params.min_points() as u64 {
            let mut wx = x * origin_points as f64;
            let mut wy = y * origin_points as f64;

            let children_start = child_ids.len() as u32;
            child_ids.push(id);

            for k in neighbor_ids {
                if visited[k] {
                    continue;
                }
                visited[k] = true;

                let child = previous.nodes[k];
                let node = &nodes[child as usize];
                wx += node.x * node.num_points as f64;
                wy += node.y * node.num_points as f64;
                child_ids.push(child);
            }

            let cluster_id = nodes.len() as u32;
            nodes.push(ClusterNode {
                x: wx / num_points as f64,
                y: wy / num_points as f64,
                num_points: num_points as u32,
                zoom,
                children_start,
                children_end: child_ids.len() as u32,
            });
            next.push(cluster_id);
        } else {
            next.push(id);

            // too few points to cluster, keep the neighbors as they are
            if num_points > origin_points as u64 {
                for k in neighbor_ids {
                    if visited[k] {
                        continue;
                    }
                    visited[k] = true;
                    next.push(previous.nodes[k]);
                }
            }
        }
    }

    next
}
