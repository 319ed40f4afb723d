//! A clustering session: the stateful front end a map view talks to.
//!
//! The session reacts to two independent triggers:
//!
//! - [`ClusteringSession::set_points`] rebuilds the index when the point set's key changes, then
//!   re-queries if a viewport is already known.
//! - [`ClusteringSession::set_viewport`] re-queries the current index when the viewport's key
//!   changes. Without an index, nothing runs and the cached clusters stay as they were.
//!
//! Nothing else recomputes the cached clusters. In particular, a new point set whose key matches
//! the previous one (by default: the same number of points) does not rebuild the index, and the
//! cached clusters keep describing the previous points until a key changes. Supply a content key
//! with [`ClusteringSession::with_points_key`] when that matters.

use std::fmt;

use crate::cluster::{ClusterId, ClusterIndex, ClusterOptions, ClusterParams, ClusterResult};
use crate::error::Result;
use crate::r#type::{Coord, Point};
use crate::viewport::{region_to_bounding_box, viewport_zoom, PixelSize, Region};

type PointsKeyFn<T> = Box<dyn Fn(&[Point<T>]) -> u64 + Send + Sync>;

/// The default point set key: the number of points.
pub fn point_count_key<T>(points: &[Point<T>]) -> u64 {
    points.len() as u64
}

/// Caches a [`ClusterIndex`] and the clusters visible in the last viewport.
///
/// All operations are synchronous. The session is not meant to be driven from several threads
/// at once; the index it holds is read-only and can be shared through [`Self::index`].
pub struct ClusteringSession<T> {
    options: ClusterOptions,
    params: ClusterParams,
    size: PixelSize,
    points_key_fn: PointsKeyFn<T>,
    points_key: Option<u64>,
    index: Option<ClusterIndex<T>>,
    region: Option<Region>,
    zoom: Option<u32>,
    clusters: Vec<ClusterResult<T>>,
}

impl<T: 'static> ClusteringSession<T> {
    /// Create a session for a display of the given size.
    ///
    /// Fails if the options are invalid for that display.
    pub fn new(options: ClusterOptions, size: PixelSize) -> Result<Self> {
        let params = options.resolve(size.width())?;
        Ok(Self {
            options,
            params,
            size,
            points_key_fn: Box::new(point_count_key),
            points_key: None,
            index: None,
            region: None,
            zoom: None,
            clusters: vec![],
        })
    }

    /// Replace the function deciding whether a new point set differs from the current one.
    pub fn with_points_key(
        mut self,
        key: impl Fn(&[Point<T>]) -> u64 + Send + Sync + 'static,
    ) -> Self {
        self.points_key_fn = Box::new(key);
        self
    }

    /// The clusters computed for the last viewport. Empty until the first query runs.
    pub fn current_clusters(&self) -> &[ClusterResult<T>] {
        &self.clusters
    }

    /// Coordinates of the points nested under a cluster, for fitting the view to them.
    ///
    /// Ids from an index that has since been rebuilt yield no coordinates.
    pub fn expand(&self, cluster_id: ClusterId, max_leaves: Option<usize>) -> Vec<Coord> {
        match &self.index {
            Some(index) => index
                .expand(cluster_id, max_leaves)
                .into_iter()
                .map(|point| point.coordinate)
                .collect(),
            None => vec![],
        }
    }

    /// The current index, if points have been set.
    pub fn index(&self) -> Option<&ClusterIndex<T>> {
        self.index.as_ref()
    }

    /// The last viewport applied.
    pub fn viewport(&self) -> Option<&Region> {
        self.region.as_ref()
    }

    /// The zoom the current clusters were computed at.
    pub fn zoom(&self) -> Option<u32> {
        self.zoom
    }

    /// The latest display size.
    pub fn pixel_size(&self) -> PixelSize {
        self.size
    }

    /// The parameters of the most recent build.
    pub fn params(&self) -> &ClusterParams {
        &self.params
    }
}

impl<T: Clone + 'static> ClusteringSession<T> {
    /// Apply a new point set.
    ///
    /// Rebuilds the index when the point set key changed, discarding the previous index and
    /// invalidating its cluster ids. If a viewport is known, the clusters are recomputed against
    /// the new index before this returns.
    pub fn set_points(&mut self, points: Vec<Point<T>>) {
        let key = (self.points_key_fn)(&points);
        if self.points_key == Some(key) {
            log::debug!("Point set key {} unchanged, keeping the current index", key);
            return;
        }

        // the default radius follows the display width at build time
        match self.options.resolve(self.size.width()) {
            Ok(params) => self.params = params,
            Err(err) => log::warn!("Keeping previous cluster parameters: {}", err),
        }

        self.index = Some(ClusterIndex::new(points, self.params));
        self.points_key = Some(key);

        if self.region.is_some() {
            self.refresh();
        }
    }

    /// Apply a new viewport.
    ///
    /// Re-queries the current index when any of the four region fields changed. The display
    /// size is recorded either way.
    pub fn set_viewport(&mut self, region: Region, size: PixelSize) {
        self.size = size;
        if self.region.map(|r| r.key()) == Some(region.key()) {
            log::trace!("Viewport unchanged, keeping {} clusters", self.clusters.len());
            return;
        }

        self.region = Some(region);
        self.refresh();
    }

    fn refresh(&mut self) {
        let (Some(index), Some(region)) = (&self.index, &self.region) else {
            log::debug!("No cluster index yet, skipping query");
            return;
        };

        let bbox = region_to_bounding_box(region);
        let zoom = viewport_zoom(region, self.size, self.params.min_zoom());
        self.clusters = index.query(&bbox, zoom);
        self.zoom = Some(zoom);
    }
}

impl<T> fmt::Debug for ClusteringSession<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClusteringSession")
            .field("params", &self.params)
            .field("size", &self.size)
            .field("points_key", &self.points_key)
            .field("num_points", &self.index.as_ref().map(|index| index.len()))
            .field("region", &self.region)
            .field("zoom", &self.zoom)
            .field("num_clusters", &self.clusters.len())
            .finish()
    }
}
