use crate::error::{ClusterError, Result};
use crate::kdtree::DEFAULT_KDTREE_NODE_SIZE;

/// Default tile extent in pixels; the radius is measured relative to it.
pub const DEFAULT_EXTENT: u32 = 512;

/// Default lowest zoom level clusters are generated for.
pub const DEFAULT_MIN_ZOOM: u32 = 1;

/// Default highest zoom level clusters are generated for.
pub const DEFAULT_MAX_ZOOM: u32 = 16;

/// Share of the display width used as cluster radius when none is configured.
pub const DEFAULT_RADIUS_RATIO: f64 = 0.045;

/// Default minimum number of points needed to form a cluster.
pub const DEFAULT_MIN_POINTS: u32 = 2;

/// Highest supported `max_zoom`.
pub const MAX_ZOOM: u32 = 30;

/// User-facing clustering configuration. Every field has a default.
///
/// Call [`ClusterOptions::resolve`] to validate the options and obtain the [`ClusterParams`] an
/// index is built with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClusterOptions {
    /// Tile extent in pixels
    pub extent: u32,
    /// Lowest zoom level to generate clusters on
    pub min_zoom: u32,
    /// Highest zoom level to generate clusters on
    pub max_zoom: u32,
    /// Cluster radius in pixels. Derived from the display width when `None`.
    pub radius: Option<f64>,
    /// Minimum number of points to form a cluster
    pub min_points: u32,
    /// Leaf node size of the k-d trees backing each zoom level
    pub node_size: usize,
}

impl Default for ClusterOptions {
    fn default() -> Self {
        Self {
            extent: DEFAULT_EXTENT,
            min_zoom: DEFAULT_MIN_ZOOM,
            max_zoom: DEFAULT_MAX_ZOOM,
            radius: None,
            min_points: DEFAULT_MIN_POINTS,
            node_size: DEFAULT_KDTREE_NODE_SIZE,
        }
    }
}

impl ClusterOptions {
    pub fn with_extent(mut self, extent: u32) -> Self {
        self.extent = extent;
        self
    }

    pub fn with_zoom_range(mut self, min_zoom: u32, max_zoom: u32) -> Self {
        self.min_zoom = min_zoom;
        self.max_zoom = max_zoom;
        self
    }

    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = Some(radius);
        self
    }

    pub fn with_min_points(mut self, min_points: u32) -> Self {
        self.min_points = min_points;
        self
    }

    pub fn with_node_size(mut self, node_size: usize) -> Self {
        self.node_size = node_size;
        self
    }

    /// Validate these options for a display `display_width` pixels wide.
    ///
    /// The width is only used when no explicit radius is configured.
    pub fn resolve(&self, display_width: f64) -> Result<ClusterParams> {
        if self.min_zoom > self.max_zoom {
            return Err(ClusterError::InvalidZoomRange {
                min_zoom: self.min_zoom,
                max_zoom: self.max_zoom,
            });
        }
        if self.max_zoom > MAX_ZOOM {
            return Err(ClusterError::ZoomTooLarge(self.max_zoom));
        }
        if self.extent == 0 {
            return Err(ClusterError::InvalidExtent);
        }

        let radius = self
            .radius
            .unwrap_or(display_width * DEFAULT_RADIUS_RATIO);
        if !radius.is_finite() || radius <= 0.0 {
            return Err(ClusterError::InvalidRadius(radius));
        }

        if !(2..=65535).contains(&self.node_size) {
            return Err(ClusterError::InvalidNodeSize(self.node_size));
        }
        if self.min_points < 2 {
            return Err(ClusterError::InvalidMinPoints(self.min_points));
        }

        Ok(ClusterParams {
            extent: self.extent,
            min_zoom: self.min_zoom,
            max_zoom: self.max_zoom,
            radius,
            min_points: self.min_points,
            node_size: self.node_size,
        })
    }
}

/// Validated, fully resolved clustering parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClusterParams {
    extent: u32,
    min_zoom: u32,
    max_zoom: u32,
    radius: f64,
    min_points: u32,
    node_size: usize,
}

impl ClusterParams {
    pub fn extent(&self) -> u32 {
        self.extent
    }

    pub fn min_zoom(&self) -> u32 {
        self.min_zoom
    }

    pub fn max_zoom(&self) -> u32 {
        self.max_zoom
    }

    /// Cluster radius in pixels
    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn min_points(&self) -> u32 {
        self.min_points
    }

    pub fn node_size(&self) -> usize {
        self.node_size
    }

    /// Merge distance at `zoom`, in unit-square coordinates.
    #[inline]
    pub(crate) fn zoom_radius(&self, zoom: u32) -> f64 {
        self.radius / (self.extent as f64 * 2f64.powi(zoom as i32))
    }

    /// Clamp a query zoom into the range that has a precomputed level.
    ///
    /// `max_zoom + 1` is the unclustered level holding every input point.
    #[inline]
    pub(crate) fn limit_zoom(&self, zoom: u32) -> u32 {
        zoom.clamp(self.min_zoom, self.max_zoom + 1)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults() {
        let params = ClusterOptions::default().resolve(400.).unwrap();
        assert_eq!(params.extent(), 512);
        assert_eq!(params.min_zoom(), 1);
        assert_eq!(params.max_zoom(), 16);
        assert!((params.radius() - 18.).abs() < 1e-9);
        assert_eq!(params.min_points(), 2);
        assert_eq!(params.node_size(), 64);
    }

    #[test]
    fn explicit_radius_ignores_width() {
        let params = ClusterOptions::default()
            .with_radius(60.)
            .resolve(f64::NAN)
            .unwrap();
        assert_eq!(params.radius(), 60.);
    }

    #[test]
    fn rejects_invalid_options() {
        let base = ClusterOptions::default();
        assert_eq!(
            base.with_zoom_range(5, 4).resolve(400.),
            Err(ClusterError::InvalidZoomRange {
                min_zoom: 5,
                max_zoom: 4
            })
        );
        assert_eq!(
            base.with_zoom_range(0, 31).resolve(400.),
            Err(ClusterError::ZoomTooLarge(31))
        );
        assert_eq!(base.with_extent(0).resolve(400.), Err(ClusterError::InvalidExtent));
        assert_eq!(
            base.with_radius(0.).resolve(400.),
            Err(ClusterError::InvalidRadius(0.))
        );
        assert_eq!(
            base.with_radius(-3.).resolve(400.),
            Err(ClusterError::InvalidRadius(-3.))
        );
        assert!(matches!(
            base.with_radius(f64::NAN).resolve(400.),
            Err(ClusterError::InvalidRadius(_))
        ));
        assert_eq!(
            base.with_node_size(1).resolve(400.),
            Err(ClusterError::InvalidNodeSize(1))
        );
        assert_eq!(
            base.with_min_points(1).resolve(400.),
            Err(ClusterError::InvalidMinPoints(1))
        );
        assert_eq!(base.resolve(0.), Err(ClusterError::InvalidRadius(0.)));
    }

    #[test]
    fn equal_zoom_bounds_are_valid() {
        let params = ClusterOptions::default()
            .with_zoom_range(3, 3)
            .resolve(100.)
            .unwrap();
        assert_eq!(params.limit_zoom(0), 3);
        assert_eq!(params.limit_zoom(3), 3);
        assert_eq!(params.limit_zoom(20), 4);
    }
}
