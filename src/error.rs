use std::fmt::Debug;
use thiserror::Error;

/// Enum with all errors in this crate.
///
/// Every variant describes a violated configuration invariant. Data problems (empty point sets,
/// stale cluster ids, degenerate viewports, out-of-range coordinates) are never errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClusterError {
    #[error("min zoom {min_zoom} is greater than max zoom {max_zoom}")]
    InvalidZoomRange { min_zoom: u32, max_zoom: u32 },

    #[error("max zoom {0} is above the supported maximum of {max}", max = crate::cluster::MAX_ZOOM)]
    ZoomTooLarge(u32),

    #[error("cluster radius must be finite and positive, got {0}")]
    InvalidRadius(f64),

    #[error("tile extent must be positive")]
    InvalidExtent,

    #[error("node size must be within 2..=65535, got {0}")]
    InvalidNodeSize(usize),

    #[error("a cluster needs at least 2 points, got min_points = {0}")]
    InvalidMinPoints(u32),

    #[error("pixel size must be finite and positive, got {width}x{height}")]
    InvalidPixelSize { width: f64, height: f64 },
}

pub type Result<T> = std::result::Result<T, ClusterError>;
