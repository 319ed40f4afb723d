//! Conversions between map viewports, bounding boxes and zoom levels.

use geo_traits::{CoordTrait, RectTrait};

use crate::error::{ClusterError, Result};
use crate::mercator::px;

/// Normalized longitude deltas at or above this span are treated as a whole-world view.
pub const WORLD_SPAN_DELTA: f64 = 40.0;

/// Highest zoom considered when fitting a bounding box into a pixel viewport.
pub const MAX_FIT_ZOOM: u32 = 20;

/// The visible map region: a center plus latitude and longitude spans.
///
/// `longitude_delta` may be negative when the region wraps across the antimeridian.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Region {
    pub center_longitude: f64,
    pub center_latitude: f64,
    pub longitude_delta: f64,
    pub latitude_delta: f64,
}

impl Region {
    pub fn new(
        center_longitude: f64,
        center_latitude: f64,
        longitude_delta: f64,
        latitude_delta: f64,
    ) -> Self {
        Self {
            center_longitude,
            center_latitude,
            longitude_delta,
            latitude_delta,
        }
    }

    /// The longitude delta with a negative (antimeridian-wrapping) span shifted by 360 degrees.
    #[inline]
    pub fn normalized_longitude_delta(&self) -> f64 {
        if self.longitude_delta < 0.0 {
            self.longitude_delta + 360.0
        } else {
            self.longitude_delta
        }
    }

    /// Identity used to detect viewport changes: the bit patterns of the four fields.
    pub(crate) fn key(&self) -> [u64; 4] {
        [
            self.center_latitude.to_bits(),
            self.center_longitude.to_bits(),
            self.latitude_delta.to_bits(),
            self.longitude_delta.to_bits(),
        ]
    }
}

/// Pixel dimensions of the display surface.
///
/// Both dimensions are guaranteed finite and positive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelSize {
    width: f64,
    height: f64,
}

impl PixelSize {
    /// Create a new pixel size, rejecting non-finite or non-positive dimensions.
    pub fn new(width: f64, height: f64) -> Result<Self> {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if !valid(width) || !valid(height) {
            return Err(ClusterError::InvalidPixelSize { width, height });
        }
        Ok(Self { width, height })
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.height
    }
}

/// An axis-aligned rectangle in geographic degrees.
///
/// Boxes produced by [`region_to_bounding_box`] are not clamped to the canonical
/// `[-180, 180]` / `[-90, 90]` ranges; consumers must tolerate denormalized values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl BoundingBox {
    pub fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            west,
            south,
            east,
            north,
        }
    }

    /// A box covering the whole world.
    pub fn world() -> Self {
        Self::new(-180.0, -90.0, 180.0, 90.0)
    }

    /// Copy any [`RectTrait`] implementation, interpreting `x` as longitude and `y` as latitude.
    pub fn from_rect(rect: &impl RectTrait<T = f64>) -> Self {
        let min = rect.min();
        let max = rect.max();
        Self::new(min.x(), min.y(), max.x(), max.y())
    }

    /// East minus west, in degrees.
    #[inline]
    pub fn width(&self) -> f64 {
        self.east - self.west
    }

    /// North minus south, in degrees.
    #[inline]
    pub fn height(&self) -> f64 {
        self.north - self.south
    }
}

/// Convert a region into the bounding box it covers.
///
/// A negative longitude delta is shifted by 360 degrees first, so the box always has a
/// non-negative width. The normalized delta, not the box width, is the span of the region: the
/// box reaches that far on each side of the center, so a delta of `-2` normalizes to `358` and
/// yields a box `716` degrees wide.
pub fn region_to_bounding_box(region: &Region) -> BoundingBox {
    let lng_delta = region.normalized_longitude_delta();

    BoundingBox::new(
        region.center_longitude - lng_delta,
        region.center_latitude - region.latitude_delta,
        region.center_longitude + lng_delta,
        region.center_latitude + region.latitude_delta,
    )
}

/// The largest integer zoom in `0..=MAX_FIT_ZOOM` at which `bbox` fits within `size`.
///
/// Both corners are projected into tile pixels at [`MAX_FIT_ZOOM`]; each halving of the
/// ratio between the projected span and the viewport size is one zoom level down.
/// Degenerate boxes (zero or negative spans) fit at the highest zoom.
pub fn bounding_box_zoom(bbox: &BoundingBox, size: PixelSize) -> u32 {
    let base = MAX_FIT_ZOOM;
    let (min_x, max_y) = px(bbox.west, bbox.south, base);
    let (max_x, min_y) = px(bbox.east, bbox.north, base);

    let width = max_x - min_x;
    let height = max_y - min_y;

    let fit_x = base as f64 - (width / size.width()).log2();
    let fit_y = base as f64 - (height / size.height()).log2();

    // f64::min ignores a NaN operand (negative span), so only a fully degenerate box is NaN
    let adjusted = fit_x.min(fit_y).floor();
    if adjusted.is_nan() {
        return base;
    }
    adjusted.clamp(0.0, base as f64) as u32
}

/// The zoom level to cluster at for a given viewport.
///
/// Views spanning [`WORLD_SPAN_DELTA`] or more degrees of normalized longitude skip the fit
/// computation and return `min_zoom` directly.
pub fn viewport_zoom(region: &Region, size: PixelSize, min_zoom: u32) -> u32 {
    if region.normalized_longitude_delta() >= WORLD_SPAN_DELTA {
        return min_zoom;
    }
    bounding_box_zoom(&region_to_bounding_box(region), size)
}
