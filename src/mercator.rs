//! Spherical Mercator projection helpers.
//!
//! Clustering happens in the unit square: `x` in `[0, 1]` from west to east and `y` in `[0, 1]`
//! from north to south. Viewport fitting happens in tile pixel space.

use std::f64::consts::PI;

/// Pixel size of a single map tile at zoom 0, used for viewport fitting.
pub const TILE_SIZE: f64 = 256.0;

/// Largest `|sin(latitude)|` allowed in pixel projection, which keeps the poles finite.
const MAX_SIN_LATITUDE: f64 = 0.9999;

/// Project a longitude into the unit square.
#[inline]
pub(crate) fn lng_x(lng: f64) -> f64 {
    lng / 360.0 + 0.5
}

/// Project a latitude into the unit square, clamped to `[0, 1]`.
#[inline]
pub(crate) fn lat_y(lat: f64) -> f64 {
    let sin = (lat * PI / 180.0).sin();
    let y = 0.5 - (0.25 * ((1.0 + sin) / (1.0 - sin)).ln()) / PI;
    y.clamp(0.0, 1.0)
}

/// Inverse of [`lng_x`].
#[inline]
pub(crate) fn x_lng(x: f64) -> f64 {
    (x - 0.5) * 360.0
}

/// Inverse of [`lat_y`].
#[inline]
pub(crate) fn y_lat(y: f64) -> f64 {
    let y2 = ((180.0 - y * 360.0) * PI) / 180.0;
    (360.0 * y2.exp().atan()) / PI - 90.0
}

/// Fold a longitude outside `[-180, 180]` back into `[-180, 180)`.
///
/// Non-finite values are returned unchanged.
#[inline]
pub(crate) fn wrap_longitude(lng: f64) -> f64 {
    if (-180.0..=180.0).contains(&lng) || !lng.is_finite() {
        lng
    } else {
        (lng + 180.0).rem_euclid(360.0) - 180.0
    }
}

/// Project a coordinate into tile pixel space at `zoom`, rounded to whole pixels.
///
/// Both axes are capped at the world size in pixels for that zoom.
pub(crate) fn px(lng: f64, lat: f64, zoom: u32) -> (f64, f64) {
    let size = TILE_SIZE * 2f64.powi(zoom as i32);
    let center = size / 2.0;
    let f = (lat * PI / 180.0)
        .sin()
        .clamp(-MAX_SIN_LATITUDE, MAX_SIN_LATITUDE);

    let x = (center + lng * (size / 360.0)).round();
    let y = (center + 0.5 * ((1.0 + f) / (1.0 - f)).ln() * (-size / (2.0 * PI))).round();
    (x.min(size), y.min(size))
}

#[cfg(test)]
mod test {
    use super::*;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{} != {}", a, b);
    }

    #[test]
    fn unit_square_corners() {
        assert_close(lng_x(-180.), 0.);
        assert_close(lng_x(180.), 1.);
        assert_close(lat_y(0.), 0.5);
        assert_eq!(lat_y(90.), 0.);
        assert_eq!(lat_y(-90.), 1.);
    }

    #[test]
    fn projection_inverts() {
        for (lng, lat) in [(0., 0.), (-122.4, 37.7), (151.2, -33.8), (179.9, 84.)] {
            assert_close(x_lng(lng_x(lng)), lng);
            assert!((y_lat(lat_y(lat)) - lat).abs() < 1e-6);
        }
    }

    #[test]
    fn wraps_out_of_range_longitudes() {
        assert_eq!(wrap_longitude(180.), 180.);
        assert_eq!(wrap_longitude(-180.), -180.);
        assert_close(wrap_longitude(190.), -170.);
        assert_close(wrap_longitude(-190.), 170.);
        assert_close(wrap_longitude(540.), -180.);
        assert!(wrap_longitude(f64::NAN).is_nan());
    }

    #[test]
    fn pixel_projection() {
        assert_eq!(px(0., 0., 0), (128., 128.));
        assert_eq!(px(-180., 0., 1), (0., 256.));
        assert_eq!(px(180., 0., 1), (512., 256.));
        // poles stay finite
        let (_, north) = px(0., 90., 2);
        let (_, south) = px(0., -90., 2);
        assert!(north.is_finite() && south.is_finite());
        assert!(north < south);
    }
}
