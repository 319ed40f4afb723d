use geo_traits::CoordTrait;

/// A geographic coordinate in degrees.
///
/// Values are not validated: out-of-range or non-finite coordinates are carried as-is.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Coord {
    /// Longitude, the `x` axis
    pub longitude: f64,
    /// Latitude, the `y` axis
    pub latitude: f64,
}

impl Coord {
    /// Create a new coordinate from a longitude and latitude.
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }

    /// Copy any [`CoordTrait`] implementation, interpreting `x` as longitude and `y` as latitude.
    pub fn from_coord(coord: &impl CoordTrait<T = f64>) -> Self {
        Self::new(coord.x(), coord.y())
    }

    pub(crate) fn is_finite(&self) -> bool {
        self.longitude.is_finite() && self.latitude.is_finite()
    }
}

impl CoordTrait for Coord {
    type T = f64;

    fn dim(&self) -> geo_traits::Dimensions {
        geo_traits::Dimensions::Xy
    }

    fn nth_or_panic(&self, n: usize) -> Self::T {
        match n {
            0 => self.longitude,
            1 => self.latitude,
            _ => panic!("Coord only has 2 dimensions, requested {}", n),
        }
    }

    fn x(&self) -> Self::T {
        self.longitude
    }

    fn y(&self) -> Self::T {
        self.latitude
    }
}

impl From<(f64, f64)> for Coord {
    fn from((longitude, latitude): (f64, f64)) -> Self {
        Self::new(longitude, latitude)
    }
}

/// An input point: a coordinate plus an opaque, caller-supplied payload.
///
/// The payload is never inspected by the index and is handed back unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct Point<T> {
    /// Location of the point
    pub coordinate: Coord,
    /// Caller data carried through clustering
    pub payload: T,
}

impl<T> Point<T> {
    /// Create a new point.
    pub fn new(longitude: f64, latitude: f64, payload: T) -> Self {
        Self {
            coordinate: Coord::new(longitude, latitude),
            payload,
        }
    }

    /// Create a new point from any [`CoordTrait`] implementation.
    pub fn from_coord(coord: &impl CoordTrait<T = f64>, payload: T) -> Self {
        Self {
            coordinate: Coord::from_coord(coord),
            payload,
        }
    }

    /// Longitude of this point.
    #[inline]
    pub fn longitude(&self) -> f64 {
        self.coordinate.longitude
    }

    /// Latitude of this point.
    #[inline]
    pub fn latitude(&self) -> f64 {
        self.coordinate.latitude
    }
}
