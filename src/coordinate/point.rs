//! Point structure for representing geographic coordinates

/// A longitude/latitude pair in degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    /// Longitude in degrees east
    pub lon: f64,
    /// Latitude in degrees north
    pub lat: f64,
}

impl Point {
    /// Create a new point
    pub fn new(lon: f64, lat: f64) -> Self {
        Point { lon, lat }
    }

    /// Midpoint of the segment between two points
    pub fn midpoint(&self, other: &Point) -> Point {
        Point::new(0.5 * (self.lon + other.lon), 0.5 * (self.lat + other.lat))
    }

    /// Reflect `other` through this point: `self + (self - other)`
    pub fn reflect(&self, other: &Point) -> Point {
        Point::new(
            self.lon + (self.lon - other.lon),
            self.lat + (self.lat - other.lat),
        )
    }

    /// Clamp into [-180, 180] x [-90, 90]
    pub fn clamped(&self) -> Point {
        Point::new(self.lon.clamp(-180.0, 180.0), self.lat.clamp(-90.0, 90.0))
    }
}
