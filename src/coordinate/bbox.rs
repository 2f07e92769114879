//! Longitude-latitude rectangle used to subset scans

use super::point::Point;
use super::validation::{is_valid_latitude, is_valid_longitude};
use crate::errors::{SubsetError, SubsetResult};

/// A longitude-latitude bounding box, bounds inclusive
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    /// Western edge in degrees
    pub min_lon: f64,
    /// Southern edge in degrees
    pub min_lat: f64,
    /// Eastern edge in degrees
    pub max_lon: f64,
    /// Northern edge in degrees
    pub max_lat: f64,
}

impl BoundingBox {
    /// Create a new bounding box, checking that the bounds are ordered and in range
    pub fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> SubsetResult<Self> {
        if !is_valid_longitude(min_lon) || !is_valid_longitude(max_lon) {
            return Err(SubsetError::InvalidDomain(format!(
                "longitudes must lie in [-180, 180], got {} and {}",
                min_lon, max_lon
            )));
        }
        if !is_valid_latitude(min_lat) || !is_valid_latitude(max_lat) {
            return Err(SubsetError::InvalidDomain(format!(
                "latitudes must lie in [-90, 90], got {} and {}",
                min_lat, max_lat
            )));
        }
        if min_lon > max_lon || min_lat > max_lat {
            return Err(SubsetError::InvalidDomain(format!(
                "minimum exceeds maximum in {},{},{},{}",
                min_lon, min_lat, max_lon, max_lat
            )));
        }

        Ok(BoundingBox {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        })
    }

    /// The whole globe
    pub fn global() -> Self {
        BoundingBox {
            min_lon: -180.0,
            min_lat: -90.0,
            max_lon: 180.0,
            max_lat: 90.0,
        }
    }

    /// Parse a bounding box from a string (format: "minlon,minlat,maxlon,maxlat")
    pub fn from_string(bbox_str: &str) -> SubsetResult<Self> {
        let parts: Vec<&str> = bbox_str.split(',').collect();
        if parts.len() != 4 {
            return Err(SubsetError::InvalidDomain(
                "Bounding box must have 4 comma-separated values".to_string(),
            ));
        }

        let mut values = [0.0; 4];
        for (value, part) in values.iter_mut().zip(&parts) {
            *value = part.trim().parse::<f64>().map_err(|_| {
                SubsetError::InvalidDomain(format!("Invalid bounding box value '{}'", part.trim()))
            })?;
        }

        BoundingBox::new(values[0], values[1], values[2], values[3])
    }

    /// Bounds in header order: min_lon, min_lat, max_lon, max_lat
    pub fn to_array(&self) -> [f64; 4] {
        [self.min_lon, self.min_lat, self.max_lon, self.max_lat]
    }

    /// Get the center point of the bounding box
    pub fn center(&self) -> Point {
        Point::new(
            self.min_lon + (self.max_lon - self.min_lon) / 2.0,
            self.min_lat + (self.max_lat - self.min_lat) / 2.0,
        )
    }

    /// Check if this bounding box contains a longitude/latitude pair
    #[inline]
    pub fn contains_lon_lat(&self, lon: f64, lat: f64) -> bool {
        lon >= self.min_lon && lon <= self.max_lon && lat >= self.min_lat && lat <= self.max_lat
    }

    /// Check if this bounding box contains a point
    pub fn contains(&self, point: &Point) -> bool {
        self.contains_lon_lat(point.lon, point.lat)
    }
}
