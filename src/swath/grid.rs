//! Geolocation grids and timestamped scans

use std::sync::Arc;

use log::debug;

use crate::coordinate::{is_missing, is_valid_lon_lat, Point, MISSING};
use crate::errors::{SubsetError, SubsetResult};

use super::timestamp::Timestamp;

/// Immutable rows x columns grid of pixel-center coordinates, row-major
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    rows: usize,
    columns: usize,
    longitudes: Vec<f64>,
    latitudes: Vec<f64>,
}

impl Grid {
    /// Create a grid from parallel longitude and latitude arrays
    ///
    /// Both arrays must hold exactly `rows * columns` valid coordinates.
    pub fn new(rows: usize, columns: usize, longitudes: Vec<f64>, latitudes: Vec<f64>) -> SubsetResult<Self> {
        let expected = rows.checked_mul(columns).ok_or_else(|| {
            SubsetError::InvalidHeader(format!("grid {}x{} is too large", rows, columns))
        })?;

        if rows == 0 || columns == 0 {
            return Err(SubsetError::InvalidHeader(format!(
                "grid {}x{} has no pixels",
                rows, columns
            )));
        }
        if longitudes.len() != expected || latitudes.len() != expected {
            return Err(SubsetError::InvalidHeader(format!(
                "grid {}x{} needs {} coordinates, got {} longitudes and {} latitudes",
                rows,
                columns,
                expected,
                longitudes.len(),
                latitudes.len()
            )));
        }

        if let Some(index) = longitudes
            .iter()
            .zip(&latitudes)
            .position(|(&lon, &lat)| !is_valid_lon_lat(lon, lat))
        {
            return Err(SubsetError::InvalidHeader(format!(
                "invalid coordinate ({}, {}) at pixel {}",
                longitudes[index], latitudes[index], index
            )));
        }

        Ok(Grid {
            rows,
            columns,
            longitudes,
            latitudes,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    /// (rows, columns)
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.columns)
    }

    pub fn len(&self) -> usize {
        self.rows * self.columns
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn index(&self, row: usize, column: usize) -> usize {
        row * self.columns + column
    }

    pub fn longitudes(&self) -> &[f64] {
        &self.longitudes
    }

    pub fn latitudes(&self) -> &[f64] {
        &self.latitudes
    }

    #[inline]
    pub fn longitude(&self, index: usize) -> f64 {
        self.longitudes[index]
    }

    #[inline]
    pub fn latitude(&self, index: usize) -> f64 {
        self.latitudes[index]
    }

    #[inline]
    pub fn center(&self, row: usize, column: usize) -> Point {
        let index = self.index(row, column);
        Point::new(self.longitudes[index], self.latitudes[index])
    }
}

/// Inclusive range of values considered physically valid
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueRange {
    pub minimum: f64,
    pub maximum: f64,
}

impl ValueRange {
    pub fn new(minimum: f64, maximum: f64) -> SubsetResult<Self> {
        if !(minimum <= maximum) {
            return Err(SubsetError::ConfigError(format!(
                "valid range minimum {} exceeds maximum {}",
                minimum, maximum
            )));
        }
        Ok(ValueRange { minimum, maximum })
    }

    /// Parse "min,max"
    pub fn from_string(range_str: &str) -> SubsetResult<Self> {
        let parts: Vec<&str> = range_str.split(',').collect();
        if parts.len() != 2 {
            return Err(SubsetError::ConfigError(format!(
                "Invalid range format '{}'. Expected 'min,max'",
                range_str
            )));
        }

        let parse = |s: &str| {
            s.trim()
                .parse::<f64>()
                .map_err(|_| SubsetError::ConfigError(format!("Invalid range value '{}'", s.trim())))
        };

        ValueRange::new(parse(parts[0])?, parse(parts[1])?)
    }

    /// Is `value` present and inside the range
    #[inline]
    pub fn contains(&self, value: f64) -> bool {
        !is_missing(value) && value >= self.minimum && value <= self.maximum
    }
}

impl Default for ValueRange {
    /// Any non-negative finite value
    fn default() -> Self {
        ValueRange {
            minimum: 0.0,
            maximum: f64::MAX,
        }
    }
}

/// One timestamped data array sharing a geolocation grid
#[derive(Debug, Clone)]
pub struct Scan {
    timestamp: Timestamp,
    grid: Arc<Grid>,
    values: Vec<f64>,
}

impl Scan {
    /// Create a scan, overwriting values outside `valid` with MISSING
    pub fn new(timestamp: Timestamp, grid: Arc<Grid>, mut values: Vec<f64>, valid: &ValueRange) -> SubsetResult<Self> {
        if values.len() != grid.len() {
            return Err(SubsetError::InvalidHeader(format!(
                "scan has {} values, grid {}x{} has {} pixels",
                values.len(),
                grid.rows(),
                grid.columns(),
                grid.len()
            )));
        }

        let mut invalid = 0usize;
        for value in values.iter_mut() {
            if !valid.contains(*value) {
                *value = MISSING;
                invalid += 1;
            }
        }
        debug!("Scan {}: {} of {} values invalid", timestamp, invalid, values.len());

        Ok(Scan {
            timestamp,
            grid,
            values,
        })
    }

    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    pub fn grid(&self) -> &Arc<Grid> {
        &self.grid
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn shape(&self) -> (usize, usize) {
        self.grid.shape()
    }
}
