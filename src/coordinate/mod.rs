//! Coordinate handling for swath data
//!
//! This module provides the longitude-latitude rectangle, points and the
//! validity predicates used throughout the subsetting engine.

mod bbox;
mod point;
pub mod validation;

// Re-export key types
pub use self::bbox::BoundingBox;
pub use self::point::Point;
pub use self::validation::{
    is_missing, is_valid_latitude, is_valid_lon_lat, is_valid_longitude, is_valid_timestamp,
    MISSING,
};
