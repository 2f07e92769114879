//! Unit tests for the swath engine

mod test_utils;
mod corners_tests;
mod aggregate_tests;
