use std::cell::Cell;
use std::sync::Arc;

use crate::errors::{SubsetError, SubsetResult};
use crate::swath::{BufferAllocator, Grid, HeapAllocator, Scan, Timestamp, ValueRange};

/// Regular grid: longitude grows with the column, latitude with the row
pub fn regular_grid(rows: usize, columns: usize, lon0: f64, lat0: f64, step: f64) -> Arc<Grid> {
    let mut longitudes = Vec::with_capacity(rows * columns);
    let mut latitudes = Vec::with_capacity(rows * columns);
    for row in 0..rows {
        for column in 0..columns {
            longitudes.push(lon0 + column as f64 * step);
            latitudes.push(lat0 + row as f64 * step);
        }
    }
    Arc::new(Grid::new(rows, columns, longitudes, latitudes).unwrap())
}

/// Grid from explicit longitudes and latitudes
pub fn grid_from(rows: usize, columns: usize, longitudes: &[f64], latitudes: &[f64]) -> Arc<Grid> {
    Arc::new(Grid::new(rows, columns, longitudes.to_vec(), latitudes.to_vec()).unwrap())
}

pub fn timestamp(value: i64) -> Timestamp {
    Timestamp::new(value).unwrap()
}

pub fn scan(value: i64, grid: &Arc<Grid>, values: Vec<f64>) -> Scan {
    Scan::new(timestamp(value), Arc::clone(grid), values, &ValueRange::default()).unwrap()
}

/// Deterministic pseudo-random sequence in [0, 1)
pub struct Lcg(u64);

impl Lcg {
    pub fn new(seed: u64) -> Self {
        Lcg(seed)
    }

    pub fn next(&mut self) -> f64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (self.0 >> 11) as f64 / (1u64 << 53) as f64
    }
}

/// Allocator that succeeds `remaining` times, then fails
pub struct FailAfter {
    remaining: Cell<usize>,
}

impl FailAfter {
    pub fn new(successes: usize) -> Self {
        FailAfter {
            remaining: Cell::new(successes),
        }
    }
}

impl BufferAllocator for FailAfter {
    fn allocate(&self, len: usize) -> SubsetResult<Vec<f64>> {
        let remaining = self.remaining.get();
        if remaining == 0 {
            return Err(SubsetError::AllocationFailed(len));
        }
        self.remaining.set(remaining - 1);
        HeapAllocator.allocate(len)
    }
}

/// Allocator whose `failing`-th call (counting from 0) fails, all others succeed
pub struct FailOnCall {
    calls: Cell<usize>,
    failing: usize,
}

impl FailOnCall {
    pub fn new(failing: usize) -> Self {
        FailOnCall {
            calls: Cell::new(0),
            failing,
        }
    }
}

impl BufferAllocator for FailOnCall {
    fn allocate(&self, len: usize) -> SubsetResult<Vec<f64>> {
        let call = self.calls.get();
        self.calls.set(call + 1);
        if call == self.failing {
            return Err(SubsetError::AllocationFailed(len));
        }
        HeapAllocator.allocate(len)
    }
}
