//! Pixel filtering and compaction
//!
//! Filtering happens in two independent steps. [`count_and_mark`] tests
//! every pixel of a reduced index range against the subset rectangle and
//! the validity rules and produces a [`MaskedScan`] in which every rejected
//! or out-of-range pixel is MISSING. [`compact`] then copies the surviving
//! pixels, in row-major order, into a dense [`SubsetRecord`].

use std::sync::Arc;

use log::debug;
use rayon::prelude::*;

use crate::coordinate::{is_missing, BoundingBox, Point, MISSING};
use crate::errors::{SubsetError, SubsetResult};

use super::bounds::IndexRange;
use super::corners::{CornerSet, DegeneracyPolicy};
use super::grid::{Grid, Scan, ValueRange};
use super::record::{BufferAllocator, Layout, PackedArrays, SubsetRecord};
use super::timestamp::Timestamp;

/// Per-pixel validity rules
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Validity {
    /// Accepted value range
    pub range: ValueRange,
    /// Treatment of cells with implausible corners
    pub degeneracy: DegeneracyPolicy,
}

impl Validity {
    /// Does pixel `index` pass, given its value and optional corners
    #[inline]
    pub fn accepts(&self, grid: &Grid, index: usize, value: f64, corners: Option<&CornerSet>) -> bool {
        if !self.range.contains(value) {
            return false;
        }

        match (self.degeneracy, corners) {
            (DegeneracyPolicy::RejectCoincident { tolerance }, Some(corners)) => {
                let center = Point::new(grid.longitude(index), grid.latitude(index));
                !corners.has_coincident_corners(index, center, tolerance)
            }
            _ => true,
        }
    }
}

/// A scan after marking: only surviving pixels keep their values
#[derive(Debug, Clone)]
pub struct MaskedScan {
    timestamp: Timestamp,
    grid: Arc<Grid>,
    values: Vec<f64>,
    count: usize,
}

impl MaskedScan {
    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    pub fn grid(&self) -> &Arc<Grid> {
        &self.grid
    }

    /// Values with every rejected pixel set to MISSING
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of pixels that passed
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn shape(&self) -> (usize, usize) {
        self.grid.shape()
    }
}

/// Test every pixel of `range` and mark the failures
///
/// A pixel passes when its center lies in `bounds` and `validity` accepts
/// it. Pixels outside `range` are MISSING in the result. Rows are
/// processed in parallel; the only shared state is the summed count.
pub fn count_and_mark(
    bounds: &BoundingBox,
    validity: &Validity,
    range: &IndexRange,
    scan: &Scan,
    corners: Option<&CornerSet>,
) -> MaskedScan {
    let grid = scan.grid();
    let columns = grid.columns();
    let source = scan.values();
    let mut values = vec![MISSING; source.len()];

    let count: usize = values
        .par_chunks_mut(columns)
        .enumerate()
        .filter(|(row, _)| *row >= range.first_row && *row <= range.last_row)
        .map(|(row, masked_row)| {
            let mut passed = 0usize;
            for column in range.first_column..=range.last_column {
                let index = row * columns + column;
                let value = source[index];
                if bounds.contains_lon_lat(grid.longitude(index), grid.latitude(index))
                    && validity.accepts(grid, index, value, corners)
                {
                    masked_row[column] = value;
                    passed += 1;
                }
            }
            passed
        })
        .sum();

    debug!(
        "Scan {}: {} of {} pixels in range passed",
        scan.timestamp(),
        count,
        range.pixel_count()
    );

    MaskedScan {
        timestamp: scan.timestamp(),
        grid: Arc::clone(grid),
        values,
        count,
    }
}

/// Copy the surviving pixels of `range` into a dense record
///
/// Returns `Ok(None)` when nothing survived. Fails when the output buffer
/// cannot be allocated, or when `range` misses pixels counted as survivors.
pub fn compact(
    masked: &MaskedScan,
    range: &IndexRange,
    corners: Option<&CornerSet>,
    allocator: &dyn BufferAllocator,
) -> SubsetResult<Option<SubsetRecord>> {
    if masked.count == 0 {
        return Ok(None);
    }

    let columns = masked.grid.columns();
    let indices = range
        .indices(columns)
        .filter(|&index| !is_missing(masked.values[index]));

    pack_pixels(
        masked.timestamp,
        &masked.grid,
        &masked.values,
        indices,
        masked.count,
        corners,
        allocator,
    )
}

/// Pack the pixels named by `indices` into a record of `count` points
///
/// Fails unless `indices` yields at least `count` row-major pixel indices.
pub(crate) fn pack_pixels<I>(
    timestamp: Timestamp,
    grid: &Grid,
    values: &[f64],
    indices: I,
    count: usize,
    corners: Option<&CornerSet>,
    allocator: &dyn BufferAllocator,
) -> SubsetResult<Option<SubsetRecord>>
where
    I: Iterator<Item = usize>,
{
    if count == 0 {
        return Ok(None);
    }

    let layout = if corners.is_some() {
        Layout::WithCorners
    } else {
        Layout::Centers
    };
    let mut arrays = PackedArrays::allocate(layout, count, allocator)?;

    let mut slot = 0usize;
    let mut point = [0.0; 11];
    for index in indices.take(count) {
        point[0] = grid.longitude(index);
        point[1] = grid.latitude(index);
        point[2] = values[index];
        if let Some(corners) = corners {
            point[3..].copy_from_slice(&corners.packed(index));
        }
        arrays.set_point(slot, &point);
        slot += 1;
    }

    if slot != count {
        return Err(SubsetError::GenericError(format!(
            "{} surviving pixels in range, {} counted",
            slot, count
        )));
    }
    debug!("Packed {} points for {}", slot, timestamp);

    Ok(SubsetRecord::new(timestamp, arrays))
}
