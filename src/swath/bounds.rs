//! Index-range reduction
//!
//! Two passes narrow the part of a scan that later stages have to visit.
//! The first bounds the pixels whose centers fall inside the subset
//! rectangle; the second re-tightens that range once invalid pixels have
//! been masked. Both scan rows forward and backward to find the first and
//! last matching row, then columns within those rows. The result is a
//! superset of the matching pixels, not an exact hull.

use log::debug;

use crate::coordinate::{is_missing, BoundingBox};

use super::grid::Grid;

/// Inclusive row/column window of a grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexRange {
    pub first_row: usize,
    pub last_row: usize,
    pub first_column: usize,
    pub last_column: usize,
}

impl IndexRange {
    /// The whole of a rows x columns grid
    pub fn full(rows: usize, columns: usize) -> Option<Self> {
        if rows == 0 || columns == 0 {
            return None;
        }
        Some(IndexRange {
            first_row: 0,
            last_row: rows - 1,
            first_column: 0,
            last_column: columns - 1,
        })
    }

    pub fn rows(&self) -> usize {
        self.last_row - self.first_row + 1
    }

    pub fn columns(&self) -> usize {
        self.last_column - self.first_column + 1
    }

    /// Number of pixels in the window
    pub fn pixel_count(&self) -> usize {
        self.rows() * self.columns()
    }

    #[inline]
    pub fn contains(&self, row: usize, column: usize) -> bool {
        row >= self.first_row && row <= self.last_row && column >= self.first_column && column <= self.last_column
    }

    /// Is `self` inside `other`
    pub fn within(&self, other: &IndexRange) -> bool {
        self.first_row >= other.first_row
            && self.last_row <= other.last_row
            && self.first_column >= other.first_column
            && self.last_column <= other.last_column
    }

    /// Row-major flat indices of the window for a grid `columns` wide
    pub fn indices(&self, columns: usize) -> impl Iterator<Item = usize> + '_ {
        (self.first_row..=self.last_row).flat_map(move |row| {
            (self.first_column..=self.last_column).map(move |column| row * columns + column)
        })
    }
}

/// Smallest window holding every pixel whose center lies in `bounds`
///
/// Returns `None` when no pixel of the grid is inside the rectangle.
pub fn find_index_range_in_bounds(bounds: &BoundingBox, grid: &Grid) -> Option<IndexRange> {
    let full = IndexRange::full(grid.rows(), grid.columns())?;
    let longitudes = grid.longitudes();
    let latitudes = grid.latitudes();

    let range = reduce(&full, grid.columns(), |index| {
        bounds.contains_lon_lat(longitudes[index], latitudes[index])
    });

    match &range {
        Some(r) => debug!(
            "Rectangle bounds rows {}..={} columns {}..={} of {}x{}",
            r.first_row,
            r.last_row,
            r.first_column,
            r.last_column,
            grid.rows(),
            grid.columns()
        ),
        None => debug!("No pixel of {}x{} grid inside rectangle", grid.rows(), grid.columns()),
    }

    range
}

/// Narrow `range` to the pixels of a masked value array that survived filtering
///
/// `values` is row-major with `columns` per row. Pixels are kept when they
/// are not MISSING, which after masking means they passed the validity
/// test. The result is never wider than `range`.
pub fn tighten_index_range_by_mask(values: &[f64], columns: usize, range: &IndexRange) -> Option<IndexRange> {
    let tightened = reduce(range, columns, |index| !is_missing(values[index]));

    if let Some(r) = &tightened {
        debug!(
            "Mask tightened rows {}..={} -> {}..={}, columns {}..={} -> {}..={}",
            range.first_row,
            range.last_row,
            r.first_row,
            r.last_row,
            range.first_column,
            range.last_column,
            r.first_column,
            r.last_column
        );
    }

    tightened
}

/// Row-then-column forward/backward scans over `range`
fn reduce<F>(range: &IndexRange, columns: usize, matches: F) -> Option<IndexRange>
where
    F: Fn(usize) -> bool,
{
    let row_matches = |row: usize| {
        (range.first_column..=range.last_column).any(|column| matches(row * columns + column))
    };

    let first_row = (range.first_row..=range.last_row).find(|&row| row_matches(row))?;
    let last_row = (first_row..=range.last_row)
        .rev()
        .find(|&row| row_matches(row))
        .unwrap_or(first_row);

    let column_matches =
        |column: usize| (first_row..=last_row).any(|row| matches(row * columns + column));

    let first_column = (range.first_column..=range.last_column).find(|&column| column_matches(column))?;
    let last_column = (first_column..=range.last_column)
        .rev()
        .find(|&column| column_matches(column))
        .unwrap_or(first_column);

    Some(IndexRange {
        first_row,
        last_row,
        first_column,
        last_column,
    })
}
