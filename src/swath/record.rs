//! Subset records and their packed storage
//!
//! A record's variables live in one contiguous buffer, variable-major, in
//! the same order they are written to the interchange stream. Callers never
//! see offsets; they ask for a variable's slice.

use std::ops::Range;

use crate::errors::{SubsetError, SubsetResult};

use super::timestamp::Timestamp;

/// Variables of a record, in storage and wire order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variable {
    Longitude,
    Latitude,
    Value,
    LongitudeSW,
    LongitudeSE,
    LongitudeNW,
    LongitudeNE,
    LatitudeSW,
    LatitudeSE,
    LatitudeNW,
    LatitudeNE,
}

impl Variable {
    /// Variables of a record without corners
    pub const CENTERS: [Variable; 3] = [Variable::Longitude, Variable::Latitude, Variable::Value];

    /// Corner variables, longitudes first then latitudes, each SW, SE, NW, NE
    pub const CORNERS: [Variable; 8] = [
        Variable::LongitudeSW,
        Variable::LongitudeSE,
        Variable::LongitudeNW,
        Variable::LongitudeNE,
        Variable::LatitudeSW,
        Variable::LatitudeSE,
        Variable::LatitudeNW,
        Variable::LatitudeNE,
    ];

    /// Position in the packed buffer
    pub fn ordinal(&self) -> usize {
        match self {
            Variable::Longitude => 0,
            Variable::Latitude => 1,
            Variable::Value => 2,
            Variable::LongitudeSW => 3,
            Variable::LongitudeSE => 4,
            Variable::LongitudeNW => 5,
            Variable::LongitudeNE => 6,
            Variable::LatitudeSW => 7,
            Variable::LatitudeSE => 8,
            Variable::LatitudeNW => 9,
            Variable::LatitudeNE => 10,
        }
    }

    /// Name used in stream headers; the value variable takes the scan's name
    pub fn header_name<'a>(&self, value_name: &'a str) -> &'a str {
        match self {
            Variable::Longitude => "Longitude",
            Variable::Latitude => "Latitude",
            Variable::Value => value_name,
            Variable::LongitudeSW => "Longitude_SW",
            Variable::LongitudeSE => "Longitude_SE",
            Variable::LongitudeNW => "Longitude_NW",
            Variable::LongitudeNE => "Longitude_NE",
            Variable::LatitudeSW => "Latitude_SW",
            Variable::LatitudeSE => "Latitude_SE",
            Variable::LatitudeNW => "Latitude_NW",
            Variable::LatitudeNE => "Latitude_NE",
        }
    }
}

/// Number of packed variables per point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Longitude, latitude, value
    Centers,
    /// Centers plus eight corner coordinates
    WithCorners,
}

impl Layout {
    pub fn variable_count(&self) -> usize {
        match self {
            Layout::Centers => 3,
            Layout::WithCorners => 11,
        }
    }

    pub fn from_variable_count(count: usize) -> Option<Self> {
        match count {
            3 => Some(Layout::Centers),
            11 => Some(Layout::WithCorners),
            _ => None,
        }
    }

    /// Variables present in this layout, in order
    pub fn variables(&self) -> Vec<Variable> {
        let mut variables = Variable::CENTERS.to_vec();
        if *self == Layout::WithCorners {
            variables.extend_from_slice(&Variable::CORNERS);
        }
        variables
    }
}

/// Source of output buffers
///
/// Compaction asks for its buffer through this trait so allocation failure
/// can be injected in tests.
pub trait BufferAllocator {
    /// Allocate `len` zeroed values
    fn allocate(&self, len: usize) -> SubsetResult<Vec<f64>>;
}

/// Allocator backed by the global heap, reporting failure instead of aborting
#[derive(Debug, Default, Clone, Copy)]
pub struct HeapAllocator;

impl BufferAllocator for HeapAllocator {
    fn allocate(&self, len: usize) -> SubsetResult<Vec<f64>> {
        let mut buffer = Vec::new();
        buffer
            .try_reserve_exact(len)
            .map_err(|_| SubsetError::AllocationFailed(len))?;
        buffer.resize(len, 0.0);
        Ok(buffer)
    }
}

/// One contiguous buffer holding every variable of a record
#[derive(Debug, Clone, PartialEq)]
pub struct PackedArrays {
    layout: Layout,
    points: usize,
    data: Vec<f64>,
}

impl PackedArrays {
    /// Allocate storage for `points` points
    pub fn allocate(layout: Layout, points: usize, allocator: &dyn BufferAllocator) -> SubsetResult<Self> {
        let len = points
            .checked_mul(layout.variable_count())
            .ok_or(SubsetError::AllocationFailed(usize::MAX))?;
        let data = allocator.allocate(len)?;
        Ok(PackedArrays { layout, points, data })
    }

    /// Wrap an already packed buffer
    pub fn from_vec(layout: Layout, points: usize, data: Vec<f64>) -> SubsetResult<Self> {
        if data.len() != points * layout.variable_count() {
            return Err(SubsetError::GenericError(format!(
                "packed buffer holds {} values, expected {}",
                data.len(),
                points * layout.variable_count()
            )));
        }
        Ok(PackedArrays { layout, points, data })
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn points(&self) -> usize {
        self.points
    }

    /// The whole buffer in wire order
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    fn span(&self, variable: Variable) -> Option<Range<usize>> {
        let ordinal = variable.ordinal();
        if ordinal >= self.layout.variable_count() {
            return None;
        }
        let start = ordinal * self.points;
        Some(start..start + self.points)
    }

    /// Values of one variable, or `None` if the layout lacks it
    pub fn variable(&self, variable: Variable) -> Option<&[f64]> {
        self.span(variable).map(|span| &self.data[span])
    }

    pub fn variable_mut(&mut self, variable: Variable) -> Option<&mut [f64]> {
        self.span(variable).map(move |span| &mut self.data[span])
    }

    /// Write every variable of point `slot` at once
    pub(crate) fn set_point(&mut self, slot: usize, values: &[f64]) {
        for (ordinal, value) in values.iter().enumerate().take(self.layout.variable_count()) {
            self.data[ordinal * self.points + slot] = *value;
        }
    }
}

/// The subset of one scan (or one aggregated day)
#[derive(Debug, Clone, PartialEq)]
pub struct SubsetRecord {
    timestamp: Timestamp,
    arrays: PackedArrays,
}

impl SubsetRecord {
    /// Create a record; empty subsets are not records
    pub fn new(timestamp: Timestamp, arrays: PackedArrays) -> Option<Self> {
        if arrays.points() == 0 {
            return None;
        }
        Some(SubsetRecord { timestamp, arrays })
    }

    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    pub fn points(&self) -> usize {
        self.arrays.points()
    }

    pub fn layout(&self) -> Layout {
        self.arrays.layout()
    }

    pub fn arrays(&self) -> &PackedArrays {
        &self.arrays
    }

    pub fn longitudes(&self) -> &[f64] {
        self.arrays.variable(Variable::Longitude).unwrap_or(&[])
    }

    pub fn latitudes(&self) -> &[f64] {
        self.arrays.variable(Variable::Latitude).unwrap_or(&[])
    }

    pub fn values(&self) -> &[f64] {
        self.arrays.variable(Variable::Value).unwrap_or(&[])
    }
}
