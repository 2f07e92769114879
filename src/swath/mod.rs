//! Swath subsetting engine
//!
//! This module provides the grids and scans, the index-range reducer, the
//! pixel filter and compactor, the corner interpolator, the daily
//! aggregator and the per-scan driver tying them together.

pub mod aggregate;
pub mod bounds;
pub mod corners;
pub mod filter;
pub mod grid;
pub mod pipeline;
pub mod record;
pub mod timestamp;
#[cfg(test)]
mod tests;

pub use aggregate::{AggregationState, TemporalAggregator};
pub use bounds::{find_index_range_in_bounds, tighten_index_range_by_mask, IndexRange};
pub use corners::{compute_corners, Corner, CornerInterpolator, CornerSet, DegeneracyPolicy};
pub use filter::{compact, count_and_mark, MaskedScan, Validity};
pub use grid::{Grid, Scan, ValueRange};
pub use pipeline::{ScanOutcome, SubsetOptions, SubsetOutput, SubsetPipeline};
pub use record::{BufferAllocator, HeapAllocator, Layout, PackedArrays, SubsetRecord, Variable};
pub use timestamp::Timestamp;
