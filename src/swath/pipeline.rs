//! Sequential per-scan driver
//!
//! Scans arrive in ascending timestamp order. Each one is reduced, marked,
//! tightened and compacted, then either appended to the record list or
//! folded into the daily aggregator. Errors scoped to a scan skip it; the
//! run fails only when no scan succeeded.

use std::sync::Arc;

use log::{debug, info, warn};

use crate::coordinate::BoundingBox;
use crate::errors::{ErrorScope, SubsetError, SubsetResult};

use super::aggregate::TemporalAggregator;
use super::bounds::{find_index_range_in_bounds, tighten_index_range_by_mask};
use super::corners::{CornerInterpolator, CornerSet};
use super::filter::{compact, count_and_mark, Validity};
use super::grid::{Grid, Scan};
use super::record::{BufferAllocator, HeapAllocator, Layout, SubsetRecord};
use super::timestamp::Timestamp;

/// What the caller asked for
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubsetOptions {
    /// Subset rectangle
    pub bounds: BoundingBox,
    /// Pixel validity rules, including the corner degeneracy policy
    pub validity: Validity,
    /// Emit eight corner coordinates per point
    pub corners: bool,
    /// Fold scans into daily mean composites
    pub aggregate: bool,
}

impl Default for SubsetOptions {
    fn default() -> Self {
        SubsetOptions {
            bounds: BoundingBox::global(),
            validity: Validity::default(),
            corners: false,
            aggregate: false,
        }
    }
}

impl SubsetOptions {
    pub fn layout(&self) -> Layout {
        if self.corners {
            Layout::WithCorners
        } else {
            Layout::Centers
        }
    }
}

/// Result of feeding one scan to the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOutcome {
    /// A record was appended
    Appended(usize),
    /// The scan was folded into the daily composite
    Accumulated(usize),
    /// No pixel of the scan survived
    Empty,
}

/// Output of a finished run
#[derive(Debug, Clone)]
pub struct SubsetOutput {
    pub records: Vec<SubsetRecord>,
    pub processed: usize,
    pub skipped: usize,
}

/// Drives scans through reduction, filtering and compaction
pub struct SubsetPipeline<A: BufferAllocator = HeapAllocator> {
    options: SubsetOptions,
    allocator: A,
    interpolator: CornerInterpolator,
    corner_cache: Option<(Arc<Grid>, Arc<CornerSet>)>,
    aggregator: Option<TemporalAggregator>,
    records: Vec<SubsetRecord>,
    last_timestamp: Option<Timestamp>,
    processed: usize,
    skipped: usize,
}

impl SubsetPipeline<HeapAllocator> {
    pub fn new(options: SubsetOptions) -> Self {
        Self::with_allocator(options, HeapAllocator)
    }
}

impl<A: BufferAllocator> SubsetPipeline<A> {
    /// Create a pipeline drawing output buffers from `allocator`
    pub fn with_allocator(options: SubsetOptions, allocator: A) -> Self {
        SubsetPipeline {
            options,
            allocator,
            interpolator: CornerInterpolator::new(options.validity.degeneracy),
            corner_cache: None,
            aggregator: options
                .aggregate
                .then(|| TemporalAggregator::new(options.validity.range)),
            records: Vec::new(),
            last_timestamp: None,
            processed: 0,
            skipped: 0,
        }
    }

    pub fn options(&self) -> &SubsetOptions {
        &self.options
    }

    /// Records emitted so far
    pub fn records(&self) -> &[SubsetRecord] {
        &self.records
    }

    /// Process one scan, skipping it on scan-scoped errors
    ///
    /// Returns `Ok(None)` when the scan was skipped, and the error itself
    /// when it reaches beyond the scan.
    pub fn push(&mut self, scan: &Scan) -> SubsetResult<Option<ScanOutcome>> {
        match self.process(scan) {
            Ok(outcome) => {
                self.processed += 1;
                self.last_timestamp = Some(scan.timestamp());
                Ok(Some(outcome))
            }
            Err(e) if e.scope() == ErrorScope::Scan => {
                warn!("Skipping scan {}: {}", scan.timestamp(), e);
                self.skipped += 1;
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Record a scan that failed before it could be built
    pub fn skip(&mut self, reason: &SubsetError) {
        warn!("Skipping input: {}", reason);
        self.skipped += 1;
    }

    /// Process one scan, propagating every error
    pub fn process(&mut self, scan: &Scan) -> SubsetResult<ScanOutcome> {
        if let Some(previous) = self.last_timestamp {
            if scan.timestamp() <= previous {
                return Err(SubsetError::NonMonotonicTimestamp {
                    previous: previous.value(),
                    current: scan.timestamp().value(),
                });
            }
        }

        let Some(range) = find_index_range_in_bounds(&self.options.bounds, scan.grid()) else {
            debug!("Scan {} lies outside the rectangle", scan.timestamp());
            return Ok(ScanOutcome::Empty);
        };

        let corners = if self.options.corners {
            Some(self.corners_for(scan.grid()))
        } else {
            None
        };

        let masked = count_and_mark(
            &self.options.bounds,
            &self.options.validity,
            &range,
            scan,
            corners.as_deref(),
        );

        if let Some(aggregator) = self.aggregator.as_mut() {
            // Even an empty scan closes the previous day or grid shape
            if let Some(record) = aggregator.accumulate(&masked, corners, &self.allocator)? {
                self.records.push(record);
            }
            return Ok(match masked.count() {
                0 => ScanOutcome::Empty,
                count => ScanOutcome::Accumulated(count),
            });
        }

        let Some(tight) = tighten_index_range_by_mask(masked.values(), masked.grid().columns(), &range) else {
            return Ok(ScanOutcome::Empty);
        };

        match compact(&masked, &tight, corners.as_deref(), &self.allocator)? {
            Some(record) => {
                let points = record.points();
                info!("Scan {}: {} points", scan.timestamp(), points);
                self.records.push(record);
                Ok(ScanOutcome::Appended(points))
            }
            None => Ok(ScanOutcome::Empty),
        }
    }

    /// Flush any pending composite and hand back the records
    pub fn finish(mut self) -> SubsetResult<SubsetOutput> {
        if let Some(aggregator) = self.aggregator.as_mut() {
            if let Some(record) = aggregator.flush(&self.allocator)? {
                self.records.push(record);
            }
        }

        if self.processed == 0 {
            return Err(SubsetError::NoScansProcessed);
        }

        info!(
            "Processed {} scans, skipped {}, produced {} records",
            self.processed,
            self.skipped,
            self.records.len()
        );

        Ok(SubsetOutput {
            records: self.records,
            processed: self.processed,
            skipped: self.skipped,
        })
    }

    /// Corners of `grid`, computed once per distinct grid
    fn corners_for(&mut self, grid: &Arc<Grid>) -> Arc<CornerSet> {
        if let Some((cached_grid, corners)) = &self.corner_cache {
            if Arc::ptr_eq(cached_grid, grid) {
                return Arc::clone(corners);
            }
        }

        debug!("Computing corners for {}x{} grid", grid.rows(), grid.columns());
        let corners = Arc::new(self.interpolator.compute(grid));
        self.corner_cache = Some((Arc::clone(grid), Arc::clone(&corners)));
        corners
    }
}
