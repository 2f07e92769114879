//! Daily running-mean composites
//!
//! Scans of one calendar day are folded into a per-pixel (count, mean)
//! state with the incremental update `mean' = (count * mean + value) /
//! (count + 1)`, so any number of scans fit in the memory of one grid. A
//! scan from a later day flushes the previous day first.

use std::sync::Arc;

use log::{debug, info, warn};

use crate::errors::SubsetResult;

use super::corners::CornerSet;
use super::filter::{pack_pixels, MaskedScan};
use super::grid::{Grid, ValueRange};
use super::record::{BufferAllocator, SubsetRecord};
use super::timestamp::Timestamp;

/// Running state over one grid shape
#[derive(Debug, Clone)]
pub struct AggregationState {
    day: Timestamp,
    grid: Arc<Grid>,
    corners: Option<Arc<CornerSet>>,
    counts: Vec<u32>,
    means: Vec<f64>,
}

impl AggregationState {
    fn new(day: Timestamp, grid: Arc<Grid>, corners: Option<Arc<CornerSet>>) -> Self {
        let len = grid.len();
        AggregationState {
            day,
            grid,
            corners,
            counts: vec![0; len],
            means: vec![0.0; len],
        }
    }

    /// Midnight of the day being accumulated
    pub fn day(&self) -> Timestamp {
        self.day
    }

    pub fn shape(&self) -> (usize, usize) {
        self.grid.shape()
    }

    pub fn counts(&self) -> &[u32] {
        &self.counts
    }

    pub fn means(&self) -> &[f64] {
        &self.means
    }

    fn reset(&mut self, day: Timestamp) {
        self.day = day;
        self.counts.iter_mut().for_each(|count| *count = 0);
        self.means.iter_mut().for_each(|mean| *mean = 0.0);
    }
}

/// Folds masked scans into daily composites
#[derive(Debug, Clone, Default)]
pub struct TemporalAggregator {
    valid: ValueRange,
    state: Option<AggregationState>,
}

impl TemporalAggregator {
    /// Create an aggregator that counts values inside `valid`
    pub fn new(valid: ValueRange) -> Self {
        TemporalAggregator { valid, state: None }
    }

    pub fn state(&self) -> Option<&AggregationState> {
        self.state.as_ref()
    }

    /// Fold `scan` into the running state
    ///
    /// Returns the previous day's composite when `scan` starts a new day.
    /// A scan whose grid shape differs from the state's discards the
    /// un-flushed state.
    pub fn accumulate(
        &mut self,
        scan: &MaskedScan,
        corners: Option<Arc<CornerSet>>,
        allocator: &dyn BufferAllocator,
    ) -> SubsetResult<Option<SubsetRecord>> {
        let day = scan.timestamp().start_of_day();
        let mut flushed = None;

        if let Some(state) = &self.state {
            if state.shape() != scan.shape() {
                warn!(
                    "Grid shape changed from {:?} to {:?}, discarding composite for {}",
                    state.shape(),
                    scan.shape(),
                    state.day()
                );
                self.state = None;
            } else if state.day() != day {
                flushed = self.flush(allocator)?;
            }
        }

        let state = self
            .state
            .get_or_insert_with(|| AggregationState::new(day, Arc::clone(scan.grid()), corners.clone()));
        state.day = day;
        state.grid = Arc::clone(scan.grid());
        state.corners = corners;

        let mut updated = 0usize;
        for ((count, mean), &value) in state
            .counts
            .iter_mut()
            .zip(state.means.iter_mut())
            .zip(scan.values())
        {
            if self.valid.contains(value) {
                let n = f64::from(*count);
                *mean = (n * *mean + value) / (n + 1.0);
                *count += 1;
                updated += 1;
            }
        }
        debug!("Folded {} pixels of {} into composite for {}", updated, scan.timestamp(), day);

        Ok(flushed)
    }

    /// Emit the composite of the current day and zero the state
    ///
    /// Returns `Ok(None)` when no pixel was valid during the day. A failed
    /// flush leaves the state untouched.
    pub fn flush(&mut self, allocator: &dyn BufferAllocator) -> SubsetResult<Option<SubsetRecord>> {
        let Some(state) = self.state.as_mut() else {
            return Ok(None);
        };

        let count = state.counts.iter().filter(|&&count| count > 0).count();
        let counts = &state.counts;
        let indices = (0..counts.len()).filter(|&index| counts[index] > 0);

        // On failure the state is kept so a later flush can emit the day
        let record = pack_pixels(
            state.day,
            &state.grid,
            &state.means,
            indices,
            count,
            state.corners.as_deref(),
            allocator,
        )?;

        let day = state.day;
        state.reset(day);

        if let Some(record) = &record {
            info!("Composite for {}: {} points", record.timestamp(), record.points());
        }
        Ok(record)
    }
}
