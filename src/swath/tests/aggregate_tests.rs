//! Tests for daily running means

use std::sync::Arc;

use super::test_utils::{regular_grid, scan, FailOnCall, Lcg};
use crate::coordinate::{BoundingBox, MISSING};
use crate::errors::SubsetError;
use crate::swath::{
    compute_corners, count_and_mark, Grid, HeapAllocator, IndexRange, Layout, MaskedScan, Scan,
    TemporalAggregator, Validity, ValueRange,
};

fn masked(scan: &Scan) -> MaskedScan {
    let (rows, columns) = scan.shape();
    let range = IndexRange::full(rows, columns).unwrap();
    count_and_mark(&BoundingBox::global(), &Validity::default(), &range, scan, None)
}

fn single_pixel(grid: &Arc<Grid>, timestamp: i64, value: f64) -> MaskedScan {
    let mut values = vec![MISSING; grid.len()];
    values[grid.index(1, 1)] = value;
    masked(&scan(timestamp, grid, values))
}

#[test]
fn test_two_scans_same_day() {
    let grid = regular_grid(3, 3, -90.0, 35.0, 0.1);
    let mut aggregator = TemporalAggregator::new(ValueRange::default());

    assert!(aggregator
        .accumulate(&single_pixel(&grid, 20081731500, 4.0), None, &HeapAllocator)
        .unwrap()
        .is_none());
    assert!(aggregator
        .accumulate(&single_pixel(&grid, 20081731800, 6.0), None, &HeapAllocator)
        .unwrap()
        .is_none());

    let state = aggregator.state().unwrap();
    let center = grid.index(1, 1);
    assert_eq!(state.counts()[center], 2);
    assert_eq!(state.means()[center], 5.0);
    assert_eq!(state.counts().iter().filter(|&&c| c > 0).count(), 1);

    let record = aggregator.flush(&HeapAllocator).unwrap().unwrap();
    assert_eq!(record.timestamp().value(), 20081730000);
    assert_eq!(record.points(), 1);
    assert_eq!(record.values(), &[5.0]);
    assert_eq!(record.longitudes(), &[grid.longitude(center)]);

    // Flushing zeroes the state
    let state = aggregator.state().unwrap();
    assert!(state.counts().iter().all(|&c| c == 0));
    assert!(aggregator.flush(&HeapAllocator).unwrap().is_none());
}

#[test]
fn test_running_mean_matches_two_pass() {
    let grid = regular_grid(2, 3, 0.0, 0.0, 1.0);
    let mut rng = Lcg::new(99);
    let mut aggregator = TemporalAggregator::new(ValueRange::default());
    let mut sums = vec![0.0; grid.len()];
    let mut counts = vec![0u32; grid.len()];

    for minute in 0..50 {
        let values: Vec<f64> = (0..grid.len())
            .map(|_| if rng.next() < 0.25 { -1.0 } else { rng.next() * 1000.0 })
            .collect();
        for (index, &value) in values.iter().enumerate() {
            if value >= 0.0 {
                sums[index] += value;
                counts[index] += 1;
            }
        }
        let timestamp = 20080011000 + minute;
        aggregator
            .accumulate(&masked(&scan(timestamp, &grid, values)), None, &HeapAllocator)
            .unwrap();
    }

    let state = aggregator.state().unwrap();
    for index in 0..grid.len() {
        assert_eq!(state.counts()[index], counts[index]);
        if counts[index] > 0 {
            let expected = sums[index] / counts[index] as f64;
            let relative = ((state.means()[index] - expected) / expected).abs();
            assert!(relative <= 1e-9, "pixel {}: {} vs {}", index, state.means()[index], expected);
        }
    }
}

#[test]
fn test_new_day_flushes_previous() {
    let grid = regular_grid(3, 3, 0.0, 0.0, 1.0);
    let mut aggregator = TemporalAggregator::new(ValueRange::default());

    aggregator
        .accumulate(&single_pixel(&grid, 20081732300, 2.0), None, &HeapAllocator)
        .unwrap();
    let flushed = aggregator
        .accumulate(&single_pixel(&grid, 20081740100, 8.0), None, &HeapAllocator)
        .unwrap()
        .unwrap();

    assert_eq!(flushed.timestamp().value(), 20081730000);
    assert_eq!(flushed.values(), &[2.0]);

    let state = aggregator.state().unwrap();
    assert_eq!(state.day().value(), 20081740000);
    assert_eq!(state.means()[grid.index(1, 1)], 8.0);
    assert_eq!(state.counts()[grid.index(1, 1)], 1);
}

#[test]
fn test_shape_change_discards_state() {
    let small = regular_grid(3, 3, 0.0, 0.0, 1.0);
    let large = regular_grid(4, 4, 0.0, 0.0, 1.0);
    let mut aggregator = TemporalAggregator::new(ValueRange::default());

    aggregator
        .accumulate(&single_pixel(&small, 20081731000, 3.0), None, &HeapAllocator)
        .unwrap();
    let flushed = aggregator
        .accumulate(&single_pixel(&large, 20081731100, 9.0), None, &HeapAllocator)
        .unwrap();
    assert!(flushed.is_none());

    let record = aggregator.flush(&HeapAllocator).unwrap().unwrap();
    assert_eq!(record.values(), &[9.0]);
}

#[test]
fn test_invalid_values_leave_state_unchanged() {
    let grid = regular_grid(3, 3, 0.0, 0.0, 1.0);
    let mut aggregator = TemporalAggregator::new(ValueRange::default());

    aggregator
        .accumulate(&single_pixel(&grid, 20081731000, 7.0), None, &HeapAllocator)
        .unwrap();
    aggregator
        .accumulate(&masked(&scan(20081731100, &grid, vec![MISSING; 9])), None, &HeapAllocator)
        .unwrap();

    let state = aggregator.state().unwrap();
    assert_eq!(state.means()[grid.index(1, 1)], 7.0);
    assert_eq!(state.counts()[grid.index(1, 1)], 1);
}

#[test]
fn test_flush_with_corners() {
    let grid = regular_grid(3, 3, 0.0, 0.0, 1.0);
    let corners = Arc::new(compute_corners(&grid));
    let mut aggregator = TemporalAggregator::new(ValueRange::default());

    aggregator
        .accumulate(&single_pixel(&grid, 20081731000, 1.0), Some(corners), &HeapAllocator)
        .unwrap();
    let record = aggregator.flush(&HeapAllocator).unwrap().unwrap();
    assert_eq!(record.layout(), Layout::WithCorners);
    assert_eq!(record.arrays().as_slice().len(), 11);
}

#[test]
fn test_failed_flush_keeps_the_day() {
    let grid = regular_grid(3, 3, 0.0, 0.0, 1.0);
    let mut aggregator = TemporalAggregator::new(ValueRange::default());

    aggregator
        .accumulate(&single_pixel(&grid, 20081731000, 1.0), None, &HeapAllocator)
        .unwrap();
    aggregator
        .accumulate(&single_pixel(&grid, 20081731400, 3.0), None, &HeapAllocator)
        .unwrap();

    let next_day = single_pixel(&grid, 20081740900, 5.0);
    assert!(matches!(
        aggregator.accumulate(&next_day, None, &FailOnCall::new(0)),
        Err(SubsetError::AllocationFailed(_))
    ));

    let state = aggregator.state().unwrap();
    assert_eq!(state.day().value(), 20081730000);
    assert_eq!(state.counts()[grid.index(1, 1)], 2);

    let record = aggregator.flush(&HeapAllocator).unwrap().unwrap();
    assert_eq!(record.timestamp().value(), 20081730000);
    assert_eq!(record.values(), &[2.0]);
}
