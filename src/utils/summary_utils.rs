//! Summary statistics over subset records

use crate::swath::SubsetRecord;

/// Minimum, maximum and mean of the measured values of some records
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueSummary {
    pub count: usize,
    pub minimum: f64,
    pub maximum: f64,
    pub mean: f64,
}

/// Summarize every value of `records`, or `None` when there are none
pub fn summarize_values(records: &[SubsetRecord]) -> Option<ValueSummary> {
    let mut count = 0usize;
    let mut minimum = f64::INFINITY;
    let mut maximum = f64::NEG_INFINITY;
    let mut sum = 0.0;

    for &value in records.iter().flat_map(|record| record.values()) {
        count += 1;
        minimum = minimum.min(value);
        maximum = maximum.max(value);
        sum += value;
    }

    (count > 0).then(|| ValueSummary {
        count,
        minimum,
        maximum,
        mean: sum / count as f64,
    })
}
