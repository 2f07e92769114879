//! YYYYDDDHHMM timestamps

use std::fmt;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Timelike};

use crate::coordinate::is_valid_timestamp;
use crate::errors::{SubsetError, SubsetResult};

/// A UTC timestamp encoded as the integer YYYYDDDHHMM
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Wrap an encoded value, rejecting malformed ones
    pub fn new(yyyydddhhmm: i64) -> SubsetResult<Self> {
        if is_valid_timestamp(yyyydddhhmm) {
            Ok(Timestamp(yyyydddhhmm))
        } else {
            Err(SubsetError::InvalidTimestamp(yyyydddhhmm))
        }
    }

    /// Build from its components
    pub fn from_parts(year: i64, day_of_year: i64, hour: i64, minute: i64) -> SubsetResult<Self> {
        Self::new(((year * 1000 + day_of_year) * 100 + hour) * 100 + minute)
    }

    /// Encoded YYYYDDDHHMM value
    pub fn value(&self) -> i64 {
        self.0
    }

    pub fn year(&self) -> i64 {
        self.0 / 10_000_000
    }

    pub fn day_of_year(&self) -> i64 {
        self.0 / 10_000 % 1000
    }

    pub fn hour(&self) -> i64 {
        self.0 / 100 % 100
    }

    pub fn minute(&self) -> i64 {
        self.0 % 100
    }

    /// Calendar day as YYYYDDD
    pub fn day(&self) -> i64 {
        self.0 / 10_000
    }

    /// Midnight of the same calendar day
    pub fn start_of_day(&self) -> Timestamp {
        Timestamp(self.day() * 10_000)
    }

    /// Start of the same hour
    pub fn start_of_hour(&self) -> Timestamp {
        Timestamp(self.0 / 100 * 100)
    }

    /// Convert to a chrono date-time
    pub fn to_datetime(&self) -> NaiveDateTime {
        // Components were range-checked on construction
        NaiveDate::from_yo_opt(self.year() as i32, self.day_of_year() as u32)
            .and_then(|date| date.and_hms_opt(self.hour() as u32, self.minute() as u32, 0))
            .unwrap_or_default()
    }

    /// Convert from a chrono date-time, truncating seconds
    pub fn from_datetime(datetime: &NaiveDateTime) -> SubsetResult<Self> {
        Self::from_parts(
            datetime.year() as i64,
            datetime.ordinal() as i64,
            datetime.hour() as i64,
            datetime.minute() as i64,
        )
    }

    /// ISO-8601 rendering used in stream headers, e.g. 2008-06-21T00:00:00-0000
    pub fn to_iso8601(&self) -> String {
        self.to_datetime().format("%Y-%m-%dT%H:%M:%S-0000").to_string()
    }

    /// Number of whole hours from `earlier` to `self`
    pub fn hours_since(&self, earlier: &Timestamp) -> i64 {
        let span: Duration = self.start_of_hour().to_datetime() - earlier.start_of_hour().to_datetime();
        span.num_hours()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:011}", self.0)
    }
}
