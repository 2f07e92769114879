//! Coordinate and value predicates
//!
//! Pure checks shared by every stage of the subsetting engine. None of these
//! fail; callers decide what an invalid value means for them.

/// Sentinel written over invalid or absent pixel values
pub const MISSING: f64 = -9999.0;

/// Is `lon` a finite longitude in [-180, 180]
#[inline]
pub fn is_valid_longitude(lon: f64) -> bool {
    (-180.0..=180.0).contains(&lon)
}

/// Is `lat` a finite latitude in [-90, 90]
#[inline]
pub fn is_valid_latitude(lat: f64) -> bool {
    (-90.0..=90.0).contains(&lat)
}

/// Is the pair a valid longitude/latitude
#[inline]
pub fn is_valid_lon_lat(lon: f64, lat: f64) -> bool {
    is_valid_longitude(lon) && is_valid_latitude(lat)
}

/// Is `value` the MISSING sentinel
#[inline]
pub fn is_missing(value: f64) -> bool {
    value == MISSING
}

/// Is `yyyydddhhmm` a well-formed UTC timestamp
///
/// Year 1900-9999, day of year within that year's length, hour 0-23,
/// minute 0-59.
pub fn is_valid_timestamp(yyyydddhhmm: i64) -> bool {
    if yyyydddhhmm < 0 {
        return false;
    }

    let year = yyyydddhhmm / 10_000_000;
    let day = yyyydddhhmm / 10_000 % 1000;
    let hour = yyyydddhhmm / 100 % 100;
    let minute = yyyydddhhmm % 100;

    (1900..=9999).contains(&year)
        && day >= 1
        && day <= days_in_year(year)
        && (0..=23).contains(&hour)
        && (0..=59).contains(&minute)
}

/// Number of days in a Gregorian year
pub fn days_in_year(year: i64) -> i64 {
    let leap = (year % 4 == 0 && year % 100 != 0) || year % 400 == 0;
    if leap {
        366
    } else {
        365
    }
}
