//! Scan files and input lists

use std::fs;
use std::path::{Path, PathBuf};

use lazy_static::lazy_static;
use log::debug;
use regex::Regex;

use crate::errors::{SubsetError, SubsetResult};
use crate::swath::{Scan, Timestamp, ValueRange};

use super::container::{decode_reals, parse_shape, read_container, split_header};
use super::coordinates::CoordinateCache;

/// First line of a scan file
pub const SCAN_TAG: &str = "SCAN 1.0";

lazy_static! {
    // YYYYDDD.HHMM, YYYYDDD_HHMM or YYYYDDDHHMM anywhere in a file name
    static ref TIMESTAMP_PATTERN: Option<Regex> = Regex::new(r"(\d{7})[._]?(\d{4})").ok();
}

/// Text header of a scan file
#[derive(Debug, Clone, PartialEq)]
pub struct ScanHeader {
    pub variable: String,
    pub units: String,
    pub rows: usize,
    pub columns: usize,
    /// Coordinate file, resolved against the scan's directory
    pub coordinates: PathBuf,
}

/// A scan file before it is joined with its coordinates
#[derive(Debug, Clone)]
pub struct ScanFile {
    pub header: ScanHeader,
    pub timestamp: Timestamp,
    pub values: Vec<f64>,
}

/// Extract the scan time from a file name
pub fn timestamp_from_path(path: &Path) -> SubsetResult<Timestamp> {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy())
        .unwrap_or_default();

    let captures = Option::as_ref(&TIMESTAMP_PATTERN)
        .and_then(|pattern| pattern.captures(&name))
        .ok_or_else(|| {
            SubsetError::InvalidHeader(format!("no YYYYDDDHHMM timestamp in '{}'", name))
        })?;
    let encoded = format!("{}{}", &captures[1], &captures[2]);
    let value = encoded
        .parse::<i64>()
        .map_err(|_| SubsetError::InvalidHeader(format!("bad timestamp '{}'", encoded)))?;

    Timestamp::new(value)
}

fn parse_header(lines: &[String], path: &Path) -> SubsetResult<ScanHeader> {
    if lines[0] != SCAN_TAG {
        return Err(SubsetError::InvalidHeader(format!("{} is not a scan file", path.display())));
    }

    // The variable name may contain spaces; the units are the last word
    let (variable, units) = match lines[1].rsplit_once(char::is_whitespace) {
        Some((variable, units)) if !variable.trim().is_empty() => (variable.trim(), units),
        _ => (lines[1].as_str(), "-"),
    };
    if variable.is_empty() {
        return Err(SubsetError::InvalidHeader("scan names no variable".to_string()));
    }

    let (rows, columns) = parse_shape(&lines[2])?;

    if lines[3].is_empty() {
        return Err(SubsetError::InvalidHeader("scan names no coordinate file".to_string()));
    }
    let reference = Path::new(&lines[3]);
    let coordinates = match path.parent() {
        Some(directory) if reference.is_relative() => directory.join(reference),
        _ => reference.to_path_buf(),
    };

    Ok(ScanHeader {
        variable: variable.to_string(),
        units: units.to_string(),
        rows,
        columns,
        coordinates,
    })
}

/// Read a scan file without touching its coordinates
pub fn read_scan_file(path: &Path) -> SubsetResult<ScanFile> {
    let timestamp = timestamp_from_path(path)?;
    let bytes = read_container(path)?;
    let (lines, body) = split_header(&bytes, 4)?;
    let header = parse_header(&lines, path)?;
    let values = decode_reals(body, header.rows * header.columns)?;

    debug!(
        "Read scan {} ({} {}x{}) from {}",
        timestamp,
        header.variable,
        header.rows,
        header.columns,
        path.display()
    );
    Ok(ScanFile {
        header,
        timestamp,
        values,
    })
}

/// Read a scan and join it with its (cached) coordinate grid
pub fn load_scan(path: &Path, cache: &mut CoordinateCache, valid: &ValueRange) -> SubsetResult<(ScanHeader, Scan)> {
    let file = read_scan_file(path)?;
    let grid = cache.get(&file.header.coordinates)?;

    let actual = (file.header.rows, file.header.columns);
    if grid.shape() != actual {
        return Err(SubsetError::ShapeMismatch {
            expected: grid.shape(),
            actual,
        });
    }

    let scan = Scan::new(file.timestamp, grid, file.values, valid)?;
    Ok((file.header, scan))
}

/// Read a list of scan paths, one per line
///
/// Blank lines and lines starting with '#' are ignored. Relative paths are
/// resolved against the list's directory.
pub fn read_list(path: &Path) -> SubsetResult<Vec<PathBuf>> {
    let content = fs::read_to_string(path)?;
    let directory = path.parent().unwrap_or_else(|| Path::new(""));

    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| directory.join(line))
        .collect())
}
