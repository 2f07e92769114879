//! Raw container access: decompression, header lines and the binary body

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use byteorder::{BigEndian, ByteOrder};
use flate2::read::MultiGzDecoder;
use log::debug;

use crate::errors::{SubsetError, SubsetResult};

/// Leading bytes of a gzip member
pub const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Does `bytes` start with a gzip member
pub fn is_gzip(bytes: &[u8]) -> bool {
    bytes.starts_with(&GZIP_MAGIC)
}

/// Read a whole container, inflating it if it is gzip-compressed
pub fn read_container(path: &Path) -> SubsetResult<Vec<u8>> {
    let mut raw = Vec::new();
    BufReader::new(File::open(path)?).read_to_end(&mut raw)?;

    if !is_gzip(&raw) {
        return Ok(raw);
    }

    let mut decoder = MultiGzDecoder::new(&raw[..]);
    let mut inflated = Vec::new();
    decoder.read_to_end(&mut inflated)?;
    debug!("Inflated {} from {} to {} bytes", path.display(), raw.len(), inflated.len());
    Ok(inflated)
}

/// Split `count` newline-terminated text lines off the front of `bytes`
pub(crate) fn split_header(bytes: &[u8], count: usize) -> SubsetResult<(Vec<String>, &[u8])> {
    let mut lines = Vec::with_capacity(count);
    let mut rest = bytes;

    for number in 1..=count {
        let end = rest
            .iter()
            .position(|&b| b == b'\n')
            .ok_or_else(|| SubsetError::InvalidHeader(format!("header ends before line {}", number)))?;
        let line = std::str::from_utf8(&rest[..end])
            .map_err(|_| SubsetError::InvalidHeader(format!("header line {} is not text", number)))?;
        lines.push(line.trim().to_string());
        rest = &rest[end + 1..];
    }

    Ok((lines, rest))
}

/// Parse a "rows columns" line
pub(crate) fn parse_shape(line: &str) -> SubsetResult<(usize, usize)> {
    let numbers: Vec<usize> = line
        .split_whitespace()
        .map(|word| word.parse::<usize>())
        .collect::<Result<_, _>>()
        .map_err(|_| SubsetError::InvalidHeader(format!("bad shape line '{}'", line)))?;

    match numbers[..] {
        [rows, columns] if rows > 0 && columns > 0 && rows.checked_mul(columns).is_some() => {
            Ok((rows, columns))
        }
        _ => Err(SubsetError::InvalidHeader(format!("bad shape line '{}'", line))),
    }
}

/// Decode `count` big-endian f32 values from the front of `body`
pub(crate) fn decode_reals(body: &[u8], count: usize) -> SubsetResult<Vec<f64>> {
    let needed = count
        .checked_mul(4)
        .ok_or_else(|| SubsetError::InvalidHeader(format!("{} values is too many", count)))?;
    if body.len() < needed {
        return Err(SubsetError::InvalidHeader(format!(
            "expected {} values, body holds {} bytes",
            count,
            body.len()
        )));
    }

    let mut values = vec![0.0f32; count];
    BigEndian::read_f32_into(&body[..needed], &mut values);
    Ok(values.into_iter().map(f64::from).collect())
}
