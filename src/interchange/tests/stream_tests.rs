//! Tests for the stream writer and reader state machines

use std::io::Cursor;

use byteorder::{BigEndian, ReadBytesExt};

use super::test_utils::{header_for, record};
use crate::coordinate::MISSING;
use crate::errors::SubsetError;
use crate::interchange::{read_stream, write_stream, InterchangeReader, InterchangeWriter, StreamState};
use crate::swath::{Layout, PackedArrays, SubsetRecord};

fn sample_records() -> Vec<SubsetRecord> {
    let mut corners = vec![-90.05, -89.95, 35.0, 35.1, 0.25, 1e-3];
    corners.extend_from_slice(&[-90.1, -90.0, -90.0, -89.9, -90.1, -90.0, -90.0, -89.9]);
    corners.extend_from_slice(&[34.95, 35.05, 34.95, 35.05, 35.05, 35.15, 35.05, 35.15]);
    vec![
        record(20081731200, Layout::WithCorners, corners.clone()),
        record(20081731200, Layout::WithCorners, corners),
    ]
}

fn encode(records: &[SubsetRecord], layout: Layout) -> Vec<u8> {
    write_stream(Vec::new(), &header_for(records, layout), records).unwrap()
}

#[test]
fn test_round_trip_is_bit_exact() {
    let tricky = vec![
        -0.0,
        f64::MIN_POSITIVE / 4.0,
        f64::MAX,
        0.1,
        MISSING,
        -179.99,
        1.0 / 3.0,
        -1e-300,
        90.0,
    ];
    let records = vec![
        record(20081731200, Layout::Centers, tricky),
        record(20081731300, Layout::Centers, vec![-180.0, 90.0, 0.0]),
    ];
    let bytes = encode(&records, Layout::Centers);

    let (header, decoded) = read_stream(Cursor::new(&bytes)).unwrap();
    assert_eq!(header.records, 2);
    assert_eq!(decoded.len(), records.len());
    for (original, copy) in records.iter().zip(&decoded) {
        assert_eq!(original.timestamp(), copy.timestamp());
        assert_eq!(original.points(), copy.points());
        let original_bits: Vec<u64> = original.arrays().as_slice().iter().map(|v| v.to_bits()).collect();
        let copy_bits: Vec<u64> = copy.arrays().as_slice().iter().map(|v| v.to_bits()).collect();
        assert_eq!(original_bits, copy_bits);
    }

    // Re-encoding yields the same bytes
    let again = write_stream(Vec::new(), &header, &decoded).unwrap();
    assert_eq!(again, bytes);
}

#[test]
fn test_binary_sections_are_big_endian() {
    let records = sample_records();
    let header = header_for(&records, Layout::WithCorners);
    let mut header_bytes = Vec::new();
    header.write_to(&mut header_bytes).unwrap();
    let bytes = write_stream(Vec::new(), &header, &records).unwrap();

    assert_eq!(&bytes[..header_bytes.len()], &header_bytes[..]);
    let mut binary = Cursor::new(&bytes[header_bytes.len()..]);
    assert_eq!(binary.read_i64::<BigEndian>().unwrap(), 20081731200);
    assert_eq!(binary.read_i64::<BigEndian>().unwrap(), 20081731200);
    assert_eq!(binary.read_i64::<BigEndian>().unwrap(), 2);
    assert_eq!(binary.read_i64::<BigEndian>().unwrap(), 2);
    // Longitudes of the first record, then its latitudes
    assert_eq!(binary.read_f64::<BigEndian>().unwrap(), -90.05);
    assert_eq!(binary.read_f64::<BigEndian>().unwrap(), -89.95);
    assert_eq!(binary.read_f64::<BigEndian>().unwrap(), 35.0);

    let payload = 2 * 2 * 11 * 8;
    assert_eq!(bytes.len(), header_bytes.len() + 4 * 8 + payload);
}

#[test]
fn test_out_of_order_calls_are_rejected() {
    let records = sample_records();
    let header = header_for(&records, Layout::WithCorners);
    let mut writer = InterchangeWriter::new(Vec::new());

    assert!(matches!(
        writer.write_counts(&[2, 2]),
        Err(SubsetError::InvalidState { expected: "counts", actual: "header" })
    ));
    // Misuse does not poison the writer
    writer.write_header(&header).unwrap();
    assert!(matches!(
        writer.write_header(&header),
        Err(SubsetError::InvalidState { expected: "header", actual: "timestamps" })
    ));
    assert!(matches!(
        writer.write_payload(records[0].arrays()),
        Err(SubsetError::InvalidState { .. })
    ));
    writer.write_timestamps(&[20081731200, 20081731200]).unwrap();
    writer.write_counts(&[2, 2]).unwrap();
    writer.write_payload(records[0].arrays()).unwrap();
    assert_eq!(writer.state(), StreamState::Payload);
    writer.write_payload(records[1].arrays()).unwrap();
    assert_eq!(writer.state(), StreamState::Done);
    assert!(writer.finish().is_ok());
}

#[test]
fn test_finish_before_done_fails() {
    let writer = InterchangeWriter::new(Vec::new());
    assert!(matches!(writer.finish(), Err(SubsetError::InvalidState { .. })));
}

#[test]
fn test_decreasing_timestamps_abort() {
    let records = sample_records();
    let mut writer = InterchangeWriter::new(Vec::new());
    writer.write_header(&header_for(&records, Layout::WithCorners)).unwrap();

    assert!(matches!(
        writer.write_timestamps(&[20081731300, 20081731200]),
        Err(SubsetError::NonMonotonicTimestamp { previous: 20081731300, current: 20081731200 })
    ));
    assert_eq!(writer.state(), StreamState::Failed);
    assert!(matches!(
        writer.write_counts(&[2, 2]),
        Err(SubsetError::InvalidState { actual: "failed", .. })
    ));
}

#[test]
fn test_invalid_timestamp_aborts() {
    let records = sample_records();
    for bad in [20073661200, 20081732461] {
        let mut writer = InterchangeWriter::new(Vec::new());
        writer.write_header(&header_for(&records, Layout::WithCorners)).unwrap();
        let result = writer.write_timestamps(&[20081731200, bad]);
        assert!(matches!(result, Err(SubsetError::InvalidTimestamp(t)) if t == bad));
        assert_eq!(writer.state(), StreamState::Failed);
    }
}

#[test]
fn test_non_finite_payload_aborts() {
    let records = vec![record(20081731200, Layout::Centers, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0])];
    let header = header_for(&records, Layout::Centers);
    let mut writer = InterchangeWriter::new(Vec::new());
    writer.write_header(&header).unwrap();
    writer.write_timestamps(&[20081731200]).unwrap();
    writer.write_counts(&[2]).unwrap();

    let bad = PackedArrays::from_vec(Layout::Centers, 2, vec![1.0, 2.0, 3.0, 4.0, f64::NAN, 6.0]).unwrap();
    assert!(matches!(
        writer.write_payload(&bad),
        Err(SubsetError::NonFiniteValue { record: 0, index: 4 })
    ));
    assert_eq!(writer.state(), StreamState::Failed);
}

#[test]
fn test_payload_must_match_counts() {
    let records = vec![record(20081731200, Layout::Centers, vec![1.0, 2.0, 3.0])];
    let mut writer = InterchangeWriter::new(Vec::new());
    writer.write_header(&header_for(&records, Layout::Centers)).unwrap();
    writer.write_timestamps(&[20081731200]).unwrap();
    writer.write_counts(&[2]).unwrap();
    assert!(writer.write_payload(records[0].arrays()).is_err());
}

#[test]
fn test_truncated_stream_fails() {
    let bytes = encode(&sample_records(), Layout::WithCorners);
    let truncated = &bytes[..bytes.len() - 4];

    assert!(matches!(
        read_stream(Cursor::new(truncated)),
        Err(SubsetError::IoError(_))
    ));

    // The first record is still readable
    let mut reader = InterchangeReader::new(Cursor::new(truncated));
    reader.read_header().unwrap();
    reader.read_timestamps().unwrap();
    assert_eq!(reader.read_counts().unwrap(), &[2, 2]);
    assert!(reader.read_record().unwrap().is_some());
    assert!(reader.read_record().is_err());
    assert_eq!(reader.state(), StreamState::Failed);
}

#[test]
fn test_reader_rejects_out_of_order_calls() {
    let bytes = encode(&sample_records(), Layout::WithCorners);
    let mut reader = InterchangeReader::new(Cursor::new(&bytes));
    assert!(matches!(
        reader.read_counts(),
        Err(SubsetError::InvalidState { expected: "counts", actual: "header" })
    ));
    reader.read_header().unwrap();
    assert!(matches!(reader.read_record(), Err(SubsetError::InvalidState { .. })));
}

#[test]
fn test_empty_stream() {
    let bytes = encode(&[], Layout::Centers);
    let (header, records) = read_stream(Cursor::new(&bytes)).unwrap();
    assert_eq!(header.records, 0);
    assert_eq!(header.timesteps, 0);
    assert!(records.is_empty());
}
