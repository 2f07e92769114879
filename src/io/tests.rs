//! Tests for the byte order module

extern crate std;

use std::io::Cursor;
use byteorder::{BigEndian, LittleEndian, WriteBytesExt};
use crate::io::byte_order::{BigEndianHandler, ByteOrder, ByteOrderHandler, LittleEndianHandler};

#[test]
fn test_wire_order_is_big_endian() {
    std::assert_eq!(ByteOrder::WIRE, ByteOrder::BigEndian);
    std::assert_eq!(ByteOrder::WIRE.swaps_on_host(), cfg!(target_endian = "little"));
    std::assert_ne!(ByteOrder::native().swaps_on_host(), true);
}

#[test]
fn test_big_endian_handler() {
    let mut buffer = Vec::new();
    buffer.write_i64::<BigEndian>(20081731845).unwrap();
    buffer.write_f64::<BigEndian>(-9999.0).unwrap();
    buffer.write_f64::<BigEndian>(0.125).unwrap();
    let mut cursor = Cursor::new(buffer);

    let handler = BigEndianHandler;
    std::assert_eq!(handler.read_i64(&mut cursor).unwrap(), 20081731845);
    let mut values = [0.0; 2];
    handler.read_f64_into(&mut cursor, &mut values).unwrap();
    std::assert_eq!(values, [-9999.0, 0.125]);
}

#[test]
fn test_little_endian_handler() {
    let mut buffer = Vec::new();
    buffer.write_i64::<LittleEndian>(-42).unwrap();
    buffer.write_f64::<LittleEndian>(1.5).unwrap();
    let mut cursor = Cursor::new(buffer);

    let handler = LittleEndianHandler;
    std::assert_eq!(handler.read_i64(&mut cursor).unwrap(), -42);
    let mut values = [0.0; 1];
    handler.read_f64_into(&mut cursor, &mut values).unwrap();
    std::assert_eq!(values, [1.5]);
}

#[test]
fn test_words_are_byte_reversed_between_orders() {
    let values = [1.0, -2.5, 1e300];
    let mut big = Vec::new();
    let mut little = Vec::new();
    BigEndianHandler.write_f64_slice(&mut big, &values).unwrap();
    LittleEndianHandler.write_f64_slice(&mut little, &values).unwrap();

    std::assert_eq!(big.len(), 24);
    for (b, l) in big.chunks(8).zip(little.chunks(8)) {
        let reversed: Vec<u8> = l.iter().rev().copied().collect();
        std::assert_eq!(b, &reversed[..]);
    }
    // 1.0 is 0x3FF0000000000000
    std::assert_eq!(&big[..8], &[0x3F, 0xF0, 0, 0, 0, 0, 0, 0]);
}

#[test]
fn test_short_read_fails() {
    let mut cursor = Cursor::new(vec![0u8; 12]);
    let mut values = [0.0; 2];
    std::assert!(ByteOrder::WIRE
        .create_handler()
        .read_f64_into(&mut cursor, &mut values)
        .is_err());
}
