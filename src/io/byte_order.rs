//! Byte order handling for interchange streams
//!
//! This module implements the Strategy pattern for encoding and decoding
//! 64-bit words. The interchange format fixes big-endian on the wire; the
//! little-endian handler exists for host-order diagnostics and tests.

use byteorder::{BigEndian, LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Result, Write};

/// Represents the byte order of a stream or host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    /// Little-endian byte order
    LittleEndian,
    /// Big-endian byte order (MSB first)
    BigEndian,
}

impl ByteOrder {
    /// Byte order of interchange streams
    pub const WIRE: ByteOrder = ByteOrder::BigEndian;

    /// Byte order of the running host
    pub fn native() -> Self {
        if cfg!(target_endian = "big") {
            ByteOrder::BigEndian
        } else {
            ByteOrder::LittleEndian
        }
    }

    /// Does converting between the host and this order reverse each word
    pub fn swaps_on_host(&self) -> bool {
        *self != Self::native()
    }

    /// Returns a string representation of this byte order
    pub fn name(&self) -> &'static str {
        match self {
            ByteOrder::LittleEndian => "Little Endian (LSB)",
            ByteOrder::BigEndian => "Big Endian (MSB)",
        }
    }

    /// Creates the appropriate handler for this byte order
    pub fn create_handler(&self) -> Box<dyn ByteOrderHandler> {
        match self {
            ByteOrder::LittleEndian => Box::new(LittleEndianHandler),
            ByteOrder::BigEndian => Box::new(BigEndianHandler),
        }
    }
}

/// Trait for byte order handling strategies
pub trait ByteOrderHandler: Send + Sync {
    /// Read an i64 value
    fn read_i64(&self, reader: &mut dyn Read) -> Result<i64>;

    /// Fill `values` with consecutive f64 words
    fn read_f64_into(&self, reader: &mut dyn Read, values: &mut [f64]) -> Result<()>;

    /// Write an i64 value
    fn write_i64(&self, writer: &mut dyn Write, value: i64) -> Result<()>;

    /// Write consecutive f64 words
    fn write_f64_slice(&self, writer: &mut dyn Write, values: &[f64]) -> Result<()>;
}

/// Encode `values` into `bytes` (8 bytes per value) in byte order `B`
fn encode_f64<B: byteorder::ByteOrder>(values: &[f64]) -> Vec<u8> {
    let mut bytes = vec![0u8; values.len() * 8];
    B::write_f64_into(values, &mut bytes);
    bytes
}

/// Decode consecutive words of byte order `B` from `reader`
fn decode_f64<B: byteorder::ByteOrder>(reader: &mut dyn Read, values: &mut [f64]) -> Result<()> {
    let mut bytes = vec![0u8; values.len() * 8];
    reader.read_exact(&mut bytes)?;
    B::read_f64_into(&bytes, values);
    Ok(())
}

/// Little-endian byte order handler
pub struct LittleEndianHandler;

impl ByteOrderHandler for LittleEndianHandler {
    fn read_i64(&self, reader: &mut dyn Read) -> Result<i64> {
        reader.read_i64::<LittleEndian>()
    }

    fn read_f64_into(&self, reader: &mut dyn Read, values: &mut [f64]) -> Result<()> {
        decode_f64::<LittleEndian>(reader, values)
    }

    fn write_i64(&self, writer: &mut dyn Write, value: i64) -> Result<()> {
        writer.write_i64::<LittleEndian>(value)
    }

    fn write_f64_slice(&self, writer: &mut dyn Write, values: &[f64]) -> Result<()> {
        writer.write_all(&encode_f64::<LittleEndian>(values))
    }
}

/// Big-endian byte order handler
pub struct BigEndianHandler;

impl ByteOrderHandler for BigEndianHandler {
    fn read_i64(&self, reader: &mut dyn Read) -> Result<i64> {
        reader.read_i64::<BigEndian>()
    }

    fn read_f64_into(&self, reader: &mut dyn Read, values: &mut [f64]) -> Result<()> {
        decode_f64::<BigEndian>(reader, values)
    }

    fn write_i64(&self, writer: &mut dyn Write, value: i64) -> Result<()> {
        writer.write_i64::<BigEndian>(value)
    }

    fn write_f64_slice(&self, writer: &mut dyn Write, values: &[f64]) -> Result<()> {
        writer.write_all(&encode_f64::<BigEndian>(values))
    }
}

