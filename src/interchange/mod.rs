//! Binary interchange streams
//!
//! A stream is an ASCII header followed by big-endian arrays: one timestamp
//! per record, one point count per record, then each record's variables.

pub mod header;
pub mod reader;
pub mod writer;
#[cfg(test)]
mod tests;

pub use header::{default_timesteps, Header, FORMAT_TAG};
pub use reader::{read_stream, InterchangeReader};
pub use writer::{write_stream, InterchangeWriter, StreamState};
