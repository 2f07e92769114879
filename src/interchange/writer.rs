//! Interchange stream writer
//!
//! The stream is written in four sections and the writer only accepts them
//! in order: header, timestamps, point counts, then one payload per record.
//! Any failure poisons the writer so a half-written stream cannot be
//! finished.

use std::io::Write;

use log::{debug, info};

use crate::errors::{SubsetError, SubsetResult};
use crate::io::byte_order::{ByteOrder, ByteOrderHandler};
use crate::swath::{PackedArrays, SubsetRecord, Timestamp};

use super::header::Header;

/// Section the stream expects next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    Header,
    Timestamps,
    Counts,
    Payload,
    Done,
    /// A previous call failed
    Failed,
}

impl StreamState {
    pub fn name(&self) -> &'static str {
        match self {
            StreamState::Header => "header",
            StreamState::Timestamps => "timestamps",
            StreamState::Counts => "counts",
            StreamState::Payload => "payload",
            StreamState::Done => "done",
            StreamState::Failed => "failed",
        }
    }
}

/// Writes one interchange stream to `W`
pub struct InterchangeWriter<W: Write> {
    writer: W,
    handler: Box<dyn ByteOrderHandler>,
    state: StreamState,
    records: usize,
    variables: usize,
    counts: Vec<usize>,
    written: usize,
}

impl<W: Write> InterchangeWriter<W> {
    pub fn new(writer: W) -> Self {
        InterchangeWriter {
            writer,
            handler: ByteOrder::WIRE.create_handler(),
            state: StreamState::Header,
            records: 0,
            variables: 0,
            counts: Vec::new(),
            written: 0,
        }
    }

    pub fn state(&self) -> StreamState {
        self.state
    }

    fn expect(&self, expected: StreamState) -> SubsetResult<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(SubsetError::InvalidState {
                expected: expected.name(),
                actual: self.state.name(),
            })
        }
    }

    /// Run `step`, poisoning the writer if it fails
    fn guarded<T>(&mut self, step: impl FnOnce(&mut Self) -> SubsetResult<T>) -> SubsetResult<T> {
        let result = step(self);
        if result.is_err() {
            self.state = StreamState::Failed;
        }
        result
    }

    pub fn write_header(&mut self, header: &Header) -> SubsetResult<()> {
        self.expect(StreamState::Header)?;
        self.guarded(|this| {
            header.layout()?;
            header.write_to(&mut this.writer)?;
            this.records = header.records;
            this.variables = header.variable_count();
            this.state = StreamState::Timestamps;
            debug!(
                "Wrote header for {} records of {} variables, {} payload",
                this.records,
                this.variables,
                ByteOrder::WIRE.name()
            );
            Ok(())
        })
    }

    /// Write the record timestamps, which must be valid and non-decreasing
    pub fn write_timestamps(&mut self, timestamps: &[i64]) -> SubsetResult<()> {
        self.expect(StreamState::Timestamps)?;
        self.guarded(|this| {
            this.check_len(timestamps.len(), "timestamps")?;
            let mut previous: Option<i64> = None;
            for &timestamp in timestamps {
                Timestamp::new(timestamp)?;
                if let Some(previous) = previous {
                    if timestamp < previous {
                        return Err(SubsetError::NonMonotonicTimestamp { previous, current: timestamp });
                    }
                }
                previous = Some(timestamp);
            }
            for &timestamp in timestamps {
                this.handler.write_i64(&mut this.writer, timestamp)?;
            }
            this.state = StreamState::Counts;
            Ok(())
        })
    }

    /// Write the number of points of each record
    pub fn write_counts(&mut self, counts: &[usize]) -> SubsetResult<()> {
        self.expect(StreamState::Counts)?;
        self.guarded(|this| {
            this.check_len(counts.len(), "counts")?;
            if let Some(record) = counts.iter().position(|&count| count == 0) {
                return Err(SubsetError::GenericError(format!("record {} has no points", record)));
            }
            for &count in counts {
                this.handler.write_i64(&mut this.writer, count as i64)?;
            }
            this.counts = counts.to_vec();
            this.state = if this.records == 0 {
                StreamState::Done
            } else {
                StreamState::Payload
            };
            Ok(())
        })
    }

    /// Write the next record's arrays
    pub fn write_payload(&mut self, arrays: &PackedArrays) -> SubsetResult<()> {
        self.expect(StreamState::Payload)?;
        self.guarded(|this| {
            let record = this.written;
            let expected = this.counts[record];
            if arrays.points() != expected || arrays.layout().variable_count() != this.variables {
                return Err(SubsetError::GenericError(format!(
                    "record {} holds {} points of {} variables, header says {} of {}",
                    record,
                    arrays.points(),
                    arrays.layout().variable_count(),
                    expected,
                    this.variables
                )));
            }
            if let Some(index) = arrays.as_slice().iter().position(|value| !value.is_finite()) {
                return Err(SubsetError::NonFiniteValue { record, index });
            }
            this.handler.write_f64_slice(&mut this.writer, arrays.as_slice())?;
            this.written += 1;
            if this.written == this.records {
                this.state = StreamState::Done;
            }
            Ok(())
        })
    }

    /// Flush and hand back the underlying writer
    pub fn finish(mut self) -> SubsetResult<W> {
        self.expect(StreamState::Done)?;
        self.writer.flush()?;
        Ok(self.writer)
    }

    fn check_len(&self, len: usize, what: &str) -> SubsetResult<()> {
        if len != self.records {
            return Err(SubsetError::GenericError(format!(
                "{} {} given for {} records",
                len, what, self.records
            )));
        }
        Ok(())
    }
}

/// Write a complete stream of `records` described by `header`
pub fn write_stream<W: Write>(writer: W, header: &Header, records: &[SubsetRecord]) -> SubsetResult<W> {
    let mut stream = InterchangeWriter::new(writer);
    stream.write_header(header)?;

    let timestamps: Vec<i64> = records.iter().map(|r| r.timestamp().value()).collect();
    stream.write_timestamps(&timestamps)?;

    let counts: Vec<usize> = records.iter().map(SubsetRecord::points).collect();
    stream.write_counts(&counts)?;

    for record in records {
        stream.write_payload(record.arrays())?;
    }

    let total: usize = counts.iter().sum();
    info!("Wrote {} records, {} points", records.len(), total);
    stream.finish()
}
