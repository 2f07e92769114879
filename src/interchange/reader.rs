//! Interchange stream reader

use std::io::BufRead;

use log::debug;

use crate::errors::{SubsetError, SubsetResult};
use crate::io::byte_order::{ByteOrder, ByteOrderHandler};
use crate::swath::{BufferAllocator, HeapAllocator, PackedArrays, SubsetRecord, Timestamp};

use super::header::Header;
use super::writer::StreamState;

/// Upper bound on capacity reserved from header-declared record counts
const MAX_RESERVED_RECORDS: usize = 1 << 16;

/// Reads one interchange stream section by section
pub struct InterchangeReader<R: BufRead> {
    reader: R,
    handler: Box<dyn ByteOrderHandler>,
    state: StreamState,
    header: Option<Header>,
    timestamps: Vec<Timestamp>,
    counts: Vec<usize>,
    next: usize,
}

impl<R: BufRead> InterchangeReader<R> {
    pub fn new(reader: R) -> Self {
        InterchangeReader {
            reader,
            handler: ByteOrder::WIRE.create_handler(),
            state: StreamState::Header,
            header: None,
            timestamps: Vec::new(),
            counts: Vec::new(),
            next: 0,
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

    fn records(&self) -> usize {
        self.header.as_ref().map_or(0, |header| header.records)
    }

    pub fn read_header(&mut self) -> SubsetResult<&Header> {
        self.expect(StreamState::Header)?;
        self.state = StreamState::Failed;

        let header = Header::parse(&mut self.reader)?;
        header.layout()?;
        debug!("Read header: {} records of {:?}", header.records, header.names);
        self.state = StreamState::Timestamps;
        Ok(&*self.header.insert(header))
    }

    pub fn read_timestamps(&mut self) -> SubsetResult<&[Timestamp]> {
        self.expect(StreamState::Timestamps)?;
        self.state = StreamState::Failed;

        let mut timestamps = Vec::with_capacity(self.records().min(MAX_RESERVED_RECORDS));
        for _ in 0..self.records() {
            let timestamp = Timestamp::new(self.handler.read_i64(&mut self.reader)?)?;
            if let Some(previous) = timestamps.last().copied() {
                if timestamp < previous {
                    return Err(SubsetError::NonMonotonicTimestamp {
                        previous: previous.value(),
                        current: timestamp.value(),
                    });
                }
            }
            timestamps.push(timestamp);
        }

        self.timestamps = timestamps;
        self.state = StreamState::Counts;
        Ok(&self.timestamps)
    }

    pub fn read_counts(&mut self) -> SubsetResult<&[usize]> {
        self.expect(StreamState::Counts)?;
        self.state = StreamState::Failed;

        let mut counts = Vec::with_capacity(self.records().min(MAX_RESERVED_RECORDS));
        for record in 0..self.records() {
            let count = self.handler.read_i64(&mut self.reader)?;
            if count <= 0 {
                return Err(SubsetError::InvalidHeader(format!(
                    "record {} has point count {}",
                    record, count
                )));
            }
            counts.push(count as usize);
        }

        self.counts = counts;
        self.state = if self.records() == 0 {
            StreamState::Done
        } else {
            StreamState::Payload
        };
        Ok(&self.counts)
    }

    /// Read the next record, or `None` once every record was read
    pub fn read_record(&mut self) -> SubsetResult<Option<SubsetRecord>> {
        if self.state == StreamState::Done {
            return Ok(None);
        }
        self.expect(StreamState::Payload)?;
        self.state = StreamState::Failed;

        let layout = match self.header.as_ref() {
            Some(header) => header.layout()?,
            None => return Err(SubsetError::InvalidHeader("header not read".to_string())),
        };
        let points = self.counts[self.next];
        let len = points
            .checked_mul(layout.variable_count())
            .ok_or(SubsetError::AllocationFailed(usize::MAX))?;
        let mut data = HeapAllocator.allocate(len)?;
        self.handler.read_f64_into(&mut self.reader, &mut data)?;

        let arrays = PackedArrays::from_vec(layout, points, data)?;
        let record = SubsetRecord::new(self.timestamps[self.next], arrays)
            .ok_or_else(|| SubsetError::InvalidHeader(format!("record {} is empty", self.next)))?;

        self.next += 1;
        self.state = if self.next == self.records() {
            StreamState::Done
        } else {
            StreamState::Payload
        };
        Ok(Some(record))
    }

    /// Read every section and return the header with all records
    pub fn read_all(mut self) -> SubsetResult<(Header, Vec<SubsetRecord>)> {
        self.read_header()?;
        self.read_timestamps()?;
        self.read_counts()?;

        let mut records = Vec::with_capacity(self.records().min(MAX_RESERVED_RECORDS));
        while let Some(record) = self.read_record()? {
            records.push(record);
        }

        let header = self
            .header
            .take()
            .ok_or_else(|| SubsetError::InvalidHeader("header not read".to_string()))?;
        Ok((header, records))
    }
}

/// Read a complete stream
pub fn read_stream<R: BufRead>(reader: R) -> SubsetResult<(Header, Vec<SubsetRecord>)> {
    InterchangeReader::new(reader).read_all()
}
