//! ASCII header of interchange streams

use std::io::{BufRead, Write};

use chrono::{NaiveDateTime, Timelike, Utc};

use crate::coordinate::BoundingBox;
use crate::errors::{SubsetError, SubsetResult};
use crate::swath::{Layout, SubsetRecord, Variable};

/// Format tag and version, first line of every stream
pub const FORMAT_TAG: &str = "Swath 2.0";

const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S-0000";
const DIMENSIONS_LINE: &str = "# Dimensions: variables timesteps scans:";
const NAMES_LINE: &str = "# Variable names:";
const UNITS_LINE: &str = "# Variable units:";
const DOMAIN_LINE: &str = "# Domain: <min_lon> <min_lat> <max_lon> <max_lat>";
const LAYOUT_LINES: [&str; 3] = [
    "# MSB 64-bit integers (yyyydddhhmm) timestamps[scans] and",
    "# MSB 64-bit integers points[scans] and",
    "# IEEE-754 64-bit reals data_1[variables][points_1] ... data_S[variables][points_S]:",
];

/// Units of every coordinate variable
pub const COORDINATE_UNITS: &str = "deg";

/// Everything in a stream before the binary arrays
#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    /// Free-form single-line description
    pub description: String,
    /// Creation time, UTC, whole seconds
    pub created: NaiveDateTime,
    /// Nominal number of timesteps covered
    pub timesteps: usize,
    /// Number of records that follow
    pub records: usize,
    /// Variable names in payload order
    pub names: Vec<String>,
    /// Variable units in payload order
    pub units: Vec<String>,
    /// Subset rectangle
    pub domain: BoundingBox,
}

impl Header {
    /// Build the header describing `records`
    ///
    /// `timesteps` defaults to the number of hours spanned by the first and
    /// last record, inclusive.
    pub fn for_records(
        description: &str,
        value_name: &str,
        value_units: &str,
        layout: Layout,
        domain: BoundingBox,
        records: &[SubsetRecord],
        timesteps: Option<usize>,
    ) -> Self {
        let names = layout
            .variables()
            .iter()
            .map(|variable| token(variable.header_name(value_name)))
            .collect();
        let units = layout
            .variables()
            .iter()
            .map(|variable| match variable {
                Variable::Value => token(value_units),
                _ => COORDINATE_UNITS.to_string(),
            })
            .collect();
        let now = Utc::now().naive_utc();

        Header {
            description: description.replace(['\n', '\r'], " "),
            created: now.with_nanosecond(0).unwrap_or(now),
            timesteps: timesteps.unwrap_or_else(|| default_timesteps(records)),
            records: records.len(),
            names,
            units,
            domain,
        }
    }

    /// Number of variables per point
    pub fn variable_count(&self) -> usize {
        self.names.len()
    }

    /// Packed layout implied by the variable count
    pub fn layout(&self) -> SubsetResult<Layout> {
        Layout::from_variable_count(self.variable_count()).ok_or_else(|| {
            SubsetError::InvalidHeader(format!("unsupported variable count {}", self.variable_count()))
        })
    }

    /// Name of the measured variable
    pub fn value_name(&self) -> Option<&str> {
        self.names.get(Variable::Value.ordinal()).map(String::as_str)
    }

    /// Units of the measured variable
    pub fn value_units(&self) -> Option<&str> {
        self.units.get(Variable::Value.ordinal()).map(String::as_str)
    }

    /// Write the header lines
    pub fn write_to(&self, writer: &mut dyn Write) -> SubsetResult<()> {
        writeln!(writer, "{}", FORMAT_TAG)?;
        writeln!(writer, "{}", self.description)?;
        writeln!(writer, "{}", self.created.format(TIME_FORMAT))?;
        writeln!(writer, "{}", DIMENSIONS_LINE)?;
        writeln!(writer, "{} {} {}", self.variable_count(), self.timesteps, self.records)?;
        writeln!(writer, "{}", NAMES_LINE)?;
        writeln!(writer, "{}", self.names.join(" "))?;
        writeln!(writer, "{}", UNITS_LINE)?;
        writeln!(writer, "{}", self.units.join(" "))?;
        writeln!(writer, "{}", DOMAIN_LINE)?;
        let [min_lon, min_lat, max_lon, max_lat] = self.domain.to_array();
        writeln!(writer, "{} {} {} {}", min_lon, min_lat, max_lon, max_lat)?;
        for line in LAYOUT_LINES {
            writeln!(writer, "{}", line)?;
        }
        Ok(())
    }

    /// Parse the header lines, leaving `reader` at the first binary byte
    pub fn parse(reader: &mut dyn BufRead) -> SubsetResult<Self> {
        let tag = next_line(reader)?;
        if tag != FORMAT_TAG {
            return Err(SubsetError::InvalidHeader(format!("unknown format '{}'", tag)));
        }
        let description = next_line(reader)?;
        let created_line = next_line(reader)?;
        let created = NaiveDateTime::parse_from_str(&created_line, TIME_FORMAT).map_err(|e| {
            SubsetError::InvalidHeader(format!("bad creation time '{}': {}", created_line, e))
        })?;

        expect_line(reader, DIMENSIONS_LINE)?;
        let dimensions: Vec<usize> = parse_numbers(&next_line(reader)?, "dimensions")?;
        let [variables, timesteps, records] = dimensions[..] else {
            return Err(SubsetError::InvalidHeader("expected three dimensions".to_string()));
        };

        expect_line(reader, NAMES_LINE)?;
        let names = tokens(&next_line(reader)?);
        expect_line(reader, UNITS_LINE)?;
        let units = tokens(&next_line(reader)?);
        if names.len() != variables || units.len() != variables {
            return Err(SubsetError::InvalidHeader(format!(
                "{} variables declared, {} names and {} units given",
                variables,
                names.len(),
                units.len()
            )));
        }

        expect_line(reader, DOMAIN_LINE)?;
        let domain: Vec<f64> = parse_numbers(&next_line(reader)?, "domain")?;
        let [min_lon, min_lat, max_lon, max_lat] = domain[..] else {
            return Err(SubsetError::InvalidHeader("expected four domain values".to_string()));
        };
        let domain = BoundingBox::new(min_lon, min_lat, max_lon, max_lat)?;

        for line in LAYOUT_LINES {
            expect_line(reader, line)?;
        }

        Ok(Header {
            description,
            created,
            timesteps,
            records,
            names,
            units,
            domain,
        })
    }
}

/// Hours spanned by the first and last record, inclusive
pub fn default_timesteps(records: &[SubsetRecord]) -> usize {
    match (records.first(), records.last()) {
        (Some(first), Some(last)) => {
            last.timestamp().hours_since(&first.timestamp()).max(0) as usize + 1
        }
        _ => 0,
    }
}

/// Names and units are whitespace-separated on the wire
fn token(text: &str) -> String {
    let joined = text.split_whitespace().collect::<Vec<_>>().join("_");
    if joined.is_empty() {
        "-".to_string()
    } else {
        joined
    }
}

fn tokens(line: &str) -> Vec<String> {
    line.split_whitespace().map(str::to_string).collect()
}

fn next_line(reader: &mut dyn BufRead) -> SubsetResult<String> {
    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 {
        return Err(SubsetError::InvalidHeader("unexpected end of header".to_string()));
    }
    Ok(line.trim_end_matches(['\n', '\r']).to_string())
}

fn expect_line(reader: &mut dyn BufRead, expected: &str) -> SubsetResult<()> {
    let line = next_line(reader)?;
    if line != expected {
        return Err(SubsetError::InvalidHeader(format!(
            "expected '{}', found '{}'",
            expected, line
        )));
    }
    Ok(())
}

fn parse_numbers<T: std::str::FromStr>(line: &str, what: &str) -> SubsetResult<Vec<T>> {
    line.split_whitespace()
        .map(|word| {
            word.parse::<T>()
                .map_err(|_| SubsetError::InvalidHeader(format!("bad {} value '{}'", what, word)))
        })
        .collect()
}
