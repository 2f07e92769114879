//! Custom error types for swath subsetting

use std::fmt;
use std::io;

/// How far an error reaches when the driver decides what to do with it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorScope {
    /// Only the scan being processed is lost; the run continues
    Scan,
    /// The whole run must stop
    Run,
}

/// Swath subsetting error types
#[derive(Debug)]
pub enum SubsetError {
    /// I/O error
    IoError(io::Error),
    /// Scan and coordinate grid disagree on shape
    ShapeMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },
    /// Unparsable scan, coordinate or stream header
    InvalidHeader(String),
    /// Timestamp that is not a valid YYYYDDDHHMM
    InvalidTimestamp(i64),
    /// Timestamp not strictly after the previous scan
    NonMonotonicTimestamp { previous: i64, current: i64 },
    /// Output or working buffer could not be allocated
    AllocationFailed(usize),
    /// Longitude/latitude rectangle is malformed
    InvalidDomain(String),
    /// Payload value that cannot be serialized
    NonFiniteValue { record: usize, index: usize },
    /// Interchange reader/writer called out of order
    InvalidState { expected: &'static str, actual: &'static str },
    /// No scan of the run was processed successfully
    NoScansProcessed,
    /// Invalid configuration file or option
    ConfigError(String),
    /// Generic error with message
    GenericError(String),
}

impl SubsetError {
    /// Scope of this error under the scan-skipping policy
    pub fn scope(&self) -> ErrorScope {
        match self {
            SubsetError::ShapeMismatch { .. }
            | SubsetError::InvalidHeader(_)
            | SubsetError::InvalidTimestamp(_)
            | SubsetError::NonMonotonicTimestamp { .. }
            | SubsetError::AllocationFailed(_) => ErrorScope::Scan,
            _ => ErrorScope::Run,
        }
    }
}

impl fmt::Display for SubsetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubsetError::IoError(e) => write!(f, "I/O error: {}", e),
            SubsetError::ShapeMismatch { expected, actual } => write!(
                f,
                "Shape mismatch: expected {}x{}, found {}x{}",
                expected.0, expected.1, actual.0, actual.1
            ),
            SubsetError::InvalidHeader(msg) => write!(f, "Invalid header: {}", msg),
            SubsetError::InvalidTimestamp(t) => write!(f, "Invalid timestamp: {}", t),
            SubsetError::NonMonotonicTimestamp { previous, current } => write!(
                f,
                "Timestamp {} does not follow previous timestamp {}",
                current, previous
            ),
            SubsetError::AllocationFailed(len) => {
                write!(f, "Failed to allocate buffer of {} values", len)
            }
            SubsetError::InvalidDomain(msg) => write!(f, "Invalid domain: {}", msg),
            SubsetError::NonFiniteValue { record, index } => write!(
                f,
                "Non-finite value at index {} of record {}",
                index, record
            ),
            SubsetError::InvalidState { expected, actual } => write!(
                f,
                "Interchange stream in state {}, expected {}",
                actual, expected
            ),
            SubsetError::NoScansProcessed => write!(f, "No scan was processed successfully"),
            SubsetError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            SubsetError::GenericError(msg) => write!(f, "Subset error: {}", msg),
        }
    }
}

impl std::error::Error for SubsetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SubsetError::IoError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for SubsetError {
    fn from(error: io::Error) -> Self {
        SubsetError::IoError(error)
    }
}

impl From<String> for SubsetError {
    fn from(msg: String) -> Self {
        SubsetError::GenericError(msg)
    }
}

/// Result type for subsetting operations
pub type SubsetResult<T> = Result<T, SubsetError>;
