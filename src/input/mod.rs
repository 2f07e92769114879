//! Scan and coordinate input files
//!
//! Scans arrive as small self-describing containers: a text header naming
//! the variable, shape and coordinate file, followed by big-endian 32-bit
//! reals. Both kinds of file may be gzip-compressed.

pub mod container;
pub mod coordinates;
pub mod scan_file;

pub use container::{is_gzip, read_container};
pub use coordinates::{read_coordinates, CoordinateCache};
pub use scan_file::{load_scan, read_list, read_scan_file, timestamp_from_path, ScanFile, ScanHeader};
