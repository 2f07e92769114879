//! I/O utilities for stream handling
//!
//! This module provides the byte order strategies used by the interchange
//! reader and writer.

pub mod byte_order;
#[cfg(test)]
mod tests;
