//! Datasets of byte-string records.
//!
//! On storage a dataset is a flat file of newline-delimited records, written
//! append-only. [`stream`] reads and writes such files in bounded batches so
//! that a sketch can be built from a file that does not fit in memory, and
//! [`generate`] produces datasets that overlap an origin dataset by a known
//! fraction, in memory or on disk.

mod error;
pub mod generate;
pub mod stream;

pub use crate::error::Error;

/// One record: the bytes of a line, without its terminator.
pub type Element = Vec<u8>;
