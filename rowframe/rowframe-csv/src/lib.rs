//! Delimited text reader for `rowframe`.
//!
//! [`CsvReader`] implements [`FormatReader`](rowframe_core::FormatReader).
//! Tokenizing is done by the `csv` crate; this crate adds header handling,
//! per-column type inference, and typed conversion with per-file reports of
//! malformed records.

mod infer;
mod reader;

pub use reader::CsvReader;
