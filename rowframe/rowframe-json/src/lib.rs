//! JSON-lines reader for `rowframe`.
//!
//! [`JsonLinesReader`] parses one JSON object per line with `serde_json`,
//! infers a schema as the union of keys seen across records, and converts
//! each record into a typed [`Row`](rowframe_core::Row).
//!
//! # Type merging
//!
//! When records disagree on a key's type the types widen: `long` + `double`
//! is `double`, `boolean` with a number or any scalar with a string is
//! `string`, and `null` merges with everything. A key absent from some
//! records is nullable. Objects and arrays only merge with their own kind;
//! anything else is [`SourceError::SchemaConflict`](rowframe_core::SourceError).

mod infer;
mod reader;

pub use reader::JsonLinesReader;
