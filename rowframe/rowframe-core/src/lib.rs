//! Engine-agnostic core types and reader contracts for `rowframe`.
//!
//! This crate provides the data model shared by every layer ([`Value`] /
//! [`Row`] / [`Schema`]) and the [`FormatReader`] trait implemented by the
//! file format crates.

mod cancel;
mod error;
mod format;
mod options;
mod reader;
mod row;
mod schema;
mod value;

pub use cancel::CancellationToken;
pub use error::{RowParseError, SchemaError, SourceError, ValueTypeError};
pub use format::SourceFormat;
pub use options::{ParseMode, ReadOptions};
pub use reader::{DecodedTable, FileReport, FormatReader, SourceInput};
pub use row::Row;
pub use schema::{DataType, ElementDef, Field, Fields, Schema, SchemaRef, format_schema};
pub use value::Value;
