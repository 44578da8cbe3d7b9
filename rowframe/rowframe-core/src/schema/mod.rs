//! Schema model: data types, fields, and the `printSchema` renderer.

mod format;
mod types;

pub use format::format_schema;
pub use types::{DataType, ElementDef, Field, Fields, Schema, SchemaRef};
