//! Arrow integration layer for `rowframe`.
//!
//! This crate covers three things:
//! 1. Convert a `rowframe-core` [`Schema`](rowframe_core::Schema) to an Arrow
//!    `Schema` ([`schema_to_arrow`]).
//! 2. Convert positional rows into an Arrow `RecordBatch`
//!    ([`rows_to_record_batch`]).
//! 3. Render pre-formatted cells as a bordered text table
//!    ([`format_table`]), used by `show` and `describe`.
//!
//! # Typical Flow
//! ```rust
//! use rowframe_arrow::rows_to_record_batch;
//! use rowframe_core::{DataType, Field, Row, Schema, Value};
//!
//! let schema = Schema::try_new(vec![Field::new("count", DataType::I64, true)]).unwrap();
//! let rows = vec![Row::new(vec![Value::I64(15)]), Row::new(vec![Value::Null])];
//! let batch = rows_to_record_batch(&schema, &rows).unwrap();
//! assert_eq!(batch.num_rows(), 2);
//! ```
pub mod arrow_convert;
pub mod error;
pub mod pretty;
pub mod schema_convert;

pub use arrow_convert::rows_to_record_batch;
pub use error::ArrowConvertError;
pub use pretty::format_table;
pub use schema_convert::schema_to_arrow;
