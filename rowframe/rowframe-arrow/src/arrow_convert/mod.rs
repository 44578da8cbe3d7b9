//! Conversion from positional rows to an Arrow `RecordBatch`.

mod append;
mod builder;
mod scalar;

use std::sync::Arc;

use arrow::{
    array::ArrayRef,
    datatypes::DataType,
    record_batch::{RecordBatch, RecordBatchOptions},
};
use rowframe_core::{Row, Schema, Value};

use crate::{error::ArrowConvertError, schema_convert::schema_to_arrow};

/// Convert rows aligned to `schema` into one `RecordBatch`.
///
/// An empty `rows` slice yields an empty batch with the converted schema.
/// A value that does not match its field's type fails with
/// [`ArrowConvertError::ValueType`].
pub fn rows_to_record_batch(
    schema: &Schema,
    rows: &[Row],
) -> Result<RecordBatch, ArrowConvertError> {
    let arrow_schema = Arc::new(schema_to_arrow(schema));
    if rows.is_empty() {
        return Ok(RecordBatch::new_empty(arrow_schema));
    }

    let mut arrays: Vec<ArrayRef> = Vec::with_capacity(schema.len());
    for (i, field) in arrow_schema.fields().iter().enumerate() {
        let values: Vec<&Value> = rows
            .iter()
            .map(|r| r.get(i).unwrap_or(&Value::Null))
            .collect();
        arrays.push(build_array_from_values(field.data_type(), &values)?);
    }

    let options = RecordBatchOptions::new().with_row_count(Some(rows.len()));
    Ok(RecordBatch::try_new_with_options(arrow_schema, arrays, &options)?)
}

fn build_array_from_values(
    dt: &DataType,
    values: &[&Value],
) -> Result<ArrayRef, ArrowConvertError> {
    let capacity = match dt {
        DataType::List(_) => values.len().saturating_mul(4),
        _ => values.len(),
    };
    let mut builder = builder::make_builder(dt, capacity)?;
    for value in values {
        append::append_value_to_builder(&mut builder, dt, value)?;
    }
    Ok(builder.finish())
}
