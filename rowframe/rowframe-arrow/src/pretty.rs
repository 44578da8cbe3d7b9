//! Bordered text tables for `show` and `describe`.

use std::sync::Arc;

use arrow::{
    array::{ArrayRef, StringArray},
    datatypes::{DataType, Field, Schema},
    record_batch::{RecordBatch, RecordBatchOptions},
    util::pretty::pretty_format_batches,
};

use crate::error::ArrowConvertError;

/// Render already-formatted cells as a fixed-width table:
///
/// ```text
/// +-------------------+-----+
/// | DEST_COUNTRY_NAME | cnt |
/// +-------------------+-----+
/// | United States     | 15  |
/// +-------------------+-----+
/// ```
///
/// Each row of `rows` must have one cell per header entry.
pub fn format_table(header: &[String], rows: &[Vec<String>]) -> Result<String, ArrowConvertError> {
    let schema = Arc::new(Schema::new(
        header
            .iter()
            .map(|name| Field::new(name, DataType::Utf8, false))
            .collect::<Vec<_>>(),
    ));
    let columns: Vec<ArrayRef> = (0..header.len())
        .map(|i| {
            let cells: StringArray = rows
                .iter()
                .map(|row| Some(row.get(i).map_or("", String::as_str)))
                .collect();
            Arc::new(cells) as ArrayRef
        })
        .collect();

    let options = RecordBatchOptions::new().with_row_count(Some(rows.len()));
    let batch = RecordBatch::try_new_with_options(schema, columns, &options)?;
    Ok(pretty_format_batches(&[batch])?.to_string())
}
