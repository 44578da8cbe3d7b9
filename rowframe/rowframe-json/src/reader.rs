use rowframe_core::{
    CancellationToken, DataType, DecodedTable, Field, FileReport, FormatReader, ReadOptions, Row,
    RowParseError, Schema, SourceError, SourceFormat, SourceInput, Value,
};
use serde_json::{Map, Value as JsonValue};
use tracing::{debug, warn};

use crate::infer::SchemaInference;

/// [`FormatReader`] for newline-delimited JSON objects.
///
/// The schema is always inferred (unless one is supplied explicitly) as the
/// union of keys across all records of all inputs, with fields ordered by
/// name.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonLinesReader;

impl JsonLinesReader {
    pub fn new() -> Self {
        Self
    }
}

struct ParsedRecord {
    line: u64,
    object: Map<String, JsonValue>,
}

struct ParsedFile {
    report: FileReport,
    records: Vec<ParsedRecord>,
}

impl FormatReader for JsonLinesReader {
    fn format(&self) -> SourceFormat {
        SourceFormat::JsonLines
    }

    fn read(
        &self,
        inputs: &[SourceInput<'_>],
        options: &ReadOptions,
        cancel: &CancellationToken,
    ) -> Result<DecodedTable, SourceError> {
        let mut files = Vec::with_capacity(inputs.len());
        for input in inputs {
            files.push(parse_records(input, options, cancel)?);
        }

        let schema = match &options.schema {
            Some(schema) => schema.clone(),
            None => {
                let mut inference = SchemaInference::default();
                let sample = options.sample_limit.unwrap_or(usize::MAX);
                let records = files.iter().flat_map(|f| f.records.iter()).take(sample);
                for (i, record) in records.enumerate() {
                    check_cancel(i, options, cancel)?;
                    inference.observe(&record.object)?;
                }
                let schema = inference.finish(options.sample_limit.is_some())?;
                debug!(fields = schema.len(), "json schema inferred");
                schema
            }
        };

        let mut rows = Vec::new();
        let mut reports = Vec::with_capacity(files.len());
        for ParsedFile {
            mut report,
            records,
        } in files
        {
            let before = rows.len();
            for (i, record) in records.into_iter().enumerate() {
                check_cancel(i, options, cancel)?;
                match convert_record(&schema, &record.object) {
                    Ok(row) => rows.push(row),
                    Err(detail) => {
                        let err = RowParseError::new(&report.name, record.line, detail);
                        drop_record(&mut report, options, err)?;
                    }
                }
            }
            report.rows = rows.len() - before;
            reports.push(report);
        }

        Ok(DecodedTable {
            schema,
            rows,
            files: reports,
        })
    }
}

fn check_cancel(
    index: usize,
    options: &ReadOptions,
    cancel: &CancellationToken,
) -> Result<(), SourceError> {
    if index % options.batch_size.max(1) == 0 && cancel.is_cancelled() {
        return Err(SourceError::Cancelled);
    }
    Ok(())
}

fn drop_record(
    report: &mut FileReport,
    options: &ReadOptions,
    err: RowParseError,
) -> Result<(), SourceError> {
    report.reject(options.mode, err)?;
    if let Some(err) = report.malformed.last() {
        warn!(%err, "dropping malformed json record");
    }
    Ok(())
}

/// Split one input into lines and parse each non-blank line as an object.
fn parse_records(
    input: &SourceInput<'_>,
    options: &ReadOptions,
    cancel: &CancellationToken,
) -> Result<ParsedFile, SourceError> {
    let mut report = FileReport::new(input.name);
    let mut records = Vec::new();

    for (i, raw) in input.data.split(|b| *b == b'\n').enumerate() {
        check_cancel(i, options, cancel)?;
        let line = i as u64 + 1;
        let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
        if raw.iter().all(u8::is_ascii_whitespace) {
            continue;
        }

        let parsed = std::str::from_utf8(raw)
            .map_err(|e| format!("invalid UTF-8: {e}"))
            .and_then(|text| serde_json::from_str::<JsonValue>(text).map_err(|e| e.to_string()))
            .and_then(|value| match value {
                JsonValue::Object(object) => Ok(object),
                other => Err(format!("expected a JSON object, found {}", json_kind(&other))),
            });
        match parsed {
            Ok(object) => records.push(ParsedRecord { line, object }),
            Err(detail) => {
                let err = RowParseError::new(input.name, line, detail);
                drop_record(&mut report, options, err)?;
            }
        }
    }

    debug!(file = input.name, records = records.len(), "json input parsed");
    Ok(ParsedFile { report, records })
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

fn convert_record(schema: &Schema, object: &Map<String, JsonValue>) -> Result<Row, String> {
    schema
        .fields()
        .iter()
        .map(|field| convert_field(field, object.get(&field.name)))
        .collect()
}

fn convert_field(field: &Field, value: Option<&JsonValue>) -> Result<Value, String> {
    convert_value(
        value.unwrap_or(&JsonValue::Null),
        field.data_type(),
        field.is_nullable(),
    )
    .map_err(|detail| format!("field '{}': {detail}", field.name))
}

fn convert_value(value: &JsonValue, data_type: &DataType, nullable: bool) -> Result<Value, String> {
    let mismatch = || format!("cannot read {} as {data_type}", json_kind(value));
    Ok(match (value, data_type) {
        (JsonValue::Null, _) if nullable => Value::Null,
        (JsonValue::Null, _) => return Err("null value for non-nullable field".to_string()),

        (JsonValue::Bool(b), DataType::Bool) => Value::Bool(*b),
        (JsonValue::Number(n), DataType::I64) => Value::I64(n.as_i64().ok_or_else(mismatch)?),
        (JsonValue::Number(n), DataType::F64) => Value::F64(n.as_f64().ok_or_else(mismatch)?),
        (JsonValue::String(s), DataType::String) => Value::string(s),
        // Scalars promoted to string keep their JSON text.
        (other, DataType::String) => Value::from(other.to_string()),

        (JsonValue::Object(object), DataType::Struct(fields)) => Value::Struct(
            fields
                .iter()
                .map(|field| convert_field(field, object.get(&field.name)))
                .collect::<Result<_, _>>()?,
        ),
        (JsonValue::Array(items), DataType::List(element)) => Value::List(
            items
                .iter()
                .map(|item| convert_value(item, &element.data_type, element.nullable))
                .collect::<Result<_, _>>()?,
        ),
        _ => return Err(mismatch()),
    })
}
