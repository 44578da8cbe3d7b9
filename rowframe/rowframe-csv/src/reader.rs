use rowframe_core::{
    CancellationToken, DataType, DecodedTable, Field, FileReport, FormatReader, ReadOptions, Row,
    RowParseError, Schema, SourceError, SourceFormat, SourceInput, Value,
};
use tracing::{debug, warn};

use crate::infer::{ColumnInference, parse_bool};

/// [`FormatReader`] for delimited text.
///
/// Every input must share one column layout. With `header` set, the first
/// record of each input is a header and the first input's header names the
/// columns; otherwise columns are `_c0`, `_c1`, ….
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvReader;

impl CsvReader {
    pub fn new() -> Self {
        Self
    }
}

/// A record that passed structural checks, not yet typed.
struct RawRecord {
    line: u64,
    cells: Vec<String>,
}

struct RawFile {
    report: FileReport,
    records: Vec<RawRecord>,
}

impl FormatReader for CsvReader {
    fn format(&self) -> SourceFormat {
        SourceFormat::Csv
    }

    fn read(
        &self,
        inputs: &[SourceInput<'_>],
        options: &ReadOptions,
        cancel: &CancellationToken,
    ) -> Result<DecodedTable, SourceError> {
        if let Some(schema) = &options.schema {
            check_flat_schema(schema)?;
        }

        let mut header: Option<Vec<String>> = None;
        let mut width = options.schema.as_ref().map(Schema::len);
        let mut files = Vec::with_capacity(inputs.len());
        for input in inputs {
            let file = split_records(input, options, cancel, &mut header, &mut width)?;
            files.push(file);
        }

        let schema = match &options.schema {
            Some(schema) => schema.clone(),
            None => {
                let names = column_names(header, width.unwrap_or(0));
                let schema = if options.infer_schema {
                    infer_schema(names, &files, options, cancel)?
                } else {
                    Schema::try_new(
                        names
                            .into_iter()
                            .map(|name| Field::new(name, DataType::String, true))
                            .collect::<Vec<_>>(),
                    )?
                };
                debug!(fields = schema.len(), "csv schema resolved");
                schema
            }
        };

        let mut rows = Vec::new();
        let mut reports = Vec::with_capacity(files.len());
        for RawFile {
            mut report,
            records,
        } in files
        {
            let before = rows.len();
            for (i, record) in records.into_iter().enumerate() {
                check_cancel(i, options, cancel)?;
                match convert_record(&schema, &record) {
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
        warn!(%err, "dropping malformed csv record");
    }
    Ok(())
}

fn check_flat_schema(schema: &Schema) -> Result<(), SourceError> {
    match schema.fields().iter().find(|f| !f.data_type().is_primitive()) {
        Some(field) => Err(SourceError::InvalidOption {
            key: "schema".to_string(),
            detail: format!(
                "csv cannot read field '{}' of type {}",
                field.name,
                field.data_type()
            ),
        }),
        None => Ok(()),
    }
}

/// Tokenize one input, stripping its header and rejecting records that are
/// not UTF-8 or have the wrong number of fields.
fn split_records(
    input: &SourceInput<'_>,
    options: &ReadOptions,
    cancel: &CancellationToken,
    header: &mut Option<Vec<String>>,
    width: &mut Option<usize>,
) -> Result<RawFile, SourceError> {
    let mut report = FileReport::new(input.name);
    let mut records = Vec::new();
    let mut csv = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(options.delimiter)
        .quote(options.quote)
        .from_reader(input.data);

    let mut expect_header = options.header;
    for (i, result) in csv.byte_records().enumerate() {
        check_cancel(i, options, cancel)?;
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                let line = e.position().map_or(0, |p| p.line());
                let err = RowParseError::new(input.name, line, e.to_string());
                drop_record(&mut report, options, err)?;
                continue;
            }
        };
        let line = record.position().map_or(0, |p| p.line());
        let cells = match csv::StringRecord::from_byte_record(record) {
            Ok(record) => record.iter().map(str::to_string).collect::<Vec<_>>(),
            Err(e) => {
                let err = RowParseError::new(input.name, line, format!("invalid UTF-8: {e}"));
                drop_record(&mut report, options, err)?;
                continue;
            }
        };

        if expect_header {
            expect_header = false;
            if header.is_none() {
                *width = width.or(Some(cells.len()));
                *header = Some(cells);
            }
            continue;
        }

        let expected = *width.get_or_insert(cells.len());
        if cells.len() != expected {
            let err = RowParseError::new(
                input.name,
                line,
                format!("expected {expected} fields, found {}", cells.len()),
            );
            drop_record(&mut report, options, err)?;
            continue;
        }
        records.push(RawRecord { line, cells });
    }

    debug!(file = input.name, records = records.len(), "csv input tokenized");
    Ok(RawFile { report, records })
}

/// Header names made unique, or generated `_cN` names.
///
/// Empty names become `_c{index}` and repeated names get their index
/// appended. A generated name that is already taken by another header or
/// an earlier generated name gets a `_{n}` suffix until it is free.
fn column_names(header: Option<Vec<String>>, width: usize) -> Vec<String> {
    let Some(header) = header else {
        return (0..width).map(|i| format!("_c{i}")).collect();
    };
    let mut names: Vec<String> = Vec::with_capacity(header.len());
    for (i, name) in header.iter().enumerate() {
        let generated = if name.is_empty() {
            format!("_c{i}")
        } else if header.iter().filter(|n| *n == name).count() > 1 {
            format!("{name}{i}")
        } else {
            names.push(name.clone());
            continue;
        };

        let mut candidate = generated.clone();
        let mut n = 0;
        while is_taken(&candidate, &header, &names) {
            n += 1;
            candidate = format!("{generated}_{n}");
        }
        if !name.is_empty() {
            warn!(column = i, name = %name, renamed = %candidate, "duplicate csv header renamed");
        }
        names.push(candidate);
    }
    names
}

fn is_taken(candidate: &str, header: &[String], assigned: &[String]) -> bool {
    header.iter().chain(assigned).any(|n| n == candidate)
}

fn infer_schema(
    names: Vec<String>,
    files: &[RawFile],
    options: &ReadOptions,
    cancel: &CancellationToken,
) -> Result<Schema, SourceError> {
    let mut columns = vec![ColumnInference::default(); names.len()];
    let sample = options.sample_limit.unwrap_or(usize::MAX);
    let records = files.iter().flat_map(|f| f.records.iter()).take(sample);
    for (i, record) in records.enumerate() {
        check_cancel(i, options, cancel)?;
        for (column, cell) in columns.iter_mut().zip(&record.cells) {
            column.observe(cell);
        }
    }

    let fields = names
        .into_iter()
        .zip(columns)
        .map(|(name, column)| {
            // A sample cannot prove a column never holds null.
            let nullable = column.saw_empty || options.sample_limit.is_some();
            Field::new(name, column.candidate.as_datatype(), nullable)
        })
        .collect::<Vec<_>>();
    Ok(Schema::try_new(fields)?)
}

fn convert_record(schema: &Schema, record: &RawRecord) -> Result<Row, String> {
    schema
        .fields()
        .iter()
        .zip(&record.cells)
        .map(|(field, cell)| convert_cell(field, cell))
        .collect()
}

fn convert_cell(field: &Field, cell: &str) -> Result<Value, String> {
    if cell.is_empty() {
        return if field.is_nullable() {
            Ok(Value::Null)
        } else {
            Err(format!("empty value for non-nullable field '{}'", field.name))
        };
    }
    let value = match field.data_type() {
        DataType::String => Some(Value::string(cell)),
        DataType::Bool => parse_bool(cell).map(Value::Bool),
        DataType::I64 => cell.parse().ok().map(Value::I64),
        DataType::F64 => cell.parse().ok().map(Value::F64),
        DataType::Null => None,
        DataType::Struct(_) | DataType::List(_) => None,
    };
    value.ok_or_else(|| {
        format!(
            "cannot read '{cell}' as {} for field '{}'",
            field.data_type(),
            field.name
        )
    })
}
