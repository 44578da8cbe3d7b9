use std::path::PathBuf;

use rowframe_core::{
    CancellationToken, DataType, DecodedTable, Field, FormatReader, ParseMode, ReadOptions, Schema,
    SourceError, SourceFormat, SourceInput, Value, format_schema,
};
use rowframe_csv::CsvReader;

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn read_fixtures(names: &[&str], options: &ReadOptions) -> Result<DecodedTable, SourceError> {
    let data: Vec<(String, Vec<u8>)> = names
        .iter()
        .map(|name| (name.to_string(), std::fs::read(fixture_path(name)).unwrap()))
        .collect();
    let inputs: Vec<SourceInput<'_>> = data
        .iter()
        .map(|(name, bytes)| SourceInput::new(name, bytes))
        .collect();
    CsvReader::new().read(&inputs, options, &CancellationToken::new())
}

fn header_and_infer() -> ReadOptions {
    ReadOptions {
        header: true,
        infer_schema: true,
        ..ReadOptions::default()
    }
}

#[test]
fn reports_csv_format() {
    assert_eq!(CsvReader::new().format(), SourceFormat::Csv);
}

#[test]
fn infers_flight_schema_from_header() {
    let table = read_fixtures(&["flights.csv"], &header_and_infer()).unwrap();
    assert_eq!(
        format_schema(&table.schema),
        "root\n \
         |-- DEST_COUNTRY_NAME: string (nullable = false)\n \
         |-- ORIGIN_COUNTRY_NAME: string (nullable = false)\n \
         |-- count: long (nullable = false)\n"
    );
    assert_eq!(table.rows.len(), 5);
    assert_eq!(
        table.rows[0].values(),
        &[
            Value::string("United States"),
            Value::string("Romania"),
            Value::I64(15)
        ]
    );
    assert_eq!(table.files[0].rows, 5);
}

#[test]
fn without_inference_every_column_is_nullable_string() {
    let options = ReadOptions {
        header: true,
        ..ReadOptions::default()
    };
    let table = read_fixtures(&["flights.csv"], &options).unwrap();
    for field in table.schema.fields().iter() {
        assert_eq!(field.data_type(), &DataType::String);
        assert!(field.is_nullable());
    }
    assert_eq!(table.rows[0][2], Value::string("15"));
}

#[test]
fn without_header_columns_are_numbered() {
    let table = read_fixtures(&["flights.csv"], &ReadOptions::default()).unwrap();
    let names: Vec<_> = table.schema.names().collect();
    assert_eq!(names, ["_c0", "_c1", "_c2"]);
    // The header line is now data.
    assert_eq!(table.rows.len(), 6);
    assert_eq!(table.rows[0][0], Value::string("DEST_COUNTRY_NAME"));
}

#[test]
fn quoted_fields_and_empty_cells() {
    let table = read_fixtures(&["retail.csv"], &header_and_infer()).unwrap();
    let schema = &table.schema;
    assert_eq!(schema.field_with_name("InvoiceNo").unwrap().data_type(), &DataType::I64);
    assert_eq!(schema.field_with_name("UnitPrice").unwrap().data_type(), &DataType::F64);

    let quantity = schema.field_with_name("Quantity").unwrap();
    assert_eq!(quantity.data_type(), &DataType::I64);
    assert!(quantity.is_nullable());

    let discounted = schema.field_with_name("Discounted").unwrap();
    assert_eq!(discounted.data_type(), &DataType::Bool);
    assert!(discounted.is_nullable());

    assert_eq!(
        table.rows[2][1],
        Value::string("CREAM CUPID HEARTS, COAT HANGER")
    );
    assert_eq!(table.rows[2][4], Value::Null);
    assert_eq!(table.rows[3][2], Value::Null);
}

#[test]
fn mixed_values_promote() {
    let table = read_fixtures(&["mixed.csv"], &header_and_infer()).unwrap();
    let types: Vec<_> = table
        .schema
        .fields()
        .iter()
        .map(|f| f.data_type().clone())
        .collect();
    // boolean + number -> string, long + text -> string, long + double -> double
    assert_eq!(types, [DataType::String, DataType::String, DataType::F64]);
    assert_eq!(table.rows[0][2], Value::F64(1.0));
}

#[test]
fn ragged_rows_fail_fast_by_default() {
    let err = read_fixtures(&["ragged.csv"], &header_and_infer()).unwrap_err();
    match err {
        SourceError::RowParse(e) => {
            assert_eq!(e.file, "ragged.csv");
            assert_eq!(e.line, 3);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn ragged_rows_dropped_and_reported() {
    let options = ReadOptions {
        mode: ParseMode::DropMalformed,
        ..header_and_infer()
    };
    let table = read_fixtures(&["ragged.csv"], &options).unwrap();
    assert_eq!(table.rows.len(), 2);
    let report = &table.files[0];
    assert_eq!(report.rows, 2);
    assert_eq!(report.error_count(), 2);
    assert_eq!(report.malformed[0].line, 3);
    assert_eq!(report.malformed[1].line, 5);
}

#[test]
fn duplicate_and_empty_header_names_are_made_unique() {
    let options = ReadOptions {
        header: true,
        ..ReadOptions::default()
    };
    let table = read_fixtures(&["dup_header.csv"], &options).unwrap();
    let names: Vec<_> = table.schema.names().collect();
    assert_eq!(names, ["id", "value1", "value2", "_c3"]);
}

#[test]
fn renamed_header_does_not_collide_with_an_existing_one() {
    let options = ReadOptions {
        header: true,
        ..ReadOptions::default()
    };
    let table = read_fixtures(&["dup_collision.csv"], &options).unwrap();
    let names: Vec<_> = table.schema.names().collect();
    assert_eq!(names, ["a0", "a1_1", "a1"]);
    assert_eq!(
        table.rows[0].values(),
        &[Value::string("1"), Value::string("2"), Value::string("3")]
    );
}

#[test]
fn custom_delimiter() {
    let mut options = header_and_infer();
    options.set("sep", ";").unwrap();
    let table = read_fixtures(&["semicolon.csv"], &options).unwrap();
    assert_eq!(table.schema.names().collect::<Vec<_>>(), ["a", "b"]);
    assert_eq!(table.rows[1].values(), &[Value::I64(3), Value::I64(4)]);
}

#[test]
fn multiple_inputs_share_one_schema() {
    let table = read_fixtures(
        &["parts/part-0.csv", "parts/part-1.csv"],
        &header_and_infer(),
    )
    .unwrap();
    assert_eq!(table.schema.field(1).data_type(), &DataType::F64);
    assert_eq!(table.rows.len(), 3);
    assert_eq!(table.rows[2][0], Value::string("gamma"));
    assert_eq!(table.files.len(), 2);
    assert_eq!(table.files[1].rows, 1);
}

#[test]
fn explicit_schema_skips_inference_and_rejects_bad_values() {
    let schema = Schema::try_new(vec![
        Field::new("flag", DataType::Bool, true),
        Field::new("n", DataType::I64, true),
        Field::new("ratio", DataType::F64, true),
    ])
    .unwrap();
    let options = ReadOptions {
        header: true,
        schema: Some(schema.clone()),
        mode: ParseMode::DropMalformed,
        ..ReadOptions::default()
    };
    let table = read_fixtures(&["mixed.csv"], &options).unwrap();
    assert_eq!(table.schema, schema);
    // "3" is not a boolean and "x" is not a long.
    assert_eq!(table.rows.len(), 2);
    assert_eq!(table.files[0].error_count(), 1);
}

#[test]
fn sample_limit_infers_from_prefix() {
    let options = ReadOptions {
        sample_limit: Some(2),
        mode: ParseMode::DropMalformed,
        ..header_and_infer()
    };
    let table = read_fixtures(&["mixed.csv"], &options).unwrap();
    assert_eq!(table.schema.field(0).data_type(), &DataType::Bool);
    assert_eq!(table.schema.field(1).data_type(), &DataType::I64);
    assert!(table.schema.fields().iter().all(Field::is_nullable));
    // The third record no longer fits the sampled types.
    assert_eq!(table.rows.len(), 2);
    assert_eq!(table.files[0].error_count(), 1);
}

#[test]
fn cancelled_read_stops() {
    let token = CancellationToken::new();
    token.cancel();
    let data = std::fs::read(fixture_path("flights.csv")).unwrap();
    let inputs = [SourceInput::new("flights.csv", &data)];
    let err = CsvReader::new()
        .read(&inputs, &header_and_infer(), &token)
        .unwrap_err();
    assert!(matches!(err, SourceError::Cancelled));
}

#[test]
fn empty_input_yields_empty_table() {
    let inputs = [SourceInput::new("empty.csv", b"")];
    let table = CsvReader::new()
        .read(&inputs, &header_and_infer(), &CancellationToken::new())
        .unwrap();
    assert!(table.schema.is_empty());
    assert!(table.rows.is_empty());
}
