use std::path::PathBuf;

use rowframe_core::{
    CancellationToken, DataType, DecodedTable, Field, FormatReader, ParseMode, ReadOptions, Schema,
    SourceError, SourceFormat, SourceInput, Value, format_schema,
};
use rowframe_json::JsonLinesReader;

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn read_fixture(name: &str, options: &ReadOptions) -> Result<DecodedTable, SourceError> {
    let data = std::fs::read(fixture_path(name)).unwrap();
    let inputs = [SourceInput::new(name, &data)];
    JsonLinesReader::new().read(&inputs, options, &CancellationToken::new())
}

#[test]
fn reports_json_format() {
    assert_eq!(JsonLinesReader::new().format(), SourceFormat::JsonLines);
}

#[test]
fn flight_schema_sorted_by_key() {
    let table = read_fixture("flights.json", &ReadOptions::default()).unwrap();
    assert_eq!(
        format_schema(&table.schema),
        "root\n \
         |-- DEST_COUNTRY_NAME: string (nullable = false)\n \
         |-- ORIGIN_COUNTRY_NAME: string (nullable = false)\n \
         |-- count: long (nullable = false)\n"
    );
    // The blank line is skipped.
    assert_eq!(table.rows.len(), 4);
    assert_eq!(
        table.rows[0].values(),
        &[
            Value::string("United States"),
            Value::string("Romania"),
            Value::I64(15)
        ]
    );
}

#[test]
fn conflicting_scalars_promote() {
    let table = read_fixture("promote.json", &ReadOptions::default()).unwrap();
    let schema = &table.schema;
    assert_eq!(
        schema.names().collect::<Vec<_>>(),
        ["extra", "flag", "id", "note", "score"]
    );

    let field = |name: &str| schema.field_with_name(name).unwrap().clone();
    assert_eq!(field("extra"), Field::new("extra", DataType::String, true));
    assert_eq!(field("flag"), Field::new("flag", DataType::String, false));
    assert_eq!(field("id"), Field::new("id", DataType::I64, false));
    assert_eq!(field("note"), Field::new("note", DataType::String, true));
    assert_eq!(field("score"), Field::new("score", DataType::F64, true));

    assert_eq!(
        table.rows[0].values(),
        &[
            Value::Null,
            Value::string("true"),
            Value::I64(1),
            Value::Null,
            Value::F64(3.0)
        ]
    );
    assert_eq!(table.rows[1][1], Value::string("7"));
}

#[test]
fn nested_objects_and_arrays() {
    let table = read_fixture("nested.json", &ReadOptions::default()).unwrap();
    assert_eq!(
        format_schema(&table.schema),
        "root\n \
         |-- address: struct (nullable = true)\n \
         |    |-- city: string (nullable = false)\n \
         |    |-- zip: long (nullable = true)\n \
         |-- name: string (nullable = false)\n \
         |-- tags: array (nullable = false)\n \
         |    |-- element: string (containsNull = true)\n"
    );
    assert_eq!(
        table.rows[0].values(),
        &[
            Value::Struct(vec![Value::string("Oslo"), Value::I64(123)]),
            Value::string("a"),
            Value::List(vec![Value::string("x"), Value::string("y")]),
        ]
    );
    assert_eq!(table.rows[1][0], Value::Struct(vec![Value::string("Lima"), Value::Null]));
    assert_eq!(table.rows[2][0], Value::Null);
}

#[test]
fn object_versus_scalar_is_a_conflict_in_every_mode() {
    for mode in [ParseMode::FailFast, ParseMode::DropMalformed] {
        let options = ReadOptions {
            mode,
            ..ReadOptions::default()
        };
        let err = read_fixture("conflict.json", &options).unwrap_err();
        match err {
            SourceError::SchemaConflict {
                field,
                existing,
                found,
            } => {
                assert_eq!(field, "a");
                assert_eq!(existing, "struct");
                assert_eq!(found, "long");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}

#[test]
fn malformed_lines_fail_fast() {
    let err = read_fixture("malformed.json", &ReadOptions::default()).unwrap_err();
    match err {
        SourceError::RowParse(e) => {
            assert_eq!(e.file, "malformed.json");
            assert_eq!(e.line, 2);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn malformed_lines_dropped_and_counted() {
    let options = ReadOptions {
        mode: ParseMode::DropMalformed,
        ..ReadOptions::default()
    };
    let table = read_fixture("malformed.json", &options).unwrap();
    assert_eq!(table.rows.len(), 2);
    let report = &table.files[0];
    assert_eq!(report.rows, 2);
    assert_eq!(report.error_count(), 2);
    assert_eq!(report.malformed[1].line, 3);
    assert!(report.malformed[1].detail.contains("array"));
}

#[test]
fn explicit_schema_converts_and_rejects() {
    let schema = Schema::try_new(vec![
        Field::new("flag", DataType::Bool, true),
        Field::new("id", DataType::I64, false),
    ])
    .unwrap();
    let options = ReadOptions {
        schema: Some(schema.clone()),
        mode: ParseMode::DropMalformed,
        ..ReadOptions::default()
    };
    let table = read_fixture("promote.json", &options).unwrap();
    assert_eq!(table.schema, schema);
    // `"flag": 7` is not a boolean.
    assert_eq!(table.rows.len(), 2);
    assert_eq!(table.rows[1].values(), &[Value::Bool(false), Value::I64(3)]);
    assert_eq!(table.files[0].error_count(), 1);
}

#[test]
fn sample_limit_makes_fields_nullable() {
    let options = ReadOptions {
        sample_limit: Some(1),
        mode: ParseMode::DropMalformed,
        ..ReadOptions::default()
    };
    let table = read_fixture("promote.json", &options).unwrap();
    // Inferred from the first record only.
    assert_eq!(
        table.schema.names().collect::<Vec<_>>(),
        ["flag", "id", "note", "score"]
    );
    assert!(table.schema.fields().iter().all(Field::is_nullable));
    // Record two has `flag: 7` and `score: 4.5`.
    assert_eq!(table.rows.len(), 2);
    assert_eq!(table.files[0].error_count(), 1);
}

#[test]
fn cancellation_is_observed() {
    let token = CancellationToken::new();
    token.cancel();
    let data = std::fs::read(fixture_path("flights.json")).unwrap();
    let inputs = [SourceInput::new("flights.json", &data)];
    let err = JsonLinesReader::new()
        .read(&inputs, &ReadOptions::default(), &token)
        .unwrap_err();
    assert!(matches!(err, SourceError::Cancelled));
}

#[test]
fn multiple_inputs_merge_schemas() {
    let a = br#"{"x":1}"#;
    let b = b"{\"x\":2.5,\"y\":\"s\"}\n";
    let inputs = [SourceInput::new("a.json", a), SourceInput::new("b.json", b)];
    let table = JsonLinesReader::new()
        .read(&inputs, &ReadOptions::default(), &CancellationToken::new())
        .unwrap();
    assert_eq!(table.schema.field(0).data_type(), &DataType::F64);
    assert!(table.schema.field(1).is_nullable());
    assert_eq!(table.rows[0].values(), &[Value::F64(1.0), Value::Null]);
    assert_eq!(table.files.len(), 2);
    assert_eq!(table.files[1].rows, 1);
}
