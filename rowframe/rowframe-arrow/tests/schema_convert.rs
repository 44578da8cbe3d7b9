use std::sync::Arc;

use arrow::datatypes::{DataType as ArrowDataType, Field as ArrowField};
use rowframe_arrow::schema_to_arrow;
use rowframe_core::{DataType, ElementDef, Field, Fields, Schema};

#[test]
fn schema_to_arrow_converts_nested_types() {
    let schema = Schema::try_new(vec![
        Field::new("n", DataType::Null, true),
        Field::new("b", DataType::Bool, false),
        Field::new("count", DataType::I64, false),
        Field::new("ratio", DataType::F64, true),
        Field::new("name", DataType::String, true),
        Field::new(
            "tags",
            DataType::List(Box::new(ElementDef::new(DataType::String, true))),
            false,
        ),
        Field::new(
            "address",
            DataType::Struct(Fields::new(vec![
                Field::new("city", DataType::String, false),
                Field::new("zip", DataType::I64, true),
            ])),
            true,
        ),
    ])
    .unwrap();

    let arrow = schema_to_arrow(&schema);
    assert_eq!(arrow.fields().len(), 7);

    let expected = [
        ("n", ArrowDataType::Null, true),
        ("b", ArrowDataType::Boolean, false),
        ("count", ArrowDataType::Int64, false),
        ("ratio", ArrowDataType::Float64, true),
        ("name", ArrowDataType::Utf8, true),
        (
            "tags",
            ArrowDataType::List(Arc::new(ArrowField::new("item", ArrowDataType::Utf8, true))),
            false,
        ),
        (
            "address",
            ArrowDataType::Struct(
                vec![
                    ArrowField::new("city", ArrowDataType::Utf8, false),
                    ArrowField::new("zip", ArrowDataType::Int64, true),
                ]
                .into(),
            ),
            true,
        ),
    ];
    for (field, (name, data_type, nullable)) in arrow.fields().iter().zip(expected) {
        assert_eq!(field.name(), name);
        assert_eq!(field.data_type(), &data_type);
        assert_eq!(field.is_nullable(), nullable, "{name}");
    }
}

#[test]
fn empty_schema_converts_to_empty_arrow_schema() {
    assert!(schema_to_arrow(&Schema::empty()).fields().is_empty());
}
