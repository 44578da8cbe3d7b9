use std::sync::Arc;

use arrow::datatypes::{DataType as ArrowDataType, Field as ArrowField, Schema as ArrowSchema};
use rowframe_core::{DataType, ElementDef, Field, Schema};

/// Converts a `rowframe` schema into an Arrow `Schema`.
///
/// `long` maps to `Int64`, `double` to `Float64`, `string` to `Utf8`;
/// arrays become `List` with an `item` child field.
pub fn schema_to_arrow(schema: &Schema) -> ArrowSchema {
    let fields: Vec<ArrowField> = schema.fields().iter().map(field_to_arrow).collect();
    ArrowSchema::new(fields)
}

fn field_to_arrow(f: &Field) -> ArrowField {
    ArrowField::new(&f.name, element_to_datatype(&f.element), f.element.nullable)
}

fn element_to_datatype(elem: &ElementDef) -> ArrowDataType {
    match &elem.data_type {
        DataType::Null => ArrowDataType::Null,
        DataType::Bool => ArrowDataType::Boolean,
        DataType::I64 => ArrowDataType::Int64,
        DataType::F64 => ArrowDataType::Float64,
        DataType::String => ArrowDataType::Utf8,
        DataType::Struct(fields) => {
            let arrow_fields: Vec<ArrowField> = fields.iter().map(field_to_arrow).collect();
            ArrowDataType::Struct(arrow_fields.into())
        }
        DataType::List(elem) => {
            let child_dt = element_to_datatype(elem);
            ArrowDataType::List(Arc::new(ArrowField::new("item", child_dt, elem.nullable)))
        }
    }
}
