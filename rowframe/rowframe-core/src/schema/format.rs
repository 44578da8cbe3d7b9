use super::{DataType, Field, Schema};

const BRANCH: &str = " |-- ";
const INDENT: &str = " |   ";

/// Render a schema as the `printSchema` tree:
///
/// ```text
/// root
///  |-- name: string (nullable = true)
///  |-- tags: array (nullable = true)
///  |    |-- element: string (containsNull = true)
/// ```
///
/// Struct members and array elements are nested one level deeper than
/// their parent field.
pub fn format_schema(schema: &Schema) -> String {
    let mut out = String::from("root\n");
    for field in schema.fields().iter() {
        format_field(field, 0, &mut out);
    }
    out
}

fn format_field(field: &Field, depth: usize, out: &mut String) {
    push_line(
        out,
        depth,
        &format!(
            "{}: {} (nullable = {})",
            field.name,
            field.data_type().type_name(),
            field.is_nullable()
        ),
    );
    format_children(field.data_type(), depth + 1, out);
}

fn format_children(data_type: &DataType, depth: usize, out: &mut String) {
    match data_type {
        DataType::Struct(fields) => {
            for child in fields.iter() {
                format_field(child, depth, out);
            }
        }
        DataType::List(elem) => {
            push_line(
                out,
                depth,
                &format!(
                    "element: {} (containsNull = {})",
                    elem.data_type.type_name(),
                    elem.nullable
                ),
            );
            format_children(&elem.data_type, depth + 1, out);
        }
        _ => {}
    }
}

fn push_line(out: &mut String, depth: usize, text: &str) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
    out.push_str(BRANCH);
    out.push_str(text);
    out.push('\n');
}
