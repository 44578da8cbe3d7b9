use std::{
    fmt::{self, Display, Formatter},
    ops::Deref,
    sync::Arc,
};

use crate::error::SchemaError;

/// Logical data type of a field or expression.
///
/// Variant names mirror [`Value`](crate::Value) for consistency (values ↔ types).
#[derive(Debug, Clone, PartialEq)]
pub enum DataType {
    /// Type of an untyped `null` literal.
    Null,
    Bool,
    I64,
    F64,
    String,
    Struct(Fields),
    List(Box<ElementDef>),
}

impl DataType {
    pub fn is_primitive(&self) -> bool {
        !matches!(self, DataType::Struct(_) | DataType::List(_))
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, DataType::I64 | DataType::F64)
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            DataType::Null => "null",
            DataType::Bool => "boolean",
            DataType::I64 => "long",
            DataType::F64 => "double",
            DataType::String => "string",
            DataType::Struct(_) => "struct",
            DataType::List(_) => "array",
        }
    }

    /// Parse a type name as written in `CAST(x AS type)`.
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name.to_ascii_lowercase().as_str() {
            "boolean" | "bool" => DataType::Bool,
            "long" | "bigint" | "int" | "integer" => DataType::I64,
            "double" | "float" => DataType::F64,
            "string" | "varchar" | "text" => DataType::String,
            _ => return None,
        })
    }
}

impl Display for DataType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Struct(fields) => {
                f.write_str("struct<")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}:{}", field.name, field.element.data_type)?;
                }
                f.write_str(">")
            }
            DataType::List(elem) => write!(f, "array<{}>", elem.data_type),
            other => f.write_str(other.type_name()),
        }
    }
}

/// Typed collection of [`Field`] used for schema bodies and struct members.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Fields(pub Vec<Field>);

impl Fields {
    pub fn new(fields: Vec<Field>) -> Self {
        Self(fields)
    }

    pub fn as_slice(&self) -> &[Field] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &Field> {
        self.0.iter()
    }
}

impl From<Vec<Field>> for Fields {
    fn from(value: Vec<Field>) -> Self {
        Self(value)
    }
}

impl Deref for Fields {
    type Target = [Field];

    fn deref(&self) -> &Self::Target {
        self.as_slice()
    }
}

/// Nested element definition used for array items and field bodies.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementDef {
    pub data_type: DataType,
    pub nullable: bool,
}

impl ElementDef {
    pub fn new(data_type: DataType, nullable: bool) -> Self {
        Self {
            data_type,
            nullable,
        }
    }
}

/// A named, typed column.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub element: ElementDef,
}

impl Field {
    pub fn new(name: impl Into<String>, data_type: DataType, nullable: bool) -> Self {
        Self {
            name: name.into(),
            element: ElementDef::new(data_type, nullable),
        }
    }

    pub fn data_type(&self) -> &DataType {
        &self.element.data_type
    }

    pub fn is_nullable(&self) -> bool {
        self.element.nullable
    }

    pub fn with_name(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            element: self.element.clone(),
        }
    }
}

pub type SchemaRef = Arc<Schema>;

/// Ordered field list with unique names.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Schema {
    fields: Fields,
}

impl Schema {
    /// Build a schema, rejecting duplicate field names.
    pub fn try_new(fields: impl Into<Fields>) -> Result<Self, SchemaError> {
        let fields = fields.into();
        for (i, field) in fields.iter().enumerate() {
            if fields[..i].iter().any(|f| f.name == field.name) {
                return Err(SchemaError::DuplicateField {
                    name: field.name.clone(),
                });
            }
        }
        Ok(Self { fields })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    pub fn field(&self, index: usize) -> &Field {
        &self.fields[index]
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Index of the field called `name`.
    pub fn index_of(&self, name: &str) -> Result<usize, SchemaError> {
        self.position(name)
            .ok_or_else(|| SchemaError::FieldNotFound {
                name: name.to_string(),
                available: self.names().map(str::to_string).collect(),
            })
    }

    pub fn field_with_name(&self, name: &str) -> Result<&Field, SchemaError> {
        self.index_of(name).map(|i| self.field(i))
    }
}

impl Display for Schema {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&super::format_schema(self))
    }
}
