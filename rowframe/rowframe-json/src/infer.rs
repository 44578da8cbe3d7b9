//! Schema inference and merging over parsed JSON records.

use std::collections::BTreeMap;

use rowframe_core::{DataType, ElementDef, Field, Fields, Schema, SchemaError, SourceError};
use serde_json::{Map, Value as JsonValue};

/// Type inferred for one JSON position. Object keys are kept sorted, which
/// gives the field order of the resulting schema.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum JsonType {
    Null,
    Bool,
    Long,
    Double,
    String,
    Object(BTreeMap<String, Slot>),
    Array(Box<Slot>),
}

/// A type plus whether null (or absence) was observed for it.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Slot {
    pub(crate) ty: JsonType,
    pub(crate) nullable: bool,
}

impl Slot {
    fn new(ty: JsonType) -> Self {
        let nullable = ty == JsonType::Null;
        Self { ty, nullable }
    }
}

impl JsonType {
    fn name(&self) -> &'static str {
        match self {
            JsonType::Null => "null",
            JsonType::Bool => "boolean",
            JsonType::Long => "long",
            JsonType::Double => "double",
            JsonType::String => "string",
            JsonType::Object(_) => "struct",
            JsonType::Array(_) => "array",
        }
    }

    fn is_nested(&self) -> bool {
        matches!(self, JsonType::Object(_) | JsonType::Array(_))
    }

    /// Infer the type of `value`, found at `path`.
    pub(crate) fn infer(path: &str, value: &JsonValue) -> Result<Self, SourceError> {
        Ok(match value {
            JsonValue::Null => JsonType::Null,
            JsonValue::Bool(_) => JsonType::Bool,
            JsonValue::Number(n) if n.is_i64() => JsonType::Long,
            JsonValue::Number(_) => JsonType::Double,
            JsonValue::String(_) => JsonType::String,
            JsonValue::Array(items) => {
                let element_path = format!("{path}.element");
                let mut element = Slot {
                    ty: JsonType::Null,
                    nullable: false,
                };
                for item in items {
                    let item = Slot::new(Self::infer(&element_path, item)?);
                    element = merge_slots(&element_path, element, item)?;
                }
                JsonType::Array(Box::new(element))
            }
            JsonValue::Object(map) => JsonType::Object(object_slots(path, map)?),
        })
    }
}

fn child_path(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}

pub(crate) fn object_slots(
    path: &str,
    map: &Map<String, JsonValue>,
) -> Result<BTreeMap<String, Slot>, SourceError> {
    map.iter()
        .map(|(k, v)| {
            let ty = JsonType::infer(&child_path(path, k), v)?;
            Ok::<_, SourceError>((k.clone(), Slot::new(ty)))
        })
        .collect()
}

fn merge_slots(path: &str, a: Slot, b: Slot) -> Result<Slot, SourceError> {
    let nullable = a.nullable || b.nullable;
    let ty = merge_types(path, a.ty, b.ty)?;
    Ok(Slot { ty, nullable })
}

fn merge_types(path: &str, a: JsonType, b: JsonType) -> Result<JsonType, SourceError> {
    Ok(match (a, b) {
        (JsonType::Null, t) | (t, JsonType::Null) => t,
        (JsonType::Object(a), JsonType::Object(b)) => JsonType::Object(merge_objects(path, a, b)?),
        (JsonType::Array(a), JsonType::Array(b)) => {
            let element = merge_slots(&format!("{path}.element"), *a, *b)?;
            JsonType::Array(Box::new(element))
        }
        (a, b) if a.is_nested() || b.is_nested() => {
            return Err(SourceError::SchemaConflict {
                field: path.to_string(),
                existing: a.name().to_string(),
                found: b.name().to_string(),
            });
        }
        (a, b) if a == b => a,
        (JsonType::Long, JsonType::Double) | (JsonType::Double, JsonType::Long) => JsonType::Double,
        // boolean with a number, or any scalar with text.
        _ => JsonType::String,
    })
}

/// Union of two objects' keys; a key missing on one side becomes nullable.
pub(crate) fn merge_objects(
    path: &str,
    mut a: BTreeMap<String, Slot>,
    b: BTreeMap<String, Slot>,
) -> Result<BTreeMap<String, Slot>, SourceError> {
    let missing_in_b: Vec<String> = a.keys().filter(|k| !b.contains_key(*k)).cloned().collect();
    for key in missing_in_b {
        if let Some(slot) = a.get_mut(&key) {
            slot.nullable = true;
        }
    }
    for (key, slot) in b {
        let merged = match a.remove(&key) {
            Some(existing) => merge_slots(&child_path(path, &key), existing, slot)?,
            None => Slot {
                nullable: true,
                ..slot
            },
        };
        a.insert(key, merged);
    }
    Ok(a)
}

/// Accumulates record shapes into a schema.
#[derive(Debug, Default)]
pub(crate) struct SchemaInference {
    root: Option<BTreeMap<String, Slot>>,
}

impl SchemaInference {
    pub(crate) fn observe(&mut self, record: &Map<String, JsonValue>) -> Result<(), SourceError> {
        let slots = object_slots("", record)?;
        self.root = Some(match self.root.take() {
            None => slots,
            Some(root) => merge_objects("", root, slots)?,
        });
        Ok(())
    }

    /// `force_nullable` marks every top-level field nullable.
    pub(crate) fn finish(self, force_nullable: bool) -> Result<Schema, SchemaError> {
        let fields = self
            .root
            .unwrap_or_default()
            .into_iter()
            .map(|(name, slot)| {
                let (data_type, nullable) = to_data_type(slot.ty);
                Field::new(name, data_type, nullable || slot.nullable || force_nullable)
            })
            .collect::<Vec<_>>();
        Schema::try_new(fields)
    }
}

/// Returns the data type and whether the position must be nullable.
fn to_data_type(ty: JsonType) -> (DataType, bool) {
    match ty {
        // A field that was only ever null reads as nullable string.
        JsonType::Null => (DataType::String, true),
        JsonType::Bool => (DataType::Bool, false),
        JsonType::Long => (DataType::I64, false),
        JsonType::Double => (DataType::F64, false),
        JsonType::String => (DataType::String, false),
        JsonType::Object(slots) => {
            let fields = slots
                .into_iter()
                .map(|(name, slot)| {
                    let (data_type, nullable) = to_data_type(slot.ty);
                    Field::new(name, data_type, nullable || slot.nullable)
                })
                .collect::<Vec<_>>();
            (DataType::Struct(Fields::new(fields)), false)
        }
        JsonType::Array(element) => {
            let (data_type, nullable) = to_data_type(element.ty);
            (
                DataType::List(Box::new(ElementDef::new(
                    data_type,
                    nullable || element.nullable,
                ))),
                false,
            )
        }
    }
}
