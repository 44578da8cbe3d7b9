//! Positional rows aligned to a [`Schema`].

use std::ops::Deref;

use crate::{error::ValueTypeError, schema::Schema, value::Value};

/// One record: values positionally aligned to a schema.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row(Vec<Value>);

impl Row {
    pub fn new(values: Vec<Value>) -> Self {
        Self(values)
    }

    pub fn values(&self) -> &[Value] {
        &self.0
    }

    pub fn into_values(self) -> Vec<Value> {
        self.0
    }

    /// Check arity, value types, and nullability against `schema`.
    pub fn conforms_to(&self, schema: &Schema) -> Result<(), ValueTypeError> {
        if self.0.len() != schema.len() {
            return Err(ValueTypeError::new(
                format!("{} values", schema.len()),
                format!("{} values", self.0.len()),
            ));
        }
        for (value, field) in self.0.iter().zip(schema.fields().iter()) {
            if value.is_null() && !field.is_nullable() {
                return Err(ValueTypeError::new(
                    format!("non-null value for field '{}'", field.name),
                    "null",
                ));
            }
            if !value.matches_type(field.data_type()) {
                return Err(value.type_mismatch(format!(
                    "{} for field '{}'",
                    field.data_type(),
                    field.name
                )));
            }
        }
        Ok(())
    }
}

impl From<Vec<Value>> for Row {
    fn from(values: Vec<Value>) -> Self {
        Self(values)
    }
}

impl Deref for Row {
    type Target = [Value];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromIterator<Value> for Row {
    fn from_iter<T: IntoIterator<Item = Value>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
