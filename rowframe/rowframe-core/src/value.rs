//! Scalar and nested values carried by rows.

use std::{fmt, sync::Arc};

use crate::{error::ValueTypeError, schema::DataType};

/// A single cell value.
///
/// Variants mirror [`DataType`] (values ↔ types). `Null` is valid for any
/// nullable field.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    I64(i64),
    F64(f64),
    String(Arc<str>),
    Struct(Vec<Value>),
    List(Vec<Value>),
}

impl Value {
    pub fn string(s: impl AsRef<str>) -> Self {
        Self::String(Arc::from(s.as_ref()))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn try_bool(&self) -> Result<Option<bool>, ValueTypeError> {
        match self {
            Value::Bool(v) => Ok(Some(*v)),
            Value::Null => Ok(None),
            _ => Err(self.type_mismatch("boolean")),
        }
    }

    pub fn try_i64(&self) -> Result<Option<i64>, ValueTypeError> {
        match self {
            Value::I64(v) => Ok(Some(*v)),
            Value::Null => Ok(None),
            _ => Err(self.type_mismatch("long")),
        }
    }

    pub fn try_f64(&self) -> Result<Option<f64>, ValueTypeError> {
        match self {
            Value::F64(v) => Ok(Some(*v)),
            Value::Null => Ok(None),
            _ => Err(self.type_mismatch("double")),
        }
    }

    pub fn try_str(&self) -> Result<Option<&str>, ValueTypeError> {
        match self {
            Value::String(v) => Ok(Some(v.as_ref())),
            Value::Null => Ok(None),
            _ => Err(self.type_mismatch("string")),
        }
    }

    /// Numeric value widened to `f64`. `long` values convert lossily above 2^53.
    pub fn as_f64_lossy(&self) -> Result<Option<f64>, ValueTypeError> {
        match self {
            Value::I64(v) => Ok(Some(*v as f64)),
            Value::F64(v) => Ok(Some(*v)),
            Value::Null => Ok(None),
            _ => Err(self.type_mismatch("numeric")),
        }
    }

    /// Whether this value can be stored in a field of `data_type`.
    ///
    /// `Null` is accepted everywhere; nullability is the caller's concern.
    pub fn matches_type(&self, data_type: &DataType) -> bool {
        match (self, data_type) {
            (Value::Null, _) => true,
            (Value::Bool(_), DataType::Bool)
            | (Value::I64(_), DataType::I64)
            | (Value::F64(_), DataType::F64)
            | (Value::String(_), DataType::String) => true,
            (Value::Struct(children), DataType::Struct(fields)) => {
                children.len() == fields.len()
                    && children.iter().zip(fields.iter()).all(|(v, f)| {
                        (f.element.nullable || !v.is_null()) && v.matches_type(&f.element.data_type)
                    })
            }
            (Value::List(items), DataType::List(elem)) => items.iter().all(|v| {
                (elem.nullable || !v.is_null()) && v.matches_type(&elem.data_type)
            }),
            _ => false,
        }
    }

    pub fn type_mismatch(&self, expected: impl Into<String>) -> ValueTypeError {
        ValueTypeError::new(expected, self.type_name())
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::I64(_) => "long",
            Value::F64(_) => "double",
            Value::String(_) => "string",
            Value::Struct(_) => "struct",
            Value::List(_) => "array",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::I64(v) => write!(f, "{v}"),
            Value::F64(v) => fmt_double(*v, f),
            Value::String(v) => f.write_str(v),
            Value::Struct(children) => {
                f.write_str("{")?;
                write_joined(children, f)?;
                f.write_str("}")
            }
            Value::List(items) => {
                f.write_str("[")?;
                write_joined(items, f)?;
                f.write_str("]")
            }
        }
    }
}

// Whole doubles keep a trailing `.0` so they read differently from longs.
fn fmt_double(v: f64, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if v.is_nan() {
        f.write_str("NaN")
    } else if v.is_infinite() {
        f.write_str(if v > 0.0 { "Infinity" } else { "-Infinity" })
    } else if v.fract() == 0.0 && v.abs() < 1e16 {
        write!(f, "{v:.1}")
    } else {
        write!(f, "{v}")
    }
}

fn write_joined(values: &[Value], f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for (i, v) in values.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{v}")?;
    }
    Ok(())
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::I64(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::I64(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::F64(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::string(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(Arc::from(v))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}
