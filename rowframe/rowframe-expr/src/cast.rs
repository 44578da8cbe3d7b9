use rowframe_core::{DataType, Value};

use crate::error::ExprError;

/// Whether a value of type `from` may be cast to `to`.
///
/// Primitives cast freely among each other; nested values only cast to
/// their own type or to `string`.
pub(crate) fn can_cast(from: &DataType, to: &DataType) -> bool {
    if from == to || matches!(from, DataType::Null) {
        return true;
    }
    match to {
        DataType::String => true,
        DataType::Bool | DataType::I64 | DataType::F64 => from.is_primitive(),
        _ => false,
    }
}

/// Whether casting `from` to `to` can turn a non-null value into null.
pub(crate) fn may_produce_null(from: &DataType, to: &DataType) -> bool {
    matches!(
        (from, to),
        (DataType::String, DataType::Bool | DataType::I64 | DataType::F64)
            | (DataType::F64, DataType::I64)
    )
}

/// Cast a single value. Unparseable strings and unrepresentable doubles
/// become null.
pub(crate) fn cast_value(value: &Value, to: &DataType) -> Result<Value, ExprError> {
    let out = match (value, to) {
        (Value::Null, _) => Value::Null,
        (v, to) if v.matches_type(to) => v.clone(),

        (v, DataType::String) => Value::from(v.to_string()),

        (Value::Bool(b), DataType::I64) => Value::I64(i64::from(*b)),
        (Value::Bool(b), DataType::F64) => Value::F64(if *b { 1.0 } else { 0.0 }),
        (Value::I64(v), DataType::Bool) => Value::Bool(*v != 0),
        (Value::I64(v), DataType::F64) => Value::F64(*v as f64),
        (Value::F64(v), DataType::Bool) => Value::Bool(*v != 0.0),
        (Value::F64(v), DataType::I64) => double_to_long(*v).map_or(Value::Null, Value::I64),

        (Value::String(s), DataType::Bool) => parse_bool(s).map_or(Value::Null, Value::Bool),
        (Value::String(s), DataType::I64) => parse_long(s).map_or(Value::Null, Value::I64),
        (Value::String(s), DataType::F64) => s.trim().parse().map_or(Value::Null, Value::F64),

        (v, to) => {
            return Err(ExprError::mismatch(
                "cast",
                format!("cannot cast {} to {to}", v.type_name()),
            ));
        }
    };
    Ok(out)
}

/// Truncate toward zero; `None` for NaN, infinities, and values outside the
/// `long` range.
fn double_to_long(v: f64) -> Option<i64> {
    let t = v.trunc();
    // i64::MAX as f64 rounds up to 2^63, which is itself out of range.
    (t.is_finite() && t >= i64::MIN as f64 && t < i64::MAX as f64).then_some(t as i64)
}

fn parse_long(s: &str) -> Option<i64> {
    let s = s.trim();
    s.parse::<i64>()
        .ok()
        .or_else(|| s.parse::<f64>().ok().and_then(double_to_long))
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "yes" | "y" | "1" => Some(true),
        "false" | "f" | "no" | "n" | "0" => Some(false),
        _ => None,
    }
}
