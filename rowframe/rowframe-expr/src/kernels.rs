//! Per-value operator kernels. Operand types were checked at bind time, so
//! a mismatch here means a row did not conform to its schema.

use std::cmp::Ordering;

use rowframe_core::Value;

use crate::{
    error::ExprError,
    expr::{BinaryOp, UnaryOp},
};

pub(crate) fn arithmetic(op: BinaryOp, left: &Value, right: &Value) -> Result<Value, ExprError> {
    match (left, right) {
        (Value::Null, _) | (_, Value::Null) => Ok(Value::Null),
        (Value::I64(l), Value::I64(r)) if op != BinaryOp::Div => long_arithmetic(op, *l, *r),
        _ => {
            let (Some(l), Some(r)) = (left.as_f64_lossy()?, right.as_f64_lossy()?) else {
                return Ok(Value::Null);
            };
            Ok(double_arithmetic(op, l, r))
        }
    }
}

fn long_arithmetic(op: BinaryOp, l: i64, r: i64) -> Result<Value, ExprError> {
    let result = match op {
        BinaryOp::Add => l.checked_add(r),
        BinaryOp::Sub => l.checked_sub(r),
        BinaryOp::Mul => l.checked_mul(r),
        BinaryOp::Mod if r == 0 => return Ok(Value::Null),
        BinaryOp::Mod => Some(l.wrapping_rem(r)),
        _ => return Err(ExprError::mismatch(op.symbol(), "not an arithmetic operator")),
    };
    result.map(Value::I64).ok_or_else(|| ExprError::Overflow {
        op: format!("{l} {} {r}", op.symbol()),
    })
}

fn double_arithmetic(op: BinaryOp, l: f64, r: f64) -> Value {
    match op {
        BinaryOp::Add => Value::F64(l + r),
        BinaryOp::Sub => Value::F64(l - r),
        BinaryOp::Mul => Value::F64(l * r),
        BinaryOp::Div | BinaryOp::Mod if r == 0.0 => Value::Null,
        BinaryOp::Div => Value::F64(l / r),
        BinaryOp::Mod => Value::F64(l % r),
        _ => Value::Null,
    }
}

pub(crate) fn compare(op: BinaryOp, left: &Value, right: &Value) -> Result<Value, ExprError> {
    if left.is_null() || right.is_null() {
        return Ok(Value::Null);
    }
    let result = match op {
        BinaryOp::Eq => values_equal(left, right),
        BinaryOp::NotEq => !values_equal(left, right),
        _ => {
            let ordering = order_values(left, right).ok_or_else(|| {
                ExprError::mismatch(
                    op.symbol(),
                    format!("cannot order {} and {}", left.type_name(), right.type_name()),
                )
            })?;
            match op {
                BinaryOp::Lt => ordering == Ordering::Less,
                BinaryOp::LtEq => ordering != Ordering::Greater,
                BinaryOp::Gt => ordering == Ordering::Greater,
                BinaryOp::GtEq => ordering != Ordering::Less,
                _ => return Err(ExprError::mismatch(op.symbol(), "not a comparison")),
            }
        }
    };
    Ok(Value::Bool(result))
}

fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::I64(l), Value::F64(r)) => (*l as f64) == *r,
        (Value::F64(l), Value::I64(r)) => *l == (*r as f64),
        _ => left == right,
    }
}

/// Ordering between two non-null primitive values of comparable types.
fn order_values(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::I64(l), Value::I64(r)) => Some(l.cmp(r)),
        (Value::Bool(l), Value::Bool(r)) => Some(l.cmp(r)),
        (Value::String(l), Value::String(r)) => Some(l.cmp(r)),
        (Value::I64(_) | Value::F64(_), Value::I64(_) | Value::F64(_)) => {
            let l = left.as_f64_lossy().ok()??;
            let r = right.as_f64_lossy().ok()??;
            Some(l.partial_cmp(&r).unwrap_or_else(|| l.total_cmp(&r)))
        }
        _ => None,
    }
}

/// Three-valued `AND`: false wins over null.
pub(crate) fn and_kleene(left: Option<bool>, right: Option<bool>) -> Option<bool> {
    match (left, right) {
        (Some(false), _) | (_, Some(false)) => Some(false),
        (Some(true), Some(true)) => Some(true),
        _ => None,
    }
}

/// Three-valued `OR`: true wins over null.
pub(crate) fn or_kleene(left: Option<bool>, right: Option<bool>) -> Option<bool> {
    match (left, right) {
        (Some(true), _) | (_, Some(true)) => Some(true),
        (Some(false), Some(false)) => Some(false),
        _ => None,
    }
}

pub(crate) fn unary(op: UnaryOp, value: &Value) -> Result<Value, ExprError> {
    match op {
        UnaryOp::IsNull => Ok(Value::Bool(value.is_null())),
        UnaryOp::IsNotNull => Ok(Value::Bool(!value.is_null())),
        UnaryOp::Not => Ok(value.try_bool()?.map_or(Value::Null, |b| Value::Bool(!b))),
        UnaryOp::Negate => match value {
            Value::Null => Ok(Value::Null),
            Value::I64(v) => v
                .checked_neg()
                .map(Value::I64)
                .ok_or_else(|| ExprError::Overflow {
                    op: format!("- {v}"),
                }),
            Value::F64(v) => Ok(Value::F64(-v)),
            other => Err(other.type_mismatch("numeric").into()),
        },
    }
}
