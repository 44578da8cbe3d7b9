//! Bound, evaluable expressions.

use rowframe_core::{DataType, Row, Schema, Value};

use crate::{
    cast,
    error::ExprError,
    expr::{BinaryOp, Expr, UnaryOp},
    functions::BoundFunction,
    kernels,
};

/// An [`Expr`] resolved against a schema: column names are replaced by
/// positions, operand types are checked, and regex patterns are compiled.
///
/// The result type and nullability are known up front, which lets a
/// projection compute its output schema without touching any rows.
#[derive(Debug, Clone)]
pub struct PhysicalExpr {
    kind: PhysicalKind,
    data_type: DataType,
    nullable: bool,
}

#[derive(Debug, Clone)]
enum PhysicalKind {
    Literal(Value),
    Column(usize),
    Unary {
        op: UnaryOp,
        expr: Box<PhysicalExpr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<PhysicalExpr>,
        right: Box<PhysicalExpr>,
    },
    Function {
        func: BoundFunction,
        args: Vec<PhysicalExpr>,
    },
    Cast {
        expr: Box<PhysicalExpr>,
        to: DataType,
    },
}

impl PhysicalExpr {
    pub fn bind(expr: &Expr, schema: &Schema) -> Result<Self, ExprError> {
        match expr {
            Expr::Literal(value) => bind_literal(value),
            Expr::Column(name) => {
                let index = schema
                    .position(name)
                    .ok_or_else(|| ExprError::FieldNotFound {
                        name: name.clone(),
                        available: schema.names().map(str::to_string).collect(),
                    })?;
                let field = schema.field(index);
                Ok(Self {
                    kind: PhysicalKind::Column(index),
                    data_type: field.data_type().clone(),
                    nullable: field.is_nullable(),
                })
            }
            Expr::Alias { expr, .. } => Self::bind(expr, schema),
            Expr::Unary { op, expr } => bind_unary(*op, Self::bind(expr, schema)?),
            Expr::Binary { op, left, right } => {
                bind_binary(*op, Self::bind(left, schema)?, Self::bind(right, schema)?)
            }
            Expr::Function { func, args } => {
                let bound = args
                    .iter()
                    .map(|arg| Self::bind(arg, schema))
                    .collect::<Result<Vec<_>, _>>()?;
                let (func, data_type, nullable) = func.resolve(&bound, args)?;
                Ok(Self {
                    kind: PhysicalKind::Function { func, args: bound },
                    data_type,
                    nullable,
                })
            }
            Expr::Cast { expr, to } => {
                let inner = Self::bind(expr, schema)?;
                if !cast::can_cast(&inner.data_type, to) {
                    return Err(ExprError::mismatch(
                        "cast",
                        format!("cannot cast {} to {to}", inner.data_type),
                    ));
                }
                let nullable = inner.nullable || cast::may_produce_null(&inner.data_type, to);
                Ok(Self {
                    kind: PhysicalKind::Cast {
                        expr: Box::new(inner),
                        to: to.clone(),
                    },
                    data_type: to.clone(),
                    nullable,
                })
            }
        }
    }

    pub fn data_type(&self) -> &DataType {
        &self.data_type
    }

    /// Whether evaluation may yield [`Value::Null`].
    pub fn nullable(&self) -> bool {
        self.nullable
    }

    pub fn evaluate(&self, row: &Row) -> Result<Value, ExprError> {
        match &self.kind {
            PhysicalKind::Literal(value) => Ok(value.clone()),
            PhysicalKind::Column(index) => {
                let width = row.len();
                row.get(*index).cloned().ok_or(ExprError::RowWidth {
                    index: *index,
                    width,
                })
            }
            PhysicalKind::Unary { op, expr } => kernels::unary(*op, &expr.evaluate(row)?),
            PhysicalKind::Binary { op, left, right } => {
                // Both sides always run so errors surface regardless of
                // short-circuit opportunities.
                let l = left.evaluate(row)?;
                let r = right.evaluate(row)?;
                match op {
                    BinaryOp::And => Ok(Value::from(kernels::and_kleene(
                        l.try_bool()?,
                        r.try_bool()?,
                    ))),
                    BinaryOp::Or => Ok(Value::from(kernels::or_kleene(
                        l.try_bool()?,
                        r.try_bool()?,
                    ))),
                    op if op.is_comparison() => kernels::compare(*op, &l, &r),
                    op => kernels::arithmetic(*op, &l, &r),
                }
            }
            PhysicalKind::Function { func, args } => {
                let values = args
                    .iter()
                    .map(|arg| arg.evaluate(row))
                    .collect::<Result<Vec<_>, _>>()?;
                let out = func.invoke(&values)?;
                // coalesce over mixed long/double widens.
                match (out, &self.data_type) {
                    (Value::I64(v), DataType::F64) => Ok(Value::F64(v as f64)),
                    (out, _) => Ok(out),
                }
            }
            PhysicalKind::Cast { expr, to } => cast::cast_value(&expr.evaluate(row)?, to),
        }
    }

    /// Evaluate as a filter predicate: only `true` keeps the row.
    pub fn evaluate_predicate(&self, row: &Row) -> Result<bool, ExprError> {
        Ok(matches!(self.evaluate(row)?, Value::Bool(true)))
    }
}

fn bind_literal(value: &Value) -> Result<PhysicalExpr, ExprError> {
    let data_type = match value {
        Value::Null => DataType::Null,
        Value::Bool(_) => DataType::Bool,
        Value::I64(_) => DataType::I64,
        Value::F64(_) => DataType::F64,
        Value::String(_) => DataType::String,
        Value::Struct(_) | Value::List(_) => {
            return Err(ExprError::mismatch(
                "literal",
                format!("{} literals are not supported", value.type_name()),
            ));
        }
    };
    Ok(PhysicalExpr {
        kind: PhysicalKind::Literal(value.clone()),
        data_type,
        nullable: value.is_null(),
    })
}

fn bind_unary(op: UnaryOp, expr: PhysicalExpr) -> Result<PhysicalExpr, ExprError> {
    let (data_type, nullable) = match op {
        UnaryOp::IsNull | UnaryOp::IsNotNull => (DataType::Bool, false),
        UnaryOp::Not => match expr.data_type {
            DataType::Bool | DataType::Null => (DataType::Bool, expr.nullable),
            ref other => {
                return Err(ExprError::mismatch(
                    "NOT",
                    format!("expected boolean operand, found {other}"),
                ));
            }
        },
        UnaryOp::Negate => match expr.data_type {
            DataType::Null => (DataType::F64, true),
            ref dt if dt.is_numeric() => (dt.clone(), expr.nullable),
            ref other => {
                return Err(ExprError::mismatch(
                    "-",
                    format!("expected numeric operand, found {other}"),
                ));
            }
        },
    };
    Ok(PhysicalExpr {
        kind: PhysicalKind::Unary {
            op,
            expr: Box::new(expr),
        },
        data_type,
        nullable,
    })
}

fn bind_binary(
    op: BinaryOp,
    left: PhysicalExpr,
    right: PhysicalExpr,
) -> Result<PhysicalExpr, ExprError> {
    let (l, r) = (&left.data_type, &right.data_type);
    let mut nullable = left.nullable || right.nullable;

    let data_type = match op {
        BinaryOp::And | BinaryOp::Or => {
            if !is_bool_like(l) || !is_bool_like(r) {
                return Err(operand_mismatch(op, "boolean", l, r));
            }
            DataType::Bool
        }
        op if op.is_comparison() => {
            if !comparable(op, l, r) {
                return Err(ExprError::mismatch(
                    op.symbol(),
                    format!("cannot compare {l} with {r}"),
                ));
            }
            DataType::Bool
        }
        op => {
            if !is_numeric_like(l) || !is_numeric_like(r) {
                return Err(operand_mismatch(op, "numeric", l, r));
            }
            // Division and modulo by zero yield null.
            if matches!(op, BinaryOp::Div | BinaryOp::Mod) {
                nullable = true;
            }
            match (op, l, r) {
                (BinaryOp::Div, _, _) => DataType::F64,
                (_, DataType::I64, DataType::I64) => DataType::I64,
                (_, DataType::Null, DataType::I64) | (_, DataType::I64, DataType::Null) => {
                    DataType::I64
                }
                _ => DataType::F64,
            }
        }
    };
    if matches!(l, DataType::Null) || matches!(r, DataType::Null) {
        nullable = true;
    }

    Ok(PhysicalExpr {
        kind: PhysicalKind::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        },
        data_type,
        nullable,
    })
}

fn is_bool_like(dt: &DataType) -> bool {
    matches!(dt, DataType::Bool | DataType::Null)
}

fn is_numeric_like(dt: &DataType) -> bool {
    dt.is_numeric() || matches!(dt, DataType::Null)
}

fn comparable(op: BinaryOp, l: &DataType, r: &DataType) -> bool {
    match (l, r) {
        (DataType::Null, _) | (_, DataType::Null) => true,
        (l, r) if l.is_numeric() && r.is_numeric() => true,
        (l, r) if l == r && l.is_primitive() => true,
        // Nested values support equality only.
        (l, r) => l == r && matches!(op, BinaryOp::Eq | BinaryOp::NotEq),
    }
}

fn operand_mismatch(op: BinaryOp, expected: &str, l: &DataType, r: &DataType) -> ExprError {
    ExprError::mismatch(
        op.symbol(),
        format!("expected {expected} operands, found {l} and {r}"),
    )
}
