//! Logical expression tree and its builders.

use std::{fmt, ops};

use rowframe_core::{DataType, Row, Schema, Value};

use crate::{error::ExprError, functions::ScalarFunction, physical::PhysicalExpr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Not,
    Negate,
    IsNull,
    IsNotNull,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    And,
    Or,
}

impl BinaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Eq => "=",
            BinaryOp::NotEq => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::LtEq => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::GtEq => ">=",
            BinaryOp::And => "AND",
            BinaryOp::Or => "OR",
        }
    }

    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            BinaryOp::Eq
                | BinaryOp::NotEq
                | BinaryOp::Lt
                | BinaryOp::LtEq
                | BinaryOp::Gt
                | BinaryOp::GtEq
        )
    }
}

/// A per-row scalar computation.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Value),
    Column(String),
    Unary {
        op: UnaryOp,
        expr: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Function {
        func: ScalarFunction,
        args: Vec<Expr>,
    },
    Cast {
        expr: Box<Expr>,
        to: DataType,
    },
    /// Renames the output column; evaluation is the inner expression's.
    Alias {
        expr: Box<Expr>,
        name: String,
    },
}

/// Reference a field by name.
pub fn col(name: impl Into<String>) -> Expr {
    Expr::Column(name.into())
}

/// A constant value.
pub fn lit(value: impl Into<Value>) -> Expr {
    Expr::Literal(value.into())
}

impl Expr {
    pub fn binary(left: Expr, op: BinaryOp, right: Expr) -> Self {
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    fn unary(self, op: UnaryOp) -> Self {
        Expr::Unary {
            op,
            expr: Box::new(self),
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn eq(self, other: Expr) -> Self {
        Self::binary(self, BinaryOp::Eq, other)
    }

    pub fn not_eq(self, other: Expr) -> Self {
        Self::binary(self, BinaryOp::NotEq, other)
    }

    pub fn lt(self, other: Expr) -> Self {
        Self::binary(self, BinaryOp::Lt, other)
    }

    pub fn lt_eq(self, other: Expr) -> Self {
        Self::binary(self, BinaryOp::LtEq, other)
    }

    pub fn gt(self, other: Expr) -> Self {
        Self::binary(self, BinaryOp::Gt, other)
    }

    pub fn gt_eq(self, other: Expr) -> Self {
        Self::binary(self, BinaryOp::GtEq, other)
    }

    pub fn and(self, other: Expr) -> Self {
        Self::binary(self, BinaryOp::And, other)
    }

    pub fn or(self, other: Expr) -> Self {
        Self::binary(self, BinaryOp::Or, other)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        self.unary(UnaryOp::Not)
    }

    pub fn is_null(self) -> Self {
        self.unary(UnaryOp::IsNull)
    }

    pub fn is_not_null(self) -> Self {
        self.unary(UnaryOp::IsNotNull)
    }

    pub fn alias(self, name: impl Into<String>) -> Self {
        Expr::Alias {
            expr: Box::new(self),
            name: name.into(),
        }
    }

    pub fn cast(self, to: DataType) -> Self {
        Expr::Cast {
            expr: Box::new(self),
            to,
        }
    }

    /// Name of the column this expression produces in a projection.
    pub fn output_name(&self) -> String {
        match self {
            Expr::Column(name) | Expr::Alias { name, .. } => name.clone(),
            other => other.to_string(),
        }
    }

    /// Resolve against `schema` into an evaluable [`PhysicalExpr`].
    pub fn bind(&self, schema: &Schema) -> Result<PhysicalExpr, ExprError> {
        PhysicalExpr::bind(self, schema)
    }

    /// Bind and evaluate against a single row in one step.
    pub fn evaluate(&self, schema: &Schema, row: &Row) -> Result<Value, ExprError> {
        self.bind(schema)?.evaluate(row)
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal(Value::Null) => f.write_str("NULL"),
            Expr::Literal(v) => write!(f, "{v}"),
            Expr::Column(name) => f.write_str(name),
            Expr::Unary { op, expr } => match op {
                UnaryOp::Not => write!(f, "(NOT {expr})"),
                UnaryOp::Negate => write!(f, "(- {expr})"),
                UnaryOp::IsNull => write!(f, "({expr} IS NULL)"),
                UnaryOp::IsNotNull => write!(f, "({expr} IS NOT NULL)"),
            },
            Expr::Binary { op, left, right } => write!(f, "({left} {} {right})", op.symbol()),
            Expr::Function { func, args } => {
                write!(f, "{}(", func.name())?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                f.write_str(")")
            }
            Expr::Cast { expr, to } => write!(f, "CAST({expr} AS {to})"),
            Expr::Alias { expr, name } => write!(f, "{expr} AS {name}"),
        }
    }
}

macro_rules! impl_binary_operator {
    ($trait:ident, $method:ident, $op:expr) => {
        impl ops::$trait for Expr {
            type Output = Expr;

            fn $method(self, rhs: Expr) -> Expr {
                Expr::binary(self, $op, rhs)
            }
        }
    };
}

impl_binary_operator!(Add, add, BinaryOp::Add);
impl_binary_operator!(Sub, sub, BinaryOp::Sub);
impl_binary_operator!(Mul, mul, BinaryOp::Mul);
impl_binary_operator!(Div, div, BinaryOp::Div);
impl_binary_operator!(Rem, rem, BinaryOp::Mod);

impl ops::Neg for Expr {
    type Output = Expr;

    fn neg(self) -> Expr {
        self.unary(UnaryOp::Negate)
    }
}

impl ops::Not for Expr {
    type Output = Expr;

    fn not(self) -> Expr {
        self.unary(UnaryOp::Not)
    }
}
