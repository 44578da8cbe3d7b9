//! Column expressions for `rowframe`.
//!
//! An [`Expr`] is a declarative tree built with [`col`], [`lit`], operator
//! methods, and the function helpers in this crate (or parsed from text
//! with [`parse_expr`]). Before rows flow through it, an expression is bound
//! to a [`Schema`](rowframe_core::Schema) with [`Expr::bind`], which resolves
//! column names, type-checks operands, and compiles regular expressions into
//! a [`PhysicalExpr`] that evaluates one row at a time.
//!
//! # Typical Flow
//! ```rust
//! use rowframe_core::{DataType, Field, Row, Schema, Value};
//! use rowframe_expr::{col, lit};
//!
//! let schema = Schema::try_new(vec![Field::new("count", DataType::I64, true)]).unwrap();
//! let predicate = col("count").gt(lit(3000)).bind(&schema).unwrap();
//! let row = Row::new(vec![Value::I64(15)]);
//! assert_eq!(predicate.evaluate(&row).unwrap(), Value::Bool(false));
//! ```

mod cast;
mod error;
mod expr;
mod functions;
mod kernels;
mod parser;
mod physical;

pub use error::ExprError;
pub use expr::{BinaryOp, Expr, UnaryOp, col, lit};
pub use functions::{
    ScalarFunction, abs, call, coalesce, concat, instr, length, lower, ltrim, regexp_extract,
    regexp_replace, round, rtrim, sqrt, trim, upper,
};
pub use parser::{parse_expr, parse_named_expr};
pub use physical::PhysicalExpr;
