//! Built-in scalar functions.

use regex::Regex;
use rowframe_core::{DataType, Value};

use crate::{
    error::ExprError,
    expr::{Expr, lit},
    physical::PhysicalExpr,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarFunction {
    Upper,
    Lower,
    Trim,
    Ltrim,
    Rtrim,
    Length,
    Concat,
    RegexpReplace,
    RegexpExtract,
    Instr,
    Abs,
    Round,
    Sqrt,
    Coalesce,
}

const ALL: &[ScalarFunction] = &[
    ScalarFunction::Upper,
    ScalarFunction::Lower,
    ScalarFunction::Trim,
    ScalarFunction::Ltrim,
    ScalarFunction::Rtrim,
    ScalarFunction::Length,
    ScalarFunction::Concat,
    ScalarFunction::RegexpReplace,
    ScalarFunction::RegexpExtract,
    ScalarFunction::Instr,
    ScalarFunction::Abs,
    ScalarFunction::Round,
    ScalarFunction::Sqrt,
    ScalarFunction::Coalesce,
];

impl ScalarFunction {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Upper => "upper",
            Self::Lower => "lower",
            Self::Trim => "trim",
            Self::Ltrim => "ltrim",
            Self::Rtrim => "rtrim",
            Self::Length => "length",
            Self::Concat => "concat",
            Self::RegexpReplace => "regexp_replace",
            Self::RegexpExtract => "regexp_extract",
            Self::Instr => "instr",
            Self::Abs => "abs",
            Self::Round => "round",
            Self::Sqrt => "sqrt",
            Self::Coalesce => "coalesce",
        }
    }

    /// Case-insensitive lookup by SQL name.
    pub fn lookup(name: &str) -> Option<Self> {
        ALL.iter()
            .copied()
            .find(|f| f.name().eq_ignore_ascii_case(name))
    }

    /// Accepted argument count as `(min, max)`; `None` means unbounded.
    pub fn arity(&self) -> (usize, Option<usize>) {
        match self {
            Self::Upper
            | Self::Lower
            | Self::Trim
            | Self::Ltrim
            | Self::Rtrim
            | Self::Length
            | Self::Abs
            | Self::Sqrt => (1, Some(1)),
            Self::Instr => (2, Some(2)),
            Self::RegexpReplace => (3, Some(3)),
            Self::RegexpExtract => (2, Some(3)),
            Self::Round => (1, Some(2)),
            Self::Concat | Self::Coalesce => (1, None),
        }
    }

    pub fn call(self, args: Vec<Expr>) -> Expr {
        Expr::Function { func: self, args }
    }

    /// Check argument types and compute the output type and nullability.
    pub(crate) fn resolve(
        &self,
        args: &[PhysicalExpr],
        raw_args: &[Expr],
    ) -> Result<(BoundFunction, DataType, bool), ExprError> {
        let (min, max) = self.arity();
        if args.len() < min || max.is_some_and(|max| args.len() > max) {
            let expected = match max {
                Some(max) if max == min => min.to_string(),
                Some(max) => format!("{min} to {max}"),
                None => format!("at least {min}"),
            };
            return Err(ExprError::ArgumentCount {
                function: self.name(),
                expected,
                actual: args.len(),
            });
        }

        let any_nullable = args.iter().any(PhysicalExpr::nullable);
        let plain = BoundFunction::Plain(*self);

        match self {
            Self::Upper | Self::Lower | Self::Trim | Self::Ltrim | Self::Rtrim => {
                self.expect_string(&args[0])?;
                Ok((plain, DataType::String, any_nullable))
            }
            Self::Length => {
                self.expect_string(&args[0])?;
                Ok((plain, DataType::I64, any_nullable))
            }
            Self::Concat => {
                for arg in args {
                    self.expect_string(arg)?;
                }
                Ok((plain, DataType::String, any_nullable))
            }
            Self::Instr => {
                self.expect_string(&args[0])?;
                self.expect_string(&args[1])?;
                Ok((plain, DataType::I64, any_nullable))
            }
            Self::RegexpReplace => {
                self.expect_string(&args[0])?;
                self.expect_string(&args[2])?;
                let regex = self.compile_pattern(&raw_args[1])?;
                Ok((BoundFunction::RegexpReplace(regex), DataType::String, any_nullable))
            }
            Self::RegexpExtract => {
                self.expect_string(&args[0])?;
                if let Some(group) = args.get(2) {
                    self.expect_long(group)?;
                }
                let regex = self.compile_pattern(&raw_args[1])?;
                Ok((BoundFunction::RegexpExtract(regex), DataType::String, any_nullable))
            }
            Self::Abs => {
                let dt = self.expect_numeric(&args[0])?;
                Ok((plain, dt, any_nullable))
            }
            Self::Round => {
                let dt = self.expect_numeric(&args[0])?;
                if let Some(scale) = args.get(1) {
                    self.expect_long(scale)?;
                }
                Ok((plain, dt, any_nullable))
            }
            Self::Sqrt => {
                self.expect_numeric(&args[0])?;
                Ok((plain, DataType::F64, any_nullable))
            }
            Self::Coalesce => {
                let mut dt = DataType::Null;
                for arg in args {
                    dt = self.common_type(&dt, arg.data_type())?;
                }
                let nullable = args.iter().all(PhysicalExpr::nullable);
                Ok((plain, dt, nullable))
            }
        }
    }

    fn expect_string(&self, arg: &PhysicalExpr) -> Result<(), ExprError> {
        match arg.data_type() {
            DataType::String | DataType::Null => Ok(()),
            other => Err(ExprError::mismatch(
                self.name(),
                format!("expected string argument, found {other}"),
            )),
        }
    }

    fn expect_long(&self, arg: &PhysicalExpr) -> Result<(), ExprError> {
        match arg.data_type() {
            DataType::I64 | DataType::Null => Ok(()),
            other => Err(ExprError::mismatch(
                self.name(),
                format!("expected long argument, found {other}"),
            )),
        }
    }

    fn expect_numeric(&self, arg: &PhysicalExpr) -> Result<DataType, ExprError> {
        match arg.data_type() {
            DataType::Null => Ok(DataType::F64),
            dt if dt.is_numeric() => Ok(dt.clone()),
            other => Err(ExprError::mismatch(
                self.name(),
                format!("expected numeric argument, found {other}"),
            )),
        }
    }

    fn common_type(&self, a: &DataType, b: &DataType) -> Result<DataType, ExprError> {
        match (a, b) {
            (DataType::Null, t) | (t, DataType::Null) => Ok(t.clone()),
            (a, b) if a == b => Ok(a.clone()),
            (a, b) if a.is_numeric() && b.is_numeric() => Ok(DataType::F64),
            (a, b) => Err(ExprError::mismatch(
                self.name(),
                format!("arguments have no common type: {a} and {b}"),
            )),
        }
    }

    fn compile_pattern(&self, raw: &Expr) -> Result<Regex, ExprError> {
        let pattern = match raw {
            Expr::Literal(Value::String(p)) => p,
            other => {
                return Err(ExprError::InvalidArgument {
                    function: self.name(),
                    detail: format!("pattern must be a string literal, found {other}"),
                });
            }
        };
        Regex::new(pattern).map_err(|source| ExprError::InvalidRegex {
            pattern: pattern.to_string(),
            source,
        })
    }
}

/// A function with its per-binding state (compiled patterns).
#[derive(Debug, Clone)]
pub(crate) enum BoundFunction {
    Plain(ScalarFunction),
    RegexpReplace(Regex),
    RegexpExtract(Regex),
}

impl BoundFunction {
    pub(crate) fn invoke(&self, args: &[Value]) -> Result<Value, ExprError> {
        match self {
            BoundFunction::RegexpReplace(regex) => {
                match (args[0].try_str()?, args[2].try_str()?) {
                    (Some(s), Some(replacement)) => {
                        Ok(Value::string(regex.replace_all(s, replacement)))
                    }
                    _ => Ok(Value::Null),
                }
            }
            BoundFunction::RegexpExtract(regex) => {
                let group = match args.get(2) {
                    Some(v) => v.try_i64()?,
                    None => Some(1),
                };
                match (args[0].try_str()?, group) {
                    (Some(s), Some(group)) => regexp_extract_group(regex, s, group),
                    _ => Ok(Value::Null),
                }
            }
            BoundFunction::Plain(func) => invoke_plain(*func, args),
        }
    }
}

fn invoke_plain(func: ScalarFunction, args: &[Value]) -> Result<Value, ExprError> {
    match func {
        ScalarFunction::Upper => map_str(&args[0], |s| s.to_uppercase()),
        ScalarFunction::Lower => map_str(&args[0], |s| s.to_lowercase()),
        ScalarFunction::Trim => map_str(&args[0], |s| s.trim_matches(' ').to_string()),
        ScalarFunction::Ltrim => map_str(&args[0], |s| s.trim_start_matches(' ').to_string()),
        ScalarFunction::Rtrim => map_str(&args[0], |s| s.trim_end_matches(' ').to_string()),
        ScalarFunction::Length => Ok(match args[0].try_str()? {
            Some(s) => Value::I64(s.chars().count() as i64),
            None => Value::Null,
        }),
        ScalarFunction::Concat => {
            let mut out = String::new();
            for arg in args {
                match arg.try_str()? {
                    Some(s) => out.push_str(s),
                    None => return Ok(Value::Null),
                }
            }
            Ok(Value::from(out))
        }
        ScalarFunction::Instr => match (args[0].try_str()?, args[1].try_str()?) {
            (Some(s), Some(sub)) => Ok(Value::I64(instr_position(s, sub))),
            _ => Ok(Value::Null),
        },
        ScalarFunction::Abs => match &args[0] {
            Value::I64(v) => v
                .checked_abs()
                .map(Value::I64)
                .ok_or_else(|| ExprError::Overflow {
                    op: "abs".to_string(),
                }),
            Value::F64(v) => Ok(Value::F64(v.abs())),
            Value::Null => Ok(Value::Null),
            other => Err(other.type_mismatch("numeric").into()),
        },
        ScalarFunction::Round => {
            let scale = match args.get(1) {
                Some(v) => v.try_i64()?,
                None => Some(0),
            };
            match (&args[0], scale) {
                (Value::Null, _) | (_, None) => Ok(Value::Null),
                (Value::I64(v), Some(scale)) => round_long(*v, scale),
                (Value::F64(v), Some(scale)) => Ok(Value::F64(round_double(*v, scale))),
                (other, _) => Err(other.type_mismatch("numeric").into()),
            }
        }
        ScalarFunction::Sqrt => Ok(args[0]
            .as_f64_lossy()?
            .map_or(Value::Null, |v| Value::F64(v.sqrt()))),
        ScalarFunction::Coalesce => Ok(args
            .iter()
            .find(|v| !v.is_null())
            .cloned()
            .unwrap_or(Value::Null)),
        ScalarFunction::RegexpReplace | ScalarFunction::RegexpExtract => {
            Err(ExprError::InvalidArgument {
                function: func.name(),
                detail: "pattern was not compiled at bind time".to_string(),
            })
        }
    }
}

fn map_str(value: &Value, f: impl FnOnce(&str) -> String) -> Result<Value, ExprError> {
    Ok(value.try_str()?.map_or(Value::Null, |s| Value::from(f(s))))
}

/// 1-based character position of `sub` in `s`, or 0 when absent.
fn instr_position(s: &str, sub: &str) -> i64 {
    match s.find(sub) {
        Some(byte_idx) => s[..byte_idx].chars().count() as i64 + 1,
        None => 0,
    }
}

fn regexp_extract_group(regex: &Regex, s: &str, group: i64) -> Result<Value, ExprError> {
    let group = usize::try_from(group)
        .ok()
        .filter(|g| *g < regex.captures_len())
        .ok_or_else(|| ExprError::InvalidArgument {
            function: "regexp_extract",
            detail: format!(
                "group index {group} out of range, pattern has {} group(s)",
                regex.captures_len() - 1
            ),
        })?;
    let text = regex
        .captures(s)
        .and_then(|caps| caps.get(group))
        .map_or("", |m| m.as_str());
    Ok(Value::string(text))
}

// Half away from zero, matching HALF_UP on doubles. Scales past f64
// precision leave the value as is.
fn round_double(v: f64, scale: i64) -> f64 {
    if !v.is_finite() || scale >= 17 {
        return v;
    }
    let factor = 10f64.powi(scale.max(-308) as i32);
    let scaled = v * factor;
    if !scaled.is_finite() {
        return v;
    }
    scaled.round() / factor
}

fn round_long(v: i64, scale: i64) -> Result<Value, ExprError> {
    if scale >= 0 {
        return Ok(Value::I64(v));
    }
    let overflow = || ExprError::Overflow {
        op: "round".to_string(),
    };
    let factor = u32::try_from(scale.unsigned_abs())
        .ok()
        .and_then(|exp| 10i64.checked_pow(exp));
    let Some(factor) = factor else {
        return Ok(Value::I64(0));
    };
    let rem = v % factor;
    let base = v - rem;
    let rounded = if rem.abs() * 2 >= factor {
        base.checked_add(factor * v.signum()).ok_or_else(overflow)?
    } else {
        base
    };
    Ok(Value::I64(rounded))
}

pub fn upper(e: Expr) -> Expr {
    ScalarFunction::Upper.call(vec![e])
}

pub fn lower(e: Expr) -> Expr {
    ScalarFunction::Lower.call(vec![e])
}

pub fn trim(e: Expr) -> Expr {
    ScalarFunction::Trim.call(vec![e])
}

pub fn ltrim(e: Expr) -> Expr {
    ScalarFunction::Ltrim.call(vec![e])
}

pub fn rtrim(e: Expr) -> Expr {
    ScalarFunction::Rtrim.call(vec![e])
}

pub fn length(e: Expr) -> Expr {
    ScalarFunction::Length.call(vec![e])
}

pub fn concat(args: Vec<Expr>) -> Expr {
    ScalarFunction::Concat.call(args)
}

/// Replace every match of `pattern` in `e` with `replacement` (`$1` refers
/// to capture groups).
pub fn regexp_replace(e: Expr, pattern: &str, replacement: &str) -> Expr {
    ScalarFunction::RegexpReplace.call(vec![e, lit(pattern), lit(replacement)])
}

/// Extract capture `group` of the first match of `pattern`; empty string
/// when nothing matches.
pub fn regexp_extract(e: Expr, pattern: &str, group: i64) -> Expr {
    ScalarFunction::RegexpExtract.call(vec![e, lit(pattern), lit(group)])
}

pub fn instr(e: Expr, substring: &str) -> Expr {
    ScalarFunction::Instr.call(vec![e, lit(substring)])
}

pub fn abs(e: Expr) -> Expr {
    ScalarFunction::Abs.call(vec![e])
}

pub fn round(e: Expr, scale: i64) -> Expr {
    ScalarFunction::Round.call(vec![e, lit(scale)])
}

pub fn sqrt(e: Expr) -> Expr {
    ScalarFunction::Sqrt.call(vec![e])
}

pub fn coalesce(args: Vec<Expr>) -> Expr {
    ScalarFunction::Coalesce.call(args)
}

/// Build a function call by name.
pub fn call(name: &str, args: Vec<Expr>) -> Result<Expr, ExprError> {
    ScalarFunction::lookup(name)
        .map(|func| func.call(args))
        .ok_or_else(|| ExprError::UnknownFunction {
            name: name.to_string(),
        })
}
