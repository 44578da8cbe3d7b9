//! Text expression parser built on nom.
//!
//! # Grammar
//!
//! Lowest to highest precedence:
//!
//! ```text
//! or        := and ("OR" and)*
//! and       := not ("AND" not)*
//! not       := "NOT" not | cmp
//! cmp       := add (("=" | "==" | "!=" | "<>" | "<" | "<=" | ">" | ">=") add
//!                   | "IS" ["NOT"] "NULL")?
//! add       := mul (("+" | "-") mul)*
//! mul       := unary (("*" | "/" | "%") unary)*
//! unary     := "-" unary | primary
//! primary   := "(" or ")" | "CAST" "(" or "AS" type ")" | TRUE | FALSE | NULL
//!            | number | string | name "(" args ")" | name | `quoted name`
//! ```
//!
//! Keywords are case-insensitive. Strings take single or double quotes; a
//! backslash escapes only the quote character and itself, so regex escapes
//! such as `\d` pass through untouched.

use nom::{
    IResult,
    branch::alt,
    bytes::complete::{tag, tag_no_case, take_while, take_while1},
    character::complete::{char, digit0, digit1, multispace0, one_of},
    combinator::{all_consuming, cut, map, map_opt, opt, recognize, value, verify},
    error::{Error, ErrorKind},
    multi::{fold_many0, separated_list0},
    sequence::{delimited, pair, preceded, terminated, tuple},
};
use rowframe_core::{DataType, Value};

use crate::{
    error::ExprError,
    expr::{BinaryOp, Expr, col},
    functions::ScalarFunction,
};

// Marks a call to a name that is not a known function.
const UNKNOWN_FUNCTION: ErrorKind = ErrorKind::Fail;

const RESERVED: &[&str] = &[
    "and", "or", "not", "is", "null", "true", "false", "as", "cast",
];

/// Parse a single expression such as `count > 3000 AND upper(name) = 'X'`.
pub fn parse_expr(input: &str) -> Result<Expr, ExprError> {
    run(input, or_expr)
}

/// Parse an expression with an optional `AS alias` suffix, as used in
/// projections.
pub fn parse_named_expr(input: &str) -> Result<Expr, ExprError> {
    run(input, named_expr)
}

fn run<'a>(
    input: &'a str,
    parser: impl FnMut(&'a str) -> IResult<&'a str, Expr>,
) -> Result<Expr, ExprError> {
    match all_consuming(parser)(input) {
        Ok((_, expr)) => Ok(expr),
        Err(nom::Err::Failure(e)) if e.code == UNKNOWN_FUNCTION => {
            let name: String = e.input.chars().take_while(|c| is_ident_continue(*c)).collect();
            Err(ExprError::UnknownFunction { name })
        }
        Err(nom::Err::Error(e) | nom::Err::Failure(e)) => Err(ExprError::Parse {
            input: input.to_string(),
            detail: describe_position(input, e.input),
        }),
        Err(nom::Err::Incomplete(_)) => Err(ExprError::Parse {
            input: input.to_string(),
            detail: "incomplete input".to_string(),
        }),
    }
}

fn describe_position(input: &str, rest: &str) -> String {
    let rest = rest.trim_start();
    if rest.is_empty() {
        "unexpected end of input".to_string()
    } else {
        format!(
            "unexpected input at offset {}: '{rest}'",
            input.len() - rest.len()
        )
    }
}

fn named_expr(input: &str) -> IResult<&str, Expr> {
    let (input, expr) = or_expr(input)?;
    let (input, alias) = opt(preceded(ws(keyword("as")), ws(identifier)))(input)?;
    Ok((
        input,
        match alias {
            Some(name) => expr.alias(name),
            None => expr,
        },
    ))
}

fn or_expr(input: &str) -> IResult<&str, Expr> {
    let (input, first) = and_expr(input)?;
    fold_many0(
        preceded(ws(keyword("or")), and_expr),
        move || first.clone(),
        |acc, rhs| Expr::binary(acc, BinaryOp::Or, rhs),
    )(input)
}

fn and_expr(input: &str) -> IResult<&str, Expr> {
    let (input, first) = not_expr(input)?;
    fold_many0(
        preceded(ws(keyword("and")), not_expr),
        move || first.clone(),
        |acc, rhs| Expr::binary(acc, BinaryOp::And, rhs),
    )(input)
}

fn not_expr(input: &str) -> IResult<&str, Expr> {
    alt((
        map(preceded(ws(keyword("not")), not_expr), Expr::not),
        comparison,
    ))(input)
}

enum CmpTail {
    Op(BinaryOp, Expr),
    IsNull,
    IsNotNull,
}

fn comparison(input: &str) -> IResult<&str, Expr> {
    let (input, left) = additive(input)?;
    let (input, tail) = opt(alt((
        map(
            tuple((
                ws(keyword("is")),
                opt(ws(keyword("not"))),
                cut(ws(keyword("null"))),
            )),
            |(_, not, _)| {
                if not.is_some() {
                    CmpTail::IsNotNull
                } else {
                    CmpTail::IsNull
                }
            },
        ),
        map(pair(ws(comparison_op), additive), |(op, right)| {
            CmpTail::Op(op, right)
        }),
    )))(input)?;
    let expr = match tail {
        None => left,
        Some(CmpTail::IsNull) => left.is_null(),
        Some(CmpTail::IsNotNull) => left.is_not_null(),
        Some(CmpTail::Op(op, right)) => Expr::binary(left, op, right),
    };
    Ok((input, expr))
}

fn comparison_op(input: &str) -> IResult<&str, BinaryOp> {
    alt((
        value(BinaryOp::LtEq, tag("<=")),
        value(BinaryOp::GtEq, tag(">=")),
        value(BinaryOp::NotEq, tag("!=")),
        value(BinaryOp::NotEq, tag("<>")),
        value(BinaryOp::Eq, tag("==")),
        value(BinaryOp::Eq, tag("=")),
        value(BinaryOp::Lt, tag("<")),
        value(BinaryOp::Gt, tag(">")),
    ))(input)
}

fn additive(input: &str) -> IResult<&str, Expr> {
    let (input, first) = multiplicative(input)?;
    fold_many0(
        pair(
            ws(alt((
                value(BinaryOp::Add, char('+')),
                value(BinaryOp::Sub, char('-')),
            ))),
            multiplicative,
        ),
        move || first.clone(),
        |acc, (op, rhs)| Expr::binary(acc, op, rhs),
    )(input)
}

fn multiplicative(input: &str) -> IResult<&str, Expr> {
    let (input, first) = unary(input)?;
    fold_many0(
        pair(
            ws(alt((
                value(BinaryOp::Mul, char('*')),
                value(BinaryOp::Div, char('/')),
                value(BinaryOp::Mod, char('%')),
            ))),
            unary,
        ),
        move || first.clone(),
        |acc, (op, rhs)| Expr::binary(acc, op, rhs),
    )(input)
}

fn unary(input: &str) -> IResult<&str, Expr> {
    alt((map(preceded(ws(char('-')), unary), negate), primary))(input)
}

// `-5` parses as a literal rather than a negation node.
fn negate(expr: Expr) -> Expr {
    match expr {
        Expr::Literal(Value::I64(v)) if v != i64::MIN => Expr::Literal(Value::I64(-v)),
        Expr::Literal(Value::F64(v)) => Expr::Literal(Value::F64(-v)),
        other => -other,
    }
}

fn primary(input: &str) -> IResult<&str, Expr> {
    ws(alt((
        delimited(char('('), or_expr, cut(ws(char(')')))),
        cast_expr,
        value(Expr::Literal(Value::Bool(true)), keyword("true")),
        value(Expr::Literal(Value::Bool(false)), keyword("false")),
        value(Expr::Literal(Value::Null), keyword("null")),
        number,
        string_literal,
        function_call,
        map(identifier, col),
    )))(input)
}

fn cast_expr(input: &str) -> IResult<&str, Expr> {
    let (input, _) = pair(keyword("cast"), ws(char('(')))(input)?;
    let (input, (expr, _, to, _)) = cut(tuple((
        or_expr,
        ws(keyword("as")),
        ws(map_opt(bare_identifier, DataType::from_name)),
        char(')'),
    )))(input)?;
    Ok((input, expr.cast(to)))
}

fn function_call(input: &str) -> IResult<&str, Expr> {
    let (rest, name) = terminated(bare_identifier, ws(char('(')))(input)?;
    let Some(func) = ScalarFunction::lookup(name) else {
        return Err(nom::Err::Failure(Error::new(input, UNKNOWN_FUNCTION)));
    };
    let (rest, args) = cut(terminated(
        separated_list0(ws(char(',')), or_expr),
        ws(char(')')),
    ))(rest)?;
    Ok((rest, func.call(args)))
}

fn number(input: &str) -> IResult<&str, Expr> {
    let (rest, text) = terminated(
        recognize(tuple((
            digit1,
            opt(pair(char('.'), digit0)),
            opt(tuple((one_of("eE"), opt(one_of("+-")), digit1))),
        ))),
        keyword_boundary,
    )(input)?;
    let literal = match text.parse::<i64>() {
        Ok(v) => Value::I64(v),
        Err(_) => text
            .parse::<f64>()
            .map(Value::F64)
            .map_err(|_| nom::Err::Error(Error::new(input, ErrorKind::Float)))?,
    };
    Ok((rest, Expr::Literal(literal)))
}

fn string_literal(input: &str) -> IResult<&str, Expr> {
    let mut chars = input.char_indices();
    let quote = match chars.next() {
        Some((_, q @ ('\'' | '"'))) => q,
        _ => return Err(nom::Err::Error(Error::new(input, ErrorKind::Char))),
    };
    let mut out = String::new();
    let mut escaped = false;
    for (i, c) in chars {
        if escaped {
            if c != quote && c != '\\' {
                out.push('\\');
            }
            out.push(c);
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == quote {
            return Ok((&input[i + c.len_utf8()..], Expr::Literal(Value::from(out))));
        } else {
            out.push(c);
        }
    }
    // Unterminated.
    Err(nom::Err::Failure(Error::new(input, ErrorKind::Eof)))
}

fn identifier(input: &str) -> IResult<&str, &str> {
    alt((
        delimited(char('`'), take_while1(|c| c != '`'), char('`')),
        bare_identifier,
    ))(input)
}

fn bare_identifier(input: &str) -> IResult<&str, &str> {
    verify(
        recognize(pair(
            take_while1(|c: char| c.is_ascii_alphabetic() || c == '_'),
            take_while(is_ident_continue),
        )),
        |s: &str| !RESERVED.iter().any(|kw| kw.eq_ignore_ascii_case(s)),
    )(input)
}

fn keyword<'a>(kw: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    terminated(tag_no_case(kw), keyword_boundary)
}

fn ws<'a, O, F>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    delimited(multispace0, inner, multispace0)
}

fn keyword_boundary(input: &str) -> IResult<&str, ()> {
    if input.chars().next().is_some_and(is_ident_continue) {
        return Err(nom::Err::Error(Error::new(input, ErrorKind::Verify)));
    }
    Ok((input, ()))
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}
