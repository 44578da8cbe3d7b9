use rowframe_core::{DataType, Field, Row, Schema, Value};
use rowframe_expr::{
    Expr, ExprError, ScalarFunction, abs, call, coalesce, col, concat, instr, length, lit, lower,
    ltrim, regexp_extract, regexp_replace, round, rtrim, sqrt, trim, upper,
};

fn eval_const(expr: Expr) -> Value {
    expr.evaluate(&Schema::empty(), &Row::default()).unwrap()
}

fn text_schema() -> Schema {
    Schema::try_new(vec![
        Field::new("Description", DataType::String, true),
        Field::new("UnitPrice", DataType::F64, true),
        Field::new("Quantity", DataType::I64, true),
    ])
    .unwrap()
}

#[test]
fn instr_is_one_based_and_zero_when_absent() {
    assert_eq!(
        eval_const(instr(lit("HAND WARMER MUFF"), "HAND WARMER")),
        Value::I64(1)
    );
    assert_eq!(eval_const(instr(lit("HAND WARMER"), "MUFF")), Value::I64(0));
    // A substring longer than the string never matches.
    assert_eq!(eval_const(instr(lit("MUFF"), "HAND WARMER")), Value::I64(0));
    assert_eq!(eval_const(instr(lit("größe"), "ße")), Value::I64(4));
    assert_eq!(eval_const(instr(lit(Value::Null), "x")), Value::Null);
}

#[test]
fn case_and_trim_functions() {
    assert_eq!(eval_const(upper(lit("white metal"))), Value::string("WHITE METAL"));
    assert_eq!(eval_const(lower(lit("WHITE"))), Value::string("white"));
    assert_eq!(eval_const(trim(lit("  x  "))), Value::string("x"));
    assert_eq!(eval_const(ltrim(lit("  x  "))), Value::string("x  "));
    assert_eq!(eval_const(rtrim(lit("  x  "))), Value::string("  x"));
    assert_eq!(eval_const(length(lit("héllo"))), Value::I64(5));
}

#[test]
fn concat_is_null_if_any_argument_is_null() {
    assert_eq!(
        eval_const(concat(vec![lit("a"), lit("-"), lit("b")])),
        Value::string("a-b")
    );
    assert_eq!(
        eval_const(concat(vec![lit("a"), lit(Value::Null)])),
        Value::Null
    );
}

#[test]
fn regexp_replace_rewrites_every_match() {
    let expr = regexp_replace(col("Description"), "BLACK|WHITE|RED", "COLOR");
    let schema = text_schema();
    let row = Row::new(vec![
        Value::string("WHITE HANGING HEART, RED"),
        Value::Null,
        Value::Null,
    ]);
    assert_eq!(
        expr.evaluate(&schema, &row).unwrap(),
        Value::string("COLOR HANGING HEART, COLOR")
    );
}

#[test]
fn regexp_extract_returns_group_or_empty() {
    assert_eq!(
        eval_const(regexp_extract(lit("WHITE METAL LANTERN"), "(BLACK|WHITE|RED)", 1)),
        Value::string("WHITE")
    );
    assert_eq!(
        eval_const(regexp_extract(lit("CREAM CUPID"), "(BLACK|WHITE|RED)", 1)),
        Value::string("")
    );
    assert_eq!(
        eval_const(regexp_extract(lit("order 1234"), r"(\d+)", 0)),
        Value::string("1234")
    );

    let err = regexp_extract(lit("x"), "(a)", 5)
        .evaluate(&Schema::empty(), &Row::default())
        .unwrap_err();
    assert!(matches!(err, ExprError::InvalidArgument { .. }), "{err}");
}

#[test]
fn invalid_regex_fails_at_bind() {
    let err = regexp_replace(col("Description"), "(unclosed", "")
        .bind(&text_schema())
        .unwrap_err();
    assert!(matches!(err, ExprError::InvalidRegex { .. }), "{err}");
}

#[test]
fn regex_pattern_must_be_literal() {
    let expr = ScalarFunction::RegexpReplace.call(vec![
        col("Description"),
        col("Description"),
        lit(""),
    ]);
    let err = expr.bind(&text_schema()).unwrap_err();
    assert!(matches!(err, ExprError::InvalidArgument { .. }), "{err}");
}

#[test]
fn round_with_extreme_scales() {
    assert_eq!(eval_const(round(lit(2.5), 400)), Value::F64(2.5));
    assert_eq!(eval_const(round(lit(2.5), 17)), Value::F64(2.5));
    assert_eq!(eval_const(round(lit(1e300), 20)), Value::F64(1e300));
    assert_eq!(eval_const(round(lit(2.5), -400)), Value::F64(0.0));
    assert_eq!(eval_const(round(lit(15i64), i64::MIN)), Value::I64(0));
    assert_eq!(eval_const(round(lit(15i64), i64::MAX)), Value::I64(15));
    assert_eq!(eval_const(round(lit(15i64), -19)), Value::I64(0));
}

#[test]
fn numeric_functions() {
    assert_eq!(eval_const(abs(lit(-3))), Value::I64(3));
    assert_eq!(eval_const(abs(lit(-2.5))), Value::F64(2.5));
    assert_eq!(eval_const(round(lit(1.25), 1)), Value::F64(1.3));
    assert_eq!(eval_const(round(lit(-2.5), 0)), Value::F64(-3.0));
    assert_eq!(eval_const(round(lit(1250), -2)), Value::I64(1300));
    assert_eq!(eval_const(sqrt(lit(16))), Value::F64(4.0));
    match eval_const(sqrt(lit(-1.0))) {
        Value::F64(v) => assert!(v.is_nan()),
        other => panic!("unexpected value: {other:?}"),
    }
}

#[test]
fn abs_of_min_long_overflows() {
    let err = abs(lit(i64::MIN))
        .evaluate(&Schema::empty(), &Row::default())
        .unwrap_err();
    assert!(matches!(err, ExprError::Overflow { .. }));
}

#[test]
fn coalesce_picks_first_non_null_and_widens() {
    let schema = text_schema();
    let expr = coalesce(vec![col("Quantity"), col("UnitPrice"), lit(0)]);
    let bound = expr.bind(&schema).unwrap();
    assert_eq!(bound.data_type(), &DataType::F64);
    assert!(!bound.nullable());

    let row = Row::new(vec![Value::Null, Value::F64(2.55), Value::I64(6)]);
    assert_eq!(bound.evaluate(&row).unwrap(), Value::F64(6.0));
    let row = Row::new(vec![Value::Null, Value::F64(2.55), Value::Null]);
    assert_eq!(bound.evaluate(&row).unwrap(), Value::F64(2.55));
    let row = Row::new(vec![Value::Null, Value::Null, Value::Null]);
    assert_eq!(bound.evaluate(&row).unwrap(), Value::F64(0.0));

    let err = coalesce(vec![col("Description"), col("Quantity")])
        .bind(&schema)
        .unwrap_err();
    assert!(matches!(err, ExprError::TypeMismatch { .. }));
}

#[test]
fn function_argument_types_are_checked() {
    let err = upper(col("Quantity")).bind(&text_schema()).unwrap_err();
    assert!(matches!(err, ExprError::TypeMismatch { .. }), "{err}");
    let err = sqrt(col("Description")).bind(&text_schema()).unwrap_err();
    assert!(matches!(err, ExprError::TypeMismatch { .. }), "{err}");
}

#[test]
fn call_by_name() {
    let expr = call("UPPER", vec![col("Description")]).unwrap();
    assert_eq!(expr.to_string(), "upper(Description)");

    let err = call("frobnicate", vec![]).unwrap_err();
    assert!(matches!(err, ExprError::UnknownFunction { ref name } if name == "frobnicate"));

    let err = call("upper", vec![lit("a"), lit("b")])
        .unwrap()
        .bind(&Schema::empty())
        .unwrap_err();
    assert!(matches!(
        err,
        ExprError::ArgumentCount {
            function: "upper",
            actual: 2,
            ..
        }
    ));
}
