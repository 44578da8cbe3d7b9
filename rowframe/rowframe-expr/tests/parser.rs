use rowframe_core::{DataType, Field, Row, Schema, Value};
use rowframe_expr::{ExprError, col, instr, lit, parse_expr, parse_named_expr, upper};

#[test]
fn parses_comparison_with_precedence() {
    let expr = parse_expr("count > 10 AND count < 20 OR DEST = 'Egypt'").unwrap();
    let expected = col("count")
        .gt(lit(10))
        .and(col("count").lt(lit(20)))
        .or(col("DEST").eq(lit("Egypt")));
    assert_eq!(expr, expected);
}

#[test]
fn arithmetic_precedence_and_negative_literals() {
    assert_eq!(
        parse_expr("a + b * -2").unwrap(),
        col("a") + col("b") * lit(-2)
    );
    assert_eq!(
        parse_expr("(a + b) % 3").unwrap(),
        (col("a") + col("b")) % lit(3)
    );
    assert_eq!(parse_expr("- a").unwrap(), -col("a"));
    assert_eq!(parse_expr("1.5e2").unwrap(), lit(150.0));
}

#[test]
fn keywords_are_case_insensitive() {
    assert_eq!(
        parse_expr("NOT x is not null and Y = TRUE").unwrap(),
        col("x").is_not_null().not().and(col("Y").eq(lit(true)))
    );
    assert_eq!(parse_expr("x IS NULL").unwrap(), col("x").is_null());
    assert_eq!(parse_expr("null").unwrap(), lit(Value::Null));
}

#[test]
fn identifiers_may_contain_keywords() {
    assert_eq!(parse_expr("android").unwrap(), col("android"));
    assert_eq!(parse_expr("`weird name`").unwrap(), col("weird name"));
    assert_eq!(parse_expr("nullable").unwrap(), col("nullable"));
}

#[test]
fn parses_function_calls() {
    assert_eq!(
        parse_expr("instr(Description, 'HAND WARMER') >= 1").unwrap(),
        instr(col("Description"), "HAND WARMER").gt_eq(lit(1))
    );
    assert_eq!(
        parse_expr("Upper( name )").unwrap(),
        upper(col("name"))
    );
}

#[test]
fn string_escapes_keep_regex_backslashes() {
    assert_eq!(parse_expr(r"'it\'s'").unwrap(), lit("it's"));
    assert_eq!(parse_expr(r#""\d+""#).unwrap(), lit(r"\d+"));
}

#[test]
fn parses_cast() {
    assert_eq!(
        parse_expr("CAST(count AS double) / 2").unwrap(),
        col("count").cast(DataType::F64) / lit(2)
    );
    assert!(parse_expr("cast(x as widget)").is_err());
}

#[test]
fn named_expression_alias() {
    assert_eq!(
        parse_named_expr("count * 2 AS doubled").unwrap(),
        (col("count") * lit(2)).alias("doubled")
    );
    assert_eq!(parse_named_expr("count").unwrap(), col("count"));
}

#[test]
fn unknown_function_is_reported_by_name() {
    let err = parse_expr("frob(x)").unwrap_err();
    assert!(
        matches!(err, ExprError::UnknownFunction { ref name } if name == "frob"),
        "{err}"
    );
}

#[test]
fn syntax_errors_report_position() {
    for bad in ["", "count >", "a +* b", "(a", "'open", "a b"] {
        let err = parse_expr(bad).unwrap_err();
        assert!(matches!(err, ExprError::Parse { .. }), "{bad}: {err}");
    }
}

#[test]
fn parsed_expression_evaluates() {
    let schema = Schema::try_new(vec![Field::new("count", DataType::I64, true)]).unwrap();
    let expr = parse_expr("count % 2 = 0 AND count <> 4").unwrap();
    let bound = expr.bind(&schema).unwrap();
    assert!(bound.evaluate_predicate(&Row::new(vec![Value::I64(6)])).unwrap());
    assert!(!bound.evaluate_predicate(&Row::new(vec![Value::I64(4)])).unwrap());
}
