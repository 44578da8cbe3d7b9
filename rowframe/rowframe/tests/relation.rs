use std::path::PathBuf;

use rowframe::{
    FrameError, Relation, Session, SortKey,
    core::{DataType, Field, Row, Schema, SchemaError, Value},
    expr::{ExprError, col, instr, lit, upper},
};

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn flights() -> Relation {
    Session::new()
        .read()
        .json(fixture_path("flights.json"))
        .unwrap()
}

fn longs(session: &Session, name: &str, values: &[Option<i64>]) -> Relation {
    let schema = Schema::try_new(vec![Field::new(name, DataType::I64, true)]).unwrap();
    let rows = values
        .iter()
        .map(|v| Row::new(vec![Value::from(*v)]))
        .collect();
    session.create_relation(schema, rows).unwrap()
}

#[test]
fn flight_scenario() {
    let flights = flights();
    let first = flights.first().unwrap().unwrap();
    assert_eq!(
        first.values(),
        &[
            Value::string("United States"),
            Value::string("Romania"),
            Value::I64(15)
        ]
    );

    let busy = flights.where_expr("count > 3000").unwrap();
    let busy_rows = busy.collect().unwrap();
    assert_eq!(busy_rows.len(), 3);
    assert!(!busy_rows.contains(&first));

    let domestic = flights
        .with_column(
            "domestic",
            col("DEST_COUNTRY_NAME").eq(col("ORIGIN_COUNTRY_NAME")),
        )
        .unwrap();
    assert_eq!(
        domestic.schema().field(3),
        &Field::new("domestic", DataType::Bool, false)
    );
    let rows = domestic.collect().unwrap();
    assert_eq!(rows[0][3], Value::Bool(false));
    assert_eq!(rows[5][3], Value::Bool(true));
}

#[test]
fn row_preserving_transformations_keep_count() {
    let flights = flights();
    let n = flights.count().unwrap();
    let transformed = [
        flights.select_columns(&["count"]).unwrap(),
        flights
            .select([col("count") * lit(2), upper(col("DEST_COUNTRY_NAME"))])
            .unwrap(),
        flights.with_column("double", col("count") / lit(2)).unwrap(),
        flights.with_column_renamed("count", "n").unwrap(),
    ];
    for relation in transformed {
        assert_eq!(relation.count().unwrap(), n);
    }
}

#[test]
fn select_orders_and_names_columns() {
    let flights = flights();
    let projected = flights
        .select([
            col("count"),
            (col("count") + lit(1)).alias("next"),
            col("count").gt(lit(3000)),
        ])
        .unwrap();
    assert_eq!(projected.columns(), ["count", "next", "(count > 3000)"]);

    let parsed = flights
        .select_expr(&["upper(ORIGIN_COUNTRY_NAME) AS origin", "count * 2"])
        .unwrap();
    assert_eq!(parsed.columns(), ["origin", "(count * 2)"]);
    assert_eq!(
        parsed.first().unwrap().unwrap().values(),
        &[Value::string("ROMANIA"), Value::I64(30)]
    );
}

#[test]
fn unknown_columns_fail_when_the_transformation_is_built() {
    let flights = flights();
    let err = flights.select_columns(&["Count"]).unwrap_err();
    assert!(matches!(err, FrameError::Expr(ExprError::FieldNotFound { .. })));

    let err = flights.filter(col("missing").is_null()).unwrap_err();
    assert!(matches!(err, FrameError::Expr(ExprError::FieldNotFound { .. })));

    let err = flights.with_column_renamed("missing", "x").unwrap_err();
    assert!(matches!(err, FrameError::Schema(SchemaError::FieldNotFound { .. })));
}

#[test]
fn duplicate_output_names_are_rejected() {
    let flights = flights();
    let err = flights.select([col("count"), col("count")]).unwrap_err();
    assert!(matches!(err, FrameError::Schema(SchemaError::DuplicateField { .. })));

    let err = flights
        .with_column_renamed("count", "DEST_COUNTRY_NAME")
        .unwrap_err();
    assert!(matches!(err, FrameError::Schema(SchemaError::DuplicateField { .. })));
}

#[test]
fn filter_requires_boolean_predicate() {
    let err = flights().filter(col("count") + lit(1)).unwrap_err();
    assert!(matches!(err, FrameError::Expr(ExprError::TypeMismatch { .. })));
}

#[test]
fn chained_filters_equal_conjunction() {
    let session = Session::new();
    let values = longs(
        &session,
        "x",
        &[Some(1), None, Some(7), Some(12), Some(4), None, Some(9)],
    );
    let p1 = || col("x").gt(lit(3));
    let p2 = || (col("x") % lit(2)).eq(lit(1));

    let chained = values.filter(p1()).unwrap().filter(p2()).unwrap();
    let conjunction = values.filter(p1().and(p2())).unwrap();
    assert_eq!(chained.collect().unwrap(), conjunction.collect().unwrap());
    assert_eq!(
        chained.collect().unwrap(),
        vec![Row::new(vec![Value::I64(7)]), Row::new(vec![Value::I64(9)])]
    );

    // The first relation is untouched by the second filter.
    assert_eq!(values.filter(p1()).unwrap().count().unwrap(), 4);
}

#[test]
fn chained_filters_evaluate_every_predicate() {
    let session = Session::new();
    let values = longs(&session, "x", &[Some(i64::MAX)]);
    let filtered = values
        .filter(col("x").lt(lit(0)))
        .unwrap()
        .filter((col("x") + lit(1)).gt(lit(0)))
        .unwrap();
    let err = filtered.collect().unwrap_err();
    assert!(matches!(err, FrameError::Expr(ExprError::Overflow { .. })));
}

#[test]
fn with_column_replaces_in_place() {
    let flights = flights();
    let replaced = flights
        .with_column("count", col("count").cast(DataType::F64))
        .unwrap();
    assert_eq!(replaced.columns(), flights.columns());
    assert_eq!(replaced.schema().field(2).data_type(), &DataType::F64);
    assert_eq!(replaced.first().unwrap().unwrap()[2], Value::F64(15.0));
}

#[test]
fn drop_ignores_absent_names_and_is_idempotent() {
    let flights = flights();
    let once = flights.drop(&["ORIGIN_COUNTRY_NAME", "nope"]).unwrap();
    assert_eq!(once.columns(), ["DEST_COUNTRY_NAME", "count"]);
    let twice = once.drop(&["ORIGIN_COUNTRY_NAME"]).unwrap();
    assert_eq!(twice.columns(), once.columns());
    assert_eq!(twice.collect().unwrap(), once.collect().unwrap());

    let selected = twice.select_columns(&["DEST_COUNTRY_NAME", "count"]).unwrap();
    assert_eq!(selected.collect().unwrap(), once.collect().unwrap());
}

#[test]
fn rename_round_trip_preserves_values() {
    let flights = flights();
    let original = flights.select_columns(&["count"]).unwrap();
    let round_trip = flights
        .select([col("count").alias("tmp")])
        .unwrap()
        .with_column_renamed("tmp", "count")
        .unwrap();
    assert_eq!(round_trip.schema(), original.schema());
    assert_eq!(round_trip.collect().unwrap(), original.collect().unwrap());

    let back = flights
        .with_column_renamed("count", "c")
        .unwrap()
        .with_column_renamed("c", "count")
        .unwrap();
    assert_eq!(back.collect().unwrap(), flights.collect().unwrap());
}

#[test]
fn take_is_deterministic() {
    let flights = flights();
    let a = flights.take(5).unwrap();
    let b = flights.take(5).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.len(), 5);
    assert_eq!(flights.take(100).unwrap().len(), 12);
}

#[test]
fn take_pulls_only_what_it_needs() {
    let session = Session::new();
    let values = longs(&session, "x", &[Some(1), Some(2), Some(i64::MAX)]);
    let next = values.with_column("next", col("x") + lit(1)).unwrap();

    // The third row overflows, but take(2) never evaluates it.
    assert_eq!(next.take(2).unwrap().len(), 2);
    assert!(next.limit(2).collect().is_ok());
    assert!(next.collect().is_err());
}

#[test]
fn limit_caps_rows() {
    let flights = flights();
    assert_eq!(flights.limit(3).count().unwrap(), 3);
    assert_eq!(flights.limit(3).take(10).unwrap(), flights.take(3).unwrap());
    assert_eq!(flights.limit(0).count().unwrap(), 0);
}

#[test]
fn order_by_sorts_with_nulls_placed_by_direction() {
    let session = Session::new();
    let values = longs(&session, "x", &[Some(3), None, Some(1), Some(2)]);
    let column = |r: &Relation| -> Vec<Value> {
        r.collect().unwrap().into_iter().map(|row| row[0].clone()).collect()
    };

    let asc = values.order_by([SortKey::asc(col("x"))]).unwrap();
    assert_eq!(
        column(&asc),
        [Value::Null, Value::I64(1), Value::I64(2), Value::I64(3)]
    );
    let desc = values.order_by([SortKey::desc(col("x"))]).unwrap();
    assert_eq!(
        column(&desc),
        [Value::I64(3), Value::I64(2), Value::I64(1), Value::Null]
    );

    let top = flights()
        .order_by([SortKey::desc(col("count"))])
        .unwrap()
        .first()
        .unwrap()
        .unwrap();
    assert_eq!(top[2], Value::I64(370002));
}

#[test]
fn distinct_keeps_first_occurrences() {
    let flights = flights();
    let destinations = flights
        .select_columns(&["DEST_COUNTRY_NAME"])
        .unwrap()
        .distinct();
    let rows = destinations.collect().unwrap();
    assert_eq!(rows.len(), 5);
    assert_eq!(rows[0][0], Value::string("United States"));
    assert_eq!(rows[1][0], Value::string("Egypt"));
}

#[test]
fn instr_over_retail_descriptions() {
    let retail = Session::new()
        .read()
        .header(true)
        .infer_schema(true)
        .csv(fixture_path("retail"))
        .unwrap();
    let warmers = retail
        .with_column("pos", instr(col("Description"), "HAND WARMER"))
        .unwrap()
        .filter(col("pos").gt_eq(lit(1)))
        .unwrap()
        .select_columns(&["Description"])
        .unwrap();
    let names: Vec<Value> = warmers
        .collect()
        .unwrap()
        .into_iter()
        .map(|row| row[0].clone())
        .collect();
    assert_eq!(
        names,
        [
            Value::string("HAND WARMER UNION JACK"),
            Value::string("HAND WARMER MUFF")
        ]
    );
}

#[test]
fn null_predicates_exclude_rows() {
    let session = Session::new();
    let values = longs(&session, "x", &[Some(1), None, Some(5)]);
    let kept = values.filter(col("x").gt(lit(2)).or(lit(false))).unwrap();
    assert_eq!(kept.collect().unwrap(), vec![Row::new(vec![Value::I64(5)])]);
}

#[test]
fn create_relation_validates_rows() {
    let schema = Schema::try_new(vec![Field::new("x", DataType::I64, false)]).unwrap();
    let err = Session::new()
        .create_relation(
            schema,
            vec![Row::new(vec![Value::I64(1)]), Row::new(vec![Value::Null])],
        )
        .unwrap_err();
    match err {
        FrameError::RowMismatch { index, .. } => assert_eq!(index, 1),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn relations_are_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Relation>();
}
