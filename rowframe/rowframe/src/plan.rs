//! Plan nodes and the pull-based executor.
//!
//! A [`Plan`] is an immutable node; transformations wrap the upstream node
//! in a new one behind an `Arc`, so relations share their common prefix and
//! the graph is acyclic by construction. Executing a node returns an
//! iterator that pulls rows from its input on demand.

use std::{cmp::Ordering, collections::HashSet, iter, ops::Range, sync::Arc};

use rowframe_core::{Row, Value};
use rowframe_expr::PhysicalExpr;

use crate::error::FrameError;

pub(crate) type RowStream<'a> = Box<dyn Iterator<Item = Result<Row, FrameError>> + 'a>;

#[derive(Debug)]
pub(crate) enum Plan {
    /// Decoded or in-memory rows.
    Scan { rows: Vec<Row> },
    Project {
        input: Arc<Plan>,
        exprs: Vec<PhysicalExpr>,
    },
    /// Keeps a row only when every predicate is `true`. All predicates are
    /// evaluated for every row reaching the node.
    Filter {
        input: Arc<Plan>,
        predicates: Vec<PhysicalExpr>,
    },
    Limit { input: Arc<Plan>, limit: usize },
    Sort {
        input: Arc<Plan>,
        keys: Vec<BoundSortKey>,
    },
    /// Keeps the first occurrence of each row.
    Distinct { input: Arc<Plan> },
}

#[derive(Debug)]
pub(crate) struct BoundSortKey {
    pub(crate) expr: PhysicalExpr,
    pub(crate) descending: bool,
}

impl Plan {
    /// Number of scanned rows when the plan only maps and filters them, which
    /// lets the scan be split into independent ranges. `None` when a limit,
    /// sort, or distinct sits above the scan.
    pub(crate) fn partitionable_len(&self) -> Option<usize> {
        match self {
            Plan::Scan { rows } => Some(rows.len()),
            Plan::Project { input, .. } | Plan::Filter { input, .. } => input.partitionable_len(),
            Plan::Limit { .. } | Plan::Sort { .. } | Plan::Distinct { .. } => None,
        }
    }

    /// Pull rows through the plan. `range` restricts the scan and is only
    /// meaningful when [`partitionable_len`](Self::partitionable_len) is
    /// `Some`.
    pub(crate) fn execute(&self, range: Option<Range<usize>>) -> RowStream<'_> {
        match self {
            Plan::Scan { rows } => {
                let rows = match range {
                    Some(range) => &rows[range.start.min(rows.len())..range.end.min(rows.len())],
                    None => &rows[..],
                };
                Box::new(rows.iter().cloned().map(Ok))
            }
            Plan::Project { input, exprs } => Box::new(
                input
                    .execute(range)
                    .map(move |row| project(exprs, &row?)),
            ),
            Plan::Filter { input, predicates } => {
                Box::new(input.execute(range).filter_map(move |row| {
                    let row = match row {
                        Ok(row) => row,
                        Err(e) => return Some(Err(e)),
                    };
                    match keep_row(predicates, &row) {
                        Ok(true) => Some(Ok(row)),
                        Ok(false) => None,
                        Err(e) => Some(Err(e)),
                    }
                }))
            }
            Plan::Limit { input, limit } => Box::new(input.execute(None).take(*limit)),
            Plan::Sort { input, keys } => match sort_rows(input.execute(None), keys) {
                Ok(rows) => Box::new(rows.into_iter().map(Ok)),
                Err(e) => Box::new(iter::once(Err(e))),
            },
            Plan::Distinct { input } => {
                let mut seen = HashSet::new();
                Box::new(input.execute(None).filter(move |row| match row {
                    Ok(row) => seen.insert(row_key(row)),
                    Err(_) => true,
                }))
            }
        }
    }
}

fn project(exprs: &[PhysicalExpr], row: &Row) -> Result<Row, FrameError> {
    exprs
        .iter()
        .map(|expr| expr.evaluate(row))
        .collect::<Result<Row, _>>()
        .map_err(FrameError::from)
}

fn keep_row(predicates: &[PhysicalExpr], row: &Row) -> Result<bool, FrameError> {
    let mut keep = true;
    for predicate in predicates {
        keep &= predicate.evaluate_predicate(row)?;
    }
    Ok(keep)
}

fn sort_rows(input: RowStream<'_>, keys: &[BoundSortKey]) -> Result<Vec<Row>, FrameError> {
    let mut keyed = input
        .map(|row| -> Result<_, FrameError> {
            let row = row?;
            let key = keys
                .iter()
                .map(|k| k.expr.evaluate(&row))
                .collect::<Result<Vec<_>, _>>()?;
            Ok((key, row))
        })
        .collect::<Result<Vec<_>, _>>()?;

    keyed.sort_by(|(a, _), (b, _)| {
        keys.iter()
            .zip(a.iter().zip(b))
            .map(|(key, (a, b))| {
                let ord = compare_values(a, b);
                if key.descending { ord.reverse() } else { ord }
            })
            .find(|ord| ord.is_ne())
            .unwrap_or(Ordering::Equal)
    });
    Ok(keyed.into_iter().map(|(_, row)| row).collect())
}

/// Total order used by sorting: null first, numbers compared after widening,
/// nested values element by element.
pub(crate) fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Less,
        (_, Value::Null) => Ordering::Greater,
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        (Value::I64(a), Value::I64(b)) => a.cmp(b),
        (Value::F64(a), Value::F64(b)) => a.total_cmp(b),
        (Value::I64(a), Value::F64(b)) => (*a as f64).total_cmp(b),
        (Value::F64(a), Value::I64(b)) => a.total_cmp(&(*b as f64)),
        (Value::String(a), Value::String(b)) => a.cmp(b),
        (Value::Struct(a), Value::Struct(b)) | (Value::List(a), Value::List(b)) => a
            .iter()
            .zip(b)
            .map(|(a, b)| compare_values(a, b))
            .find(|ord| ord.is_ne())
            .unwrap_or_else(|| a.len().cmp(&b.len())),
        _ => a.type_name().cmp(b.type_name()),
    }
}

/// Hashable image of a value for duplicate detection.
#[derive(Debug, PartialEq, Eq, Hash)]
enum ValueKey {
    Null,
    Bool(bool),
    I64(i64),
    F64(u64),
    String(Arc<str>),
    Struct(Vec<ValueKey>),
    List(Vec<ValueKey>),
}

fn value_key(value: &Value) -> ValueKey {
    match value {
        Value::Null => ValueKey::Null,
        Value::Bool(v) => ValueKey::Bool(*v),
        Value::I64(v) => ValueKey::I64(*v),
        // -0.0 equals 0.0 and every NaN is one value.
        Value::F64(v) if *v == 0.0 => ValueKey::F64(0.0f64.to_bits()),
        Value::F64(v) if v.is_nan() => ValueKey::F64(f64::NAN.to_bits()),
        Value::F64(v) => ValueKey::F64(v.to_bits()),
        Value::String(v) => ValueKey::String(Arc::clone(v)),
        Value::Struct(children) => ValueKey::Struct(children.iter().map(value_key).collect()),
        Value::List(items) => ValueKey::List(items.iter().map(value_key).collect()),
    }
}

fn row_key(row: &Row) -> Vec<ValueKey> {
    row.iter().map(value_key).collect()
}

/// Split `0..len` into at most `parts` contiguous, non-empty ranges.
pub(crate) fn partition_ranges(len: usize, parts: usize) -> Vec<Range<usize>> {
    if len == 0 {
        return Vec::new();
    }
    let chunk = len.div_ceil(parts.max(1));
    (0..len)
        .step_by(chunk)
        .map(|start| start..(start + chunk).min(len))
        .collect()
}
