//! Immutable relations: transformations build plan nodes, actions run them.

use std::sync::Arc;

use arrow::record_batch::RecordBatch;
use rayon::prelude::*;
use rowframe_arrow::rows_to_record_batch;
use rowframe_core::{DataType, Field, FileReport, Row, Schema, SchemaRef, format_schema};
use rowframe_expr::{Expr, ExprError, PhysicalExpr, col, parse_expr, parse_named_expr};
use tracing::debug;

use crate::{
    error::FrameError,
    plan::{BoundSortKey, Plan, RowStream, partition_ranges},
    session::SessionConfig,
    show::render_rows,
    stats::{CoMoments, ColumnAccumulator, Summary},
};

/// Ordering for [`Relation::order_by`]. Ascending keys put nulls first,
/// descending keys put them last.
#[derive(Debug, Clone, PartialEq)]
pub struct SortKey {
    pub expr: Expr,
    pub descending: bool,
}

impl SortKey {
    pub fn asc(expr: Expr) -> Self {
        Self {
            expr,
            descending: false,
        }
    }

    pub fn desc(expr: Expr) -> Self {
        Self {
            expr,
            descending: true,
        }
    }
}

/// A schema plus a lazy plan producing rows of that schema.
///
/// Transformations never modify `self`; they return a new relation whose
/// plan references this one's. Cloning is cheap.
#[derive(Debug, Clone)]
pub struct Relation {
    schema: SchemaRef,
    plan: Arc<Plan>,
    reports: Arc<Vec<FileReport>>,
    config: Arc<SessionConfig>,
}

impl Relation {
    pub(crate) fn from_rows(
        config: Arc<SessionConfig>,
        schema: Schema,
        rows: Vec<Row>,
        reports: Vec<FileReport>,
    ) -> Self {
        Self {
            schema: Arc::new(schema),
            plan: Arc::new(Plan::Scan { rows }),
            reports: Arc::new(reports),
            config,
        }
    }

    fn derive(&self, schema: Schema, plan: Plan) -> Self {
        Self {
            schema: Arc::new(schema),
            plan: Arc::new(plan),
            reports: Arc::clone(&self.reports),
            config: Arc::clone(&self.config),
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn columns(&self) -> Vec<&str> {
        self.schema.names().collect()
    }

    /// Per-file outcome of the read this relation descends from. Empty for
    /// relations built in memory.
    pub fn read_report(&self) -> &[FileReport] {
        &self.reports
    }

    fn column(&self, index: usize) -> Result<PhysicalExpr, FrameError> {
        Ok(col(&self.schema.field(index).name).bind(&self.schema)?)
    }

    fn project(&self, named: Vec<(String, PhysicalExpr)>) -> Result<Self, FrameError> {
        let fields = named
            .iter()
            .map(|(name, expr)| Field::new(name, expr.data_type().clone(), expr.nullable()))
            .collect::<Vec<_>>();
        let schema = Schema::try_new(fields)?;
        let plan = Plan::Project {
            input: Arc::clone(&self.plan),
            exprs: named.into_iter().map(|(_, expr)| expr).collect(),
        };
        Ok(self.derive(schema, plan))
    }

    /// Project `exprs` in order. Output columns are named after the
    /// expression (see [`Expr::output_name`]).
    pub fn select(&self, exprs: impl IntoIterator<Item = Expr>) -> Result<Self, FrameError> {
        let named = exprs
            .into_iter()
            .map(|expr| Ok((expr.output_name(), expr.bind(&self.schema)?)))
            .collect::<Result<Vec<_>, FrameError>>()?;
        self.project(named)
    }

    pub fn select_columns(&self, names: &[&str]) -> Result<Self, FrameError> {
        self.select(names.iter().map(|name| col(*name)))
    }

    /// Project text expressions such as `"upper(name) AS up"`.
    pub fn select_expr(&self, exprs: &[&str]) -> Result<Self, FrameError> {
        let parsed = exprs
            .iter()
            .map(|text| parse_named_expr(text))
            .collect::<Result<Vec<_>, _>>()?;
        self.select(parsed)
    }

    /// Keep rows for which `predicate` is `true`.
    ///
    /// Filtering a filtered relation extends the existing filter node, so
    /// `r.filter(a)?.filter(b)?` runs one node evaluating `a` and `b` on
    /// every row.
    pub fn filter(&self, predicate: Expr) -> Result<Self, FrameError> {
        let bound = predicate.bind(&self.schema)?;
        if !matches!(bound.data_type(), DataType::Bool | DataType::Null) {
            return Err(ExprError::TypeMismatch {
                op: "filter".to_string(),
                detail: format!("predicate {predicate} is {}, not boolean", bound.data_type()),
            }
            .into());
        }

        let plan = match self.plan.as_ref() {
            Plan::Filter { input, predicates } => {
                let mut predicates = predicates.clone();
                predicates.push(bound);
                Plan::Filter {
                    input: Arc::clone(input),
                    predicates,
                }
            }
            _ => Plan::Filter {
                input: Arc::clone(&self.plan),
                predicates: vec![bound],
            },
        };
        Ok(self.derive(self.schema.as_ref().clone(), plan))
    }

    /// Alias of [`filter`](Self::filter).
    pub fn where_(&self, predicate: Expr) -> Result<Self, FrameError> {
        self.filter(predicate)
    }

    /// [`filter`](Self::filter) with a text predicate such as `"count > 3000"`.
    pub fn filter_expr(&self, predicate: &str) -> Result<Self, FrameError> {
        self.filter(parse_expr(predicate)?)
    }

    pub fn where_expr(&self, predicate: &str) -> Result<Self, FrameError> {
        self.filter_expr(predicate)
    }

    /// Append a column, or replace the column called `name` in place.
    pub fn with_column(&self, name: &str, expr: Expr) -> Result<Self, FrameError> {
        let bound = expr.bind(&self.schema)?;
        let mut named = (0..self.schema.len())
            .map(|i| Ok((self.schema.field(i).name.clone(), self.column(i)?)))
            .collect::<Result<Vec<_>, FrameError>>()?;
        match self.schema.position(name) {
            Some(i) => named[i].1 = bound,
            None => named.push((name.to_string(), bound)),
        }
        self.project(named)
    }

    /// Remove the named columns. Names that do not exist are ignored.
    pub fn drop(&self, names: &[&str]) -> Result<Self, FrameError> {
        let keep: Vec<usize> = (0..self.schema.len())
            .filter(|&i| !names.contains(&self.schema.field(i).name.as_str()))
            .collect();
        if keep.len() == self.schema.len() {
            return Ok(self.clone());
        }
        let named = keep
            .into_iter()
            .map(|i| Ok((self.schema.field(i).name.clone(), self.column(i)?)))
            .collect::<Result<Vec<_>, FrameError>>()?;
        self.project(named)
    }

    /// Rename one column. Values are untouched, so the plan is shared.
    pub fn with_column_renamed(&self, old: &str, new: &str) -> Result<Self, FrameError> {
        let index = self.schema.index_of(old)?;
        let fields = self
            .schema
            .fields()
            .iter()
            .enumerate()
            .map(|(i, f)| if i == index { f.with_name(new) } else { f.clone() })
            .collect::<Vec<_>>();
        Ok(Self {
            schema: Arc::new(Schema::try_new(fields)?),
            ..self.clone()
        })
    }

    /// At most `n` rows.
    pub fn limit(&self, n: usize) -> Self {
        self.derive(
            self.schema.as_ref().clone(),
            Plan::Limit {
                input: Arc::clone(&self.plan),
                limit: n,
            },
        )
    }

    /// Stable sort by `keys`, most significant first.
    pub fn order_by(&self, keys: impl IntoIterator<Item = SortKey>) -> Result<Self, FrameError> {
        let keys = keys
            .into_iter()
            .map(|key| {
                Ok(BoundSortKey {
                    expr: key.expr.bind(&self.schema)?,
                    descending: key.descending,
                })
            })
            .collect::<Result<Vec<_>, FrameError>>()?;
        Ok(self.derive(
            self.schema.as_ref().clone(),
            Plan::Sort {
                input: Arc::clone(&self.plan),
                keys,
            },
        ))
    }

    /// Drop duplicate rows, keeping first occurrences in order.
    pub fn distinct(&self) -> Self {
        self.derive(
            self.schema.as_ref().clone(),
            Plan::Distinct {
                input: Arc::clone(&self.plan),
            },
        )
    }

    fn stream(&self) -> RowStream<'_> {
        self.plan.execute(None)
    }

    pub fn collect(&self) -> Result<Vec<Row>, FrameError> {
        self.stream().collect()
    }

    /// The first `n` rows. Row-preserving chains pull no more than `n`
    /// rows from the source.
    pub fn take(&self, n: usize) -> Result<Vec<Row>, FrameError> {
        self.stream().take(n).collect()
    }

    pub fn first(&self) -> Result<Option<Row>, FrameError> {
        Ok(self.take(1)?.into_iter().next())
    }

    pub fn count(&self) -> Result<usize, FrameError> {
        self.aggregate(|| 0usize, |n, _| Ok(n + 1), |a, b| a + b)
    }

    /// Print up to `n` rows as a table.
    pub fn show(&self, n: usize, truncate: bool) -> Result<(), FrameError> {
        print!("{}", self.show_string(n, truncate)?);
        Ok(())
    }

    /// [`show`](Self::show) with the session's default row count, truncating.
    pub fn show_default(&self) -> Result<(), FrameError> {
        self.show(self.config.show_rows, true)
    }

    /// The text [`show`](Self::show) prints.
    pub fn show_string(&self, n: usize, truncate: bool) -> Result<String, FrameError> {
        let mut rows = self.take(n.saturating_add(1))?;
        let more = rows.len() > n;
        rows.truncate(n);
        let width = truncate.then_some(self.config.truncate_width);
        render_rows(&self.schema, &rows, width, more)
    }

    pub fn print_schema(&self) {
        print!("{}", self.schema_string());
    }

    /// The `printSchema` tree.
    pub fn schema_string(&self) -> String {
        format_schema(&self.schema)
    }

    /// Count, mean, sample stddev, min and max of every column.
    pub fn describe(&self) -> Result<Summary, FrameError> {
        let indices = (0..self.schema.len()).collect();
        self.summarize(indices)
    }

    pub fn describe_columns(&self, names: &[&str]) -> Result<Summary, FrameError> {
        let indices = names
            .iter()
            .map(|name| self.schema.index_of(name))
            .collect::<Result<Vec<_>, _>>()?;
        self.summarize(indices)
    }

    fn summarize(&self, indices: Vec<usize>) -> Result<Summary, FrameError> {
        let init = || {
            indices
                .iter()
                .map(|&i| ColumnAccumulator::new(self.schema.field(i).data_type()))
                .collect::<Vec<_>>()
        };
        let accumulators = self.aggregate(
            init,
            |mut accs, row| {
                for (acc, &i) in accs.iter_mut().zip(&indices) {
                    acc.update(&row[i]).map_err(ExprError::from)?;
                }
                Ok(accs)
            },
            |a, b| a.into_iter().zip(b).map(|(a, b)| a.merge(b)).collect(),
        )?;

        let columns = accumulators
            .into_iter()
            .zip(&indices)
            .map(|(acc, &i)| acc.finish(&self.schema.field(i).name))
            .collect();
        Ok(Summary::new(columns, Arc::clone(&self.config)))
    }

    /// Pearson correlation of two numeric columns over rows where both are
    /// non-null. `None` with fewer than two pairs or zero variance.
    pub fn corr(&self, a: &str, b: &str) -> Result<Option<f64>, FrameError> {
        let ia = self.numeric_column("corr", a)?;
        let ib = self.numeric_column("corr", b)?;
        let moments = self.aggregate(
            CoMoments::default,
            |mut acc, row| {
                let x = row[ia].as_f64_lossy().map_err(ExprError::from)?;
                let y = row[ib].as_f64_lossy().map_err(ExprError::from)?;
                if let (Some(x), Some(y)) = (x, y) {
                    acc.update(x, y);
                }
                Ok(acc)
            },
            CoMoments::merge,
        )?;
        Ok(moments.correlation())
    }

    fn numeric_column(&self, op: &str, name: &str) -> Result<usize, FrameError> {
        let index = self.schema.index_of(name)?;
        let data_type = self.schema.field(index).data_type();
        if !data_type.is_numeric() {
            return Err(ExprError::TypeMismatch {
                op: op.to_string(),
                detail: format!("column '{name}' is {data_type}, expected long or double"),
            }
            .into());
        }
        Ok(index)
    }

    /// Collect into one Arrow `RecordBatch`.
    pub fn to_record_batch(&self) -> Result<RecordBatch, FrameError> {
        Ok(rows_to_record_batch(&self.schema, &self.collect()?)?)
    }

    /// Fold every row into an accumulator. Plans without a limit, sort, or
    /// distinct are split into `target_partitions` scan ranges folded on the
    /// rayon pool and merged in order.
    fn aggregate<A, I, F, M>(&self, identity: I, fold: F, merge: M) -> Result<A, FrameError>
    where
        A: Send,
        I: Fn() -> A + Sync + Send,
        F: Fn(A, &Row) -> Result<A, FrameError> + Sync,
        M: Fn(A, A) -> A + Sync + Send,
    {
        let partitions = self.config.target_partitions;
        match self.plan.partitionable_len() {
            Some(len) if partitions > 1 => {
                let ranges = partition_ranges(len, partitions);
                debug!(rows = len, partitions = ranges.len(), "parallel aggregation");
                ranges
                    .into_par_iter()
                    .map(|range| fold_rows(self.plan.execute(Some(range)), identity(), &fold))
                    .try_reduce(&identity, |a, b| Ok(merge(a, b)))
            }
            _ => fold_rows(self.stream(), identity(), &fold),
        }
    }
}

fn fold_rows<A>(
    rows: RowStream<'_>,
    init: A,
    fold: &impl Fn(A, &Row) -> Result<A, FrameError>,
) -> Result<A, FrameError> {
    let mut acc = init;
    for row in rows {
        acc = fold(acc, &row?)?;
    }
    Ok(acc)
}
