//! Mergeable aggregate states for `describe` and `corr`.
//!
//! Each partition folds its rows into a partial state; partial states merge
//! pairwise with the parallel update of Chan et al., so the result does not
//! depend on how the scan was split.

use std::{cmp::Ordering, sync::Arc};

use rowframe_core::{DataType, Field, Row, Schema, Value, ValueTypeError};

use crate::{error::FrameError, plan::compare_values, relation::Relation, session::SessionConfig};

/// Count, mean, and sum of squared deviations of a numeric stream.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct Moments {
    count: u64,
    mean: f64,
    m2: f64,
}

impl Moments {
    pub(crate) fn update(&mut self, x: f64) {
        self.count += 1;
        let delta = x - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (x - self.mean);
    }

    pub(crate) fn merge(self, other: Self) -> Self {
        if self.count == 0 {
            return other;
        }
        if other.count == 0 {
            return self;
        }
        let (na, nb) = (self.count as f64, other.count as f64);
        let count = self.count + other.count;
        let n = count as f64;
        let delta = other.mean - self.mean;
        Self {
            count,
            mean: self.mean + delta * nb / n,
            m2: self.m2 + other.m2 + delta * delta * na * nb / n,
        }
    }

    pub(crate) fn mean(&self) -> Option<f64> {
        (self.count > 0).then_some(self.mean)
    }

    /// Sample standard deviation (divisor n - 1).
    pub(crate) fn stddev(&self) -> Option<f64> {
        (self.count > 1).then(|| (self.m2 / (self.count - 1) as f64).sqrt())
    }
}

/// Running co-moments of paired observations.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct CoMoments {
    count: u64,
    mean_x: f64,
    mean_y: f64,
    m2_x: f64,
    m2_y: f64,
    c_xy: f64,
}

impl CoMoments {
    pub(crate) fn update(&mut self, x: f64, y: f64) {
        self.count += 1;
        let n = self.count as f64;
        let dx = x - self.mean_x;
        let dy = y - self.mean_y;
        self.mean_x += dx / n;
        self.mean_y += dy / n;
        self.m2_x += dx * (x - self.mean_x);
        self.m2_y += dy * (y - self.mean_y);
        self.c_xy += dx * (y - self.mean_y);
    }

    pub(crate) fn merge(self, other: Self) -> Self {
        if self.count == 0 {
            return other;
        }
        if other.count == 0 {
            return self;
        }
        let (na, nb) = (self.count as f64, other.count as f64);
        let count = self.count + other.count;
        let n = count as f64;
        let dx = other.mean_x - self.mean_x;
        let dy = other.mean_y - self.mean_y;
        let weight = na * nb / n;
        Self {
            count,
            mean_x: self.mean_x + dx * nb / n,
            mean_y: self.mean_y + dy * nb / n,
            m2_x: self.m2_x + other.m2_x + dx * dx * weight,
            m2_y: self.m2_y + other.m2_y + dy * dy * weight,
            c_xy: self.c_xy + other.c_xy + dx * dy * weight,
        }
    }

    /// Pearson correlation; `None` with fewer than two pairs or when either
    /// side has zero variance.
    pub(crate) fn correlation(&self) -> Option<f64> {
        if self.count < 2 || self.m2_x == 0.0 || self.m2_y == 0.0 {
            return None;
        }
        Some(self.c_xy / (self.m2_x * self.m2_y).sqrt())
    }
}

/// Partial `describe` state for one column.
#[derive(Debug, Clone)]
pub(crate) struct ColumnAccumulator {
    numeric: bool,
    count: u64,
    moments: Moments,
    min: Option<Value>,
    max: Option<Value>,
}

impl ColumnAccumulator {
    pub(crate) fn new(data_type: &DataType) -> Self {
        Self {
            numeric: data_type.is_numeric(),
            count: 0,
            moments: Moments::default(),
            min: None,
            max: None,
        }
    }

    pub(crate) fn update(&mut self, value: &Value) -> Result<(), ValueTypeError> {
        if value.is_null() {
            return Ok(());
        }
        self.count += 1;
        if !self.numeric {
            return Ok(());
        }
        if let Some(x) = value.as_f64_lossy()? {
            self.moments.update(x);
        }
        self.min = Some(pick(self.min.take(), value.clone(), Ordering::Less));
        self.max = Some(pick(self.max.take(), value.clone(), Ordering::Greater));
        Ok(())
    }

    pub(crate) fn merge(self, other: Self) -> Self {
        let min = match other.min {
            Some(v) => Some(pick(self.min, v, Ordering::Less)),
            None => self.min,
        };
        let max = match other.max {
            Some(v) => Some(pick(self.max, v, Ordering::Greater)),
            None => self.max,
        };
        Self {
            numeric: self.numeric,
            count: self.count + other.count,
            moments: self.moments.merge(other.moments),
            min,
            max,
        }
    }

    pub(crate) fn finish(self, name: &str) -> ColumnStats {
        ColumnStats {
            name: name.to_string(),
            count: self.count,
            mean: self.moments.mean(),
            stddev: self.moments.stddev(),
            min: self.min,
            max: self.max,
        }
    }
}

/// Keep `current` unless `candidate` orders `wanted` relative to it.
fn pick(current: Option<Value>, candidate: Value, wanted: Ordering) -> Value {
    match current {
        Some(current) if compare_values(&candidate, &current) != wanted => current,
        _ => candidate,
    }
}

/// Statistics for one column of a [`Summary`]. Non-numeric columns only
/// carry `count`.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnStats {
    pub name: String,
    /// Non-null values.
    pub count: u64,
    pub mean: Option<f64>,
    /// Sample standard deviation; `None` below two values.
    pub stddev: Option<f64>,
    pub min: Option<Value>,
    pub max: Option<Value>,
}

/// Result of [`Relation::describe`].
#[derive(Debug, Clone)]
pub struct Summary {
    columns: Vec<ColumnStats>,
    config: Arc<SessionConfig>,
}

impl Summary {
    pub(crate) fn new(columns: Vec<ColumnStats>, config: Arc<SessionConfig>) -> Self {
        Self { columns, config }
    }

    pub fn columns(&self) -> &[ColumnStats] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&ColumnStats> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// The summary as a relation with a leading `summary` column and one
    /// string column per described field:
    ///
    /// ```text
    /// +---------+------+
    /// | summary | n    |
    /// +---------+------+
    /// | count   | 3    |
    /// | mean    | 10.0 |
    /// | stddev  | 5.0  |
    /// | min     | 5    |
    /// | max     | 15   |
    /// +---------+------+
    /// ```
    ///
    /// When a described column is itself called `summary`, the leading
    /// column takes underscores until its name is free (`summary_`).
    pub fn to_relation(&self) -> Result<Relation, FrameError> {
        let mut label = "summary".to_string();
        while self.columns.iter().any(|c| c.name == label) {
            label.push('_');
        }
        let mut fields = vec![Field::new(label, DataType::String, false)];
        fields.extend(
            self.columns
                .iter()
                .map(|c| Field::new(&c.name, DataType::String, true)),
        );
        let schema = Schema::try_new(fields)?;

        let text = |v: Option<Value>| v.map_or(Value::Null, |v| Value::from(v.to_string()));
        let statistic = |label: &str, cell: &dyn Fn(&ColumnStats) -> Value| {
            std::iter::once(Value::from(label))
                .chain(self.columns.iter().map(cell))
                .collect::<Row>()
        };
        let rows = vec![
            statistic("count", &|c| Value::from(c.count.to_string())),
            statistic("mean", &|c| text(c.mean.map(Value::F64))),
            statistic("stddev", &|c| text(c.stddev.map(Value::F64))),
            statistic("min", &|c| text(c.min.clone())),
            statistic("max", &|c| text(c.max.clone())),
        ];
        Ok(Relation::from_rows(
            Arc::clone(&self.config),
            schema,
            rows,
            Vec::new(),
        ))
    }
}
