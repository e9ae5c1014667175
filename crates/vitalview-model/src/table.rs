use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::ModelError;
use crate::metric::{Metric, Reading};
use crate::recording::TIME_COLUMN;

/// One aligned sample: the timeline instant plus one reading per metric
/// column of the owning table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Row {
    pub time: DateTime<Utc>,
    pub readings: Vec<Reading>,
}

impl Row {
    pub fn new(time: DateTime<Utc>, readings: Vec<Reading>) -> Self {
        Self { time, readings }
    }
}

/// Per-subject table: `Time` followed by the metrics present for the subject.
///
/// Every row holds exactly one reading per metric column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubjectTable {
    pub subject: String,
    metrics: Vec<Metric>,
    rows: Vec<Row>,
}

impl SubjectTable {
    pub fn new(subject: impl Into<String>, metrics: Vec<Metric>) -> Self {
        Self {
            subject: subject.into(),
            metrics,
            rows: Vec::new(),
        }
    }

    /// Append a row; its readings must match the metric columns one to one.
    pub fn push_row(&mut self, row: Row) -> Result<(), ModelError> {
        if row.readings.len() != self.metrics.len() {
            return Err(ModelError::RowArity {
                subject: self.subject.clone(),
                expected: self.metrics.len(),
                actual: row.readings.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    /// Metric columns in table order.
    pub fn metrics(&self) -> &[Metric] {
        &self.metrics
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Column names, always starting with `Time`.
    pub fn columns(&self) -> Vec<&'static str> {
        std::iter::once(TIME_COLUMN)
            .chain(self.metrics.iter().map(|metric| metric.channel_name()))
            .collect()
    }

    /// Position of a column by name, counting `Time` as column 0.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns().iter().position(|column| *column == name)
    }

    /// Position of `metric` inside [`Row::readings`].
    pub fn metric_index(&self, metric: Metric) -> Option<usize> {
        self.metrics.iter().position(|m| *m == metric)
    }

    pub fn has_metric(&self, metric: Metric) -> bool {
        self.metric_index(metric).is_some()
    }

    /// All readings of one metric column, or `None` if the subject lacks it.
    pub fn readings(&self, metric: Metric) -> Option<impl Iterator<Item = Reading> + '_> {
        let index = self.metric_index(metric)?;
        Some(self.rows.iter().map(move |row| row.readings[index]))
    }

    /// Resolve a column name to a metric of this table.
    pub fn metric_for_column(&self, column: &str) -> Result<Metric, ModelError> {
        if column == TIME_COLUMN {
            return Err(ModelError::NotAMetric {
                column: column.to_string(),
            });
        }
        Metric::from_channel_name(column)
            .filter(|metric| self.has_metric(*metric))
            .ok_or_else(|| ModelError::UnknownColumn {
                subject: self.subject.clone(),
                column: column.to_string(),
            })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Subject tables keyed by subject identifier, in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Dataset {
    tables: Vec<SubjectTable>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a table. Subject identifiers must be unique.
    pub fn insert(&mut self, table: SubjectTable) -> Result<(), ModelError> {
        if self.get(&table.subject).is_some() {
            return Err(ModelError::DuplicateSubject {
                subject: table.subject,
            });
        }
        self.tables.push(table);
        Ok(())
    }

    pub fn get(&self, subject: &str) -> Option<&SubjectTable> {
        self.tables.iter().find(|table| table.subject == subject)
    }

    pub fn subjects(&self) -> impl Iterator<Item = &str> {
        self.tables.iter().map(|table| table.subject.as_str())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SubjectTable> {
        self.tables.iter()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a SubjectTable;
    type IntoIter = std::slice::Iter<'a, SubjectTable>;

    fn into_iter(self) -> Self::IntoIter {
        self.tables.iter()
    }
}

impl IntoIterator for Dataset {
    type Item = SubjectTable;
    type IntoIter = std::vec::IntoIter<SubjectTable>;

    fn into_iter(self) -> Self::IntoIter {
        self.tables.into_iter()
    }
}
