//! Summary Aggregator: count, sum and mean of a metric column.

use vitalview_model::{Metric, ModelError, SubjectTable};

/// Descriptive statistics over the present readings of one column.
///
/// `sum` and `mean` are `None` when `count` is zero.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Summary {
    pub count: usize,
    pub sum: Option<f64>,
    pub mean: Option<f64>,
}

impl Summary {
    /// Summarize the present values in `values`, skipping `None`.
    pub fn from_values(values: impl IntoIterator<Item = Option<f64>>) -> Self {
        let (count, sum) = values
            .into_iter()
            .flatten()
            .fold((0usize, 0.0f64), |(count, sum), value| (count + 1, sum + value));
        if count == 0 {
            return Self::default();
        }
        Self {
            count,
            sum: Some(sum),
            mean: Some(sum / count as f64),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// Summarize `metric` for one subject.
///
/// A subject without the metric summarizes to a count of zero.
pub fn summarize(table: &SubjectTable, metric: Metric) -> Summary {
    match table.readings(metric) {
        Some(readings) => Summary::from_values(readings.map(|reading| reading.value())),
        None => Summary::default(),
    }
}

/// Summarize a metric column by name; `Time` and unknown columns are errors.
pub fn summarize_column(table: &SubjectTable, column: &str) -> Result<Summary, ModelError> {
    let metric = table.metric_for_column(column)?;
    Ok(summarize(table, metric))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_has_no_sum_or_mean() {
        let summary = Summary::from_values([None, None]);
        assert_eq!(
            summary,
            Summary {
                count: 0,
                sum: None,
                mean: None
            }
        );
        assert!(summary.is_empty());
    }

    #[test]
    fn skips_missing_values() {
        let summary = Summary::from_values([Some(2.0), None, Some(4.0), Some(0.0)]);
        assert_eq!(summary.count, 3);
        assert_eq!(summary.sum, Some(6.0));
        assert_eq!(summary.mean, Some(2.0));
    }
}
