//! DataFrame export of subject tables.

use polars::prelude::{Column, DataFrame, DataType, NamedFrom, PolarsResult, Series, TimeUnit};
use vitalview_model::{SubjectTable, TIME_COLUMN};

/// Convert one subject table into a DataFrame.
///
/// `Time` is a microsecond datetime column holding UTC instants (no zone is
/// attached to the dtype). Each metric becomes a nullable `Float64` column in
/// table order; missing readings are null.
pub fn subject_frame(table: &SubjectTable) -> PolarsResult<DataFrame> {
    let micros: Vec<i64> = table
        .rows()
        .iter()
        .map(|row| row.time.timestamp_micros())
        .collect();
    let time = Series::new(TIME_COLUMN.into(), micros)
        .cast(&DataType::Datetime(TimeUnit::Microseconds, None))?;

    let mut columns: Vec<Column> = Vec::with_capacity(table.metrics().len() + 1);
    columns.push(time.into());
    for (index, metric) in table.metrics().iter().enumerate() {
        let values: Vec<Option<f64>> = table
            .rows()
            .iter()
            .map(|row| row.readings[index].value())
            .collect();
        columns.push(Series::new(metric.channel_name().into(), values).into());
    }
    DataFrame::new(columns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use vitalview_model::{Metric, Reading, Row};

    #[test]
    fn columns_follow_table_order() {
        let mut table = SubjectTable::new("S1", vec![Metric::HeartRate, Metric::Activity]);
        let t0 = Utc.timestamp_opt(1_600_000_000, 0).unwrap();
        table
            .push_row(Row::new(t0, vec![Reading::Value(72.0), Reading::Missing]))
            .unwrap();
        table
            .push_row(Row::new(
                t0 + chrono::TimeDelta::minutes(1),
                vec![Reading::Missing, Reading::Value(0.0)],
            ))
            .unwrap();

        let df = subject_frame(&table).unwrap();
        assert_eq!(df.shape(), (2, 3));
        let names: Vec<&str> = df.get_column_names().iter().map(|n| n.as_str()).collect();
        assert_eq!(names, vec!["Time", "Heart Rate", "Activity"]);
        assert_eq!(
            df.column("Time").unwrap().dtype(),
            &DataType::Datetime(TimeUnit::Microseconds, None)
        );
        assert_eq!(df.column("Heart Rate").unwrap().null_count(), 1);
        assert_eq!(df.column("Activity").unwrap().null_count(), 1);
    }

    #[test]
    fn time_only_table() {
        let table = SubjectTable::new("S1", Vec::new());
        let df = subject_frame(&table).unwrap();
        assert_eq!(df.shape(), (0, 1));
    }
}
