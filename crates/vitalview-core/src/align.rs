//! Row Aligner: positional join of the timeline with a subject's channels.

use chrono::{DateTime, Utc};
use vitalview_model::{Row, SubjectTable};

use crate::channels::RawSubject;
use crate::coerce::coerce_channel;
use crate::error::ExtractError;

/// Build the table for one subject.
///
/// Row `i` holds `timeline[i]` followed by sample `i` of every present
/// metric, in the subject's metric order. Every channel must have exactly
/// `timeline.len()` samples; a mismatch is an [`ExtractError::Alignment`].
pub fn align_rows(
    timeline: &[DateTime<Utc>],
    subject: &RawSubject<'_>,
) -> Result<SubjectTable, ExtractError> {
    let expected = timeline.len();
    let mut columns = Vec::with_capacity(subject.channels.len());
    for &(metric, data) in &subject.channels {
        if data.len() != expected {
            return Err(ExtractError::alignment(
                subject.id,
                metric,
                expected,
                data.len(),
            ));
        }
        let readings =
            coerce_channel(data).map_err(|sample| ExtractError::value(subject.id, metric, sample))?;
        columns.push(readings);
    }

    let mut table = SubjectTable::new(subject.id, subject.metrics());
    for (index, time) in timeline.iter().enumerate() {
        let readings = columns.iter().map(|column| column[index]).collect();
        table.push_row(Row::new(*time, readings))?;
    }
    Ok(table)
}
