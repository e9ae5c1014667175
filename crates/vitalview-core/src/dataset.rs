//! Dataset Assembler: the top-level extraction entry points.

use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::{info, info_span};
use vitalview_model::{Dataset, Recording};

use crate::align::align_rows;
use crate::channels::read_channels;
use crate::error::ExtractError;
use crate::timestamp::{HostLocal, LocalOffset, normalize};

/// Extract every subject of `recording`, reading the timeline in the
/// processing machine's local zone.
///
/// The recording must have been made in the same zone as the machine running
/// this; use [`extract_dataset_with`] when the zone is known.
pub fn extract_dataset<R: Recording + ?Sized>(recording: &R) -> Result<Dataset, ExtractError> {
    extract_dataset_with(recording, &HostLocal)
}

/// Extract every subject of `recording`, reading the timeline under `rule`.
///
/// Subjects keep their discovery order. The first error aborts the run and
/// no partial dataset is returned.
pub fn extract_dataset_with<R, L>(recording: &R, rule: &L) -> Result<Dataset, ExtractError>
where
    R: Recording + ?Sized,
    L: LocalOffset + ?Sized,
{
    let span = info_span!("extract");
    let _guard = span.enter();

    let raw = read_channels(recording)?;
    let timeline = normalize_timeline(raw.timeline, rule)?;
    info!(
        samples = timeline.len(),
        subjects = raw.subjects.len(),
        "read recording"
    );

    let mut dataset = Dataset::new();
    for subject in &raw.subjects {
        let span = info_span!("subject", id = subject.id);
        let _guard = span.enter();
        dataset.insert(align_rows(&timeline, subject)?)?;
    }
    Ok(dataset)
}

/// Normalize every timeline value to UTC.
pub fn normalize_timeline<L: LocalOffset + ?Sized>(
    timeline: &[NaiveDateTime],
    rule: &L,
) -> Result<Vec<DateTime<Utc>>, ExtractError> {
    timeline
        .iter()
        .enumerate()
        .map(|(index, value)| {
            normalize(*value, rule).map_err(|source| ExtractError::Timestamp { index, source })
        })
        .collect()
}
