//! Channel Reader: pulls the timeline and per-subject metric channels out of a
//! [`Recording`] without transforming them.

use chrono::NaiveDateTime;
use tracing::debug;
use vitalview_model::{
    ChannelData, Metric, Recording, TIMELINE_CHANNEL, TIMELINE_GROUP, is_reserved_group,
};

use crate::error::ExtractError;

/// Raw arrays of one recording, borrowed from the source.
#[derive(Debug, Clone)]
pub struct RawRecording<'a> {
    /// Wall-clock timeline, one value per sample index.
    pub timeline: &'a [NaiveDateTime],
    /// Subjects in discovery order.
    pub subjects: Vec<RawSubject<'a>>,
}

/// Metric channels present for one subject.
#[derive(Debug, Clone)]
pub struct RawSubject<'a> {
    pub id: &'a str,
    /// Present metrics in [`Metric::ALL`] order.
    pub channels: Vec<(Metric, &'a ChannelData)>,
}

impl RawSubject<'_> {
    pub fn metrics(&self) -> Vec<Metric> {
        self.channels.iter().map(|(metric, _)| *metric).collect()
    }
}

/// Read the `System`/`Time` timeline of `recording`.
pub fn read_timeline<R: Recording + ?Sized>(
    recording: &R,
) -> Result<&[NaiveDateTime], ExtractError> {
    match recording.channel(TIMELINE_GROUP, TIMELINE_CHANNEL)? {
        ChannelData::Timestamp(values) => Ok(values),
        other => Err(ExtractError::TimelineKind {
            group: TIMELINE_GROUP.to_string(),
            channel: TIMELINE_CHANNEL.to_string(),
            kind: other.kind(),
        }),
    }
}

/// Read the metric channels of one subject group.
pub fn read_subject<'a, R: Recording + ?Sized>(
    recording: &'a R,
    subject: &'a str,
) -> Result<RawSubject<'a>, ExtractError> {
    let names = recording.channel_names(subject)?;
    let mut channels = Vec::new();
    for metric in Metric::ALL {
        if names.contains(&metric.channel_name()) {
            let data = recording.channel(subject, metric.channel_name())?;
            channels.push((metric, data));
        }
    }
    debug!(
        subject,
        channels = names.len(),
        metrics = ?channels.iter().map(|(metric, _)| *metric).collect::<Vec<_>>(),
        "discovered subject channels"
    );
    Ok(RawSubject {
        id: subject,
        channels,
    })
}

/// Read the timeline and every non-reserved group of `recording`.
pub fn read_channels<R: Recording + ?Sized>(
    recording: &R,
) -> Result<RawRecording<'_>, ExtractError> {
    let timeline = read_timeline(recording)?;
    let subjects = recording
        .group_names()
        .into_iter()
        .filter(|group| !is_reserved_group(group))
        .map(|group| read_subject(recording, group))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(RawRecording { timeline, subjects })
}
