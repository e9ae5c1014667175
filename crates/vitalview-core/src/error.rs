//! Error types for the extraction pipeline.

use chrono::NaiveDateTime;
use thiserror::Error;
use vitalview_model::{Metric, ModelError, SourceError};

/// A raw sample that is neither a number nor the missing sentinel.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum CoercionError {
    #[error("value {value} is not finite")]
    NotFinite { value: f64 },

    #[error("integer {value} has no exact f64 representation")]
    Inexact { value: i64 },

    #[error("{kind} samples are not numeric")]
    NonNumeric { kind: &'static str },
}

/// A [`CoercionError`] located at a sample index.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
#[error("sample {index}: {source}")]
pub struct InvalidSample {
    pub index: usize,
    pub source: CoercionError,
}

/// A local time that cannot be mapped to (or from) a UTC instant.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TimestampError {
    /// No offset could be resolved for the local time.
    #[error("local time {value} has no resolvable UTC offset")]
    Unresolvable { value: NaiveDateTime },

    /// Applying the offset leaves the supported date range.
    #[error("{value} is out of range after applying the UTC offset")]
    OutOfRange { value: NaiveDateTime },
}

/// Errors raised while extracting a dataset from a recording.
///
/// The first error aborts the whole extraction; no partial dataset is
/// returned.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// Required group or channel is absent.
    #[error(transparent)]
    Source(#[from] SourceError),

    /// Timeline channel does not hold timestamps.
    #[error("timeline channel {group}/{channel} holds {kind} samples, expected timestamps")]
    TimelineKind {
        group: String,
        channel: String,
        kind: &'static str,
    },

    /// Timeline sample could not be normalized to UTC.
    #[error("timeline sample {index}: {source}")]
    Timestamp {
        index: usize,
        #[source]
        source: TimestampError,
    },

    /// Metric channel length differs from the timeline length.
    #[error(
        "subject {subject}: {metric} has {actual} samples but the timeline has {expected}"
    )]
    Alignment {
        subject: String,
        metric: Metric,
        expected: usize,
        actual: usize,
    },

    /// Metric sample is neither a number nor the missing sentinel.
    #[error("subject {subject}: invalid {metric} sample at index {index}")]
    Value {
        subject: String,
        metric: Metric,
        index: usize,
        #[source]
        source: CoercionError,
    },

    #[error(transparent)]
    Model(#[from] ModelError),
}

impl ExtractError {
    pub(crate) fn alignment(
        subject: &str,
        metric: Metric,
        expected: usize,
        actual: usize,
    ) -> Self {
        Self::Alignment {
            subject: subject.to_string(),
            metric,
            expected,
            actual,
        }
    }

    pub(crate) fn value(subject: &str, metric: Metric, sample: InvalidSample) -> Self {
        Self::Value {
            subject: subject.to_string(),
            metric,
            index: sample.index,
            source: sample.source,
        }
    }
}
