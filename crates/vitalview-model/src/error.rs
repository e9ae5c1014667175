use thiserror::Error;

/// Errors raised by the model types themselves.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("duplicate subject: {subject}")]
    DuplicateSubject { subject: String },
    #[error("unknown column '{column}' for subject {subject}")]
    UnknownColumn { subject: String, column: String },
    #[error("column '{column}' is not a metric column")]
    NotAMetric { column: String },
    #[error("row for subject {subject} has {actual} readings, expected {expected}")]
    RowArity {
        subject: String,
        expected: usize,
        actual: usize,
    },
}

/// Structural errors reported by a [`crate::Recording`] implementation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// The requested group does not exist in the recording.
    #[error("group '{group}' not found in recording")]
    MissingGroup { group: String },

    /// The requested channel does not exist in the group.
    #[error("channel '{channel}' not found in group '{group}'")]
    MissingChannel { group: String, channel: String },
}

impl SourceError {
    pub fn missing_group(group: impl Into<String>) -> Self {
        Self::MissingGroup {
            group: group.into(),
        }
    }

    pub fn missing_channel(group: impl Into<String>, channel: impl Into<String>) -> Self {
        Self::MissingChannel {
            group: group.into(),
            channel: channel.into(),
        }
    }
}
