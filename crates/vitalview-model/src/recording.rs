//! The columnar recording as seen by the reshaping pipeline.
//!
//! A container reader exposes named groups, each holding named channels of
//! raw arrays. Group names outside [`RESERVED_GROUPS`] identify subjects.

use chrono::NaiveDateTime;

use crate::error::SourceError;

/// Group holding the master timeline.
pub const TIMELINE_GROUP: &str = "System";

/// Channel inside [`TIMELINE_GROUP`] holding the master timeline.
pub const TIMELINE_CHANNEL: &str = "Time";

/// Name of the first column of every subject table.
pub const TIME_COLUMN: &str = "Time";

/// Group names that never identify a subject.
pub const RESERVED_GROUPS: [&str; 2] = [TIMELINE_GROUP, "Event"];

/// Returns true if `name` is one of the [`RESERVED_GROUPS`].
#[must_use]
pub fn is_reserved_group(name: &str) -> bool {
    RESERVED_GROUPS.contains(&name)
}

/// Raw samples of one channel, in sample-index order.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelData {
    Float(Vec<f64>),
    Integer(Vec<i64>),
    /// Date-times without any zone attached.
    Timestamp(Vec<NaiveDateTime>),
    Text(Vec<String>),
    Boolean(Vec<bool>),
}

impl ChannelData {
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Float(values) => values.len(),
            Self::Integer(values) => values.len(),
            Self::Timestamp(values) => values.len(),
            Self::Text(values) => values.len(),
            Self::Boolean(values) => values.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Short name of the sample kind, used in error messages.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Float(_) => "float",
            Self::Integer(_) => "integer",
            Self::Timestamp(_) => "timestamp",
            Self::Text(_) => "text",
            Self::Boolean(_) => "boolean",
        }
    }
}

/// A recording container opened for reading.
///
/// Implementations hold the whole recording in memory; every method is a
/// lookup.
pub trait Recording {
    /// All group names, in the order they appear in the container.
    fn group_names(&self) -> Vec<&str>;

    /// Channel names of `group`, in container order.
    fn channel_names(&self, group: &str) -> Result<Vec<&str>, SourceError>;

    /// Raw samples of `group`/`channel`.
    fn channel(&self, group: &str, channel: &str) -> Result<&ChannelData, SourceError>;

    /// Returns true if `group` exists and contains `channel`.
    fn has_channel(&self, group: &str, channel: &str) -> bool {
        self.channel_names(group)
            .map(|names| names.contains(&channel))
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, Default)]
struct MemoryGroup {
    name: String,
    channels: Vec<(String, ChannelData)>,
}

/// A [`Recording`] built directly from arrays.
///
/// Groups and channels keep insertion order. Inserting a channel that already
/// exists replaces its data in place.
///
/// ```
/// use chrono::NaiveDate;
/// use vitalview_model::{ChannelData, MemoryRecording, Recording};
///
/// let t0 = NaiveDate::from_ymd_opt(2021, 3, 1)
///     .and_then(|d| d.and_hms_opt(8, 0, 0))
///     .unwrap();
/// let recording = MemoryRecording::new()
///     .with_channel("System", "Time", ChannelData::Timestamp(vec![t0]))
///     .with_channel("111-1", "Heart Rate", ChannelData::Float(vec![412.0]));
/// assert_eq!(recording.group_names(), vec!["System", "111-1"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryRecording {
    groups: Vec<MemoryGroup>,
}

impl MemoryRecording {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an empty group (no-op if it already exists).
    #[must_use]
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group_mut(group.into());
        self
    }

    #[must_use]
    pub fn with_channel(
        mut self,
        group: impl Into<String>,
        channel: impl Into<String>,
        data: ChannelData,
    ) -> Self {
        self.insert_channel(group, channel, data);
        self
    }

    pub fn insert_channel(
        &mut self,
        group: impl Into<String>,
        channel: impl Into<String>,
        data: ChannelData,
    ) {
        let channel = channel.into();
        let group = self.group_mut(group.into());
        match group.channels.iter_mut().find(|(name, _)| *name == channel) {
            Some((_, existing)) => *existing = data,
            None => group.channels.push((channel, data)),
        }
    }

    fn group_mut(&mut self, name: String) -> &mut MemoryGroup {
        let index = match self.groups.iter().position(|group| group.name == name) {
            Some(index) => index,
            None => {
                self.groups.push(MemoryGroup {
                    name,
                    channels: Vec::new(),
                });
                self.groups.len() - 1
            }
        };
        &mut self.groups[index]
    }

    fn group(&self, name: &str) -> Result<&MemoryGroup, SourceError> {
        self.groups
            .iter()
            .find(|group| group.name == name)
            .ok_or_else(|| SourceError::missing_group(name))
    }
}

impl Recording for MemoryRecording {
    fn group_names(&self) -> Vec<&str> {
        self.groups.iter().map(|group| group.name.as_str()).collect()
    }

    fn channel_names(&self, group: &str) -> Result<Vec<&str>, SourceError> {
        Ok(self
            .group(group)?
            .channels
            .iter()
            .map(|(name, _)| name.as_str())
            .collect())
    }

    fn channel(&self, group: &str, channel: &str) -> Result<&ChannelData, SourceError> {
        self.group(group)?
            .channels
            .iter()
            .find(|(name, _)| name == channel)
            .map(|(_, data)| data)
            .ok_or_else(|| SourceError::missing_channel(group, channel))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_groups() {
        assert!(is_reserved_group("System"));
        assert!(is_reserved_group("Event"));
        assert!(!is_reserved_group("system"));
        assert!(!is_reserved_group("111-1"));
    }

    #[test]
    fn memory_recording_keeps_insertion_order() {
        let recording = MemoryRecording::new()
            .with_group("B")
            .with_channel("A", "Activity", ChannelData::Float(vec![1.0]))
            .with_channel("B", "Temperature", ChannelData::Float(vec![37.0]))
            .with_channel("A", "Heart Rate", ChannelData::Float(vec![400.0]));
        assert_eq!(recording.group_names(), vec!["B", "A"]);
        assert_eq!(
            recording.channel_names("A").expect("group A"),
            vec!["Activity", "Heart Rate"]
        );
        assert!(recording.has_channel("B", "Temperature"));
        assert!(!recording.has_channel("B", "Activity"));
        assert!(!recording.has_channel("C", "Activity"));
    }

    #[test]
    fn memory_recording_replaces_channel() {
        let recording = MemoryRecording::new()
            .with_channel("A", "Activity", ChannelData::Float(vec![1.0]))
            .with_channel("A", "Activity", ChannelData::Integer(vec![2, 3]));
        let data = recording.channel("A", "Activity").expect("channel");
        assert_eq!(data, &ChannelData::Integer(vec![2, 3]));
        assert_eq!(data.len(), 2);
        assert_eq!(data.kind(), "integer");
    }

    #[test]
    fn missing_lookups_are_structured() {
        let recording = MemoryRecording::new().with_group("A");
        assert_eq!(
            recording.channel("A", "Activity"),
            Err(SourceError::missing_channel("A", "Activity"))
        );
        assert_eq!(
            recording.channel_names("Z"),
            Err(SourceError::missing_group("Z"))
        );
    }
}
