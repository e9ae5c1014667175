//! In-memory view of a decoded TDMS file.

use vitalview_model::{ChannelData, Recording, SourceError};

use crate::types::PropertyValue;

/// Ordered name/value properties of one object.
pub type Properties = Vec<(String, PropertyValue)>;

fn find_property<'a>(properties: &'a Properties, name: &str) -> Option<&'a PropertyValue> {
    properties
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value)
}

/// A fully decoded TDMS file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TdmsFile {
    /// Properties of the root object (`/`).
    pub properties: Properties,
    pub(crate) groups: Vec<TdmsGroup>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TdmsGroup {
    pub name: String,
    pub properties: Properties,
    pub(crate) channels: Vec<TdmsChannel>,
}

/// A channel and all of its samples, concatenated across segments.
///
/// A channel that never carried raw data decodes as an empty float array.
#[derive(Debug, Clone, PartialEq)]
pub struct TdmsChannel {
    pub name: String,
    pub properties: Properties,
    pub data: ChannelData,
}

impl TdmsFile {
    /// Groups in order of first appearance.
    pub fn groups(&self) -> &[TdmsGroup] {
        &self.groups
    }

    pub fn group(&self, name: &str) -> Option<&TdmsGroup> {
        self.groups.iter().find(|group| group.name == name)
    }

    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        find_property(&self.properties, name)
    }

    pub(crate) fn group_mut_or_insert(&mut self, name: &str) -> &mut TdmsGroup {
        let index = match self.groups.iter().position(|group| group.name == name) {
            Some(index) => index,
            None => {
                self.groups.push(TdmsGroup {
                    name: name.to_string(),
                    properties: Vec::new(),
                    channels: Vec::new(),
                });
                self.groups.len() - 1
            }
        };
        &mut self.groups[index]
    }
}

impl TdmsGroup {
    /// Channels in order of first appearance.
    pub fn channels(&self) -> &[TdmsChannel] {
        &self.channels
    }

    pub fn channel(&self, name: &str) -> Option<&TdmsChannel> {
        self.channels.iter().find(|channel| channel.name == name)
    }

    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        find_property(&self.properties, name)
    }
}

impl TdmsChannel {
    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        find_property(&self.properties, name)
    }
}

impl Recording for TdmsFile {
    fn group_names(&self) -> Vec<&str> {
        self.groups.iter().map(|group| group.name.as_str()).collect()
    }

    fn channel_names(&self, group: &str) -> Result<Vec<&str>, SourceError> {
        let group = self
            .group(group)
            .ok_or_else(|| SourceError::missing_group(group))?;
        Ok(group
            .channels
            .iter()
            .map(|channel| channel.name.as_str())
            .collect())
    }

    fn channel(&self, group: &str, channel: &str) -> Result<&ChannelData, SourceError> {
        self.group(group)
            .ok_or_else(|| SourceError::missing_group(group))?
            .channel(channel)
            .map(|found| &found.data)
            .ok_or_else(|| SourceError::missing_channel(group, channel))
    }
}
