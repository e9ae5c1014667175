//! TDMS file writer.
//!
//! Writes little-endian segments with contiguous raw data. Metadata is only
//! emitted when the channel layout changes or properties are pending; a
//! channel whose raw data index is unchanged is written with the
//! "same as previous" marker.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use vitalview_model::ChannelData;

use crate::bytes::encode_timestamp;
use crate::error::{Result, TdmsError};
use crate::path::ObjectPath;
use crate::types::{
    DataType, FILE_FORMAT_VERSION, LEAD_IN_LEN, NO_RAW_DATA, PropertyValue, RawDataIndex,
    SAME_RAW_DATA_INDEX, SEGMENT_TAG, toc,
};

/// One channel's samples for a segment.
#[derive(Debug, Clone, Copy)]
pub struct SegmentChannel<'a> {
    pub group: &'a str,
    pub channel: &'a str,
    pub data: &'a ChannelData,
}

impl<'a> SegmentChannel<'a> {
    pub fn new(group: &'a str, channel: &'a str, data: &'a ChannelData) -> Self {
        Self {
            group,
            channel,
            data,
        }
    }
}

/// TDMS file writer.
pub struct TdmsWriter<W: Write> {
    writer: W,
    /// Channel layout of the previous segment.
    layout: Option<Vec<(ObjectPath, RawDataIndex)>>,
    /// Last raw data index written per channel.
    indexes: HashMap<ObjectPath, RawDataIndex>,
    /// Objects already described in some segment.
    described: Vec<ObjectPath>,
    pending_properties: Vec<(ObjectPath, String, PropertyValue)>,
}

impl<W: Write> TdmsWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            layout: None,
            indexes: HashMap::new(),
            described: Vec::new(),
            pending_properties: Vec::new(),
        }
    }

    /// Queue a property; it is written with the next segment.
    pub fn set_property(&mut self, path: ObjectPath, name: impl Into<String>, value: PropertyValue) {
        self.pending_properties.push((path, name.into(), value));
    }

    /// Write one segment holding `channels`, in the given order.
    pub fn write_segment(&mut self, channels: &[SegmentChannel<'_>]) -> Result<()> {
        let mut layout = Vec::with_capacity(channels.len());
        for channel in channels {
            let path = ObjectPath::channel(channel.group, channel.channel);
            layout.push((path, raw_index_for(channel.data)?));
        }

        let needs_metadata =
            self.layout.as_ref() != Some(&layout) || !self.pending_properties.is_empty();
        let metadata = if needs_metadata {
            self.encode_metadata(&layout)
        } else {
            Vec::new()
        };

        let mut raw = Vec::new();
        for channel in channels {
            encode_values(&mut raw, channel.data);
        }

        let mut toc_mask = 0;
        if needs_metadata {
            toc_mask |= toc::META_DATA | toc::NEW_OBJ_LIST;
        }
        if !raw.is_empty() {
            toc_mask |= toc::RAW_DATA;
        }

        let mut lead_in = Vec::with_capacity(LEAD_IN_LEN);
        lead_in.extend_from_slice(SEGMENT_TAG);
        put_u32(&mut lead_in, toc_mask);
        put_u32(&mut lead_in, FILE_FORMAT_VERSION);
        put_u64(&mut lead_in, (metadata.len() + raw.len()) as u64);
        put_u64(&mut lead_in, metadata.len() as u64);

        self.writer.write_all(&lead_in)?;
        self.writer.write_all(&metadata)?;
        self.writer.write_all(&raw)?;

        for (path, raw_index) in &layout {
            self.indexes.insert(path.clone(), *raw_index);
        }
        self.layout = Some(layout);
        Ok(())
    }

    /// Flush and return the underlying writer.
    pub fn finish(mut self) -> Result<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }

    fn encode_metadata(&mut self, layout: &[(ObjectPath, RawDataIndex)]) -> Vec<u8> {
        fn push(objects: &mut Vec<ObjectPath>, path: ObjectPath) {
            if !objects.contains(&path) {
                objects.push(path);
            }
        }

        let mut objects: Vec<ObjectPath> = Vec::new();
        if !self.described.contains(&ObjectPath::Root) {
            push(&mut objects, ObjectPath::Root);
        }
        for (path, _) in layout {
            if let Some(group) = path.group_name() {
                let group = ObjectPath::group(group);
                if !self.described.contains(&group) {
                    push(&mut objects, group);
                }
            }
        }
        for (path, _, _) in &self.pending_properties {
            if !layout.iter().any(|(channel, _)| channel == path) {
                push(&mut objects, path.clone());
            }
        }
        for (path, _) in layout {
            push(&mut objects, path.clone());
        }

        let mut out = Vec::new();
        put_u32(&mut out, objects.len() as u32);
        for path in &objects {
            put_string(&mut out, &path.to_string());
            match layout.iter().find(|(channel, _)| channel == path) {
                Some((_, raw_index)) if self.indexes.get(path) == Some(raw_index) => {
                    put_u32(&mut out, SAME_RAW_DATA_INDEX);
                }
                Some((_, raw_index)) => encode_raw_index(&mut out, raw_index),
                None => put_u32(&mut out, NO_RAW_DATA),
            }
            let properties: Vec<&(ObjectPath, String, PropertyValue)> = self
                .pending_properties
                .iter()
                .filter(|(owner, _, _)| owner == path)
                .collect();
            put_u32(&mut out, properties.len() as u32);
            for (_, name, value) in properties {
                put_string(&mut out, name);
                encode_property(&mut out, value);
            }
        }

        self.pending_properties.clear();
        for path in objects {
            if !self.described.contains(&path) {
                self.described.push(path);
            }
        }
        out
    }
}

impl TdmsWriter<BufWriter<File>> {
    /// Create (or truncate) a TDMS file for writing.
    pub fn create(path: &Path) -> Result<Self> {
        Ok(Self::new(BufWriter::new(File::create(path)?)))
    }
}

/// Write `channels` as a single-segment TDMS file.
pub fn write_tdms(path: &Path, channels: &[SegmentChannel<'_>]) -> Result<()> {
    let mut writer = TdmsWriter::create(path)?;
    writer.write_segment(channels)?;
    writer.finish()?;
    Ok(())
}

fn raw_index_for(data: &ChannelData) -> Result<RawDataIndex> {
    let values = data.len() as u64;
    Ok(match data {
        ChannelData::Float(_) => fixed(DataType::F64, values),
        ChannelData::Integer(_) => fixed(DataType::I64, values),
        ChannelData::Timestamp(_) => fixed(DataType::Timestamp, values),
        ChannelData::Boolean(_) => fixed(DataType::Boolean, values),
        ChannelData::Text(strings) => {
            let text: usize = strings.iter().map(String::len).sum();
            if u32::try_from(text).is_err() {
                return Err(TdmsError::unsupported("string chunk larger than 4 GiB"));
            }
            RawDataIndex {
                data_type: DataType::String,
                values,
                total_bytes: Some((text + 4 * strings.len()) as u64),
            }
        }
    })
}

fn fixed(data_type: DataType, values: u64) -> RawDataIndex {
    RawDataIndex {
        data_type,
        values,
        total_bytes: None,
    }
}

fn encode_raw_index(out: &mut Vec<u8>, raw_index: &RawDataIndex) {
    let len = if raw_index.total_bytes.is_some() { 28 } else { 20 };
    put_u32(out, len);
    put_u32(out, raw_index.data_type.code());
    put_u32(out, 1);
    put_u64(out, raw_index.values);
    if let Some(total) = raw_index.total_bytes {
        put_u64(out, total);
    }
}

fn encode_property(out: &mut Vec<u8>, value: &PropertyValue) {
    match value {
        PropertyValue::Integer(v) => {
            put_u32(out, DataType::I64.code());
            out.extend_from_slice(&v.to_le_bytes());
        }
        PropertyValue::Float(v) => {
            put_u32(out, DataType::F64.code());
            out.extend_from_slice(&v.to_le_bytes());
        }
        PropertyValue::Text(v) => {
            put_u32(out, DataType::String.code());
            put_string(out, v);
        }
        PropertyValue::Boolean(v) => {
            put_u32(out, DataType::Boolean.code());
            out.push(u8::from(*v));
        }
        PropertyValue::Timestamp(v) => {
            put_u32(out, DataType::Timestamp.code());
            put_timestamp(out, *v);
        }
    }
}

fn encode_values(out: &mut Vec<u8>, data: &ChannelData) {
    match data {
        ChannelData::Float(values) => {
            values.iter().for_each(|v| out.extend_from_slice(&v.to_le_bytes()));
        }
        ChannelData::Integer(values) => {
            values.iter().for_each(|v| out.extend_from_slice(&v.to_le_bytes()));
        }
        ChannelData::Timestamp(values) => values.iter().for_each(|v| put_timestamp(out, *v)),
        ChannelData::Boolean(values) => values.iter().for_each(|v| out.push(u8::from(*v))),
        ChannelData::Text(values) => {
            let mut end = 0u32;
            for value in values {
                end += value.len() as u32;
                put_u32(out, end);
            }
            values
                .iter()
                .for_each(|value| out.extend_from_slice(value.as_bytes()));
        }
    }
}

fn put_u32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_le_bytes());
}

fn put_u64(out: &mut Vec<u8>, value: u64) {
    out.extend_from_slice(&value.to_le_bytes());
}

fn put_string(out: &mut Vec<u8>, value: &str) {
    put_u32(out, value.len() as u32);
    out.extend_from_slice(value.as_bytes());
}

fn put_timestamp(out: &mut Vec<u8>, value: chrono::NaiveDateTime) {
    let (seconds, fractions) = encode_timestamp(value);
    out.extend_from_slice(&fractions.to_le_bytes());
    out.extend_from_slice(&seconds.to_le_bytes());
}
