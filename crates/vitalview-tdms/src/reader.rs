//! TDMS file reader.
//!
//! Reads the whole file into memory, then walks its segments in order,
//! tracking the object list and raw data indexes that carry over between
//! segments.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use tracing::{debug, warn};
use vitalview_model::ChannelData;

use crate::bytes::{ByteReader, Endian};
use crate::error::{Result, TdmsError};
use crate::file::{Properties, TdmsChannel, TdmsFile};
use crate::path::ObjectPath;
use crate::types::{
    DAQMX_INDEX_MARKERS, DataType, LEAD_IN_LEN, NO_RAW_DATA, PropertyValue, RawDataIndex,
    SAME_RAW_DATA_INDEX, SEGMENT_TAG, toc,
};

/// TDMS file reader.
pub struct TdmsReader<R: Read> {
    reader: BufReader<R>,
}

impl<R: Read> TdmsReader<R> {
    /// Create a new TDMS reader.
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
        }
    }

    /// Read the entire file into memory and decode it.
    pub fn read_file(mut self) -> Result<TdmsFile> {
        let mut data = Vec::new();
        self.reader.read_to_end(&mut data)?;
        parse_tdms(&data)
    }
}

impl TdmsReader<File> {
    /// Open a TDMS file for reading.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                TdmsError::FileNotFound {
                    path: path.to_path_buf(),
                }
            } else {
                TdmsError::Io(e)
            }
        })?;
        Ok(Self::new(file))
    }
}

/// Read a TDMS file from a path.
pub fn read_tdms(path: &Path) -> Result<TdmsFile> {
    TdmsReader::open(path)?.read_file()
}

/// Decode a complete TDMS file held in memory.
pub fn parse_tdms(data: &[u8]) -> Result<TdmsFile> {
    let mut state = ParseState::default();
    let mut offset = 0usize;
    let mut segments = 0usize;
    while offset < data.len() {
        if data.len() - offset < LEAD_IN_LEN {
            warn!(
                offset,
                trailing = data.len() - offset,
                "ignoring trailing bytes shorter than a segment lead-in"
            );
            break;
        }
        offset = parse_segment(data, offset, &mut state)?;
        segments += 1;
    }
    debug!(segments, objects = state.objects.len(), "decoded TDMS file");
    Ok(state.into_file())
}

#[derive(Debug, Clone, Copy)]
struct LeadIn {
    toc: u32,
    endian: Endian,
    next_segment_offset: u64,
    raw_data_offset: u64,
}

impl LeadIn {
    fn parse(data: &[u8], offset: usize) -> Result<Self> {
        let mut reader = ByteReader::new(data, offset, Endian::Little);
        if reader.take(SEGMENT_TAG.len())? != SEGMENT_TAG {
            return Err(TdmsError::InvalidTag { offset });
        }
        let toc = reader.u32()?;
        let endian = if toc & toc::BIG_ENDIAN != 0 {
            Endian::Big
        } else {
            Endian::Little
        };
        let mut reader = ByteReader::new(data, reader.position(), endian);
        let version = reader.u32()?;
        if version != 4712 && version != 4713 {
            debug!(offset, version, "unexpected TDMS version");
        }
        Ok(Self {
            toc,
            endian,
            next_segment_offset: reader.u64()?,
            raw_data_offset: reader.u64()?,
        })
    }

    fn has(&self, flag: u32) -> bool {
        self.toc & flag != 0
    }
}

#[derive(Debug)]
struct ObjectEntry {
    path: ObjectPath,
    properties: Properties,
    index: Option<RawDataIndex>,
    data: Option<ChannelData>,
}

#[derive(Debug, Default)]
struct ParseState {
    objects: Vec<ObjectEntry>,
    lookup: HashMap<ObjectPath, usize>,
    /// Objects with raw data in the current object list, in list order.
    active: Vec<usize>,
}

impl ParseState {
    fn entry(&mut self, path: ObjectPath) -> usize {
        if let Some(&index) = self.lookup.get(&path) {
            return index;
        }
        if let ObjectPath::Channel { group, .. } = &path {
            self.entry(ObjectPath::Group(group.clone()));
        }
        let index = self.objects.len();
        self.lookup.insert(path.clone(), index);
        self.objects.push(ObjectEntry {
            path,
            properties: Vec::new(),
            index: None,
            data: None,
        });
        index
    }

    fn activate(&mut self, index: usize) {
        if !self.active.contains(&index) {
            self.active.push(index);
        }
    }

    fn append(&mut self, index: usize, values: ChannelData) -> Result<()> {
        let entry = &mut self.objects[index];
        match (&mut entry.data, values) {
            (slot @ None, values) => *slot = Some(values),
            (Some(ChannelData::Float(existing)), ChannelData::Float(values)) => {
                existing.extend(values);
            }
            (Some(ChannelData::Integer(existing)), ChannelData::Integer(values)) => {
                existing.extend(values);
            }
            (Some(ChannelData::Timestamp(existing)), ChannelData::Timestamp(values)) => {
                existing.extend(values);
            }
            (Some(ChannelData::Text(existing)), ChannelData::Text(values)) => {
                existing.extend(values);
            }
            (Some(ChannelData::Boolean(existing)), ChannelData::Boolean(values)) => {
                existing.extend(values);
            }
            (Some(existing), values) => {
                return Err(TdmsError::TypeChanged {
                    path: entry.path.to_string(),
                    previous: existing.kind(),
                    current: values.kind(),
                });
            }
        }
        Ok(())
    }

    fn into_file(self) -> TdmsFile {
        let mut file = TdmsFile::default();
        for entry in self.objects {
            match entry.path {
                ObjectPath::Root => file.properties = entry.properties,
                ObjectPath::Group(name) => {
                    file.group_mut_or_insert(&name).properties = entry.properties;
                }
                ObjectPath::Channel { group, channel } => {
                    file.group_mut_or_insert(&group).channels.push(TdmsChannel {
                        name: channel,
                        properties: entry.properties,
                        data: entry.data.unwrap_or(ChannelData::Float(Vec::new())),
                    });
                }
            }
        }
        file
    }
}

/// Decode one segment starting at `offset`; returns the next segment offset.
fn parse_segment(data: &[u8], offset: usize, state: &mut ParseState) -> Result<usize> {
    let lead_in = LeadIn::parse(data, offset)?;
    let body_start = offset + LEAD_IN_LEN;
    let available = (data.len() - body_start) as u64;
    let body_end = if lead_in.next_segment_offset == u64::MAX {
        warn!(offset, "segment is marked incomplete, reading to end of file");
        data.len()
    } else if lead_in.next_segment_offset > available {
        warn!(
            offset,
            declared = lead_in.next_segment_offset,
            available,
            "segment extends past end of file, truncating"
        );
        data.len()
    } else {
        body_start + lead_in.next_segment_offset as usize
    };

    if lead_in.has(toc::DAQMX_RAW_DATA) {
        return Err(TdmsError::unsupported("DAQmx raw data"));
    }

    if lead_in.has(toc::META_DATA) {
        let mut reader = ByteReader::new(&data[..body_end], body_start, lead_in.endian);
        parse_metadata(&mut reader, lead_in.has(toc::NEW_OBJ_LIST), state)?;
    }

    if lead_in.has(toc::RAW_DATA) {
        let raw_start = usize::try_from(lead_in.raw_data_offset)
            .ok()
            .and_then(|raw| body_start.checked_add(raw))
            .filter(|start| *start <= body_end)
            .ok_or_else(|| TdmsError::invalid_format("raw data offset beyond segment end"))?;
        read_raw_data(&data[..body_end], raw_start, lead_in, state)?;
    }

    debug!(
        offset,
        toc = lead_in.toc,
        active = state.active.len(),
        "decoded segment"
    );
    Ok(body_end)
}

fn parse_metadata(reader: &mut ByteReader<'_>, new_list: bool, state: &mut ParseState) -> Result<()> {
    if new_list {
        state.active.clear();
    }
    let count = reader.u32()?;
    for _ in 0..count {
        let raw_path = reader.string()?;
        let path = ObjectPath::parse(&raw_path)?;
        let index = state.entry(path);
        match reader.u32()? {
            NO_RAW_DATA => state.active.retain(|active| *active != index),
            marker if DAQMX_INDEX_MARKERS.contains(&marker) => {
                return Err(TdmsError::unsupported("DAQmx raw data index"));
            }
            SAME_RAW_DATA_INDEX => {
                if state.objects[index].index.is_none() {
                    return Err(TdmsError::MissingPreviousIndex { path: raw_path });
                }
                state.activate(index);
            }
            len => {
                let raw_index = parse_raw_index(reader, len)?;
                state.objects[index].index = Some(raw_index);
                state.activate(index);
            }
        }
        let property_count = reader.u32()?;
        for _ in 0..property_count {
            let name = reader.string()?;
            let value = parse_property_value(reader)?;
            let properties = &mut state.objects[index].properties;
            match properties.iter_mut().find(|(key, _)| *key == name) {
                Some((_, existing)) => *existing = value,
                None => properties.push((name, value)),
            }
        }
    }
    Ok(())
}

fn parse_raw_index(reader: &mut ByteReader<'_>, len: u32) -> Result<RawDataIndex> {
    // `len` counts the length field itself.
    let start = reader.position() - 4;
    let data_type = DataType::from_code(reader.u32()?)?;
    let dimension = reader.u32()?;
    if dimension != 1 {
        return Err(TdmsError::invalid_format(format!(
            "array dimension must be 1, got {dimension}"
        )));
    }
    let values = reader.u64()?;
    let total_bytes = match data_type {
        DataType::String => Some(reader.u64()?),
        _ => None,
    };
    let consumed = reader.position() - start;
    let declared = len as usize;
    if declared < consumed {
        return Err(TdmsError::invalid_format(format!(
            "raw data index length {declared} shorter than its fields"
        )));
    }
    reader.take(declared - consumed)?;
    Ok(RawDataIndex {
        data_type,
        values,
        total_bytes,
    })
}

fn parse_property_value(reader: &mut ByteReader<'_>) -> Result<PropertyValue> {
    let data_type = DataType::from_code(reader.u32()?)?;
    Ok(match data_type {
        DataType::I8 => PropertyValue::Integer(i64::from(reader.i8()?)),
        DataType::I16 => PropertyValue::Integer(i64::from(reader.i16()?)),
        DataType::I32 => PropertyValue::Integer(i64::from(reader.i32()?)),
        DataType::I64 => PropertyValue::Integer(reader.i64()?),
        DataType::U8 => PropertyValue::Integer(i64::from(reader.u8()?)),
        DataType::U16 => PropertyValue::Integer(i64::from(reader.u16()?)),
        DataType::U32 => PropertyValue::Integer(i64::from(reader.u32()?)),
        DataType::U64 => {
            let value = reader.u64()?;
            i64::try_from(value)
                .map(PropertyValue::Integer)
                .unwrap_or(PropertyValue::Float(value as f64))
        }
        DataType::F32 | DataType::F32WithUnit => PropertyValue::Float(f64::from(reader.f32()?)),
        DataType::F64 | DataType::F64WithUnit => PropertyValue::Float(reader.f64()?),
        DataType::String => PropertyValue::Text(reader.string()?),
        DataType::Boolean => PropertyValue::Boolean(reader.boolean()?),
        DataType::Timestamp => PropertyValue::Timestamp(reader.timestamp()?),
    })
}

fn read_raw_data(
    data: &[u8],
    raw_start: usize,
    lead_in: LeadIn,
    state: &mut ParseState,
) -> Result<()> {
    let mut layout = Vec::with_capacity(state.active.len());
    let mut chunk_bytes = 0u64;
    for &index in &state.active {
        let Some(raw_index) = state.objects[index].index else {
            continue;
        };
        if raw_index.values == 0 {
            continue;
        }
        chunk_bytes = chunk_bytes
            .checked_add(raw_index.chunk_bytes()?)
            .ok_or_else(|| TdmsError::invalid_format("chunk size overflow"))?;
        layout.push((index, raw_index));
    }
    if chunk_bytes == 0 {
        return Ok(());
    }

    let raw_len = (data.len() - raw_start) as u64;
    let chunks = raw_len / chunk_bytes;
    let remainder = raw_len % chunk_bytes;
    if remainder != 0 {
        warn!(
            offset = raw_start,
            remainder, "raw data is not a whole number of chunks, ignoring the remainder"
        );
    }

    let mut reader = ByteReader::new(data, raw_start, lead_in.endian);
    if lead_in.has(toc::INTERLEAVED_DATA) {
        read_interleaved(&mut reader, &layout, chunks, state)
    } else {
        for _ in 0..chunks {
            for &(index, raw_index) in &layout {
                let values = decode_values(&mut reader, raw_index, &state.objects[index].path)?;
                state.append(index, values)?;
            }
        }
        Ok(())
    }
}

fn read_interleaved(
    reader: &mut ByteReader<'_>,
    layout: &[(usize, RawDataIndex)],
    chunks: u64,
    state: &mut ParseState,
) -> Result<()> {
    let Some(&(_, first)) = layout.first() else {
        return Ok(());
    };
    if layout
        .iter()
        .any(|(_, raw_index)| raw_index.data_type == DataType::String)
    {
        return Err(TdmsError::unsupported("interleaved string data"));
    }
    if layout
        .iter()
        .any(|(_, raw_index)| raw_index.values != first.values)
    {
        return Err(TdmsError::invalid_format(
            "interleaved channels must have equal value counts",
        ));
    }
    for _ in 0..chunks {
        for _ in 0..first.values {
            for &(index, raw_index) in layout {
                let single = RawDataIndex {
                    values: 1,
                    ..raw_index
                };
                let value = decode_values(reader, single, &state.objects[index].path)?;
                state.append(index, value)?;
            }
        }
    }
    Ok(())
}

fn decode_values(
    reader: &mut ByteReader<'_>,
    raw_index: RawDataIndex,
    path: &ObjectPath,
) -> Result<ChannelData> {
    let count = usize::try_from(raw_index.values)
        .map_err(|_| TdmsError::invalid_format("value count exceeds address space"))?;
    macro_rules! collect {
        ($variant:ident, $read:expr) => {{
            let mut values = Vec::with_capacity(count);
            for _ in 0..count {
                values.push($read);
            }
            ChannelData::$variant(values)
        }};
    }
    Ok(match raw_index.data_type {
        DataType::I8 => collect!(Integer, i64::from(reader.i8()?)),
        DataType::I16 => collect!(Integer, i64::from(reader.i16()?)),
        DataType::I32 => collect!(Integer, i64::from(reader.i32()?)),
        DataType::I64 => collect!(Integer, reader.i64()?),
        DataType::U8 => collect!(Integer, i64::from(reader.u8()?)),
        DataType::U16 => collect!(Integer, i64::from(reader.u16()?)),
        DataType::U32 => collect!(Integer, i64::from(reader.u32()?)),
        DataType::U64 => collect!(Integer, {
            let value = reader.u64()?;
            i64::try_from(value).map_err(|_| TdmsError::IntegerOverflow {
                path: path.to_string(),
                value,
            })?
        }),
        DataType::F32 | DataType::F32WithUnit => collect!(Float, f64::from(reader.f32()?)),
        DataType::F64 | DataType::F64WithUnit => collect!(Float, reader.f64()?),
        DataType::Boolean => collect!(Boolean, reader.boolean()?),
        DataType::Timestamp => collect!(Timestamp, reader.timestamp()?),
        DataType::String => decode_strings(reader, raw_index, count)?,
    })
}

/// String chunk: `count` end offsets, then the concatenated UTF-8 bytes.
fn decode_strings(
    reader: &mut ByteReader<'_>,
    raw_index: RawDataIndex,
    count: usize,
) -> Result<ChannelData> {
    let total = usize::try_from(raw_index.chunk_bytes()?)
        .map_err(|_| TdmsError::invalid_format("string chunk exceeds address space"))?;
    let offsets_len = count
        .checked_mul(4)
        .filter(|len| *len <= total)
        .ok_or_else(|| TdmsError::invalid_format("string offsets exceed chunk size"))?;
    let mut ends = Vec::with_capacity(count);
    for _ in 0..count {
        ends.push(reader.u32()? as usize);
    }
    let text = reader.take(total - offsets_len)?;
    let mut values = Vec::with_capacity(count);
    let mut start = 0usize;
    for end in ends {
        let slice = text
            .get(start..end)
            .ok_or_else(|| TdmsError::invalid_format("string offset out of bounds"))?;
        let value = std::str::from_utf8(slice)
            .map_err(|_| TdmsError::invalid_format("string value is not valid UTF-8"))?;
        values.push(value.to_owned());
        start = end;
    }
    Ok(ChannelData::Text(values))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lead_in(toc: u32, next: u64, raw: u64) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(SEGMENT_TAG);
        out.extend_from_slice(&toc.to_le_bytes());
        out.extend_from_slice(&4713u32.to_le_bytes());
        out.extend_from_slice(&next.to_le_bytes());
        out.extend_from_slice(&raw.to_le_bytes());
        out
    }

    fn put_string(out: &mut Vec<u8>, value: &str) {
        out.extend_from_slice(&(value.len() as u32).to_le_bytes());
        out.extend_from_slice(value.as_bytes());
    }

    /// One channel `/'g'/'c'` of i32 with `values` per chunk.
    fn metadata_i32(values: u64) -> Vec<u8> {
        let mut meta = Vec::new();
        meta.extend_from_slice(&1u32.to_le_bytes());
        put_string(&mut meta, "/'g'/'c'");
        meta.extend_from_slice(&20u32.to_le_bytes());
        meta.extend_from_slice(&DataType::I32.code().to_le_bytes());
        meta.extend_from_slice(&1u32.to_le_bytes());
        meta.extend_from_slice(&values.to_le_bytes());
        meta.extend_from_slice(&0u32.to_le_bytes());
        meta
    }

    #[test]
    fn empty_input_is_an_empty_file() {
        let file = parse_tdms(&[]).unwrap();
        assert!(file.groups().is_empty());
    }

    #[test]
    fn rejects_bad_tag() {
        let mut data = lead_in(0, 0, 0);
        data[..4].copy_from_slice(b"TDSh");
        assert!(matches!(
            parse_tdms(&data),
            Err(TdmsError::InvalidTag { offset: 0 })
        ));
    }

    #[test]
    fn reads_multiple_chunks_in_one_segment() {
        let meta = metadata_i32(2);
        let raw: Vec<u8> = [1i32, 2, 3, 4]
            .iter()
            .flat_map(|v| v.to_le_bytes())
            .collect();
        let toc = toc::META_DATA | toc::NEW_OBJ_LIST | toc::RAW_DATA;
        let mut data = lead_in(toc, (meta.len() + raw.len()) as u64, meta.len() as u64);
        data.extend_from_slice(&meta);
        data.extend_from_slice(&raw);

        let file = parse_tdms(&data).unwrap();
        let channel = file.group("g").and_then(|g| g.channel("c")).unwrap();
        assert_eq!(channel.data, ChannelData::Integer(vec![1, 2, 3, 4]));
    }

    #[test]
    fn segment_without_metadata_reuses_object_list() {
        let meta = metadata_i32(1);
        let toc_first = toc::META_DATA | toc::NEW_OBJ_LIST | toc::RAW_DATA;
        let mut data = lead_in(toc_first, (meta.len() + 4) as u64, meta.len() as u64);
        data.extend_from_slice(&meta);
        data.extend_from_slice(&7i32.to_le_bytes());
        data.extend(lead_in(toc::RAW_DATA, 4, 0));
        data.extend_from_slice(&8i32.to_le_bytes());

        let file = parse_tdms(&data).unwrap();
        let channel = file.group("g").and_then(|g| g.channel("c")).unwrap();
        assert_eq!(channel.data, ChannelData::Integer(vec![7, 8]));
    }

    #[test]
    fn incomplete_segment_reads_to_end_of_file() {
        let meta = metadata_i32(1);
        let toc = toc::META_DATA | toc::NEW_OBJ_LIST | toc::RAW_DATA;
        let mut data = lead_in(toc, u64::MAX, meta.len() as u64);
        data.extend_from_slice(&meta);
        data.extend_from_slice(&5i32.to_le_bytes());
        data.extend_from_slice(&6i32.to_le_bytes());
        data.push(0xAA);

        let file = parse_tdms(&data).unwrap();
        let channel = file.group("g").and_then(|g| g.channel("c")).unwrap();
        assert_eq!(channel.data, ChannelData::Integer(vec![5, 6]));
    }

    #[test]
    fn reuse_without_previous_index_fails() {
        let mut meta = Vec::new();
        meta.extend_from_slice(&1u32.to_le_bytes());
        put_string(&mut meta, "/'g'/'c'");
        meta.extend_from_slice(&SAME_RAW_DATA_INDEX.to_le_bytes());
        meta.extend_from_slice(&0u32.to_le_bytes());
        let mut data = lead_in(toc::META_DATA, meta.len() as u64, meta.len() as u64);
        data.extend_from_slice(&meta);

        assert!(matches!(
            parse_tdms(&data),
            Err(TdmsError::MissingPreviousIndex { .. })
        ));
    }

    #[test]
    fn reads_interleaved_big_endian_data() {
        let mut meta = Vec::new();
        meta.extend_from_slice(&2u32.to_be_bytes());
        for name in ["/'g'/'a'", "/'g'/'b'"] {
            meta.extend_from_slice(&(name.len() as u32).to_be_bytes());
            meta.extend_from_slice(name.as_bytes());
            meta.extend_from_slice(&20u32.to_be_bytes());
            meta.extend_from_slice(&DataType::I16.code().to_be_bytes());
            meta.extend_from_slice(&1u32.to_be_bytes());
            meta.extend_from_slice(&2u64.to_be_bytes());
            meta.extend_from_slice(&0u32.to_be_bytes());
        }
        let raw: Vec<u8> = [1i16, 10, 2, 20]
            .iter()
            .flat_map(|v| v.to_be_bytes())
            .collect();
        let toc = toc::META_DATA
            | toc::NEW_OBJ_LIST
            | toc::RAW_DATA
            | toc::INTERLEAVED_DATA
            | toc::BIG_ENDIAN;
        let mut data = Vec::new();
        data.extend_from_slice(SEGMENT_TAG);
        data.extend_from_slice(&toc.to_le_bytes());
        data.extend_from_slice(&4713u32.to_be_bytes());
        data.extend_from_slice(&((meta.len() + raw.len()) as u64).to_be_bytes());
        data.extend_from_slice(&(meta.len() as u64).to_be_bytes());
        data.extend_from_slice(&meta);
        data.extend_from_slice(&raw);

        let file = parse_tdms(&data).unwrap();
        let group = file.group("g").unwrap();
        assert_eq!(group.channel("a").unwrap().data, ChannelData::Integer(vec![1, 2]));
        assert_eq!(
            group.channel("b").unwrap().data,
            ChannelData::Integer(vec![10, 20])
        );
    }

    #[test]
    fn object_path_must_be_utf8() {
        let mut meta = Vec::new();
        meta.extend_from_slice(&1u32.to_le_bytes());
        let path = [b'/', b'\'', 0xFF, b'\''];
        meta.extend_from_slice(&(path.len() as u32).to_le_bytes());
        meta.extend_from_slice(&path);
        meta.extend_from_slice(&NO_RAW_DATA.to_le_bytes());
        meta.extend_from_slice(&0u32.to_le_bytes());
        let toc = toc::META_DATA | toc::NEW_OBJ_LIST;
        let mut data = lead_in(toc, meta.len() as u64, meta.len() as u64);
        data.extend_from_slice(&meta);

        assert!(matches!(
            parse_tdms(&data),
            Err(TdmsError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn rejects_daqmx_segments() {
        let data = lead_in(toc::DAQMX_RAW_DATA, 0, 0);
        assert!(matches!(
            parse_tdms(&data),
            Err(TdmsError::Unsupported { .. })
        ));
    }
}
