//! TDMS data types, table-of-contents flags and property values.

use chrono::NaiveDateTime;

use crate::error::{Result, TdmsError};

/// Tag at the start of every data segment.
pub const SEGMENT_TAG: &[u8; 4] = b"TDSm";

/// Size of the segment lead-in in bytes.
pub const LEAD_IN_LEN: usize = 28;

/// Version written by current NI libraries.
pub const FILE_FORMAT_VERSION: u32 = 4713;

/// Table-of-contents bits of the segment lead-in.
pub mod toc {
    pub const META_DATA: u32 = 1 << 1;
    pub const NEW_OBJ_LIST: u32 = 1 << 2;
    pub const RAW_DATA: u32 = 1 << 3;
    pub const INTERLEAVED_DATA: u32 = 1 << 5;
    pub const BIG_ENDIAN: u32 = 1 << 6;
    pub const DAQMX_RAW_DATA: u32 = 1 << 7;
}

/// Raw data index marker: the object has no data in this segment.
pub const NO_RAW_DATA: u32 = 0xFFFF_FFFF;

/// Raw data index marker: reuse the index from the previous segment.
pub const SAME_RAW_DATA_INDEX: u32 = 0x0000_0000;

/// DAQmx format-changing scaler index markers.
pub const DAQMX_INDEX_MARKERS: [u32; 2] = [0x6912_0000, 0x6913_0000];

/// Sample data types this reader understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    F32WithUnit,
    F64WithUnit,
    String,
    Boolean,
    Timestamp,
}

impl DataType {
    /// Decode a type code from the file.
    pub fn from_code(code: u32) -> Result<Self> {
        Ok(match code {
            0x01 => Self::I8,
            0x02 => Self::I16,
            0x03 => Self::I32,
            0x04 => Self::I64,
            0x05 => Self::U8,
            0x06 => Self::U16,
            0x07 => Self::U32,
            0x08 => Self::U64,
            0x09 => Self::F32,
            0x0A => Self::F64,
            0x19 => Self::F32WithUnit,
            0x1A => Self::F64WithUnit,
            0x20 => Self::String,
            0x21 => Self::Boolean,
            0x44 => Self::Timestamp,
            other => return Err(TdmsError::unsupported(format!("data type 0x{other:X}"))),
        })
    }

    pub fn code(self) -> u32 {
        match self {
            Self::I8 => 0x01,
            Self::I16 => 0x02,
            Self::I32 => 0x03,
            Self::I64 => 0x04,
            Self::U8 => 0x05,
            Self::U16 => 0x06,
            Self::U32 => 0x07,
            Self::U64 => 0x08,
            Self::F32 => 0x09,
            Self::F64 => 0x0A,
            Self::F32WithUnit => 0x19,
            Self::F64WithUnit => 0x1A,
            Self::String => 0x20,
            Self::Boolean => 0x21,
            Self::Timestamp => 0x44,
        }
    }

    /// Size of one sample, or `None` for variable-length strings.
    pub fn fixed_size(self) -> Option<usize> {
        match self {
            Self::I8 | Self::U8 | Self::Boolean => Some(1),
            Self::I16 | Self::U16 => Some(2),
            Self::I32 | Self::U32 | Self::F32 | Self::F32WithUnit => Some(4),
            Self::I64 | Self::U64 | Self::F64 | Self::F64WithUnit => Some(8),
            Self::Timestamp => Some(16),
            Self::String => None,
        }
    }

    /// Kind of [`vitalview_model::ChannelData`] samples of this type decode into.
    pub fn sample_kind(self) -> &'static str {
        match self {
            Self::I8
            | Self::I16
            | Self::I32
            | Self::I64
            | Self::U8
            | Self::U16
            | Self::U32
            | Self::U64 => "integer",
            Self::F32 | Self::F64 | Self::F32WithUnit | Self::F64WithUnit => "float",
            Self::String => "text",
            Self::Boolean => "boolean",
            Self::Timestamp => "timestamp",
        }
    }
}

/// Raw data index of one object within one segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawDataIndex {
    pub data_type: DataType,
    /// Values per chunk.
    pub values: u64,
    /// Bytes per chunk for string channels (offset table included).
    pub total_bytes: Option<u64>,
}

impl RawDataIndex {
    /// Bytes this object occupies in one chunk.
    pub fn chunk_bytes(&self) -> Result<u64> {
        match (self.data_type.fixed_size(), self.total_bytes) {
            (Some(size), _) => self
                .values
                .checked_mul(size as u64)
                .ok_or_else(|| TdmsError::invalid_format("raw data index overflow")),
            (None, Some(total)) => Ok(total),
            (None, None) => Err(TdmsError::invalid_format(
                "string raw data index without total size",
            )),
        }
    }
}

/// Value of an object property.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Integer(i64),
    Float(f64),
    Text(String),
    Boolean(bool),
    Timestamp(NaiveDateTime),
}

impl PropertyValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(value) => Some(*value),
            Self::Integer(value) => Some(*value as f64),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_codes_round_trip() {
        for code in [0x01, 0x04, 0x08, 0x0A, 0x1A, 0x20, 0x21, 0x44] {
            assert_eq!(DataType::from_code(code).unwrap().code(), code);
        }
        assert!(matches!(
            DataType::from_code(0x0B),
            Err(TdmsError::Unsupported { .. })
        ));
    }

    #[test]
    fn chunk_bytes() {
        let index = RawDataIndex {
            data_type: DataType::Timestamp,
            values: 3,
            total_bytes: None,
        };
        assert_eq!(index.chunk_bytes().unwrap(), 48);

        let index = RawDataIndex {
            data_type: DataType::String,
            values: 2,
            total_bytes: Some(13),
        };
        assert_eq!(index.chunk_bytes().unwrap(), 13);
    }
}
