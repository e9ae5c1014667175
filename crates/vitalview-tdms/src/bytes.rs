//! Bounds-checked primitive decoding and the TDMS timestamp codec.

use chrono::{DateTime, NaiveDateTime};

use crate::error::{Result, TdmsError};

/// Seconds between 1904-01-01T00:00:00 and the Unix epoch.
const EPOCH_1904_UNIX_OFFSET: i64 = 2_082_844_800;

const NANOS_PER_SECOND: u128 = 1_000_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Endian {
    #[default]
    Little,
    Big,
}

macro_rules! read_primitive {
    ($($name:ident => $ty:ty),* $(,)?) => {
        $(
            pub fn $name(&mut self) -> Result<$ty> {
                let bytes = self.array::<{ std::mem::size_of::<$ty>() }>()?;
                Ok(match self.endian {
                    Endian::Little => <$ty>::from_le_bytes(bytes),
                    Endian::Big => <$ty>::from_be_bytes(bytes),
                })
            }
        )*
    };
}

/// Cursor over an in-memory buffer.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
    endian: Endian,
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8], pos: usize, endian: Endian) -> Self {
        Self { data, pos, endian }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self.pos.checked_add(len).ok_or(TdmsError::Truncated {
            offset: self.pos,
            needed: len,
        })?;
        let slice = self.data.get(self.pos..end).ok_or(TdmsError::Truncated {
            offset: self.pos,
            needed: len,
        })?;
        self.pos = end;
        Ok(slice)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    read_primitive! {
        u8 => u8,
        i8 => i8,
        u16 => u16,
        i16 => i16,
        u32 => u32,
        i32 => i32,
        u64 => u64,
        i64 => i64,
        f32 => f32,
        f64 => f64,
    }

    pub fn boolean(&mut self) -> Result<bool> {
        Ok(self.u8()? != 0)
    }

    /// Length-prefixed UTF-8 string.
    pub fn string(&mut self) -> Result<String> {
        let len = self.u32()? as usize;
        let offset = self.pos;
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| {
            TdmsError::invalid_format(format!("string at offset {offset} is not valid UTF-8"))
        })
    }

    /// 16-byte timestamp: 2^-64 second fractions plus seconds since 1904.
    ///
    /// Little-endian files store the fraction first, big-endian files the
    /// seconds first.
    pub fn timestamp(&mut self) -> Result<NaiveDateTime> {
        let (seconds, fractions) = match self.endian {
            Endian::Little => {
                let fractions = self.u64()?;
                (self.i64()?, fractions)
            }
            Endian::Big => {
                let seconds = self.i64()?;
                (seconds, self.u64()?)
            }
        };
        decode_timestamp(seconds, fractions)
    }
}

/// Convert a TDMS timestamp into a naive date-time.
///
/// The value is taken as written; no zone is attached or applied.
pub fn decode_timestamp(seconds: i64, fractions: u64) -> Result<NaiveDateTime> {
    let half = 1u128 << 63;
    let mut nanos = ((u128::from(fractions) * NANOS_PER_SECOND + half) >> 64) as u32;
    let mut seconds = seconds;
    if u128::from(nanos) >= NANOS_PER_SECOND {
        nanos -= NANOS_PER_SECOND as u32;
        seconds = seconds
            .checked_add(1)
            .ok_or(TdmsError::TimestampOutOfRange { seconds })?;
    }
    let unix = seconds
        .checked_sub(EPOCH_1904_UNIX_OFFSET)
        .ok_or(TdmsError::TimestampOutOfRange { seconds })?;
    DateTime::from_timestamp(unix, nanos)
        .map(|dt| dt.naive_utc())
        .ok_or(TdmsError::TimestampOutOfRange { seconds })
}

/// Inverse of [`decode_timestamp`]: `(seconds since 1904, fractions)`.
pub fn encode_timestamp(value: NaiveDateTime) -> (i64, u64) {
    let utc = value.and_utc();
    let seconds = utc.timestamp() + EPOCH_1904_UNIX_OFFSET;
    let nanos = u128::from(utc.timestamp_subsec_nanos());
    let fractions = ((nanos << 64) / NANOS_PER_SECOND) as u64;
    (seconds, fractions)
}
