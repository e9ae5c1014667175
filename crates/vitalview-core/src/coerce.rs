//! Missing-value normalization for metric samples.
//!
//! VitalView writes NaN where a channel has no reading. Coercion turns that
//! sentinel into [`Reading::Missing`] and passes every finite value through
//! unchanged, zero and negatives included.

use vitalview_model::{ChannelData, Reading};

use crate::error::{CoercionError, InvalidSample};

/// Conversion of a raw sample into a [`Reading`].
///
/// Coercing an already coerced [`Reading`] returns it unchanged.
pub trait Coerce {
    fn coerce(self) -> Result<Reading, CoercionError>;
}

impl Coerce for f64 {
    fn coerce(self) -> Result<Reading, CoercionError> {
        if self.is_nan() {
            Ok(Reading::Missing)
        } else if self.is_infinite() {
            Err(CoercionError::NotFinite { value: self })
        } else {
            Ok(Reading::Value(self))
        }
    }
}

impl Coerce for f32 {
    fn coerce(self) -> Result<Reading, CoercionError> {
        f64::from(self).coerce()
    }
}

/// Integers beyond 2^53 in magnitude that would round are rejected.
impl Coerce for i64 {
    fn coerce(self) -> Result<Reading, CoercionError> {
        let widened = self as f64;
        // i64::MAX widens to 2^63, which saturates back to i64::MAX.
        if widened as i128 != i128::from(self) {
            return Err(CoercionError::Inexact { value: self });
        }
        Ok(Reading::Value(widened))
    }
}

impl Coerce for Option<f64> {
    fn coerce(self) -> Result<Reading, CoercionError> {
        match self {
            Some(value) => value.coerce(),
            None => Ok(Reading::Missing),
        }
    }
}

impl Coerce for Reading {
    fn coerce(self) -> Result<Reading, CoercionError> {
        match self {
            Reading::Value(value) => value.coerce(),
            Reading::Missing => Ok(Reading::Missing),
        }
    }
}

/// Coerce every sample of a metric channel.
///
/// Float and integer channels are accepted; any other kind fails at its first
/// sample.
pub fn coerce_channel(data: &ChannelData) -> Result<Vec<Reading>, InvalidSample> {
    match data {
        ChannelData::Float(values) => coerce_all(values.iter().copied()),
        ChannelData::Integer(values) => coerce_all(values.iter().copied()),
        other => Err(InvalidSample {
            index: 0,
            source: CoercionError::NonNumeric { kind: other.kind() },
        }),
    }
}

fn coerce_all<T: Coerce>(values: impl ExactSizeIterator<Item = T>) -> Result<Vec<Reading>, InvalidSample> {
    let mut readings = Vec::with_capacity(values.len());
    for (index, value) in values.enumerate() {
        let reading = value
            .coerce()
            .map_err(|source| InvalidSample { index, source })?;
        readings.push(reading);
    }
    Ok(readings)
}
