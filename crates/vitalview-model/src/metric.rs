use std::fmt;

use serde::{Deserialize, Serialize};

/// A physiological channel recorded per subject.
///
/// The declaration order is the discovery order used for table columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Metric {
    /// Heart rate in beats per minute.
    HeartRate,
    /// Core body temperature in degrees Celsius.
    Temperature,
    /// Activity counts in arbitrary units.
    Activity,
}

impl Metric {
    /// All metrics in discovery order.
    pub const ALL: [Metric; 3] = [Metric::HeartRate, Metric::Temperature, Metric::Activity];

    /// Channel name inside a subject group, also used as the column name.
    #[must_use]
    pub const fn channel_name(self) -> &'static str {
        match self {
            Self::HeartRate => "Heart Rate",
            Self::Temperature => "Temperature",
            Self::Activity => "Activity",
        }
    }

    /// Look up a metric by its channel (column) name. Matching is exact.
    #[must_use]
    pub fn from_channel_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|metric| metric.channel_name() == name)
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.channel_name())
    }
}

/// One metric sample after missing-value normalization.
///
/// `Missing` is distinct from every numeric value, including zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum Reading {
    Value(f64),
    Missing,
}

impl Reading {
    #[must_use]
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    #[must_use]
    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Value(value) => Some(*value),
            Self::Missing => None,
        }
    }
}

impl From<Reading> for Option<f64> {
    fn from(reading: Reading) -> Self {
        reading.value()
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(value) => write!(f, "{value}"),
            Self::Missing => f.write_str("<missing>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_names_round_trip() {
        for metric in Metric::ALL {
            assert_eq!(Metric::from_channel_name(metric.channel_name()), Some(metric));
        }
        assert_eq!(Metric::from_channel_name("Time"), None);
        assert_eq!(Metric::from_channel_name("heart rate"), None);
    }

    #[test]
    fn zero_is_a_value() {
        let reading = Reading::Value(0.0);
        assert!(!reading.is_missing());
        assert_eq!(reading.value(), Some(0.0));
        assert_eq!(Option::<f64>::from(Reading::Missing), None);
    }
}
