//! Data model for VitalView telemetry recordings.
//!
//! A recording holds one master timeline (`System`/`Time`) and one group per
//! subject with any subset of the heart rate, temperature and activity
//! channels. The types here describe both sides of the reshaping:
//!
//! - [`Recording`] and [`ChannelData`]: the columnar source as exposed by a
//!   container reader.
//! - [`Reading`], [`Row`], [`SubjectTable`] and [`Dataset`]: the row-oriented,
//!   per-subject result.

pub mod error;
pub mod metric;
pub mod recording;
pub mod table;

pub use error::{ModelError, SourceError};
pub use metric::{Metric, Reading};
pub use recording::{
    ChannelData, MemoryRecording, RESERVED_GROUPS, Recording, TIMELINE_CHANNEL, TIMELINE_GROUP,
    TIME_COLUMN, is_reserved_group,
};
pub use table::{Dataset, Row, SubjectTable};
