//! Reshaping of VitalView recordings into per-subject tables.
//!
//! The pipeline runs once per recording, in a fixed order:
//!
//! 1. [`read_channels`] pulls the `System`/`Time` timeline and, for every
//!    subject group, the heart rate, temperature and activity channels it has.
//! 2. [`normalize`] turns each wall-clock timeline value into a UTC instant.
//! 3. [`Coerce`] maps the NaN sentinel of every metric sample to
//!    [`Reading::Missing`](vitalview_model::Reading::Missing).
//! 4. [`align_rows`] zips the timeline with the subject's channels by index.
//! 5. [`extract_dataset`] collects the tables into a
//!    [`Dataset`](vitalview_model::Dataset) in discovery order.
//!
//! [`summarize`] and [`subject_frame`] consume the finished tables.
//!
//! ```
//! use chrono::{FixedOffset, NaiveDate};
//! use vitalview_core::{extract_dataset_with, summarize};
//! use vitalview_model::{ChannelData, MemoryRecording, Metric};
//!
//! let t0 = NaiveDate::from_ymd_opt(2021, 3, 1)
//!     .and_then(|d| d.and_hms_opt(8, 0, 0))
//!     .unwrap();
//! let recording = MemoryRecording::new()
//!     .with_channel("System", "Time", ChannelData::Timestamp(vec![t0]))
//!     .with_channel("S1", "Heart Rate", ChannelData::Float(vec![72.0]));
//!
//! let utc = FixedOffset::east_opt(0).unwrap();
//! let dataset = extract_dataset_with(&recording, &utc).unwrap();
//! let table = dataset.get("S1").unwrap();
//! assert_eq!(table.columns(), vec!["Time", "Heart Rate"]);
//! assert_eq!(summarize(table, Metric::HeartRate).sum, Some(72.0));
//! ```

pub mod align;
pub mod channels;
pub mod coerce;
pub mod dataset;
pub mod error;
pub mod frame;
pub mod summary;
pub mod timestamp;

pub use align::align_rows;
pub use channels::{RawRecording, RawSubject, read_channels, read_subject, read_timeline};
pub use coerce::{Coerce, coerce_channel};
pub use dataset::{extract_dataset, extract_dataset_with, normalize_timeline};
pub use error::{CoercionError, ExtractError, InvalidSample, TimestampError};
pub use frame::subject_frame;
pub use summary::{Summary, summarize, summarize_column};
pub use timestamp::{HostLocal, LocalOffset, normalize, to_local};
