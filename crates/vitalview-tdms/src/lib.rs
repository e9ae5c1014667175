//! TDMS container reader and writer.
//!
//! VitalView stores telemetry in NI TDMS files: one `System` group with the
//! master `Time` channel and one group per implanted subject. This crate
//! decodes such files into a [`TdmsFile`], which implements
//! [`vitalview_model::Recording`].
//!
//! # Features
//!
//! - Segment walking with object lists carried across segments
//! - Contiguous and interleaved raw data, little- and big-endian
//! - Integer, float, bool, string and timestamp channels and properties
//! - A writer for producing recordings in tests and fixtures
//!
//! Timestamps are returned exactly as stored, without a zone. DAQmx raw
//! data is not supported.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use vitalview_model::Recording;
//! use vitalview_tdms::read_tdms;
//!
//! let file = read_tdms(Path::new("recording.tdms")).unwrap();
//! for group in file.group_names() {
//!     println!("{group}: {:?}", file.channel_names(group).unwrap());
//! }
//! ```

mod bytes;
mod error;
mod file;
pub mod path;
mod reader;
pub mod types;
mod writer;

pub use bytes::{decode_timestamp, encode_timestamp};
pub use error::{Result, TdmsError};
pub use file::{Properties, TdmsChannel, TdmsFile, TdmsGroup};
pub use path::ObjectPath;
pub use reader::{TdmsReader, parse_tdms, read_tdms};
pub use types::{DataType, PropertyValue};
pub use writer::{SegmentChannel, TdmsWriter, write_tdms};
