//! Integration tests for reading TDMS files produced by the writer.

use std::fs;

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use proptest::prelude::*;
use tempfile::tempdir;
use vitalview_model::{ChannelData, Recording, SourceError};
use vitalview_tdms::{
    ObjectPath, PropertyValue, SegmentChannel, TdmsError, TdmsWriter, parse_tdms, read_tdms,
    write_tdms,
};

fn timeline(start_minute: i64, len: usize) -> Vec<NaiveDateTime> {
    let start = NaiveDate::from_ymd_opt(2021, 6, 1)
        .and_then(|d| d.and_hms_opt(9, 0, 0))
        .unwrap();
    (0..len as i64)
        .map(|i| start + TimeDelta::minutes(start_minute + i))
        .collect()
}

#[test]
fn reads_vitalview_layout_from_disk() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("recording.tdms");

    let time = ChannelData::Timestamp(timeline(0, 3));
    let heart = ChannelData::Float(vec![412.0, f64::NAN, 398.5]);
    let activity = ChannelData::Float(vec![0.0, 1.5, 3.0]);
    let notes = ChannelData::Text(vec!["dose".to_string(), "".to_string(), "ok".to_string()]);
    write_tdms(
        &path,
        &[
            SegmentChannel::new("System", "Time", &time),
            SegmentChannel::new("111-1", "Heart Rate", &heart),
            SegmentChannel::new("111-1", "Activity", &activity),
            SegmentChannel::new("Event", "Notes", &notes),
        ],
    )
    .expect("write tdms");

    let file = read_tdms(&path).expect("read tdms");
    assert_eq!(file.group_names(), vec!["System", "111-1", "Event"]);
    assert_eq!(
        file.channel_names("111-1").unwrap(),
        vec!["Heart Rate", "Activity"]
    );
    assert_eq!(file.channel("System", "Time").unwrap(), &time);
    assert_eq!(file.channel("Event", "Notes").unwrap(), &notes);

    let ChannelData::Float(values) = file.channel("111-1", "Heart Rate").unwrap() else {
        panic!("heart rate should decode as float");
    };
    assert_eq!(values[0], 412.0);
    assert!(values[1].is_nan());
    assert_eq!(values[2], 398.5);

    assert_eq!(
        file.channel("111-1", "Temperature"),
        Err(SourceError::missing_channel("111-1", "Temperature"))
    );
}

#[test]
fn concatenates_segments_and_keeps_properties() {
    let mut writer = TdmsWriter::new(Vec::new());
    writer.set_property(
        ObjectPath::Root,
        "name",
        PropertyValue::Text("Study 7".to_string()),
    );
    writer.set_property(
        ObjectPath::channel("111-1", "Temperature"),
        "unit_string",
        PropertyValue::Text("deg C".to_string()),
    );

    let time_a = ChannelData::Timestamp(timeline(0, 2));
    let temp_a = ChannelData::Float(vec![37.1, 37.2]);
    writer
        .write_segment(&[
            SegmentChannel::new("System", "Time", &time_a),
            SegmentChannel::new("111-1", "Temperature", &temp_a),
        ])
        .unwrap();

    // Same layout: raw data only.
    let time_b = ChannelData::Timestamp(timeline(2, 2));
    let temp_b = ChannelData::Float(vec![37.3, 37.4]);
    writer
        .write_segment(&[
            SegmentChannel::new("System", "Time", &time_b),
            SegmentChannel::new("111-1", "Temperature", &temp_b),
        ])
        .unwrap();

    // New layout with a new group and a pending group property.
    writer.set_property(
        ObjectPath::group("111-2"),
        "implant",
        PropertyValue::Integer(42),
    );
    let time_c = ChannelData::Timestamp(timeline(4, 1));
    let temp_c = ChannelData::Float(vec![37.5]);
    let heart_c = ChannelData::Integer(vec![401]);
    writer
        .write_segment(&[
            SegmentChannel::new("System", "Time", &time_c),
            SegmentChannel::new("111-1", "Temperature", &temp_c),
            SegmentChannel::new("111-2", "Heart Rate", &heart_c),
        ])
        .unwrap();

    let bytes = writer.finish().unwrap();
    let file = parse_tdms(&bytes).expect("parse tdms");

    assert_eq!(file.group_names(), vec!["System", "111-1", "111-2"]);
    assert_eq!(
        file.channel("System", "Time").unwrap(),
        &ChannelData::Timestamp(timeline(0, 5))
    );
    assert_eq!(
        file.channel("111-1", "Temperature").unwrap(),
        &ChannelData::Float(vec![37.1, 37.2, 37.3, 37.4, 37.5])
    );
    assert_eq!(
        file.channel("111-2", "Heart Rate").unwrap(),
        &ChannelData::Integer(vec![401])
    );

    assert_eq!(
        file.property("name").and_then(PropertyValue::as_str),
        Some("Study 7")
    );
    let temperature = file
        .group("111-1")
        .and_then(|group| group.channel("Temperature"))
        .unwrap();
    assert_eq!(
        temperature.property("unit_string").and_then(PropertyValue::as_str),
        Some("deg C")
    );
    assert_eq!(
        file.group("111-2")
            .and_then(|group| group.property("implant"))
            .and_then(PropertyValue::as_f64),
        Some(42.0)
    );
}

#[test]
fn type_change_between_segments_is_an_error() {
    let mut writer = TdmsWriter::new(Vec::new());
    let floats = ChannelData::Float(vec![1.0]);
    let texts = ChannelData::Text(vec!["x".to_string()]);
    writer
        .write_segment(&[SegmentChannel::new("g", "c", &floats)])
        .unwrap();
    writer
        .write_segment(&[SegmentChannel::new("g", "c", &texts)])
        .unwrap();
    let bytes = writer.finish().unwrap();

    let err = parse_tdms(&bytes).unwrap_err();
    assert!(matches!(
        err,
        TdmsError::TypeChanged {
            previous: "float",
            current: "text",
            ..
        }
    ));
}

#[test]
fn missing_file_is_reported_with_path() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("absent.tdms");
    let err = read_tdms(&path).unwrap_err();
    assert!(matches!(err, TdmsError::FileNotFound { .. }));
    assert!(err.to_string().contains("absent.tdms"));
}

#[test]
fn truncated_metadata_is_an_error() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("cut.tdms");
    let data = ChannelData::Float(vec![1.0, 2.0]);
    write_tdms(&path, &[SegmentChannel::new("g", "c", &data)]).unwrap();

    let bytes = fs::read(&path).unwrap();
    let err = parse_tdms(&bytes[..40]).unwrap_err();
    assert!(matches!(err, TdmsError::Truncated { .. }));
}

proptest! {
    #[test]
    fn segments_concatenate_in_order(
        chunks in proptest::collection::vec(
            proptest::collection::vec(-1.0e6f64..1.0e6, 0..8),
            1..5,
        )
    ) {
        let mut writer = TdmsWriter::new(Vec::new());
        for chunk in &chunks {
            let data = ChannelData::Float(chunk.clone());
            writer.write_segment(&[SegmentChannel::new("g", "c", &data)]).unwrap();
        }
        let file = parse_tdms(&writer.finish().unwrap()).unwrap();
        let expected: Vec<f64> = chunks.concat();
        prop_assert_eq!(file.channel("g", "c").unwrap(), &ChannelData::Float(expected));
    }
}
