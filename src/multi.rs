//! Splitting frames into per-series frames.
//!
//! [`partition_by_values`] cuts a frame into one frame per distinct key
//! tuple. [`to_multi`] builds on the same grouping to emit one two-field
//! `[time, value]` frame per value field and key tuple.

use crate::classify::{Classification, FieldRole};
use crate::config::PartitionOptions;
use crate::frame::{Frame, FrameKind, Labels, Value};
use crate::matcher::{matching_indices, FieldMatcher};
use crate::naming::{build_field_labels, FrameNaming};
use crate::partition::partition;
use crate::Result;

/// Key pairs of `frame` at `row`, in key-field order.
fn key_pairs<'a>(
    frame: &'a Frame,
    key_indices: &[usize],
    row: usize,
) -> Vec<(&'a str, &'a Value)> {
    key_indices
        .iter()
        .map(|&index| {
            let field = &frame.fields[index];
            (field.name.as_str(), &field.values[row])
        })
        .collect()
}

fn group_rows(frame: &Frame, key_indices: &[usize]) -> Result<Vec<Vec<usize>>> {
    let columns: Vec<&[Value]> = key_indices
        .iter()
        .map(|&index| frame.fields[index].values.as_slice())
        .collect();
    partition(&columns)
}

/// Split `frame` by the distinct values of the fields `matcher` selects.
///
/// Every field is index-gathered per group. Key fields are dropped from the
/// output unless `keep_fields` is set. If no field matches, the frame is
/// returned unchanged.
///
/// # Errors
///
/// - `Error::LengthMismatch`: `frame` is malformed
pub fn partition_by_values(
    frame: &Frame,
    matcher: &dyn FieldMatcher,
    naming: &FrameNaming,
    keep_fields: bool,
) -> Result<Vec<Frame>> {
    frame.validate()?;
    let key_indices = matching_indices(matcher, frame, std::slice::from_ref(frame));
    if key_indices.is_empty() {
        return Ok(vec![frame.clone()]);
    }
    let time_index = frame.first_time_field();
    let groups = group_rows(frame, &key_indices)?;

    let frames = groups
        .iter()
        .map(|rows| {
            let keys = key_pairs(frame, &key_indices, rows[0]);
            let (name, labels) = if naming.as_labels {
                (frame.name.clone(), build_field_labels(&keys))
            } else {
                (
                    Some(naming.series_name(frame.non_empty_name(), &keys)),
                    Labels::new(),
                )
            };
            let fields = frame
                .fields
                .iter()
                .enumerate()
                .filter(|(index, _)| keep_fields || !key_indices.contains(index))
                .map(|(index, field)| {
                    let mut out = field.gather(rows);
                    if Some(index) != time_index {
                        out.labels.extend(labels.clone());
                    }
                    out
                })
                .collect();
            Frame {
                name,
                fields,
                kind: frame.kind,
            }
        })
        .collect();
    Ok(frames)
}

/// [`partition_by_values`] with key fields selected by name.
pub fn partition_by_values_with(frame: &Frame, options: &PartitionOptions) -> Result<Vec<Frame>> {
    partition_by_values(frame, &options.matcher(), &options.naming, options.keep_fields)
}

/// Expand a frame into one `[time, value]` frame per value field and key tuple.
///
/// Key fields are the ones `key_matcher` selects; every other non-time field
/// is a value field. Series whose gathered values are all null are not
/// emitted. A frame with no matching key field is returned unchanged; a frame
/// without a time field yields nothing.
///
/// # Errors
///
/// - `Error::LengthMismatch`: `frame` is malformed
pub fn to_multi(
    frame: &Frame,
    key_matcher: &dyn FieldMatcher,
    naming: &FrameNaming,
) -> Result<Vec<Frame>> {
    frame.validate()?;
    let classes = Classification::of(frame);
    let mut key_indices = matching_indices(key_matcher, frame, std::slice::from_ref(frame));
    key_indices.retain(|&index| Some(index) != classes.time_index());
    if key_indices.is_empty() {
        return Ok(vec![frame.clone()]);
    }
    expand(frame, &classes, &key_indices, naming)
}

/// Expand a long frame on the fields classified as [`FieldRole::Key`].
///
/// A frame without key fields splits into one `[time, value]` frame per
/// non-empty value field.
pub(crate) fn expand_by_role(frame: &Frame, naming: &FrameNaming) -> Result<Vec<Frame>> {
    let classes = Classification::of(frame);
    let key_indices: Vec<usize> = classes.indices(FieldRole::Key).collect();
    if key_indices.is_empty() {
        return Ok(split_value_fields(frame, &classes));
    }
    expand(frame, &classes, &key_indices, naming)
}

fn expand(
    frame: &Frame,
    classes: &Classification,
    key_indices: &[usize],
    naming: &FrameNaming,
) -> Result<Vec<Frame>> {
    let Some(time_index) = classes.time_index() else {
        log::debug!("dropping frame {:?}: no time field for multi conversion", frame.name);
        return Ok(Vec::new());
    };
    let time_field = &frame.fields[time_index];
    let groups = group_rows(frame, key_indices)?;

    let mut out = Vec::new();
    for (index, field) in frame.fields.iter().enumerate() {
        if index == time_index || key_indices.contains(&index) {
            continue;
        }
        for rows in &groups {
            let mut value = field.gather(rows);
            if value.values.iter().all(Value::is_null) {
                continue;
            }
            let keys = key_pairs(frame, key_indices, rows[0]);
            let name = if naming.as_labels {
                value.labels.extend(build_field_labels(&keys));
                frame.name.clone()
            } else {
                Some(naming.series_name(frame.non_empty_name(), &keys))
            };
            out.push(Frame {
                name,
                fields: vec![time_field.gather(rows), value],
                kind: FrameKind::Multi,
            });
        }
    }
    log::trace!(
        "expanded frame {:?} into {} series over {} groups",
        frame.name,
        out.len(),
        groups.len()
    );
    Ok(out)
}

fn split_value_fields(frame: &Frame, classes: &Classification) -> Vec<Frame> {
    let Some(time_index) = classes.time_index() else {
        log::debug!("dropping frame {:?}: no time field for multi conversion", frame.name);
        return Vec::new();
    };
    classes
        .indices(FieldRole::Value)
        .map(|index| &frame.fields[index])
        .filter(|field| !field.values.iter().all(Value::is_null))
        .map(|field| Frame {
            name: frame.name.clone(),
            fields: vec![frame.fields[time_index].clone(), field.clone()],
            kind: FrameKind::Multi,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{Field, FieldConfig, FieldType};
    use crate::matcher::{ByNames, ByType};

    fn host_frame() -> Frame {
        Frame::new(vec![
            Field::time("time", [1, 1, 2, 2]),
            Field::string("host", ["a", "b", "a", "b"]),
            Field::number("value", [10, 20, 30, 40]),
        ])
        .with_kind(FrameKind::Long)
    }

    #[test]
    fn long_frame_splits_by_host() {
        let frames =
            to_multi(&host_frame(), &ByNames::new(["host"]), &FrameNaming::default()).unwrap();
        assert_eq!(frames.len(), 2);

        let a = &frames[0];
        assert_eq!(a.kind, FrameKind::Multi);
        assert_eq!(a.fields.len(), 2);
        assert_eq!(a.fields[0].values, vec![Value::from(1), Value::from(2)]);
        assert_eq!(a.fields[1].values, vec![Value::from(10), Value::from(30)]);
        assert_eq!(a.fields[1].labels.get("host").map(String::as_str), Some("a"));

        let b = &frames[1];
        assert_eq!(b.fields[0].values, vec![Value::from(1), Value::from(2)]);
        assert_eq!(b.fields[1].values, vec![Value::from(20), Value::from(40)]);
        assert_eq!(b.fields[1].labels.get("host").map(String::as_str), Some("b"));
    }

    #[test]
    fn names_instead_of_labels() {
        let frame = host_frame().with_name("cpu");
        let naming = FrameNaming {
            append: true,
            with_names: true,
            ..FrameNaming::display_names()
        };
        let frames = to_multi(&frame, &ByNames::new(["host"]), &naming).unwrap();
        let names: Vec<_> = frames.iter().map(|f| f.non_empty_name()).collect();
        assert_eq!(names, vec![Some("cpu host=a"), Some("cpu host=b")]);
        assert!(frames[0].fields[1].labels.is_empty());
    }

    #[test]
    fn one_series_per_value_field_and_group() {
        let config = FieldConfig {
            unit: Some("bytes".to_string()),
            ..FieldConfig::default()
        };
        let frame = Frame::new(vec![
            Field::time("time", [1, 1, 2]),
            Field::string("host", ["a", "b", "a"]),
            Field::number("rx", [1, 2, 3]).with_config(config.clone()),
            Field::number("tx", [Value::from(4), Value::Null, Value::from(6)]),
        ]);
        let frames = to_multi(&frame, &ByType(FieldType::String), &FrameNaming::default()).unwrap();
        let summary: Vec<(String, Option<String>, usize)> = frames
            .iter()
            .map(|f| {
                (
                    f.fields[1].name.clone(),
                    f.fields[1].labels.get("host").cloned(),
                    f.len(),
                )
            })
            .collect();
        assert_eq!(
            summary,
            vec![
                ("rx".to_string(), Some("a".to_string()), 2),
                ("rx".to_string(), Some("b".to_string()), 1),
                ("tx".to_string(), Some("a".to_string()), 2),
            ]
        );
        assert_eq!(frames[0].fields[1].config, config);
    }

    #[test]
    fn no_key_match_returns_frame_unchanged() {
        let frame = host_frame();
        let frames =
            to_multi(&frame, &ByNames::new(["missing"]), &FrameNaming::default()).unwrap();
        assert_eq!(frames, vec![frame]);
    }

    #[test]
    fn frame_without_time_is_dropped() {
        let frame = Frame::new(vec![
            Field::string("host", ["a"]),
            Field::number("value", [1]),
        ]);
        assert!(to_multi(&frame, &ByType(FieldType::String), &FrameNaming::default())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn keyless_frames_split_per_value_field() {
        let frame = Frame::new(vec![
            Field::number("a", [1, 2]),
            Field::time("time", [1, 2]),
            Field::number("b", [Value::Null, Value::Null]),
            Field::number("c", [3, 4]),
        ]);
        let frames = expand_by_role(&frame, &FrameNaming::default()).unwrap();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].fields[0].name, "time");
        assert_eq!(frames[0].fields[1].name, "a");
        assert_eq!(frames[1].fields[1].name, "c");
        assert!(frames.iter().all(|f| f.kind == FrameKind::Multi));
    }

    #[test]
    fn booleans_are_not_keys_when_expanding_by_role() {
        let frame = Frame::new(vec![
            Field::time("time", [1, 2]),
            Field::string("host", ["a", "a"]),
            Field::number("cpu", [Value::from(1), Value::Null]),
            Field::boolean("up", [Value::Null, Value::from(true)]),
        ])
        .with_kind(FrameKind::Long);
        let frames = expand_by_role(&frame, &FrameNaming::default()).unwrap();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].fields[1].name, "cpu");
        assert_eq!(frames[1].fields[1].name, "up");
        assert_eq!(frames[1].fields[1].labels.get("host").map(String::as_str), Some("a"));
        assert!(!frames[1].fields[1].labels.contains_key("up"));
    }

    #[test]
    fn partition_by_values_drops_key_fields() {
        let frames = partition_by_values(
            &host_frame(),
            &ByNames::new(["host"]),
            &FrameNaming::default(),
            false,
        )
        .unwrap();
        assert_eq!(frames.len(), 2);
        let fields: Vec<_> = frames[1].fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(fields, vec!["time", "value"]);
        assert!(frames[1].fields[0].labels.is_empty());
        assert_eq!(
            frames[1].fields[1].labels.get("host").map(String::as_str),
            Some("b")
        );
    }

    #[test]
    fn partition_by_values_with_options() {
        let frame = Frame::new(vec![
            Field::time("Time", [1, 2, 3, 4]),
            Field::string("Region", ["US", "EU", "US", "EU"]),
            Field::number("Value", [1520, 2936, 1327, 912]),
        ]);
        let options = PartitionOptions {
            fields: vec!["Region".to_string()],
            naming: FrameNaming::display_names(),
            keep_fields: true,
        };
        let frames = partition_by_values_with(&frame, &options).unwrap();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].non_empty_name(), Some("US"));
        assert_eq!(frames[1].non_empty_name(), Some("EU"));
        assert_eq!(frames[0].fields.len(), 3);
        assert_eq!(frames[0].fields[1].field_type, FieldType::String);
        assert_eq!(frames[1].fields[2].values, vec![Value::from(2936), Value::from(912)]);
    }

    #[test]
    fn empty_options_leave_frame_alone() {
        let frame = host_frame();
        let frames = partition_by_values_with(&frame, &PartitionOptions::default()).unwrap();
        assert_eq!(frames, vec![frame]);
    }
}
