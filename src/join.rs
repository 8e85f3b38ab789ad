//! Outer join of many frames into one wide frame.
//!
//! The output key column is the sorted union of every source's join values.
//! Each source row is located by binary search over that source's rows
//! ordered by join value; sources without a row for a key contribute nulls.

use crate::frame::{validate_all, Field, Frame, FrameKind, Value};
use crate::matcher::FieldMatcher;
use crate::multi::expand_by_role;
use crate::naming::FrameNaming;
use crate::Result;

/// Field name the host uses for an anonymous series value.
pub const TIME_SERIES_VALUE_FIELD_NAME: &str = "Value";

struct JoinSource<'a> {
    frame: &'a Frame,
    join_index: usize,
    /// Non-null rows ordered by join value (stable).
    order: Vec<usize>,
}

impl JoinSource<'_> {
    fn key_values(&self) -> &[Value] {
        &self.frame.fields[self.join_index].values
    }

    /// Row holding `key`. With duplicate keys the last row wins.
    fn locate(&self, key: &Value) -> Option<usize> {
        let values = self.key_values();
        let end = self
            .order
            .partition_point(|&row| values[row].total_cmp(key).is_le());
        let row = *self.order.get(end.checked_sub(1)?)?;
        values[row].total_cmp(key).is_eq().then_some(row)
    }
}

/// Outer-join `frames` on the field `join` selects in each frame.
///
/// When every joined frame carries the same name, the output frame takes it.
/// Otherwise each named frame's fields are tagged with their frame name.
/// Frames with no matching field are skipped. Returns `None` for an empty
/// batch or when no frame carries a join field.
///
/// # Errors
///
/// - `Error::LengthMismatch`: an input frame is malformed
pub fn outer_join(frames: &[Frame], join: &dyn FieldMatcher) -> Result<Option<Frame>> {
    validate_all(frames)?;

    let mut sources = Vec::with_capacity(frames.len());
    for frame in frames {
        let Some(join_index) = frame
            .fields
            .iter()
            .position(|field| join.matches(field, frame, frames))
        else {
            log::debug!("skipping frame {:?}: no join field", frame.name);
            continue;
        };
        let values = &frame.fields[join_index].values;
        let mut order: Vec<usize> = (0..frame.len())
            .filter(|&row| !values[row].is_null())
            .collect();
        order.sort_by(|a, b| values[*a].total_cmp(&values[*b]));
        sources.push(JoinSource {
            frame,
            join_index,
            order,
        });
    }

    let Some(first) = sources.first() else {
        return Ok(None);
    };

    let mut keys: Vec<&Value> = sources
        .iter()
        .flat_map(|source| {
            let values = source.key_values();
            source.order.iter().map(move |&row| &values[row])
        })
        .collect();
    keys.sort_by(|a, b| a.total_cmp(b));
    keys.dedup_by(|a, b| a.total_cmp(b).is_eq());

    let shared_name = shared_frame_name(&sources);
    let join_field = &first.frame.fields[first.join_index];
    let mut fields = vec![Field {
        name: join_field.name.clone(),
        field_type: join_field.field_type,
        values: keys.iter().map(|&key| key.clone()).collect(),
        labels: join_field.labels.clone(),
        config: join_field.config.clone(),
    }];

    for source in &sources {
        let rows: Vec<Option<usize>> = keys.iter().map(|key| source.locate(key)).collect();
        for (index, field) in source.frame.fields.iter().enumerate() {
            if index == source.join_index {
                continue;
            }
            let values = rows
                .iter()
                .map(|row| row.map(|row| field.values[row].clone()).unwrap_or_default())
                .collect();
            let mut out = Field {
                name: field.name.clone(),
                field_type: field.field_type,
                values,
                labels: field.labels.clone(),
                config: field.config.clone(),
            };
            if shared_name.is_none() {
                if let Some(frame_name) = source.frame.non_empty_name() {
                    carry_frame_name(&mut out, frame_name);
                }
            }
            fields.push(out);
        }
    }

    log::trace!(
        "joined {} frames into {} rows and {} fields",
        sources.len(),
        keys.len(),
        fields.len()
    );
    Ok(Some(Frame {
        name: shared_name.map(str::to_string),
        fields,
        kind: FrameKind::Wide,
    }))
}

fn shared_frame_name<'a>(sources: &[JoinSource<'a>]) -> Option<&'a str> {
    let (first, rest) = sources.split_first()?;
    let name = first.frame.non_empty_name()?;
    rest.iter()
        .all(|source| source.frame.non_empty_name() == Some(name))
        .then_some(name)
}

fn carry_frame_name(field: &mut Field, frame_name: &str) {
    if field.name == TIME_SERIES_VALUE_FIELD_NAME {
        field.name = frame_name.to_string();
    } else if !field.labels.contains_key("name") {
        field.labels.insert("name".to_string(), frame_name.to_string());
    }
}

/// Assemble one wide frame from a mixed batch.
///
/// Frames tagged [`FrameKind::Long`] are first expanded into labeled series
/// on their key fields; everything is then outer-joined on `join`.
///
/// # Errors
///
/// - `Error::LengthMismatch`: an input frame is malformed
pub fn to_wide(frames: &[Frame], join: &dyn FieldMatcher) -> Result<Option<Frame>> {
    validate_all(frames)?;
    let naming = FrameNaming::default();
    let mut working = Vec::with_capacity(frames.len());
    for frame in frames {
        if frame.kind == FrameKind::Long {
            working.extend(expand_by_role(frame, &naming)?);
        } else {
            working.push(frame.clone());
        }
    }
    outer_join(&working, join)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::FirstTimeField;
    use crate::Error;

    fn series(name: &str, times: &[i64], values: &[f64]) -> Frame {
        Frame::new(vec![
            Field::time("time", times.iter().copied()),
            Field::number(name, values.iter().copied()),
        ])
    }

    #[test]
    fn joins_on_sorted_union_of_times() {
        let a = series("a", &[1, 3], &[10.0, 30.0]);
        let b = series("b", &[2, 3], &[20.0, 31.0]);
        let wide = outer_join(&[a, b], &FirstTimeField).unwrap().unwrap();
        assert_eq!(wide.kind, FrameKind::Wide);
        let names: Vec<_> = wide.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["time", "a", "b"]);
        assert_eq!(
            wide.fields[0].values,
            vec![Value::from(1), Value::from(2), Value::from(3)]
        );
        assert_eq!(
            wide.fields[1].values,
            vec![Value::from(10.0), Value::Null, Value::from(30.0)]
        );
        assert_eq!(
            wide.fields[2].values,
            vec![Value::Null, Value::from(20.0), Value::from(31.0)]
        );
    }

    #[test]
    fn unsorted_sources_and_duplicate_keys() {
        let a = series("a", &[3, 1, 3], &[30.0, 10.0, 33.0]);
        let wide = outer_join(&[a], &FirstTimeField).unwrap().unwrap();
        assert_eq!(wide.fields[0].values, vec![Value::from(1), Value::from(3)]);
        assert_eq!(
            wide.fields[1].values,
            vec![Value::from(10.0), Value::from(33.0)]
        );
    }

    #[test]
    fn empty_input_is_absent() {
        assert!(outer_join(&[], &FirstTimeField).unwrap().is_none());
        assert!(to_wide(&[], &FirstTimeField).unwrap().is_none());
    }

    #[test]
    fn no_join_field_is_absent() {
        let frame = Frame::new(vec![Field::number("a", [1])]);
        assert!(outer_join(&[frame], &FirstTimeField).unwrap().is_none());
    }

    #[test]
    fn frame_names_are_carried_onto_fields() {
        let a = Frame::new(vec![
            Field::time("time", [1]),
            Field::number(TIME_SERIES_VALUE_FIELD_NAME, [1]),
        ])
        .with_name("cpu");
        let b = series("mem", &[1], &[2.0]).with_name("host-a");
        let wide = outer_join(&[a, b], &FirstTimeField).unwrap().unwrap();
        assert_eq!(wide.name, None);
        assert_eq!(wide.fields[1].name, "cpu");
        assert_eq!(wide.fields[2].name, "mem");
        assert_eq!(
            wide.fields[2].labels.get("name").map(String::as_str),
            Some("host-a")
        );
    }

    #[test]
    fn shared_frame_name_becomes_the_output_name() {
        let a = series("cpu", &[1, 2], &[1.0, 2.0]).with_name("cpu_query");
        let b = Frame::new(vec![
            Field::time("time", [2]),
            Field::number(TIME_SERIES_VALUE_FIELD_NAME, [5]).with_label("host", "a"),
        ])
        .with_name("cpu_query");
        let wide = outer_join(&[a, b], &FirstTimeField).unwrap().unwrap();
        assert_eq!(wide.non_empty_name(), Some("cpu_query"));
        assert_eq!(wide.fields[1].name, "cpu");
        assert!(wide.fields[1].labels.is_empty());
        assert_eq!(wide.fields[2].name, TIME_SERIES_VALUE_FIELD_NAME);
        assert_eq!(
            wide.fields[2].labels.get("host").map(String::as_str),
            Some("a")
        );
        assert!(!wide.fields[2].labels.contains_key("name"));
    }

    #[test]
    fn named_and_unnamed_sources_tag_the_named_fields() {
        let a = series("cpu", &[1], &[1.0]).with_name("cpu_query");
        let b = series("mem", &[1], &[2.0]);
        let wide = outer_join(&[a, b], &FirstTimeField).unwrap().unwrap();
        assert_eq!(wide.name, None);
        assert_eq!(
            wide.fields[1].labels.get("name").map(String::as_str),
            Some("cpu_query")
        );
        assert!(wide.fields[2].labels.is_empty());
    }

    #[test]
    fn long_frames_are_expanded_before_joining() {
        let long = Frame::new(vec![
            Field::time("time", [1, 1, 2, 2]),
            Field::string("host", ["a", "b", "a", "b"]),
            Field::number("value", [10, 20, 30, 40]),
        ])
        .with_kind(FrameKind::Long);
        let wide = to_wide(&[long], &FirstTimeField).unwrap().unwrap();
        assert_eq!(wide.fields.len(), 3);
        assert_eq!(wide.fields[1].labels.get("host").map(String::as_str), Some("a"));
        assert_eq!(wide.fields[1].values, vec![Value::from(10), Value::from(30)]);
        assert_eq!(wide.fields[2].labels.get("host").map(String::as_str), Some("b"));
        assert_eq!(wide.fields[2].values, vec![Value::from(20), Value::from(40)]);
    }

    #[test]
    fn malformed_input_is_rejected() {
        let frame = Frame::new(vec![Field::time("t", [1]), Field::number("v", [1, 2])]);
        assert!(matches!(
            to_wide(&[frame], &FirstTimeField),
            Err(Error::LengthMismatch { .. })
        ));
    }
}
