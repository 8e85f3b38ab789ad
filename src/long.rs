//! Wide to long conversion.
//!
//! Value columns are grouped into series by their label signature. Every
//! source row yields one output row per series that has a value at that row;
//! the series' labels become literal key columns.

use std::collections::BTreeMap;

use crate::classify::{Classification, FieldRole};
use crate::frame::{
    label_signature, validate_all, Field, FieldConfig, FieldType, Frame, FrameKind, Labels, Value,
};
use crate::Result;

/// Flatten each frame into one long frame.
///
/// Frames already tagged [`FrameKind::Long`] pass through unchanged. Frames
/// without a time field are dropped.
///
/// # Errors
///
/// - `Error::LengthMismatch`: an input frame is malformed
pub fn to_long(frames: &[Frame]) -> Result<Vec<Frame>> {
    validate_all(frames)?;
    let mut out = Vec::with_capacity(frames.len());
    for frame in frames {
        if frame.kind == FrameKind::Long {
            out.push(frame.clone());
            continue;
        }
        match frame_to_long(frame) {
            Some(long) => out.push(long),
            None => log::debug!(
                "dropping frame {:?}: no time field for long conversion",
                frame.name
            ),
        }
    }
    Ok(out)
}

struct ValueColumn {
    field_type: FieldType,
    config: FieldConfig,
}

struct Series {
    labels: Labels,
    /// Value name to source field index.
    columns: BTreeMap<String, usize>,
}

enum KeySource {
    Column(usize),
    Label,
}

fn frame_to_long(frame: &Frame) -> Option<Frame> {
    let classes = Classification::of(frame);
    let time_index = classes.time_index()?;
    let time_field = &frame.fields[time_index];

    let mut value_columns: BTreeMap<String, ValueColumn> = BTreeMap::new();
    let mut series: BTreeMap<String, Series> = BTreeMap::new();

    for index in classes.indices(FieldRole::Value) {
        let field = &frame.fields[index];
        if let Some(existing) = value_columns.get(&field.name) {
            if existing.field_type != field.field_type {
                log::warn!(
                    "skipping field '{}': type {:?} conflicts with {:?}",
                    field.name,
                    field.field_type,
                    existing.field_type
                );
                continue;
            }
        }
        let entry = series
            .entry(label_signature(&field.labels))
            .or_insert_with(|| Series {
                labels: field.labels.clone(),
                columns: BTreeMap::new(),
            });
        if entry.columns.contains_key(&field.name) {
            log::warn!(
                "skipping duplicate field '{}' with labels {}",
                field.name,
                label_signature(&field.labels)
            );
            continue;
        }
        entry.columns.insert(field.name.clone(), index);
        value_columns
            .entry(field.name.clone())
            .or_insert_with(|| ValueColumn {
                field_type: field.field_type,
                config: field.config.clone(),
            });
    }

    let mut keys: BTreeMap<String, KeySource> = BTreeMap::new();
    for index in classes.indices(FieldRole::Key) {
        let field = &frame.fields[index];
        if value_columns.contains_key(&field.name) || keys.contains_key(&field.name) {
            log::warn!("skipping key field '{}': name already in use", field.name);
            continue;
        }
        keys.insert(field.name.clone(), KeySource::Column(index));
    }
    for key in classes.label_keys() {
        if !series.values().any(|s| s.labels.contains_key(key)) {
            continue;
        }
        if value_columns.contains_key(key) || keys.contains_key(key) {
            log::debug!("label '{key}' shadowed by a column of the same name");
            continue;
        }
        keys.insert(key.clone(), KeySource::Label);
    }

    let mut rows: Vec<usize> = (0..frame.len()).collect();
    rows.sort_by(|a, b| time_field.values[*a].total_cmp(&time_field.values[*b]));

    let mut time_values = Vec::new();
    let mut value_values: Vec<Vec<Value>> = vec![Vec::new(); value_columns.len()];
    let mut key_values: Vec<Vec<Value>> = vec![Vec::new(); keys.len()];

    for &row in &rows {
        for s in series.values() {
            let present = s
                .columns
                .values()
                .any(|&index| !frame.fields[index].values[row].is_null());
            if !present {
                continue;
            }
            time_values.push(time_field.values[row].clone());
            for (out, name) in value_values.iter_mut().zip(value_columns.keys()) {
                let value = s
                    .columns
                    .get(name)
                    .map(|&index| frame.fields[index].values[row].clone())
                    .unwrap_or_default();
                out.push(value);
            }
            for (out, (name, source)) in key_values.iter_mut().zip(keys.iter()) {
                let value = match source {
                    KeySource::Column(index) => frame.fields[*index].values[row].clone(),
                    KeySource::Label => s
                        .labels
                        .get(name)
                        .map(|label| Value::String(label.clone()))
                        .unwrap_or_default(),
                };
                out.push(value);
            }
        }
    }

    let mut fields = Vec::with_capacity(1 + value_columns.len() + keys.len());
    fields.push(
        Field::new(time_field.name.clone(), time_field.field_type, time_values)
            .with_config(time_field.config.clone()),
    );
    for ((name, column), values) in value_columns.into_iter().zip(value_values) {
        fields.push(Field::new(name, column.field_type, values).with_config(column.config));
    }
    for ((name, source), values) in keys.into_iter().zip(key_values) {
        let field_type = match source {
            KeySource::Column(index) => frame.fields[index].field_type,
            KeySource::Label => FieldType::String,
        };
        fields.push(Field::new(name, field_type, values));
    }

    Some(Frame {
        name: frame.name.clone(),
        fields,
        kind: FrameKind::Long,
    })
}
