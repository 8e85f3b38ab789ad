//! Arrow interop.
//!
//! Frames map to record batches one field per column. Field type, labels and
//! display config travel in Arrow field metadata; frame name and kind travel
//! in schema metadata, so a batch produced here converts back losslessly.

use std::collections::HashMap;
use std::sync::Arc;

use arrow::array::{
    ArrayRef, AsArray, BooleanArray, Float64Array, StringArray, TimestampMillisecondArray,
};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Field as ArrowField, Float64Type, Int64Type, Schema, TimeUnit};
use arrow::record_batch::RecordBatch;

use crate::frame::{Field, FieldConfig, FieldType, Frame, FrameKind, Labels, Value};
use crate::{Error, Result};

pub const TYPE_KEY: &str = "tsreshape.type";
pub const LABELS_KEY: &str = "tsreshape.labels";
pub const CONFIG_KEY: &str = "tsreshape.config";
pub const NAME_KEY: &str = "tsreshape.name";
pub const KIND_KEY: &str = "tsreshape.kind";

fn type_name(field_type: FieldType) -> &'static str {
    match field_type {
        FieldType::Time => "time",
        FieldType::Number => "number",
        FieldType::Boolean => "boolean",
        FieldType::String => "string",
        FieldType::Other => "other",
    }
}

fn parse_type(name: &str) -> Option<FieldType> {
    match name {
        "time" => Some(FieldType::Time),
        "number" => Some(FieldType::Number),
        "boolean" => Some(FieldType::Boolean),
        "string" => Some(FieldType::String),
        "other" => Some(FieldType::Other),
        _ => None,
    }
}

fn kind_name(kind: FrameKind) -> &'static str {
    match kind {
        FrameKind::Unknown => "unknown",
        FrameKind::Wide => "wide",
        FrameKind::Long => "long",
        FrameKind::Multi => "multi",
    }
}

fn parse_kind(name: &str) -> FrameKind {
    match name {
        "wide" => FrameKind::Wide,
        "long" => FrameKind::Long,
        "multi" => FrameKind::Multi,
        _ => FrameKind::Unknown,
    }
}

fn to_column(field: &Field) -> (DataType, ArrayRef) {
    match field.field_type {
        FieldType::Time => {
            let values: Vec<Option<i64>> = field
                .values
                .iter()
                .map(|value| value.as_f64().map(|ms| ms as i64))
                .collect();
            (
                DataType::Timestamp(TimeUnit::Millisecond, None),
                Arc::new(TimestampMillisecondArray::from(values)),
            )
        }
        FieldType::Number => {
            let values: Vec<Option<f64>> = field.values.iter().map(Value::as_f64).collect();
            (DataType::Float64, Arc::new(Float64Array::from(values)))
        }
        FieldType::Boolean => {
            let values: Vec<Option<bool>> = field.values.iter().map(Value::as_bool).collect();
            (DataType::Boolean, Arc::new(BooleanArray::from(values)))
        }
        FieldType::String | FieldType::Other => {
            let values: Vec<Option<String>> = field
                .values
                .iter()
                .map(|value| match value {
                    Value::Null => None,
                    Value::String(text) => Some(text.clone()),
                    other => Some(other.to_string()),
                })
                .collect();
            (DataType::Utf8, Arc::new(StringArray::from(values)))
        }
    }
}

/// Convert a frame into a record batch.
///
/// # Errors
///
/// - `Error::LengthMismatch`: the frame is malformed
/// - `Error::Arrow`: the batch could not be assembled
pub fn frame_to_record_batch(frame: &Frame) -> Result<RecordBatch> {
    frame.validate()?;
    let mut fields = Vec::with_capacity(frame.fields.len());
    let mut columns = Vec::with_capacity(frame.fields.len());

    for field in &frame.fields {
        let (data_type, column) = to_column(field);
        let mut metadata = HashMap::new();
        metadata.insert(TYPE_KEY.to_string(), type_name(field.field_type).to_string());
        if !field.labels.is_empty() {
            metadata.insert(LABELS_KEY.to_string(), serde_json::to_string(&field.labels)?);
        }
        if !field.config.is_empty() {
            metadata.insert(CONFIG_KEY.to_string(), serde_json::to_string(&field.config)?);
        }
        fields.push(ArrowField::new(&field.name, data_type, true).with_metadata(metadata));
        columns.push(column);
    }

    let mut metadata = HashMap::new();
    metadata.insert(KIND_KEY.to_string(), kind_name(frame.kind).to_string());
    if let Some(name) = &frame.name {
        metadata.insert(NAME_KEY.to_string(), name.clone());
    }
    let schema = Arc::new(Schema::new(fields).with_metadata(metadata));
    if columns.is_empty() {
        return Ok(RecordBatch::new_empty(schema));
    }
    Ok(RecordBatch::try_new(schema, columns)?)
}

fn from_column(arrow_field: &ArrowField, column: &ArrayRef) -> Result<(FieldType, Vec<Value>)> {
    let data_type = arrow_field.data_type();
    match data_type {
        DataType::Timestamp(_, _) | DataType::Date32 | DataType::Date64 => {
            let millis = cast(
                column.as_ref(),
                &DataType::Timestamp(TimeUnit::Millisecond, None),
            )?;
            let millis = cast(millis.as_ref(), &DataType::Int64)?;
            let values = millis
                .as_primitive::<Int64Type>()
                .iter()
                .map(|ms| Value::from(ms.map(|ms| ms as f64)))
                .collect();
            Ok((FieldType::Time, values))
        }
        DataType::Boolean => {
            let values = column.as_boolean().iter().map(Value::from).collect();
            Ok((FieldType::Boolean, values))
        }
        DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View => {
            let text = cast(column.as_ref(), &DataType::Utf8)?;
            let values = text
                .as_string::<i32>()
                .iter()
                .map(|text| Value::from(text.map(str::to_string)))
                .collect();
            Ok((FieldType::String, values))
        }
        other if other.is_numeric() => {
            let numbers = cast(column.as_ref(), &DataType::Float64)?;
            let values = numbers
                .as_primitive::<Float64Type>()
                .iter()
                .map(Value::from)
                .collect();
            Ok((FieldType::Number, values))
        }
        other => Err(Error::UnsupportedArrowType {
            column: arrow_field.name().clone(),
            data_type: other.to_string(),
        }),
    }
}

/// Convert a record batch into a frame.
///
/// Any numeric Arrow type becomes a number field and any temporal type a
/// time field in epoch milliseconds. Metadata written by
/// [`frame_to_record_batch`] restores field types, labels and config.
///
/// # Errors
///
/// - `Error::UnsupportedArrowType`: a column has no frame equivalent
/// - `Error::Json`: label or config metadata is not valid JSON
pub fn record_batch_to_frame(batch: &RecordBatch) -> Result<Frame> {
    let schema = batch.schema();
    let mut fields = Vec::with_capacity(batch.num_columns());

    for (arrow_field, column) in schema.fields().iter().zip(batch.columns()) {
        let (natural_type, values) = from_column(arrow_field, column)?;
        let metadata = arrow_field.metadata();
        let field_type = metadata
            .get(TYPE_KEY)
            .and_then(|name| parse_type(name))
            .unwrap_or(natural_type);
        let labels: Labels = match metadata.get(LABELS_KEY) {
            Some(json) => serde_json::from_str(json)?,
            None => Labels::new(),
        };
        let config: FieldConfig = match metadata.get(CONFIG_KEY) {
            Some(json) => serde_json::from_str(json)?,
            None => FieldConfig::default(),
        };
        fields.push(Field {
            name: arrow_field.name().clone(),
            field_type,
            values,
            labels,
            config,
        });
    }

    let metadata = schema.metadata();
    Ok(Frame {
        name: metadata.get(NAME_KEY).cloned(),
        fields,
        kind: metadata
            .get(KIND_KEY)
            .map(|kind| parse_kind(kind))
            .unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Int32Array, TimestampSecondArray};

    #[test]
    fn frame_survives_a_batch() {
        let frame = Frame::new(vec![
            Field::time("time", [1_000, 2_000]),
            Field::number("value", [Value::from(1.5), Value::Null]).with_label("host", "a"),
            Field::string("region", ["eu", "us"]),
            Field::boolean("up", [true, false]),
        ])
        .with_name("cpu")
        .with_kind(FrameKind::Long);
        let batch = frame_to_record_batch(&frame).unwrap();
        assert_eq!(batch.num_rows(), 2);
        assert_eq!(batch.num_columns(), 4);
        assert_eq!(record_batch_to_frame(&batch).unwrap(), frame);
    }

    #[test]
    fn foreign_batches_are_normalized() {
        let schema = Arc::new(Schema::new(vec![
            ArrowField::new("ts", DataType::Timestamp(TimeUnit::Second, None), false),
            ArrowField::new("count", DataType::Int32, true),
        ]));
        let columns: Vec<ArrayRef> = vec![
            Arc::new(TimestampSecondArray::from(vec![1, 2])),
            Arc::new(Int32Array::from(vec![Some(7), None])),
        ];
        let batch = RecordBatch::try_new(schema, columns).unwrap();
        let frame = record_batch_to_frame(&batch).unwrap();
        assert_eq!(frame.kind, FrameKind::Unknown);
        assert_eq!(frame.fields[0].field_type, FieldType::Time);
        assert_eq!(
            frame.fields[0].values,
            vec![Value::from(1_000), Value::from(2_000)]
        );
        assert_eq!(frame.fields[1].field_type, FieldType::Number);
        assert_eq!(frame.fields[1].values, vec![Value::from(7), Value::Null]);
    }

    #[test]
    fn empty_frame_gives_empty_batch() {
        let batch = frame_to_record_batch(&Frame::default()).unwrap();
        assert_eq!(batch.num_columns(), 0);
        assert_eq!(record_batch_to_frame(&batch).unwrap().fields.len(), 0);
    }
}
