//! Frame data model.
//!
//! A [`Frame`] is an ordered list of equal-length [`Field`]s. Row `i` is the
//! implicit linkage of the `i`-th value of every field. Converters never
//! mutate a frame they are given; they always build new ones.

mod field;
mod value;

pub use field::{label_signature, Field, FieldConfig, FieldType, Labels};
pub use value::Value;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Declared layout of a frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameKind {
    #[default]
    Unknown,
    Wide,
    Long,
    Multi,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub fields: Vec<Field>,
    #[serde(default)]
    pub kind: FrameKind,
}

impl Frame {
    pub fn new(fields: Vec<Field>) -> Self {
        Self {
            name: None,
            fields,
            kind: FrameKind::Unknown,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_kind(mut self, kind: FrameKind) -> Self {
        self.kind = kind;
        self
    }

    /// Row count, taken from the first field.
    pub fn len(&self) -> usize {
        self.fields.first().map(Field::len).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Name of the frame if set and non-empty.
    pub fn non_empty_name(&self) -> Option<&str> {
        self.name.as_deref().filter(|name| !name.is_empty())
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn first_time_field(&self) -> Option<usize> {
        self.fields
            .iter()
            .position(|field| field.field_type == FieldType::Time)
    }

    /// Check that every field holds exactly `len()` values.
    ///
    /// # Errors
    ///
    /// - `Error::LengthMismatch`: a field is shorter or longer than the frame
    pub fn validate(&self) -> Result<()> {
        let expected = self.len();
        for field in &self.fields {
            if field.len() != expected {
                return Err(Error::LengthMismatch {
                    field: field.name.clone(),
                    expected,
                    actual: field.len(),
                });
            }
        }
        Ok(())
    }
}

/// Validate every frame in a batch, failing on the first malformed one.
pub fn validate_all(frames: &[Frame]) -> Result<()> {
    frames.iter().try_for_each(Frame::validate)
}
