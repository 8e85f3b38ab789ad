//! Field role classification.
//!
//! Each conversion classifies its input once and threads the result through
//! every step instead of re-inspecting field types along the way.

use std::collections::BTreeSet;

use crate::frame::{FieldType, Frame};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldRole {
    /// The frame's time axis. At most one per frame.
    Time,
    /// Literal-valued, series-distinguishing column. Only strings are keys.
    Key,
    /// Number, boolean, and later time columns.
    Value,
}

impl FieldRole {
    /// Role of a field of `field_type` that is not the frame's time axis.
    pub fn of_type(field_type: FieldType) -> Self {
        match field_type {
            FieldType::String => FieldRole::Key,
            FieldType::Time | FieldType::Number | FieldType::Boolean | FieldType::Other => {
                FieldRole::Value
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    roles: Vec<FieldRole>,
    time_index: Option<usize>,
    label_keys: BTreeSet<String>,
}

impl Classification {
    /// Classify the fields of `frame`.
    ///
    /// The first time-typed field is the time axis; later time-typed fields
    /// are ordinary value columns. Label keys are collected from value fields.
    pub fn of(frame: &Frame) -> Self {
        let mut roles = Vec::with_capacity(frame.fields.len());
        let mut time_index = None;
        let mut label_keys = BTreeSet::new();

        for (index, field) in frame.fields.iter().enumerate() {
            let role = match field.field_type {
                FieldType::Time if time_index.is_none() => {
                    time_index = Some(index);
                    FieldRole::Time
                }
                other => FieldRole::of_type(other),
            };
            if role == FieldRole::Value {
                label_keys.extend(field.labels.keys().cloned());
            }
            roles.push(role);
        }

        Self {
            roles,
            time_index,
            label_keys,
        }
    }

    pub fn roles(&self) -> &[FieldRole] {
        &self.roles
    }

    pub fn role(&self, index: usize) -> Option<FieldRole> {
        self.roles.get(index).copied()
    }

    pub fn time_index(&self) -> Option<usize> {
        self.time_index
    }

    /// Label keys carried by value fields, sorted.
    pub fn label_keys(&self) -> &BTreeSet<String> {
        &self.label_keys
    }

    /// Indices of fields with `role`, in field order.
    pub fn indices(&self, role: FieldRole) -> impl Iterator<Item = usize> + '_ {
        self.roles
            .iter()
            .enumerate()
            .filter(move |(_, candidate)| **candidate == role)
            .map(|(index, _)| index)
    }
}
