use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::value::Value;

/// Series tags attached to a field, ordered by key.
pub type Labels = BTreeMap<String, String>;

/// Canonical text form of a label set.
///
/// Two fields belong to the same series exactly when their signatures match.
pub fn label_signature(labels: &Labels) -> String {
    let map: serde_json::Map<String, serde_json::Value> = labels
        .iter()
        .map(|(key, value)| (key.clone(), serde_json::Value::String(value.clone())))
        .collect();
    serde_json::Value::Object(map).to_string()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Time,
    Number,
    Boolean,
    String,
    #[default]
    Other,
}

/// Display configuration carried alongside a field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FieldConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decimals: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl FieldConfig {
    pub fn is_empty(&self) -> bool {
        self == &FieldConfig::default()
    }
}

/// One named, typed column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub values: Vec<Value>,
    #[serde(default, skip_serializing_if = "Labels::is_empty")]
    pub labels: Labels,
    #[serde(default, skip_serializing_if = "FieldConfig::is_empty")]
    pub config: FieldConfig,
}

impl Field {
    pub fn new(name: impl Into<String>, field_type: FieldType, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            field_type,
            values,
            labels: Labels::new(),
            config: FieldConfig::default(),
        }
    }

    pub fn time<V: Into<Value>>(name: impl Into<String>, values: impl IntoIterator<Item = V>) -> Self {
        Self::new(name, FieldType::Time, values.into_iter().map(Into::into).collect())
    }

    pub fn number<V: Into<Value>>(
        name: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        Self::new(name, FieldType::Number, values.into_iter().map(Into::into).collect())
    }

    pub fn string<V: Into<Value>>(
        name: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        Self::new(name, FieldType::String, values.into_iter().map(Into::into).collect())
    }

    pub fn boolean<V: Into<Value>>(
        name: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        Self::new(name, FieldType::Boolean, values.into_iter().map(Into::into).collect())
    }

    pub fn with_labels(mut self, labels: Labels) -> Self {
        self.labels = labels;
        self
    }

    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    pub fn with_config(mut self, config: FieldConfig) -> Self {
        self.config = config;
        self
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Name shown to users: the configured display name, else the field name.
    pub fn display_name(&self) -> &str {
        self.config.display_name.as_deref().unwrap_or(&self.name)
    }

    /// Copy of this field holding only the rows at `indices`, in that order.
    pub fn gather(&self, indices: &[usize]) -> Field {
        let values = indices
            .iter()
            .map(|&index| self.values.get(index).cloned().unwrap_or_default())
            .collect();
        Field {
            name: self.name.clone(),
            field_type: self.field_type,
            values,
            labels: self.labels.clone(),
            config: self.config.clone(),
        }
    }
}
