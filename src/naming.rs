//! Series identity from key values.
//!
//! A partitioned series is identified either by labels (`key=value` tags on
//! its value field) or by a display name rendered from the same pairs.

use serde::{Deserialize, Serialize};

use crate::frame::{Labels, Value};

/// How partitioned frames carry their key values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FrameNaming {
    /// Attach key values as field labels instead of renaming the frame.
    pub as_labels: bool,
    /// Prefix the rendered name with the source frame's name.
    pub append: bool,
    /// Render `name<separator1>value` rather than the bare value.
    pub with_names: bool,
    pub separator1: String,
    /// Placed between rendered pairs.
    pub separator2: String,
}

impl Default for FrameNaming {
    fn default() -> Self {
        Self {
            as_labels: true,
            append: false,
            with_names: false,
            separator1: "=".to_string(),
            separator2: " ".to_string(),
        }
    }
}

impl FrameNaming {
    pub fn display_names() -> Self {
        Self {
            as_labels: false,
            ..Self::default()
        }
    }

    /// Render `keys` (in matcher order) as a display name. Null values are
    /// skipped.
    pub fn build_name(&self, keys: &[(&str, &Value)]) -> String {
        let parts: Vec<String> = keys
            .iter()
            .filter(|(_, value)| !value.is_null())
            .map(|(name, value)| {
                if self.with_names {
                    format!("{name}{}{value}", self.separator1)
                } else {
                    value.to_string()
                }
            })
            .collect();
        parts.join(&self.separator2)
    }

    /// Display name for a series cut from a frame named `original`.
    pub fn series_name(&self, original: Option<&str>, keys: &[(&str, &Value)]) -> String {
        let name = self.build_name(keys);
        match original.filter(|original| self.append && !original.is_empty()) {
            Some(original) => format!("{original} {name}"),
            None => name,
        }
    }
}

/// Labels built from key pairs. Null values produce no label.
pub fn build_field_labels(keys: &[(&str, &Value)]) -> Labels {
    keys.iter()
        .filter(|(_, value)| !value.is_null())
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect()
}
