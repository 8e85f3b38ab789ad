//! Caller-facing options.
//!
//! Field names follow the host's JSON option shape (`keepFields`,
//! `asLabels`, ...) so option blobs can be deserialized directly.

use serde::{Deserialize, Serialize};

use crate::matcher::ByNames;
use crate::naming::FrameNaming;

/// Target layout for [`crate::reshape`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeSeriesFormat {
    #[default]
    Wide,
    Long,
    Multi,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReshapeOptions {
    /// Default: wide
    pub format: TimeSeriesFormat,
}

impl ReshapeOptions {
    pub fn new(format: TimeSeriesFormat) -> Self {
        Self { format }
    }
}

/// Options for [`crate::partition_by_values_with`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PartitionOptions {
    /// Names of the key fields.
    pub fields: Vec<String>,
    pub naming: FrameNaming,
    /// Keep key fields in the partitioned frames.
    /// Default: false
    pub keep_fields: bool,
}

impl PartitionOptions {
    pub fn matcher(&self) -> ByNames {
        ByNames::new(self.fields.iter().cloned())
    }
}
