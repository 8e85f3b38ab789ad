//! Time-series frame reshaping.
//!
//! Converts tabular query results between the three layouts used by the
//! visualization pipeline:
//!
//! - **Wide**: one frame, one shared time column, one column per series.
//! - **Long**: one frame, time may repeat, series identity held in literal
//!   key columns.
//! - **Multi**: many `[time, value]` frames, series identity held in labels
//!   or in the frame name.
//!
//! Every converter is a pure function over borrowed frames and returns new
//! frames; inputs are validated up front and a malformed frame (fields of
//! unequal length) is the only hard error.
//!
//! ```
//! use tsreshape::{reshape, Field, Frame, TimeSeriesFormat};
//!
//! let wide = Frame::new(vec![
//!     Field::time("time", [100, 200]),
//!     Field::number("cpu", [0.5, 0.7]).with_label("host", "a"),
//!     Field::number("cpu", [0.1, 0.2]).with_label("host", "b"),
//! ]);
//! let long = reshape(&[wide], TimeSeriesFormat::Long)?;
//! assert_eq!(long[0].len(), 4);
//! # Ok::<(), tsreshape::Error>(())
//! ```

pub mod classify;
pub mod config;
pub mod error;
pub mod frame;
pub mod join;
pub mod long;
pub mod matcher;
pub mod multi;
pub mod naming;
pub mod partition;
pub mod reshape;

#[cfg(feature = "arrow")]
pub mod batch;

pub use classify::{Classification, FieldRole};
pub use config::{PartitionOptions, ReshapeOptions, TimeSeriesFormat};
pub use error::{Error, Result};
pub use frame::{Field, FieldConfig, FieldType, Frame, FrameKind, Labels, Value};
pub use join::{outer_join, to_wide};
pub use long::to_long;
pub use matcher::{ByNames, ByType, FieldMatcher, FirstTimeField};
pub use multi::{partition_by_values, partition_by_values_with, to_multi};
pub use naming::FrameNaming;
pub use partition::{partition, KeyValue};
pub use reshape::{prepare_time_series, reshape};
