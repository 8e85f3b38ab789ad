use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("field '{field}' has {actual} values, frame length is {expected}")]
    LengthMismatch {
        field: String,
        expected: usize,
        actual: usize,
    },
    #[error("partition requires at least one key column")]
    NoKeyColumns,
    #[error("key column {column} has {actual} values, expected {expected}")]
    RaggedKeyColumns {
        column: usize,
        expected: usize,
        actual: usize,
    },
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[cfg(feature = "arrow")]
    #[error("arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
    #[cfg(feature = "arrow")]
    #[error("unsupported arrow type for column '{column}': {data_type}")]
    UnsupportedArrowType { column: String, data_type: String },
}

pub type Result<T> = std::result::Result<T, Error>;
