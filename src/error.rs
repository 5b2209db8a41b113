use thiserror::Error;

use crate::field::FieldId;

/// Error type definitions
#[derive(Error, Debug)]
pub enum Error {
    #[error("Field {0} is not part of the schema set")]
    InvalidFieldReference(FieldId),

    #[error("Statistical computation failed: {0}")]
    StatisticalComputation(String),

    #[error("Upstream data unavailable for dataset {dataset_id}: {reason}")]
    UpstreamDataUnavailable { dataset_id: String, reason: String },

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Duplicate column name: {0}")]
    DuplicateColumnName(String),

    #[error("Inconsistent row count: expected {expected}, found {found}")]
    InconsistentRowCount { expected: usize, found: usize },

    #[error("Length mismatch: expected {expected}, actual {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Empty data: {0}")]
    EmptyData(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error")]
    Io(#[source] std::io::Error),

    #[error("JSON error")]
    Json(#[source] serde_json::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Whether the error aborts a whole pipeline run rather than a single candidate
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::UpstreamDataUnavailable { .. })
    }

    pub(crate) fn upstream(dataset_id: &crate::pipeline::DatasetId, reason: impl Into<String>) -> Self {
        Error::UpstreamDataUnavailable {
            dataset_id: dataset_id.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err)
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}
