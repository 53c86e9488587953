use thiserror::Error;

/// Caller mistakes and snapshots that fail validation.
///
/// Data oddities (unparseable URLs, zero denominators, missing categories,
/// pages past the end) are handled in place and never surface here.
#[derive(Debug, Error, PartialEq)]
pub enum CoreError {
    #[error("directory depth must be at least 1 (got {0})")]
    InvalidDepth(usize),

    #[error("page must be at least 1 (got {0})")]
    InvalidPage(usize),

    #[error("page_size must be greater than 0")]
    InvalidPageSize,

    #[error("unknown date range preset: {0}")]
    UnknownPreset(String),

    #[error("invalid date range: {0}")]
    InvalidDateRange(String),

    #[error("sort direction must be one of: asc, desc")]
    InvalidSortDirection,

    #[error("unknown sort key: {0}")]
    InvalidSortKey(String),

    #[error("invalid metric row {key:?}: {reason}")]
    InvalidRow { key: String, reason: String },

    #[error("malformed snapshot: {0}")]
    Serialization(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
