//! Error types for the shard slurper

use crate::client::KinesisClientError;
use thiserror::Error;

/// Main error type for slurp operations
#[derive(Debug, Error)]
pub enum SlurperError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("from-timestamp was invalid: {0}")]
    InvalidTimestamp(#[from] chrono::ParseError),

    #[error("Failed to GetShardIterator for stream: {0}")]
    GetIteratorFailed(String),

    #[error("Failed to GetRecords from stream: {0}")]
    GetRecordsFailed(String),

    #[error("Record {0} has no approximate arrival timestamp")]
    MissingArrivalTimestamp(String),

    #[error("Record {0} has an arrival timestamp out of range")]
    InvalidArrivalTimestamp(String),

    #[error("Failed to marshal item to JSON: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to write to output: {0}")]
    Write(#[from] std::io::Error),
}

impl SlurperError {
    /// Errors raised before any call to the service was made
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            SlurperError::ConfigError(_) | SlurperError::InvalidTimestamp(_)
        )
    }

    pub(crate) fn get_iterator(err: KinesisClientError) -> Self {
        SlurperError::GetIteratorFailed(err.to_string())
    }

    pub(crate) fn get_records(err: KinesisClientError) -> Self {
        SlurperError::GetRecordsFailed(err.to_string())
    }
}

/// Result type for slurp operations
pub type Result<T> = std::result::Result<T, SlurperError>;
