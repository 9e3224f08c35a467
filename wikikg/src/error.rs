//! Error types for cache and Wikidata operations
//!
//! This module defines the error taxonomy for the wikikg library: configuration
//! problems, upstream API failures, lock contention and cache file corruption.

use std::time::Duration;
use thiserror::Error;

/// Main error type for wikikg operations
#[derive(Error, Debug)]
pub enum WikiError {
    /// No file path could be resolved for a cache operation, or invalid settings
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Requested entity or field is absent from an otherwise valid payload
    #[error("Not found: {0}")]
    NotFoundError(String),

    /// Non-success HTTP status or malformed payload from the API
    #[error("Upstream error: {0}")]
    UpstreamError(String),

    /// Advisory lock on the cache file was not acquired in time
    #[error("Timed out after {timeout:?} waiting for lock on {path}")]
    LockTimeoutError { timeout: Duration, path: String },

    /// Cache file content is not a valid `tag -> (key -> value)` structure
    #[error("Failed to parse cache file {path}: {reason}")]
    ParseError { path: String, reason: String },

    /// Network request timeout
    #[error("Operation timed out after {timeout:?}: {context}")]
    TimeoutError { timeout: Duration, context: String },

    /// Filesystem error while reading or writing the cache file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/Deserialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Generic error with context
    #[error("Error: {0}")]
    Other(String),
}

impl WikiError {
    /// Whether the caller may reasonably retry the failed operation
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            WikiError::LockTimeoutError { .. } | WikiError::TimeoutError { .. }
        )
    }
}

/// Result type alias for wikikg operations
pub type Result<T> = std::result::Result<T, WikiError>;

impl From<String> for WikiError {
    fn from(s: String) -> Self {
        WikiError::Other(s)
    }
}

impl From<&str> for WikiError {
    fn from(s: &str) -> Self {
        WikiError::Other(s.to_string())
    }
}

impl From<serde_json::Error> for WikiError {
    fn from(e: serde_json::Error) -> Self {
        WikiError::SerializationError(e.to_string())
    }
}
