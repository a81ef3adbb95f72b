//! Error types
//!
//! Errors only travel inside the boundary layers (storage, persistence,
//! config, server). The public `SessionHistory` API logs and swallows
//! persistence failures instead of returning them.

use thiserror::Error;

/// Errors from a key-value storage backend
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid storage key: {0:?}")]
    InvalidKey(String),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Errors while saving or loading the timeline
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported saved session version {found} (max supported {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },

    #[error("Saved session is inconsistent: {0}")]
    Inconsistent(String),
}

/// Errors from reading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value:?}")]
    InvalidValue { var: &'static str, value: String },
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Result type for persistence operations
pub type PersistenceResult<T> = Result<T, PersistenceError>;
