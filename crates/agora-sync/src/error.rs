//! Error types for the sync layer.
//!
//! Remote operations return [`agora_types::DataResult`]; the types here cover
//! local token persistence and service construction.

use agora_api::ApiError;
use agora_config_and_utils::CoreError;
use thiserror::Error;

/// Token persistence error.
#[derive(Error, Debug)]
pub enum StorageError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias using StorageError.
pub type StorageResult<T> = Result<T, StorageError>;

/// Failure while wiring the session services from configuration.
#[derive(Error, Debug)]
pub enum SetupError {
    /// Configuration or path resolution failed
    #[error("Configuration error: {0}")]
    Core(#[from] CoreError),

    /// REST client could not be built
    #[error("API client error: {0}")]
    Api(#[from] ApiError),
}
