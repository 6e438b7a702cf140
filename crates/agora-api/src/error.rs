//! Error types for the REST client.
//!
//! These never leave the crate's public methods; they are mapped to
//! [`agora_types::DataError`] by [`crate::error_mapper`].

use thiserror::Error;

/// Transport-level error raised while talking to the Agora API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network or transport-level HTTP error from reqwest.
    ///
    /// Includes connection failures, timeouts, and TLS errors.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("API error: {status} - {message}")]
    Status {
        /// The HTTP status code.
        status: u16,
        /// The response body, typically a JSON error document.
        message: String,
    },

    /// A request body could not be encoded or a response body decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration or initialization error (bad base URL, bad MIME type).
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Convenience Result type alias for raw client operations.
pub type ApiResult<T> = Result<T, ApiError>;
