//! Realtime error types.

use thiserror::Error;

/// Realtime error type.
#[derive(Error, Debug)]
pub enum RealtimeError {
    /// WebSocket error
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// The configured server URL is unusable
    #[error("Invalid realtime URL: {0}")]
    InvalidUrl(String),

    /// A frame that is not valid Engine.IO / Socket.IO
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Not connected error
    #[error("Not connected to realtime server")]
    NotConnected,

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Send error
    #[error("Failed to send message: {0}")]
    Send(String),
}

/// Result type alias using RealtimeError.
pub type RealtimeResult<T> = Result<T, RealtimeError>;
