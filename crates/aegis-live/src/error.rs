//! Error types for aegis-live

use thiserror::Error;

/// Error type for the upstream live session
#[derive(Error, Debug)]
pub enum LiveError {
    #[error("Upstream handshake failed: {0}")]
    Handshake(String),

    #[error("WebSocket transport error: {0}")]
    Transport(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("Protocol decode error: {0}")]
    Protocol(#[from] serde_json::Error),

    #[error("Invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Upstream connection closed")]
    Closed,

    #[error("{0}")]
    Other(String),
}

/// Result type alias for aegis-live
pub type Result<T> = std::result::Result<T, LiveError>;
