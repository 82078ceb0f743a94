//! Error types for aegis-ws

use thiserror::Error;

/// WebSocket error type
#[derive(Error, Debug)]
pub enum WsError {
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Live session error: {0}")]
    Live(#[from] aegis_live::LiveError),

    #[error("Core error: {0}")]
    Core(#[from] aegis_core::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for aegis-ws
pub type Result<T> = std::result::Result<T, WsError>;
