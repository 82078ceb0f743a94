//! WebSocket message types
//!
//! Defines the JSON frame format between the browser and the gateway.
//! Audio travels as raw binary frames in both directions; everything
//! else is a tagged JSON text frame.

use serde::{Deserialize, Serialize};

use aegis_core::fallback::FallbackPackage;

/// Structured frame from server to client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientEvent {
    /// Transcription of the user's speech
    UserTranscript { text: String },

    /// Transcription of the agent's speech
    GeminiTranscript { text: String },

    /// The agent finished its turn
    TurnComplete,

    /// The user interrupted the agent (barge-in)
    Interrupted,

    /// Terminal upstream failure
    Error { error: String },

    /// Fail-safe guidance; the last structured frame of a failed session
    Fallback {
        instructions: Vec<String>,
        disclaimer: String,
    },
}

impl ClientEvent {
    /// Build the fallback frame from the process-wide package.
    pub fn fallback(package: &FallbackPackage) -> Self {
        ClientEvent::Fallback {
            instructions: package.instructions.clone(),
            disclaimer: package.disclaimer.clone(),
        }
    }
}

/// One frame bound for the client socket, written by the session's
/// single writer task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    /// PCM audio response (binary frame)
    Audio(Vec<u8>),
    /// Pre-serialized structured event (text frame)
    Event(String),
}

impl Outbound {
    pub fn event(event: &ClientEvent) -> Self {
        // ClientEvent serialization has no fallible cases
        Outbound::Event(serde_json::to_string(event).unwrap())
    }
}

/// Structured text frame from the client. Only the image form is
/// recognized; anything else is relayed upstream as plain text.
#[derive(Debug, Clone, Deserialize)]
pub struct InboundFrame {
    #[serde(rename = "type")]
    pub kind: String,
    /// base64-encoded JPEG when `kind == "image"`
    #[serde(default)]
    pub data: Option<String>,
}
