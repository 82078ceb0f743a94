//! Upstream collaborator traits
//!
//! The seam between the session machinery and the live streaming
//! service. Production wires in [`crate::GeminiLiveClient`]; tests wire
//! in fakes. All callbacks use one uniform async calling convention.

use async_trait::async_trait;
use std::sync::Arc;

use aegis_core::config::LiveConfig;
use aegis_core::guidance::GUIDANCE_SYSTEM_PROMPT;

use crate::error::Result;
use crate::wire::ServerMessage;

/// Fixed configuration for one upstream session, established once at
/// connect time: audio responses, a single voice preset, transcription
/// in both directions, proactive narration, and the guidance
/// system instruction.
#[derive(Debug, Clone)]
pub struct SessionSetup {
    pub model: String,
    pub voice: String,
    pub system_instruction: String,
}

impl SessionSetup {
    pub fn from_config(config: &LiveConfig) -> Self {
        Self {
            model: config.model.clone(),
            voice: config.voice.clone(),
            system_instruction: GUIDANCE_SYSTEM_PROMPT.trim().to_string(),
        }
    }
}

/// Factory for upstream sessions.
#[async_trait]
pub trait LiveClient: Send + Sync {
    /// Establish one upstream session, completing the setup handshake.
    ///
    /// A session holds at most one upstream connection; a handshake
    /// failure is fatal for the session and no partial traffic is
    /// attempted.
    async fn connect(&self, setup: &SessionSetup) -> Result<LiveConnection>;
}

/// An established upstream session, split for concurrent use: the
/// sender half is shared by the per-modality sender tasks, the receiver
/// half is owned by the single event receiver.
pub struct LiveConnection {
    pub sender: Arc<dyn LiveSender>,
    pub receiver: Box<dyn LiveReceiver>,
}

/// Outbound half of an upstream session.
#[async_trait]
pub trait LiveSender: Send + Sync {
    /// Forward one chunk of raw PCM microphone audio.
    async fn send_audio(&self, pcm: &[u8], sample_rate_hz: u32) -> Result<()>;

    /// Forward one JPEG camera frame.
    async fn send_video(&self, jpeg: &[u8]) -> Result<()>;

    /// Forward a text message from the user.
    async fn send_text(&self, text: &str, end_of_turn: bool) -> Result<()>;
}

/// Inbound half of an upstream session: a finite sequence of decoded
/// messages that ends on disconnect or error.
#[async_trait]
pub trait LiveReceiver: Send {
    /// Next decoded message, `None` once the upstream closes the stream.
    /// An `Err` item is terminal; no further messages follow it.
    async fn next_message(&mut self) -> Option<Result<ServerMessage>>;
}

/// Side effects a session registers once at start. Invoked by the
/// event receiver through this single async convention.
#[async_trait]
pub trait SessionHooks: Send + Sync {
    /// Deliver agent speech to the client, bypassing the event queue.
    async fn play_audio(&self, pcm: Vec<u8>);

    /// The user spoke over the agent. Runs before the corresponding
    /// interrupted event is queued, so playback can be muted first.
    async fn barge_in(&self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setup_from_config() {
        let config = LiveConfig::default();
        let setup = SessionSetup::from_config(&config);
        assert_eq!(setup.voice, "Aoede");
        assert!(setup.system_instruction.contains("emergency"));
        // the wire form has no use for leading/trailing whitespace
        assert_eq!(setup.system_instruction, setup.system_instruction.trim());
    }
}
