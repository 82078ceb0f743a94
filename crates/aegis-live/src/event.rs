//! Media frames and upstream events
//!
//! Every message that crosses a session boundary is a closed tagged
//! variant, one case per kind, so missing-case handling is an
//! exhaustiveness check rather than a runtime surprise.

/// Raw PCM audio captured by the client microphone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioChunk {
    /// 16-bit little-endian mono PCM
    pub pcm: Vec<u8>,
    /// Sample rate of `pcm` in Hz
    pub sample_rate_hz: u32,
}

/// One JPEG camera frame from the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoFrame {
    pub jpeg: Vec<u8>,
}

/// A text message typed (or relayed) by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextMessage {
    pub text: String,
}

/// One frame of client input, classified by modality.
///
/// Immutable once constructed; consumed exactly once by the sender for
/// the matching modality.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaFrame {
    Audio(AudioChunk),
    Video(VideoFrame),
    Text(TextMessage),
}

/// One typed event decoded from the upstream's mixed stream.
///
/// Produced only by the [`crate::UpstreamEventReceiver`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpstreamEvent {
    /// Agent speech, 16-bit PCM at the upstream's output rate.
    /// Latency-critical; delivered through the direct audio path.
    AgentAudio { pcm: Vec<u8> },
    /// Transcription of the user's speech
    UserTranscript { text: String },
    /// Transcription of the agent's speech
    AgentTranscript { text: String },
    /// The agent finished its turn
    TurnComplete,
    /// The user spoke over the agent (barge-in)
    Interrupted,
    /// Terminal stream failure; no events follow this one
    UpstreamError { message: String },
}
