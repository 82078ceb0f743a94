//! aegis-live: Upstream live-session client for Aegis Gateway
//!
//! Owns the real-time connection to the upstream AI streaming service:
//! typed media frames and events, per-modality input channels, the
//! session multiplexer that fans three input streams into one upstream
//! connection, and the receiver that fans the upstream's mixed event
//! stream back out. A concrete Gemini Live API client is provided; tests
//! substitute fakes behind the same traits.

pub mod channels;
pub mod client;
pub mod error;
pub mod event;
pub mod gemini;
pub mod receiver;
pub mod session;
pub mod wire;

pub use channels::{input_channels, InputChannels, InputSenders, VideoReceiver};
pub use client::{LiveClient, LiveConnection, LiveReceiver, LiveSender, SessionHooks, SessionSetup};
pub use error::{LiveError, Result};
pub use event::{AudioChunk, MediaFrame, TextMessage, UpstreamEvent, VideoFrame};
pub use gemini::GeminiLiveClient;
pub use receiver::UpstreamEventReceiver;
pub use session::{LiveSessionHandle, SessionMultiplexer};
