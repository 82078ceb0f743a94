//! Client frame classification
//!
//! Routes each inbound transport frame to the channel for its modality.
//! Classification never blocks beyond channel-enqueue time and never
//! touches the upstream. Malformed frames are a local matter: dropped,
//! logged, and the connection lives on.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use tracing::{debug, warn};

use aegis_live::channels::InputSenders;
use aegis_live::event::{AudioChunk, MediaFrame, TextMessage, VideoFrame};

use crate::message::InboundFrame;

/// Classifies inbound client frames and feeds the input channels.
pub struct ClientBridge {
    inputs: InputSenders,
    input_sample_rate_hz: u32,
}

impl ClientBridge {
    pub fn new(inputs: InputSenders, input_sample_rate_hz: u32) -> Self {
        Self {
            inputs,
            input_sample_rate_hz,
        }
    }

    /// A binary frame is raw PCM from the client microphone. No audio
    /// validation happens here; the upstream rejects malformed audio.
    pub fn route_binary(&self, pcm: Vec<u8>) {
        self.inputs.send_audio(AudioChunk {
            pcm,
            sample_rate_hz: self.input_sample_rate_hz,
        });
    }

    /// A text frame is either an image-structured message or plain text.
    pub fn route_text(&self, text: String) {
        if let Some(frame) = classify_text(text) {
            self.inputs.send(frame);
        }
    }
}

/// Classify one text frame.
///
/// Returns `None` only for an image-structured frame whose payload
/// cannot be decoded; every other input maps to a frame, with
/// unparseable text passed through verbatim.
pub(crate) fn classify_text(text: String) -> Option<MediaFrame> {
    if let Ok(frame) = serde_json::from_str::<InboundFrame>(&text) {
        if frame.kind == "image" {
            let Some(data) = frame.data else {
                warn!("Dropping image frame without payload");
                return None;
            };
            return match BASE64.decode(&data) {
                Ok(jpeg) => Some(MediaFrame::Video(VideoFrame { jpeg })),
                Err(e) => {
                    warn!("Dropping image frame with invalid base64: {}", e);
                    None
                }
            };
        }
        debug!("Unrecognized structured frame type {:?}, treating as text", frame.kind);
    }

    Some(MediaFrame::Text(TextMessage { text }))
}
