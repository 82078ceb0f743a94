//! Live API wire messages
//!
//! JSON message types exchanged over the upstream bidirectional
//! WebSocket. Client messages are objects with a single discriminating
//! field (`setup`, `realtimeInput`, `clientContent`); server messages
//! carry optional sections that may arrive in any combination.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};

use crate::client::SessionSetup;
use crate::error::Result;

// ---------------------------------------------------------------------
// Shared content types
// ---------------------------------------------------------------------

/// Binary payload carried inline as base64.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Blob {
    pub mime_type: String,
    /// base64-encoded bytes
    pub data: String,
}

impl Blob {
    /// PCM audio blob at the given sample rate.
    pub fn audio(pcm: &[u8], sample_rate_hz: u32) -> Self {
        Self {
            mime_type: format!("audio/pcm;rate={}", sample_rate_hz),
            data: BASE64.encode(pcm),
        }
    }

    /// JPEG image blob.
    pub fn jpeg(bytes: &[u8]) -> Self {
        Self {
            mime_type: "image/jpeg".to_string(),
            data: BASE64.encode(bytes),
        }
    }

    /// Decode the payload back to raw bytes.
    pub fn decode(&self) -> Result<Vec<u8>> {
        Ok(BASE64.decode(&self.data)?)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<Blob>,
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            inline_data: None,
        }
    }
}

// ---------------------------------------------------------------------
// Client -> upstream
// ---------------------------------------------------------------------

/// First message on a new connection; fixes the session configuration.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetupMessage {
    pub setup: Setup,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Setup {
    pub model: String,
    pub generation_config: GenerationConfig,
    pub system_instruction: Content,
    pub input_audio_transcription: AudioTranscriptionConfig,
    pub output_audio_transcription: AudioTranscriptionConfig,
    pub proactivity: ProactivityConfig,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub response_modalities: Vec<String>,
    pub speech_config: SpeechConfig,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeechConfig {
    pub voice_config: VoiceConfig,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceConfig {
    pub prebuilt_voice_config: PrebuiltVoiceConfig,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrebuiltVoiceConfig {
    pub voice_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AudioTranscriptionConfig {}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProactivityConfig {
    pub proactive_audio: bool,
}

impl SetupMessage {
    pub fn new(setup: &SessionSetup) -> Self {
        Self {
            setup: Setup {
                model: format!("models/{}", setup.model),
                generation_config: GenerationConfig {
                    response_modalities: vec!["AUDIO".to_string()],
                    speech_config: SpeechConfig {
                        voice_config: VoiceConfig {
                            prebuilt_voice_config: PrebuiltVoiceConfig {
                                voice_name: setup.voice.clone(),
                            },
                        },
                    },
                },
                system_instruction: Content {
                    role: None,
                    parts: vec![Part::text(setup.system_instruction.clone())],
                },
                input_audio_transcription: AudioTranscriptionConfig::default(),
                output_audio_transcription: AudioTranscriptionConfig::default(),
                proactivity: ProactivityConfig {
                    proactive_audio: true,
                },
            },
        }
    }
}

/// Streaming media input: at most one modality per message.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RealtimeInputMessage {
    pub realtime_input: RealtimeInput,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RealtimeInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio: Option<Blob>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video: Option<Blob>,
}

impl RealtimeInputMessage {
    pub fn audio(pcm: &[u8], sample_rate_hz: u32) -> Self {
        Self {
            realtime_input: RealtimeInput {
                audio: Some(Blob::audio(pcm, sample_rate_hz)),
                video: None,
            },
        }
    }

    pub fn video(jpeg: &[u8]) -> Self {
        Self {
            realtime_input: RealtimeInput {
                audio: None,
                video: Some(Blob::jpeg(jpeg)),
            },
        }
    }
}

/// A user text turn.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientContentMessage {
    pub client_content: ClientContent,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientContent {
    pub turns: Vec<Content>,
    pub turn_complete: bool,
}

impl ClientContentMessage {
    pub fn user_text(text: &str, end_of_turn: bool) -> Self {
        Self {
            client_content: ClientContent {
                turns: vec![Content {
                    role: Some("user".to_string()),
                    parts: vec![Part::text(text)],
                }],
                turn_complete: end_of_turn,
            },
        }
    }
}

// ---------------------------------------------------------------------
// Upstream -> client
// ---------------------------------------------------------------------

/// One decoded message from the upstream stream.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerMessage {
    pub setup_complete: Option<SetupComplete>,
    pub server_content: Option<ServerContent>,
    /// Tool invocations; this gateway registers no tools.
    pub tool_call: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct SetupComplete {}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerContent {
    pub model_turn: Option<Content>,
    pub input_transcription: Option<Transcription>,
    pub output_transcription: Option<Transcription>,
    pub turn_complete: bool,
    pub interrupted: bool,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Transcription {
    pub text: Option<String>,
}

impl ServerMessage {
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> SessionSetup {
        SessionSetup {
            model: "test-model".to_string(),
            voice: "Aoede".to_string(),
            system_instruction: "Guide the user.".to_string(),
        }
    }

    #[test]
    fn test_setup_message_wire_shape() {
        let json = serde_json::to_string(&SetupMessage::new(&setup())).unwrap();
        assert!(json.contains(r#""setup":"#));
        assert!(json.contains(r#""model":"models/test-model""#));
        assert!(json.contains(r#""responseModalities":["AUDIO"]"#));
        assert!(json.contains(r#""voiceName":"Aoede""#));
        assert!(json.contains(r#""inputAudioTranscription":{}"#));
        assert!(json.contains(r#""outputAudioTranscription":{}"#));
        assert!(json.contains(r#""proactiveAudio":true"#));
        assert!(json.contains("Guide the user."));
    }

    #[test]
    fn test_audio_input_mime_carries_rate() {
        let message = RealtimeInputMessage::audio(&[1, 2, 3], 16_000);
        let json = serde_json::to_string(&message).unwrap();
        assert!(json.contains(r#""realtimeInput":"#));
        assert!(json.contains(r#""mimeType":"audio/pcm;rate=16000""#));
        // the unused modality is omitted from the wire form
        assert!(!json.contains("video"));
    }

    #[test]
    fn test_video_input_is_jpeg() {
        let json = serde_json::to_string(&RealtimeInputMessage::video(&[0xFF, 0xD8])).unwrap();
        assert!(json.contains(r#""mimeType":"image/jpeg""#));
        assert!(!json.contains("audio"));
    }

    #[test]
    fn test_blob_roundtrip() {
        let original = vec![0u8, 255, 17, 42];
        let blob = Blob::jpeg(&original);
        assert_eq!(blob.decode().unwrap(), original);
    }

    #[test]
    fn test_client_content_end_of_turn() {
        let json =
            serde_json::to_string(&ClientContentMessage::user_text("hello", true)).unwrap();
        assert!(json.contains(r#""clientContent":"#));
        assert!(json.contains(r#""turnComplete":true"#));
        assert!(json.contains(r#""role":"user""#));
        assert!(json.contains("hello"));
    }

    #[test]
    fn test_parse_server_content_audio() {
        let pcm = BASE64.encode([1u8, 2, 3, 4]);
        let json = format!(
            r#"{{"serverContent":{{"modelTurn":{{"parts":[{{"inlineData":{{"mimeType":"audio/pcm;rate=24000","data":"{pcm}"}}}}]}}}}}}"#
        );
        let message = ServerMessage::parse(json.as_bytes()).unwrap();
        let content = message.server_content.unwrap();
        let part = &content.model_turn.unwrap().parts[0];
        assert_eq!(
            part.inline_data.as_ref().unwrap().decode().unwrap(),
            vec![1, 2, 3, 4]
        );
        assert!(!content.turn_complete);
        assert!(!content.interrupted);
    }

    #[test]
    fn test_parse_server_transcripts_and_flags() {
        let json = r#"{
            "serverContent": {
                "inputTranscription": {"text": "is she breathing"},
                "outputTranscription": {"text": "Check her chest."},
                "turnComplete": true,
                "interrupted": true
            }
        }"#;
        let message = ServerMessage::parse(json.as_bytes()).unwrap();
        let content = message.server_content.unwrap();
        assert_eq!(
            content.input_transcription.unwrap().text.as_deref(),
            Some("is she breathing")
        );
        assert_eq!(
            content.output_transcription.unwrap().text.as_deref(),
            Some("Check her chest.")
        );
        assert!(content.turn_complete);
        assert!(content.interrupted);
    }

    #[test]
    fn test_parse_setup_complete() {
        let message = ServerMessage::parse(br#"{"setupComplete":{}}"#).unwrap();
        assert!(message.setup_complete.is_some());
        assert!(message.server_content.is_none());
    }

    #[test]
    fn test_parse_tool_call() {
        let message =
            ServerMessage::parse(br#"{"toolCall":{"functionCalls":[{"name":"noop"}]}}"#).unwrap();
        assert!(message.tool_call.is_some());
    }

    #[test]
    fn test_parse_unknown_fields_tolerated() {
        let message =
            ServerMessage::parse(br#"{"usageMetadata":{"totalTokenCount":12}}"#).unwrap();
        assert!(message.setup_complete.is_none());
        assert!(message.server_content.is_none());
        assert!(message.tool_call.is_none());
    }

    #[test]
    fn test_parse_rejects_malformed_json() {
        assert!(ServerMessage::parse(b"{not json").is_err());
    }
}
