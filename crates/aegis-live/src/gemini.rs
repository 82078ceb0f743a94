//! Gemini Live API client
//!
//! Concrete [`LiveClient`] over the bidirectional WebSocket endpoint.
//! One connection per session: send `setup`, require `setupComplete`,
//! then stream realtime input out and server content in.

use std::sync::Arc;

use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, warn};

use aegis_core::config::LiveConfig;

use crate::client::{LiveClient, LiveConnection, LiveReceiver, LiveSender, SessionSetup};
use crate::error::{LiveError, Result};
use crate::wire::{ClientContentMessage, RealtimeInputMessage, ServerMessage, SetupMessage};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = futures::stream::SplitSink<WsStream, Message>;
type WsSource = futures::stream::SplitStream<WsStream>;

const DEFAULT_ENDPOINT: &str = "wss://generativelanguage.googleapis.com/ws/google.ai.generativelanguage.v1beta.GenerativeService.BidiGenerateContent";

/// Client for the Gemini Live API.
#[derive(Debug, Clone)]
pub struct GeminiLiveClient {
    api_key: String,
    endpoint: String,
}

impl GeminiLiveClient {
    /// Create a new client from the live configuration.
    pub fn new(config: &LiveConfig) -> Self {
        Self {
            api_key: config.api_key.clone(),
            endpoint: config
                .endpoint
                .clone()
                .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
        }
    }

    fn session_url(&self) -> String {
        format!("{}?key={}", self.endpoint, self.api_key)
    }
}

#[async_trait::async_trait]
impl LiveClient for GeminiLiveClient {
    async fn connect(&self, setup: &SessionSetup) -> Result<LiveConnection> {
        debug!("Connecting live session to {}", self.endpoint);
        let (ws, _response) = connect_async(self.session_url()).await?;
        let (mut sink, mut source) = ws.split();

        let setup_json = serde_json::to_string(&SetupMessage::new(setup))?;
        sink.send(Message::Text(setup_json.into())).await?;

        // No traffic until the upstream acknowledges the configuration.
        match next_server_message(&mut source).await {
            Some(Ok(message)) if message.setup_complete.is_some() => {
                debug!("Live session setup complete: model={}", setup.model);
            }
            Some(Ok(_)) => {
                return Err(LiveError::Handshake(
                    "expected setupComplete as the first server message".to_string(),
                ));
            }
            Some(Err(e)) => return Err(LiveError::Handshake(e.to_string())),
            None => {
                return Err(LiveError::Handshake(
                    "upstream closed during setup".to_string(),
                ));
            }
        }

        Ok(LiveConnection {
            sender: Arc::new(GeminiSender {
                sink: Mutex::new(sink),
            }),
            receiver: Box::new(GeminiReceiver { source }),
        })
    }
}

struct GeminiSender {
    sink: Mutex<WsSink>,
}

impl GeminiSender {
    async fn send_json<T: serde::Serialize>(&self, message: &T) -> Result<()> {
        let json = serde_json::to_string(message)?;
        let mut sink = self.sink.lock().await;
        sink.send(Message::Text(json.into())).await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl LiveSender for GeminiSender {
    async fn send_audio(&self, pcm: &[u8], sample_rate_hz: u32) -> Result<()> {
        self.send_json(&RealtimeInputMessage::audio(pcm, sample_rate_hz))
            .await
    }

    async fn send_video(&self, jpeg: &[u8]) -> Result<()> {
        self.send_json(&RealtimeInputMessage::video(jpeg)).await
    }

    async fn send_text(&self, text: &str, end_of_turn: bool) -> Result<()> {
        self.send_json(&ClientContentMessage::user_text(text, end_of_turn))
            .await
    }
}

struct GeminiReceiver {
    source: WsSource,
}

#[async_trait::async_trait]
impl LiveReceiver for GeminiReceiver {
    async fn next_message(&mut self) -> Option<Result<ServerMessage>> {
        next_server_message(&mut self.source).await
    }
}

/// Read the next JSON payload from the socket. The Live API delivers
/// JSON in both text and binary frames; control frames are skipped.
async fn next_server_message(source: &mut WsSource) -> Option<Result<ServerMessage>> {
    loop {
        match source.next().await? {
            Ok(Message::Text(text)) => return Some(ServerMessage::parse(text.as_bytes())),
            Ok(Message::Binary(bytes)) => return Some(ServerMessage::parse(&bytes)),
            Ok(Message::Close(frame)) => {
                debug!("Upstream sent close frame: {:?}", frame);
                return None;
            }
            Ok(_) => continue, // ping/pong
            Err(e) => {
                warn!("Upstream socket error: {}", e);
                return Some(Err(e.into()));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_endpoint_url() {
        let config = LiveConfig {
            api_key: "secret".to_string(),
            ..LiveConfig::default()
        };
        let client = GeminiLiveClient::new(&config);
        let url = client.session_url();
        assert!(url.starts_with("wss://generativelanguage.googleapis.com/"));
        assert!(url.ends_with("?key=secret"));
    }

    #[test]
    fn test_endpoint_override() {
        let config = LiveConfig {
            api_key: "k".to_string(),
            endpoint: Some("ws://localhost:9999/live".to_string()),
            ..LiveConfig::default()
        };
        let client = GeminiLiveClient::new(&config);
        assert_eq!(client.session_url(), "ws://localhost:9999/live?key=k");
    }
}
