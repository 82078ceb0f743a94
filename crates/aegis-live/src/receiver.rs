//! Upstream event receiver
//!
//! The single reader of the upstream stream. Decodes each message into
//! typed events: agent audio goes straight to the session's audio hook
//! (latency-critical), everything else is queued in receipt order for
//! the output relay. Any read or decode failure is terminal for the
//! session; retry is a policy for the layer above session creation.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::client::{LiveReceiver, SessionHooks};
use crate::error::Result;
use crate::event::UpstreamEvent;
use crate::wire::ServerMessage;

/// Decodes the upstream's mixed stream into [`UpstreamEvent`]s.
pub struct UpstreamEventReceiver {
    receiver: Box<dyn LiveReceiver>,
    events: mpsc::UnboundedSender<UpstreamEvent>,
    hooks: Arc<dyn SessionHooks>,
    cancel: CancellationToken,
}

impl UpstreamEventReceiver {
    pub fn new(
        receiver: Box<dyn LiveReceiver>,
        events: mpsc::UnboundedSender<UpstreamEvent>,
        hooks: Arc<dyn SessionHooks>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            receiver,
            events,
            hooks,
            cancel,
        }
    }

    /// Read until the stream ends, a terminal error surfaces, or the
    /// session is cancelled. The event queue closes when this returns.
    pub async fn run(mut self) {
        loop {
            let message = tokio::select! {
                _ = self.cancel.cancelled() => break,
                message = self.receiver.next_message() => message,
            };

            match message {
                None => {
                    debug!("Upstream stream ended");
                    break;
                }
                Some(Err(e)) => {
                    let _ = self.events.send(UpstreamEvent::UpstreamError {
                        message: e.to_string(),
                    });
                    break;
                }
                Some(Ok(message)) => {
                    if let Err(e) = self.dispatch(message).await {
                        let _ = self.events.send(UpstreamEvent::UpstreamError {
                            message: e.to_string(),
                        });
                        break;
                    }
                }
            }
        }
    }

    async fn dispatch(&self, message: ServerMessage) -> Result<()> {
        if let Some(content) = message.server_content {
            if let Some(turn) = content.model_turn {
                for part in turn.parts {
                    if let Some(blob) = part.inline_data {
                        self.hooks.play_audio(blob.decode()?).await;
                    }
                }
            }

            if let Some(text) = content.input_transcription.and_then(|t| t.text) {
                if !text.is_empty() {
                    let _ = self.events.send(UpstreamEvent::UserTranscript { text });
                }
            }

            if let Some(text) = content.output_transcription.and_then(|t| t.text) {
                if !text.is_empty() {
                    let _ = self.events.send(UpstreamEvent::AgentTranscript { text });
                }
            }

            if content.turn_complete {
                let _ = self.events.send(UpstreamEvent::TurnComplete);
            }

            if content.interrupted {
                // Mute playback before the client hears about the barge-in.
                self.hooks.barge_in().await;
                let _ = self.events.send(UpstreamEvent::Interrupted);
            }
        }

        if let Some(call) = message.tool_call {
            warn!("Ignoring unexpected tool call from upstream: {}", call);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LiveError;
    use crate::wire::{Blob, Content, Part, ServerContent, Transcription};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays a fixed script of upstream messages, then ends.
    struct ScriptedReceiver {
        script: VecDeque<Result<ServerMessage>>,
    }

    impl ScriptedReceiver {
        fn new(script: Vec<Result<ServerMessage>>) -> Box<Self> {
            Box::new(Self {
                script: script.into_iter().collect(),
            })
        }
    }

    #[async_trait]
    impl LiveReceiver for ScriptedReceiver {
        async fn next_message(&mut self) -> Option<Result<ServerMessage>> {
            self.script.pop_front()
        }
    }

    /// Records hook invocations interleaved with nothing else, so tests
    /// can assert ordering against the event queue.
    #[derive(Default)]
    struct RecordingHooks {
        audio: Mutex<Vec<Vec<u8>>>,
        barge_ins: Mutex<u32>,
    }

    #[async_trait]
    impl SessionHooks for RecordingHooks {
        async fn play_audio(&self, pcm: Vec<u8>) {
            self.audio.lock().unwrap().push(pcm);
        }

        async fn barge_in(&self) {
            *self.barge_ins.lock().unwrap() += 1;
        }
    }

    fn content_message(content: ServerContent) -> ServerMessage {
        ServerMessage {
            server_content: Some(content),
            ..ServerMessage::default()
        }
    }

    fn audio_message(pcm: &[u8]) -> ServerMessage {
        content_message(ServerContent {
            model_turn: Some(Content {
                role: None,
                parts: vec![Part {
                    text: None,
                    inline_data: Some(Blob::audio(pcm, 24_000)),
                }],
            }),
            ..ServerContent::default()
        })
    }

    async fn run_script(
        script: Vec<Result<ServerMessage>>,
    ) -> (Vec<UpstreamEvent>, Arc<RecordingHooks>) {
        let hooks = Arc::new(RecordingHooks::default());
        let (event_tx, mut event_rx) = mpsc::unbounded_channel();
        let receiver = UpstreamEventReceiver::new(
            ScriptedReceiver::new(script),
            event_tx,
            hooks.clone(),
            CancellationToken::new(),
        );
        receiver.run().await;

        let mut events = Vec::new();
        while let Ok(event) = event_rx.try_recv() {
            events.push(event);
        }
        (events, hooks)
    }

    #[tokio::test]
    async fn test_transcripts_queued_in_receipt_order() {
        let (events, _) = run_script(vec![
            Ok(content_message(ServerContent {
                input_transcription: Some(Transcription {
                    text: Some("he fell".into()),
                }),
                ..ServerContent::default()
            })),
            Ok(content_message(ServerContent {
                output_transcription: Some(Transcription {
                    text: Some("Stay with him.".into()),
                }),
                turn_complete: true,
                ..ServerContent::default()
            })),
        ])
        .await;

        assert_eq!(
            events,
            vec![
                UpstreamEvent::UserTranscript {
                    text: "he fell".into()
                },
                UpstreamEvent::AgentTranscript {
                    text: "Stay with him.".into()
                },
                UpstreamEvent::TurnComplete,
            ]
        );
    }

    #[tokio::test]
    async fn test_agent_audio_bypasses_event_queue() {
        let (events, hooks) = run_script(vec![Ok(audio_message(&[9, 9, 9]))]).await;

        assert_eq!(*hooks.audio.lock().unwrap(), vec![vec![9, 9, 9]]);
        assert!(events.is_empty());
    }

    #[tokio::test]
    async fn test_barge_in_runs_before_interrupted_is_queued() {
        let hooks = Arc::new(RecordingHooks::default());
        let (event_tx, mut event_rx) = mpsc::unbounded_channel();
        let receiver = UpstreamEventReceiver::new(
            ScriptedReceiver::new(vec![Ok(content_message(ServerContent {
                interrupted: true,
                ..ServerContent::default()
            }))]),
            event_tx,
            hooks.clone(),
            CancellationToken::new(),
        );
        receiver.run().await;

        // the hook already ran by the time the event is observable
        assert_eq!(event_rx.try_recv(), Ok(UpstreamEvent::Interrupted));
        assert_eq!(*hooks.barge_ins.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_empty_transcripts_not_forwarded() {
        let (events, _) = run_script(vec![Ok(content_message(ServerContent {
            input_transcription: Some(Transcription {
                text: Some(String::new()),
            }),
            output_transcription: Some(Transcription { text: None }),
            ..ServerContent::default()
        }))])
        .await;

        assert!(events.is_empty());
    }

    #[tokio::test]
    async fn test_tool_calls_ignored() {
        let (events, hooks) = run_script(vec![Ok(ServerMessage {
            tool_call: Some(serde_json::json!({"functionCalls": [{"name": "noop"}]})),
            ..ServerMessage::default()
        })])
        .await;

        assert!(events.is_empty());
        assert!(hooks.audio.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_stream_error_is_terminal() {
        let (events, _) = run_script(vec![
            Ok(content_message(ServerContent {
                turn_complete: true,
                ..ServerContent::default()
            })),
            Err(LiveError::Other("connection reset".into())),
            // never reached: the loop exits on the first error
            Ok(content_message(ServerContent {
                turn_complete: true,
                ..ServerContent::default()
            })),
        ])
        .await;

        assert_eq!(
            events,
            vec![
                UpstreamEvent::TurnComplete,
                UpstreamEvent::UpstreamError {
                    message: "connection reset".into()
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_bad_audio_payload_is_terminal() {
        let (events, _) = run_script(vec![Ok(content_message(ServerContent {
            model_turn: Some(Content {
                role: None,
                parts: vec![Part {
                    text: None,
                    inline_data: Some(Blob {
                        mime_type: "audio/pcm;rate=24000".into(),
                        data: "!!not base64!!".into(),
                    }),
                }],
            }),
            ..ServerContent::default()
        }))])
        .await;

        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], UpstreamEvent::UpstreamError { .. }));
    }
}
