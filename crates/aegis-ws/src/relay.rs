//! Output relay
//!
//! Drains the session's internal event queue strictly in arrival order
//! and forwards each event to the client socket. Lifecycle observations
//! travel back to the failover controller as notices over a channel, so
//! the controller stays the only writer of session state.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use aegis_live::event::UpstreamEvent;

use crate::message::{ClientEvent, Outbound};

/// Observations reported to the failover controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionNotice {
    /// The agent was interrupted by the user
    Interrupted,
    /// The agent finished a turn
    TurnComplete,
    /// Terminal upstream failure, relayed after the error frame
    UpstreamFailed(String),
    /// The upstream ended the stream without an error
    StreamEnded,
    /// The client transport closed
    ClientGone,
}

/// Drains the internal event queue to the client transport.
pub struct OutputRelay {
    events: mpsc::UnboundedReceiver<UpstreamEvent>,
    outbound: mpsc::UnboundedSender<Outbound>,
    notices: mpsc::UnboundedSender<SessionNotice>,
    cancel: CancellationToken,
}

impl OutputRelay {
    pub fn new(
        events: mpsc::UnboundedReceiver<UpstreamEvent>,
        outbound: mpsc::UnboundedSender<Outbound>,
        notices: mpsc::UnboundedSender<SessionNotice>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            events,
            outbound,
            notices,
            cancel,
        }
    }

    /// Forward events until a terminal sentinel, the end of the queue,
    /// or cancellation. Never reorders, never drops a queued event.
    pub async fn run(mut self) {
        loop {
            let event = tokio::select! {
                _ = self.cancel.cancelled() => break,
                event = self.events.recv() => event,
            };

            match event {
                None => {
                    let _ = self.notices.send(SessionNotice::StreamEnded);
                    break;
                }
                // Audio normally reaches the client through the direct
                // sink; a queued chunk is forwarded the same way.
                Some(UpstreamEvent::AgentAudio { pcm }) => {
                    let _ = self.outbound.send(Outbound::Audio(pcm));
                }
                Some(UpstreamEvent::UserTranscript { text }) => {
                    self.forward(ClientEvent::UserTranscript { text });
                }
                Some(UpstreamEvent::AgentTranscript { text }) => {
                    self.forward(ClientEvent::GeminiTranscript { text });
                }
                Some(UpstreamEvent::TurnComplete) => {
                    self.forward(ClientEvent::TurnComplete);
                    let _ = self.notices.send(SessionNotice::TurnComplete);
                }
                Some(UpstreamEvent::Interrupted) => {
                    self.forward(ClientEvent::Interrupted);
                    let _ = self.notices.send(SessionNotice::Interrupted);
                }
                Some(UpstreamEvent::UpstreamError { message }) => {
                    self.forward(ClientEvent::Error {
                        error: message.clone(),
                    });
                    let _ = self.notices.send(SessionNotice::UpstreamFailed(message));
                    break;
                }
            }
        }
        debug!("Output relay exited");
    }

    fn forward(&self, event: ClientEvent) {
        let _ = self.outbound.send(Outbound::event(&event));
    }
}
