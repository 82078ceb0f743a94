//! Session failover controller
//!
//! Coordinates one emergency session end to end. The controller task is
//! the only writer of session state, and the only component authorized
//! to emit the fallback package. Whatever happens upstream, the client
//! receives either a live event stream or exactly one fallback before
//! the connection closes.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use aegis_core::fallback::FallbackPackage;
use aegis_live::channels::InputChannels;
use aegis_live::client::{LiveClient, SessionHooks, SessionSetup};
use aegis_live::session::SessionMultiplexer;

use crate::message::{ClientEvent, Outbound};
use crate::relay::{OutputRelay, SessionNotice};

/// Lifecycle state of one emergency session.
///
/// Transitions are monotonic apart from the barge-in cycle: once the
/// session reaches `Closed`, no client-facing event is emitted again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Connecting,
    Active,
    Interrupted,
    Error,
    Closed,
}

/// Coordinates senders, receiver, and relay for one session.
pub struct FailoverController {
    session_id: String,
    client: Arc<dyn LiveClient>,
    setup: SessionSetup,
    fallback: Arc<FallbackPackage>,
    outbound: mpsc::UnboundedSender<Outbound>,
    notices: mpsc::UnboundedReceiver<SessionNotice>,
    notice_tx: mpsc::UnboundedSender<SessionNotice>,
    state: watch::Sender<SessionState>,
    cancel: CancellationToken,
}

impl FailoverController {
    /// Create the controller for one session.
    ///
    /// Returns the controller, a read-only view of the session state,
    /// and a notice sender for the transport read loop to report client
    /// disconnects on.
    pub fn new(
        session_id: String,
        client: Arc<dyn LiveClient>,
        setup: SessionSetup,
        fallback: Arc<FallbackPackage>,
        outbound: mpsc::UnboundedSender<Outbound>,
        cancel: CancellationToken,
    ) -> (
        Self,
        watch::Receiver<SessionState>,
        mpsc::UnboundedSender<SessionNotice>,
    ) {
        let (state_tx, state_rx) = watch::channel(SessionState::Connecting);
        let (notice_tx, notice_rx) = mpsc::unbounded_channel();
        let controller = Self {
            session_id,
            client,
            setup,
            fallback,
            outbound,
            notices: notice_rx,
            notice_tx: notice_tx.clone(),
            state: state_tx,
            cancel,
        };
        (controller, state_rx, notice_tx)
    }

    /// Drive the session to completion or failure.
    ///
    /// Cancels every session task before returning; the state is
    /// `Closed` on all paths.
    pub async fn run(mut self, channels: InputChannels, hooks: Arc<dyn SessionHooks>) {
        let connection = match self.client.connect(&self.setup).await {
            Ok(connection) => connection,
            Err(e) => {
                error!("[Session {}] Upstream handshake failed: {}", self.session_id, e);
                self.transition(SessionState::Error);
                self.send_fallback();
                self.cancel.cancel();
                self.transition(SessionState::Closed);
                return;
            }
        };
        self.transition(SessionState::Active);

        let (events, handle) =
            SessionMultiplexer::start(connection, channels, hooks, self.cancel.clone());
        let relay = OutputRelay::new(
            events,
            self.outbound.clone(),
            self.notice_tx.clone(),
            self.cancel.clone(),
        );
        let relay_task = tokio::spawn(relay.run());

        let mut failure: Option<String> = None;
        let mut client_gone = false;

        while let Some(notice) = self.notices.recv().await {
            match notice {
                SessionNotice::Interrupted => {
                    self.transition(SessionState::Interrupted);
                }
                SessionNotice::TurnComplete => {
                    if *self.state.borrow() == SessionState::Interrupted {
                        self.transition(SessionState::Active);
                    }
                }
                SessionNotice::UpstreamFailed(message) => {
                    failure = Some(message);
                    break;
                }
                SessionNotice::StreamEnded => {
                    // The upstream hung up mid-session; the client still
                    // needs guidance, so this counts as a failure.
                    failure = Some("upstream closed the stream".to_string());
                    break;
                }
                SessionNotice::ClientGone => {
                    client_gone = true;
                    break;
                }
            }
        }

        if let Some(message) = failure {
            warn!("[Session {}] Upstream failed: {}", self.session_id, message);
            self.transition(SessionState::Error);
            self.send_fallback();
        }

        self.cancel.cancel();
        let _ = relay_task.await;
        handle.join().await;
        self.transition(SessionState::Closed);

        if client_gone {
            info!("[Session {}] Closed after client disconnect", self.session_id);
        } else {
            info!("[Session {}] Closed", self.session_id);
        }
    }

    /// The single point that emits the fallback package. Runs at most
    /// once per session: both call paths are terminal.
    fn send_fallback(&self) {
        let event = ClientEvent::fallback(&self.fallback);
        if self.outbound.send(Outbound::event(&event)).is_ok() {
            info!("[Session {}] Sent fallback instructions", self.session_id);
        } else {
            error!(
                "[Session {}] Failed to send fallback, client may be disconnected",
                self.session_id
            );
        }
    }

    fn transition(&self, next: SessionState) {
        let current = *self.state.borrow();
        if current == next || current == SessionState::Closed {
            return;
        }
        info!(
            "[Session {}] State {:?} -> {:?}",
            self.session_id, current, next
        );
        self.state.send_replace(next);
    }
}
