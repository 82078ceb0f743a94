//! WebSocket connection handler
//!
//! Wires one emergency session together: splits the socket into a
//! single writer task fed by the outbound queue and a read loop feeding
//! the client bridge, then hands the session to the failover
//! controller. The read loop reports a client disconnect as a notice;
//! only the controller cancels the session.

use axum::{
    extract::{
        ws::{Message as WsMessage, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use chrono::Utc;
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use aegis_live::channels::input_channels;
use aegis_live::client::{SessionHooks, SessionSetup};

use crate::bridge::ClientBridge;
use crate::controller::FailoverController;
use crate::message::Outbound;
use crate::relay::SessionNotice;
use crate::server::WsState;

/// Handle WebSocket upgrade request
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<WsState>>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle established WebSocket connection
async fn handle_socket(socket: WebSocket, state: Arc<WsState>) {
    let session_id = uuid::Uuid::new_v4().to_string();
    let started_at = Utc::now();
    info!("Emergency session connected: {}", session_id);

    let (mut ws_sink, mut ws_stream) = socket.split();
    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<Outbound>();

    // Single writer: audio as binary frames, events as text frames.
    // Drains the queue fully before closing, so the fallback package is
    // on the wire before the socket goes away.
    let session_id_writer = session_id.clone();
    let writer_task = tokio::spawn(async move {
        while let Some(frame) = outbound_rx.recv().await {
            let message = match frame {
                Outbound::Audio(pcm) => WsMessage::Binary(pcm.into()),
                Outbound::Event(json) => WsMessage::Text(json.into()),
            };
            if ws_sink.send(message).await.is_err() {
                break;
            }
        }
        let _ = ws_sink.close().await;
        debug!("Writer task ended for session: {}", session_id_writer);
    });

    let (inputs, channels) = input_channels();
    let cancel = CancellationToken::new();
    let setup = SessionSetup::from_config(&state.config.live);

    let (controller, state_rx, notice_tx) = FailoverController::new(
        session_id.clone(),
        state.live_client.clone(),
        setup,
        state.fallback.clone(),
        outbound_tx.clone(),
        cancel.clone(),
    );

    // Read loop: classify client frames until the transport closes.
    let bridge = ClientBridge::new(inputs, state.config.live.input_sample_rate_hz);
    let session_id_read = session_id.clone();
    let read_cancel = cancel.clone();
    let read_notices = notice_tx.clone();
    let read_task = tokio::spawn(async move {
        loop {
            let message = tokio::select! {
                _ = read_cancel.cancelled() => break,
                message = ws_stream.next() => message,
            };
            match message {
                Some(Ok(WsMessage::Binary(data))) => bridge.route_binary(data.to_vec()),
                Some(Ok(WsMessage::Text(text))) => bridge.route_text(text.to_string()),
                Some(Ok(WsMessage::Ping(_))) | Some(Ok(WsMessage::Pong(_))) => {}
                Some(Ok(WsMessage::Close(_))) | None => {
                    info!("Client disconnected: {}", session_id_read);
                    let _ = read_notices.send(SessionNotice::ClientGone);
                    break;
                }
                Some(Err(e)) => {
                    warn!("Client socket error on {}: {}", session_id_read, e);
                    let _ = read_notices.send(SessionNotice::ClientGone);
                    break;
                }
            }
        }
        debug!("Read loop ended for session: {}", session_id_read);
    });

    let hooks: Arc<dyn SessionHooks> = Arc::new(WsSessionHooks {
        session_id: session_id.clone(),
        outbound: outbound_tx.clone(),
    });

    controller.run(channels, hooks).await;

    // All outbound senders are gone at this point; the writer drains
    // whatever is queued and closes the socket.
    drop(outbound_tx);
    let _ = read_task.await;
    let _ = writer_task.await;

    let elapsed = Utc::now().signed_duration_since(started_at);
    info!(
        "Emergency session ended: {} ({:?}, {}s)",
        session_id,
        *state_rx.borrow(),
        elapsed.num_seconds()
    );
}

/// Session side effects behind the uniform async hook convention.
struct WsSessionHooks {
    session_id: String,
    outbound: mpsc::UnboundedSender<Outbound>,
}

#[async_trait::async_trait]
impl SessionHooks for WsSessionHooks {
    async fn play_audio(&self, pcm: Vec<u8>) {
        let _ = self.outbound.send(Outbound::Audio(pcm));
    }

    async fn barge_in(&self) {
        // Client-side playback mutes on the interrupted frame that
        // follows; nothing is buffered server-side to flush.
        info!("User interrupted agent (barge-in): {}", self.session_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_hooks_forward_audio_to_outbound_queue() {
        let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel();
        let hooks = WsSessionHooks {
            session_id: "test".to_string(),
            outbound: outbound_tx,
        };

        hooks.play_audio(vec![1, 2, 3]).await;

        assert_eq!(outbound_rx.try_recv(), Ok(Outbound::Audio(vec![1, 2, 3])));
    }
}
