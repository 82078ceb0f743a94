//! Session multiplexer
//!
//! Fans the three input channels into the single upstream connection:
//! one independent sender task per modality, plus the event receiver.
//! Per-modality order is preserved; no ordering exists across
//! modalities. A stalled sender never blocks the others.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::channels::{InputChannels, VideoReceiver};
use crate::client::{LiveConnection, LiveSender, SessionHooks};
use crate::event::{AudioChunk, TextMessage, UpstreamEvent};
use crate::receiver::UpstreamEventReceiver;

/// Running tasks of one live session.
pub struct LiveSessionHandle {
    tasks: Vec<JoinHandle<()>>,
}

impl LiveSessionHandle {
    /// Wait for every session task to exit. Cancel the session's token
    /// first; the tasks observe it at their suspension points.
    pub async fn join(self) {
        for task in self.tasks {
            let _ = task.await;
        }
    }
}

/// Fans client input into the upstream connection.
pub struct SessionMultiplexer;

impl SessionMultiplexer {
    /// Spawn the per-modality senders and the upstream event receiver.
    ///
    /// The returned queue carries the typed events decoded from the
    /// upstream, in receipt order; it closes after a terminal event or
    /// a clean upstream end.
    pub fn start(
        connection: LiveConnection,
        channels: InputChannels,
        hooks: Arc<dyn SessionHooks>,
        cancel: CancellationToken,
    ) -> (mpsc::UnboundedReceiver<UpstreamEvent>, LiveSessionHandle) {
        let LiveConnection { sender, receiver } = connection;
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let tasks = vec![
            tokio::spawn(run_audio_sender(
                sender.clone(),
                channels.audio,
                cancel.clone(),
            )),
            tokio::spawn(run_video_sender(
                sender.clone(),
                channels.video,
                cancel.clone(),
            )),
            tokio::spawn(run_text_sender(sender, channels.text, cancel.clone())),
            tokio::spawn(UpstreamEventReceiver::new(receiver, event_tx, hooks, cancel).run()),
        ];

        (event_rx, LiveSessionHandle { tasks })
    }
}

/// Relay microphone audio upstream. Lossless: every queued chunk is
/// forwarded, in order, including chunks still queued at cancellation.
async fn run_audio_sender(
    sender: Arc<dyn LiveSender>,
    mut audio: mpsc::UnboundedReceiver<AudioChunk>,
    cancel: CancellationToken,
) {
    loop {
        let chunk = tokio::select! {
            _ = cancel.cancelled() => break,
            chunk = audio.recv() => match chunk {
                Some(chunk) => chunk,
                None => return,
            },
        };
        if let Err(e) = sender.send_audio(&chunk.pcm, chunk.sample_rate_hz).await {
            warn!("Audio sender stopping: {}", e);
            return;
        }
    }

    // Flush chunks that were already queued when the session was
    // cancelled; a dead connection ends the flush early.
    while let Ok(chunk) = audio.try_recv() {
        if sender
            .send_audio(&chunk.pcm, chunk.sample_rate_hz)
            .await
            .is_err()
        {
            break;
        }
    }
    debug!("Audio sender exited");
}

/// Relay camera frames upstream. Lossy: the channel retains only the
/// most recent frame, and pending frames may be dropped at cancellation.
async fn run_video_sender(
    sender: Arc<dyn LiveSender>,
    mut video: VideoReceiver,
    cancel: CancellationToken,
) {
    loop {
        let frame = tokio::select! {
            _ = cancel.cancelled() => break,
            frame = video.recv() => match frame {
                Some(frame) => frame,
                None => break,
            },
        };
        if let Err(e) = sender.send_video(&frame.jpeg).await {
            warn!("Video sender stopping: {}", e);
            break;
        }
    }
    debug!("Video sender exited");
}

/// Relay user text upstream as complete turns. Lossless, like audio.
async fn run_text_sender(
    sender: Arc<dyn LiveSender>,
    mut text: mpsc::UnboundedReceiver<TextMessage>,
    cancel: CancellationToken,
) {
    loop {
        let message = tokio::select! {
            _ = cancel.cancelled() => break,
            message = text.recv() => match message {
                Some(message) => message,
                None => return,
            },
        };
        if let Err(e) = sender.send_text(&message.text, true).await {
            warn!("Text sender stopping: {}", e);
            return;
        }
    }

    while let Ok(message) = text.try_recv() {
        if sender.send_text(&message.text, true).await.is_err() {
            break;
        }
    }
    debug!("Text sender exited");
}
