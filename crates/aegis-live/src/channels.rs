//! Per-modality input channels
//!
//! Audio and text are lossless strict-FIFO queues: no speech or typed
//! message may silently vanish, whatever the upstream sender's pace.
//! Video is a lossy latest-only slot: a stale camera frame has no value
//! once a newer one exists, so enqueueing replaces any pending frame.

use tokio::sync::{mpsc, watch};

use crate::event::{AudioChunk, MediaFrame, TextMessage, VideoFrame};

/// Producer half of a session's input channels. Held by the client bridge.
#[derive(Debug)]
pub struct InputSenders {
    audio: mpsc::UnboundedSender<AudioChunk>,
    video: watch::Sender<Option<VideoFrame>>,
    text: mpsc::UnboundedSender<TextMessage>,
}

/// Consumer half of a session's input channels. Held by the multiplexer.
#[derive(Debug)]
pub struct InputChannels {
    pub audio: mpsc::UnboundedReceiver<AudioChunk>,
    pub video: VideoReceiver,
    pub text: mpsc::UnboundedReceiver<TextMessage>,
}

/// Create the three input channels for one session.
pub fn input_channels() -> (InputSenders, InputChannels) {
    let (audio_tx, audio_rx) = mpsc::unbounded_channel();
    let (video_tx, video_rx) = watch::channel(None);
    let (text_tx, text_rx) = mpsc::unbounded_channel();

    (
        InputSenders {
            audio: audio_tx,
            video: video_tx,
            text: text_tx,
        },
        InputChannels {
            audio: audio_rx,
            video: VideoReceiver { rx: video_rx },
            text: text_rx,
        },
    )
}

impl InputSenders {
    /// Enqueue a frame on the channel for its modality.
    ///
    /// Returns `false` when the consuming side of the session is gone.
    pub fn send(&self, frame: MediaFrame) -> bool {
        match frame {
            MediaFrame::Audio(chunk) => self.send_audio(chunk),
            MediaFrame::Video(frame) => self.send_video(frame),
            MediaFrame::Text(message) => self.send_text(message),
        }
    }

    pub fn send_audio(&self, chunk: AudioChunk) -> bool {
        self.audio.send(chunk).is_ok()
    }

    /// Enqueue a camera frame, replacing any frame not yet consumed.
    pub fn send_video(&self, frame: VideoFrame) -> bool {
        self.video.send(Some(frame)).is_ok()
    }

    pub fn send_text(&self, message: TextMessage) -> bool {
        self.text.send(message).is_ok()
    }
}

/// Receives the most recently enqueued camera frame, at most once each.
#[derive(Debug)]
pub struct VideoReceiver {
    rx: watch::Receiver<Option<VideoFrame>>,
}

impl VideoReceiver {
    /// Wait for the next unseen frame. Returns `None` once the producer
    /// side is gone and every pending frame has been consumed.
    pub async fn recv(&mut self) -> Option<VideoFrame> {
        loop {
            if self.rx.changed().await.is_err() {
                return None;
            }
            if let Some(frame) = self.rx.borrow_and_update().clone() {
                return Some(frame);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(byte: u8) -> AudioChunk {
        AudioChunk {
            pcm: vec![byte; 4],
            sample_rate_hz: 16_000,
        }
    }

    #[tokio::test]
    async fn test_audio_is_lossless_fifo() {
        let (senders, mut channels) = input_channels();

        for i in 0..100u8 {
            assert!(senders.send_audio(chunk(i)));
        }

        for i in 0..100u8 {
            let received = channels.audio.recv().await.unwrap();
            assert_eq!(received, chunk(i));
        }
    }

    #[tokio::test]
    async fn test_text_is_lossless_fifo() {
        let (senders, mut channels) = input_channels();

        senders.send_text(TextMessage { text: "first".into() });
        senders.send_text(TextMessage { text: "second".into() });

        assert_eq!(channels.text.recv().await.unwrap().text, "first");
        assert_eq!(channels.text.recv().await.unwrap().text, "second");
    }

    #[tokio::test]
    async fn test_video_coalesces_to_latest() {
        let (senders, mut channels) = input_channels();

        senders.send_video(VideoFrame { jpeg: vec![1] });
        senders.send_video(VideoFrame { jpeg: vec![2] });
        senders.send_video(VideoFrame { jpeg: vec![3] });

        // only the most recent frame survives the backlog
        assert_eq!(channels.video.recv().await.unwrap().jpeg, vec![3]);
    }

    #[tokio::test]
    async fn test_video_preserves_relative_order() {
        let (senders, mut channels) = input_channels();

        senders.send_video(VideoFrame { jpeg: vec![1] });
        assert_eq!(channels.video.recv().await.unwrap().jpeg, vec![1]);

        senders.send_video(VideoFrame { jpeg: vec![2] });
        senders.send_video(VideoFrame { jpeg: vec![3] });
        assert_eq!(channels.video.recv().await.unwrap().jpeg, vec![3]);
    }

    #[tokio::test]
    async fn test_video_recv_ends_when_producer_gone() {
        let (senders, mut channels) = input_channels();
        drop(senders);
        assert!(channels.video.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_pending_video_still_delivered_after_producer_gone() {
        let (senders, mut channels) = input_channels();
        senders.send_video(VideoFrame { jpeg: vec![7] });
        drop(senders);
        assert_eq!(channels.video.recv().await.unwrap().jpeg, vec![7]);
        assert!(channels.video.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_send_routes_by_modality() {
        let (senders, mut channels) = input_channels();

        assert!(senders.send(MediaFrame::Text(TextMessage { text: "hi".into() })));
        assert!(senders.send(MediaFrame::Audio(chunk(9))));

        assert_eq!(channels.text.recv().await.unwrap().text, "hi");
        assert_eq!(channels.audio.recv().await.unwrap(), chunk(9));
    }

    #[tokio::test]
    async fn test_send_fails_when_session_gone() {
        let (senders, channels) = input_channels();
        drop(channels);
        assert!(!senders.send_audio(chunk(0)));
        assert!(!senders.send_video(VideoFrame { jpeg: vec![1] }));
        assert!(!senders.send_text(TextMessage { text: "x".into() }));
    }
}
