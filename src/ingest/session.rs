//! Ingestion session
//!
//! Owns one device connection for its whole lifetime: waits for frames,
//! decodes them, and hands each decoded frame to the storage engine. The
//! loop ends only when the source reports end-of-stream.
//!
//! Undecodable frames and failed appends are logged and counted; neither
//! ends the session.

use crate::ingest::frame::decode_frame;
use crate::storage::StorageEngine;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::mpsc;

/// A connection that yields raw frames
#[async_trait]
pub trait FrameSource: Send {
    /// Wait for the next frame. `None` means the peer closed the stream.
    async fn receive(&mut self) -> Option<Vec<u8>>;
}

/// In-process frame source fed through a channel
pub struct ChannelSource {
    rx: mpsc::Receiver<Vec<u8>>,
}

impl ChannelSource {
    pub fn new(rx: mpsc::Receiver<Vec<u8>>) -> Self {
        Self { rx }
    }

    /// Create a sender and its matching source. Dropping every sender ends the stream.
    pub fn pair(buffer: usize) -> (mpsc::Sender<Vec<u8>>, Self) {
        let (tx, rx) = mpsc::channel(buffer);
        (tx, Self::new(rx))
    }
}

#[async_trait]
impl FrameSource for ChannelSource {
    async fn receive(&mut self) -> Option<Vec<u8>> {
        self.rx.recv().await
    }
}

/// Per-session counters
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SessionStats {
    /// Frames received from the source
    pub frames: u64,
    /// Frames decoded and appended to the history
    pub recorded: u64,
    /// Frames that failed to decode
    pub rejected: u64,
    /// Frames decoded but not persisted (register still updated)
    pub persist_failures: u64,
}

/// Logic bound to one device connection
pub struct IngestionSession {
    id: String,
    engine: Arc<StorageEngine>,
    stats: SessionStats,
}

impl IngestionSession {
    pub fn new(engine: Arc<StorageEngine>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            engine,
            stats: SessionStats::default(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Drive the session until the source ends, then return its counters
    pub async fn accept<S: FrameSource>(mut self, mut source: S) -> SessionStats {
        tracing::info!(session_id = %self.id, "Device connected");

        while let Some(payload) = source.receive().await {
            self.handle_frame(&payload).await;
        }

        tracing::info!(
            session_id = %self.id,
            frames = self.stats.frames,
            recorded = self.stats.recorded,
            rejected = self.stats.rejected,
            persist_failures = self.stats.persist_failures,
            "Device disconnected"
        );

        self.stats
    }

    async fn handle_frame(&mut self, payload: &[u8]) {
        self.stats.frames += 1;

        let frame = match decode_frame(payload) {
            Ok(frame) => frame,
            Err(e) => {
                self.stats.rejected += 1;
                tracing::warn!(
                    session_id = %self.id,
                    error = %e,
                    payload = %String::from_utf8_lossy(payload),
                    "Discarding undecodable frame"
                );
                return;
            }
        };

        match self.engine.record(frame.ax, frame.ay, frame.az).await {
            Ok(reading) => {
                self.stats.recorded += 1;
                tracing::debug!(
                    session_id = %self.id,
                    time = %reading.time_text(),
                    ax = reading.ax,
                    ay = reading.ay,
                    az = reading.az,
                    "Reading recorded"
                );
            }
            Err(e) => {
                self.stats.persist_failures += 1;
                tracing::error!(
                    session_id = %self.id,
                    error = %e,
                    "Failed to persist reading; latest value still updated"
                );
            }
        }
    }
}
