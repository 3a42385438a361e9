use crate::error::Result;
use crate::worker::WorkerCommand;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Live audio playback capability.
///
/// Implementations own their buffering and, in stream mode, their own
/// backpressure acking toward the producer; the dispatcher hands chunks over
/// and does not wait for playback to drain.
#[async_trait::async_trait]
pub trait PlaybackSink: Send + Sync {
    /// Set the estimated chunk total for the upcoming stream.
    fn set_total_chunks(&self, total_chunks: usize);

    /// Queue one chunk of opaque sample bytes for playback.
    async fn queue_audio(&self, audio: Vec<u8>) -> Result<()>;

    /// Stop playback and drop any queued audio.
    async fn stop(&self) -> Result<()>;

    /// Release the underlying output device.
    async fn close(&self) -> Result<()>;
}

/// Playback sink without an output device.
///
/// Counts and discards chunks, acking each one to the producer so the
/// generation handshake keeps moving. Used by the CLI when no audio engine
/// is wired in, and by tests as a consumer stub.
pub struct DiscardSink {
    commands: mpsc::Sender<WorkerCommand>,
    total_chunks: AtomicUsize,
    queued_chunks: AtomicUsize,
}

impl DiscardSink {
    /// Sink that acks the producer through the given command channel.
    pub fn new(commands: mpsc::Sender<WorkerCommand>) -> Self {
        Self {
            commands,
            total_chunks: AtomicUsize::new(0),
            queued_chunks: AtomicUsize::new(0),
        }
    }

    pub fn queued_chunks(&self) -> usize {
        self.queued_chunks.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl PlaybackSink for DiscardSink {
    fn set_total_chunks(&self, total_chunks: usize) {
        self.total_chunks.store(total_chunks, Ordering::SeqCst);
        self.queued_chunks.store(0, Ordering::SeqCst);
    }

    async fn queue_audio(&self, audio: Vec<u8>) -> Result<()> {
        let queued = self.queued_chunks.fetch_add(1, Ordering::SeqCst) + 1;
        debug!("Discarding playback chunk {} ({} bytes)", queued, audio.len());

        // No device buffer to wait for: the chunk is "played" immediately.
        if let Err(e) = self.commands.send(WorkerCommand::BufferProcessed).await {
            warn!("Failed to ack playback chunk: {}", e);
        }

        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        info!(
            "Playback stopped after {} chunks",
            self.queued_chunks.load(Ordering::SeqCst)
        );
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}
