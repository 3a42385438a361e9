use super::coordinator::{Coordinator, Mode};
use crate::worker::{WorkerCommand, WorkerEvent};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, error, info, warn};

/// Routes producer events to the active consumer and relays backpressure.
///
/// The dispatcher is a pure synchronous relay: it never buffers a chunk.
/// Combined with the single-slot event channel this guarantees at most one
/// sink operation is in flight at any time — the producer is parked until
/// the previous chunk is acknowledged.
pub struct Dispatcher {
    coordinator: Arc<Mutex<Coordinator>>,
    commands: mpsc::Sender<WorkerCommand>,
    events: mpsc::Receiver<WorkerEvent>,
}

impl Dispatcher {
    pub fn new(
        coordinator: Arc<Mutex<Coordinator>>,
        commands: mpsc::Sender<WorkerCommand>,
        events: mpsc::Receiver<WorkerEvent>,
    ) -> Self {
        Self {
            coordinator,
            commands,
            events,
        }
    }

    /// Consume producer events until the worker hangs up.
    pub async fn run(mut self) {
        info!("Pipeline dispatcher started");

        while let Some(event) = self.events.recv().await {
            self.dispatch(event).await;
        }

        info!("Pipeline dispatcher stopped");
    }

    async fn dispatch(&mut self, event: WorkerEvent) {
        match event {
            WorkerEvent::LoadingModelStart => {
                self.coordinator.lock().await.on_loading_start();
            }
            WorkerEvent::LoadingModelProgress { progress } => {
                self.coordinator.lock().await.on_loading_progress(progress);
            }
            WorkerEvent::LoadingModelReady { voices } => {
                self.coordinator.lock().await.on_model_ready(voices);
            }
            WorkerEvent::StreamAudioData { audio } => {
                self.route_chunk(audio).await;
            }
            WorkerEvent::Complete => {
                if let Err(e) = self.coordinator.lock().await.complete().await {
                    error!("Completion failed: {}", e);
                }
            }
            WorkerEvent::Error { message } => {
                self.coordinator.lock().await.on_error(&message).await;
            }
        }
    }

    /// Route one audio chunk to whichever consumer is active.
    async fn route_chunk(&mut self, audio: Vec<u8>) {
        let mut coordinator = self.coordinator.lock().await;

        match coordinator.mode() {
            Mode::Disk => match coordinator.save_chunk(&audio).await {
                Ok(_percent) => {
                    // The ack is the disk path's only flow control: the
                    // producer stays blocked until it lands.
                    if let Err(e) = self.commands.send(WorkerCommand::BufferProcessed).await {
                        warn!("Failed to ack processed chunk: {}", e);
                    }
                }
                Err(e) => {
                    error!("Error processing audio chunk: {}", e);
                    let message = e.to_string();
                    coordinator.on_error(&message).await;
                }
            },
            Mode::Stream => {
                // The playback capability owns its buffering and acks the
                // producer itself once the chunk is queued.
                if let Err(e) = coordinator.stream_chunk(audio).await {
                    error!("Error queueing audio chunk: {}", e);
                    let message = e.to_string();
                    coordinator.on_error(&message).await;
                }
            }
            Mode::Idle => {
                debug!(
                    "Dropping {} byte chunk with no active session",
                    audio.len()
                );
            }
        }
    }
}
