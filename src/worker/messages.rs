use crate::voices::Voice;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Commands sent to the inference worker.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorkerCommand {
    /// Start generating audio for the given text and voice.
    Generate { text: String, voice: String },
    /// Abandon the current generation.
    Stop,
    /// Acknowledge the last audio chunk; unblocks the next one.
    BufferProcessed,
}

/// Events received from the inference worker.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum WorkerEvent {
    /// Model download/initialization has begun.
    LoadingModelStart,
    /// Model loading progress as a fraction in 0..=1.
    LoadingModelProgress { progress: f64 },
    /// Model is ready; the available voices come along.
    LoadingModelReady {
        #[serde(default)]
        voices: Vec<Voice>,
    },
    /// One chunk of opaque audio sample bytes.
    StreamAudioData { audio: Vec<u8> },
    /// End of stream: the worker has emitted every chunk.
    Complete,
    /// Generation failed.
    Error { message: String },
}

/// Event channel capacity: a single-slot rendezvous.
///
/// The protocol requires the producer to wait for a `BufferProcessed` ack
/// before emitting the next chunk. Capacity 1 makes that explicit: a
/// producer that double-sends parks on the channel instead of racing the
/// writer.
pub const EVENT_CHANNEL_CAPACITY: usize = 1;

const COMMAND_CHANNEL_CAPACITY: usize = 8;

/// Channel carrying events from the worker into the dispatcher.
pub fn event_channel() -> (mpsc::Sender<WorkerEvent>, mpsc::Receiver<WorkerEvent>) {
    mpsc::channel(EVENT_CHANNEL_CAPACITY)
}

/// Channel carrying commands from the pipeline to the worker.
pub fn command_channel() -> (mpsc::Sender<WorkerCommand>, mpsc::Receiver<WorkerCommand>) {
    mpsc::channel(COMMAND_CHANNEL_CAPACITY)
}
