//! Message protocol between the pipeline and the inference worker.
//!
//! The worker is an opaque producer: all communication is asynchronous
//! message exchange over channels, never direct calls. The disk path's flow
//! control is the `BufferProcessed` ack — the worker must not emit a chunk
//! until the previous one is acknowledged.

pub mod messages;
pub mod synth;

pub use messages::{
    command_channel, event_channel, WorkerCommand, WorkerEvent, EVENT_CHANNEL_CAPACITY,
};
pub use synth::{spawn as spawn_synth_worker, SynthConfig};
