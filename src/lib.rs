pub mod audio;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod progress;
pub mod voices;
pub mod worker;

pub use audio::{DiscardSink, PlaybackSink, WavProbe, WavStreamWriter};
pub use config::Config;
pub use error::{PipelineError, Result};
pub use pipeline::{
    ControlState, ControlsView, Coordinator, Dispatcher, Mode, PipelineSnapshot, SessionSettings,
};
pub use progress::{LogReporter, ProgressReporter, ProgressTracker};
pub use voices::{Voice, VoiceCatalog, VoiceGroup};
pub use worker::{WorkerCommand, WorkerEvent};
