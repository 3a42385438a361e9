use super::coordinator::Mode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Published snapshot of the coordinator's state.
///
/// This is the only view of the core the UI layer gets; button affordances
/// are projected from it (see `ControlsView`), never pushed by the core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSnapshot {
    /// Session identifier
    pub session_id: String,

    /// Which consumer is active
    pub mode: Mode,

    /// Whether live streaming is in progress
    pub is_streaming: bool,

    /// Whether the model has finished loading
    pub model_ready: bool,

    /// Whether at least one chunk has been delivered in the active mode
    pub delivering: bool,

    /// Estimated chunk total for the active operation
    pub total_chunks: usize,

    /// Chunks processed so far
    pub processed_chunks: usize,

    /// Bounded progress percentage (capped at 99 until completion)
    pub percent: f64,

    /// When the current session was entered
    pub started_at: DateTime<Utc>,
}
