use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for a pipeline session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSettings {
    /// Unique session identifier (e.g. "tts-7f3a...")
    pub session_id: String,

    /// Sample rate of the generated audio and of saved WAV files
    pub sample_rate: u32,

    /// Characters of input text per estimated chunk in stream mode
    pub stream_chunk_chars: usize,

    /// Characters of input text per estimated chunk in disk mode
    pub disk_chunk_chars: usize,

    /// How long `stop` waits for the producer's stop handling to settle
    /// before finalizing the output file. Finalize proceeds regardless.
    pub stop_grace: Duration,

    /// Voice used when the caller does not pick one
    pub default_voice: String,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            session_id: format!("tts-{}", uuid::Uuid::new_v4()),
            sample_rate: 23000,    // a bit slower than 24000
            stream_chunk_chars: 300, // rough estimate of chars per chunk
            disk_chunk_chars: 100,
            stop_grace: Duration::from_millis(100),
            default_voice: "af_heart".to_string(),
        }
    }
}
