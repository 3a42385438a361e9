use tracing::info;

/// Highest percentage reported while chunks are still arriving.
///
/// The chunk total is only an estimate, so intermediate progress is capped
/// below 100; completion or finalization reports the exact 100.
pub const PROGRESS_CAP: f64 = 99.0;

/// Converts chunk counts into a bounded percentage.
///
/// The total is an estimate derived from input text length, not a promise
/// from the producer. Progress therefore never claims 100 on its own.
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    total_chunks: usize,
    processed_chunks: usize,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self {
            total_chunks: 1,
            processed_chunks: 0,
        }
    }

    /// Set the estimated chunk total and reset the processed counter.
    ///
    /// An estimate of zero (empty input text) is clamped to 1 so the
    /// percentage stays finite.
    pub fn set_total(&mut self, total_chunks: usize) {
        self.total_chunks = total_chunks.max(1);
        self.processed_chunks = 0;
    }

    /// Record one processed chunk and return the bounded percentage.
    pub fn record_chunk(&mut self) -> f64 {
        self.processed_chunks += 1;
        self.percent()
    }

    /// Current bounded percentage: `min(processed / total * 100, 99)`.
    pub fn percent(&self) -> f64 {
        let raw = self.processed_chunks as f64 / self.total_chunks as f64 * 100.0;
        raw.min(PROGRESS_CAP)
    }

    pub fn processed_chunks(&self) -> usize {
        self.processed_chunks
    }

    pub fn total_chunks(&self) -> usize {
        self.total_chunks
    }

    pub fn reset(&mut self) {
        self.total_chunks = 1;
        self.processed_chunks = 0;
    }
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Scale a producer-reported model-loading fraction (0..=1) to a percentage.
///
/// Producers have been observed to emit non-numeric progress during cache
/// warmup; anything non-finite is clamped to 0.
pub fn loading_percent(progress: f64) -> f64 {
    let scaled = progress * 100.0;
    if scaled.is_finite() {
        scaled.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

/// Capability for pushing visual status updates.
///
/// `percent` is 0..=100; 100 is terminal for the current operation, whether
/// it succeeded or failed (the message says which).
pub trait ProgressReporter: Send + Sync {
    fn report(&self, percent: f64, message: Option<&str>);
}

/// Reporter that writes status lines to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogReporter;

impl ProgressReporter for LogReporter {
    fn report(&self, percent: f64, message: Option<&str>) {
        match message {
            Some(msg) => info!("[{:.0}%] {}", percent, msg),
            None => info!("[{:.0}%]", percent),
        }
    }
}
