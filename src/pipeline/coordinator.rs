use super::config::SessionSettings;
use super::stats::PipelineSnapshot;
use crate::audio::{PlaybackSink, WavStreamWriter};
use crate::error::{PipelineError, Result};
use crate::progress::{loading_percent, ProgressReporter, ProgressTracker};
use crate::voices::{Voice, VoiceCatalog};
use crate::worker::WorkerCommand;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Which consumer is active.
///
/// Legal transitions are `Idle → Stream → Idle` and `Idle → Disk → Idle`;
/// there is no direct `Stream ↔ Disk` edge. Entering a mode while the other
/// is active is rejected, not merely discouraged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Idle,
    Stream,
    Disk,
}

/// Single source of truth for the pipeline's mode and session state.
///
/// Owns the output writer in disk mode and the playback capability in
/// stream mode; every failure path ends back in `Idle` so the caller's
/// controls are never left permanently disabled.
pub struct Coordinator {
    settings: SessionSettings,
    mode: Mode,
    is_streaming: bool,
    model_ready: bool,
    delivering: bool,
    started_at: DateTime<Utc>,
    tracker: ProgressTracker,
    writer: Option<WavStreamWriter>,
    sink: Arc<dyn PlaybackSink>,
    commands: mpsc::Sender<WorkerCommand>,
    reporter: Arc<dyn ProgressReporter>,
    voices: Option<VoiceCatalog>,
}

impl Coordinator {
    pub fn new(
        settings: SessionSettings,
        commands: mpsc::Sender<WorkerCommand>,
        sink: Arc<dyn PlaybackSink>,
        reporter: Arc<dyn ProgressReporter>,
    ) -> Self {
        Self {
            settings,
            mode: Mode::Idle,
            is_streaming: false,
            model_ready: false,
            delivering: false,
            started_at: Utc::now(),
            tracker: ProgressTracker::new(),
            writer: None,
            sink,
            commands,
            reporter,
            voices: None,
        }
    }

    /// Start live streaming: estimate the chunk total from the text length
    /// and ask the producer to generate.
    pub async fn enter_stream(&mut self, text: &str, voice: &str) -> Result<()> {
        self.ensure_idle("enter stream mode")?;

        let estimate = text.len() / self.settings.stream_chunk_chars.max(1);

        self.mode = Mode::Stream;
        self.is_streaming = true;
        self.delivering = false;
        self.started_at = Utc::now();
        self.tracker.set_total(estimate);
        self.sink.set_total_chunks(estimate.max(1));

        self.reporter
            .report(0.0, Some("Initializing audio streaming..."));

        info!("Entering stream mode ({} estimated chunks)", estimate.max(1));

        if let Err(e) = self.send_generate(text, voice).await {
            self.reset_to_idle();
            return Err(e);
        }

        Ok(())
    }

    /// Start a disk save: open the output file (header write) before asking
    /// the producer to generate. On sink failure the session never starts.
    pub async fn enter_disk(
        &mut self,
        path: impl AsRef<Path>,
        text: &str,
        voice: &str,
    ) -> Result<()> {
        self.ensure_idle("enter disk mode")?;

        self.reporter.report(0.0, Some("Preparing to save audio..."));

        let writer = match WavStreamWriter::create(path, self.settings.sample_rate).await {
            Ok(writer) => writer,
            Err(e) => {
                error!("Error initializing disk save: {}", e);
                self.reporter.report(100.0, Some("Error initializing file save!"));
                return Err(e);
            }
        };

        let estimate = text.len() / self.settings.disk_chunk_chars.max(1);

        self.writer = Some(writer);
        self.mode = Mode::Disk;
        self.is_streaming = false;
        self.delivering = false;
        self.started_at = Utc::now();
        self.tracker.set_total(estimate);

        self.reporter
            .report(0.0, Some("Processing audio for saving..."));

        info!("Entering disk mode ({} estimated chunks)", estimate.max(1));

        if let Err(e) = self.send_generate(text, voice).await {
            if let Some(writer) = self.writer.take() {
                writer.abort().await;
            }
            self.reset_to_idle();
            return Err(e);
        }

        Ok(())
    }

    /// Append one chunk to the output file and return the bounded progress.
    ///
    /// An I/O failure here is fatal to the session; the dispatcher routes it
    /// through `on_error`.
    pub async fn save_chunk(&mut self, audio: &[u8]) -> Result<f64> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| PipelineError::state("audio chunk with no open output file"))?;

        writer.append_chunk(audio).await?;
        self.delivering = true;

        let percent = self.tracker.record_chunk();
        self.reporter
            .report(percent, Some("Processing audio for saving..."));

        Ok(percent)
    }

    /// Forward one chunk to the playback capability.
    pub async fn stream_chunk(&mut self, audio: Vec<u8>) -> Result<()> {
        if self.mode != Mode::Stream {
            return Err(PipelineError::state("stream chunk outside stream mode"));
        }

        self.delivering = true;
        let percent = self.tracker.record_chunk();

        self.sink.queue_audio(audio).await?;
        self.reporter.report(percent, Some("Streaming audio..."));

        Ok(())
    }

    /// End-of-stream from the producer.
    ///
    /// Idempotent: the writer is taken out of its slot exactly once, so a
    /// duplicate completion cannot double-close the sink.
    pub async fn complete(&mut self) -> Result<()> {
        match self.mode {
            Mode::Disk => {
                self.reporter.report(99.0, Some("Combining audio chunks..."));
                self.reporter.report(99.5, Some("Writing file to disk..."));

                let result = match self.writer.take() {
                    Some(writer) => writer.finalize().await.map(|_| ()),
                    None => {
                        debug!("Completion with sink already closed");
                        Ok(())
                    }
                };

                self.reset_to_idle();

                match result {
                    Ok(()) => {
                        self.reporter.report(100.0, Some("File saved successfully!"));
                        Ok(())
                    }
                    Err(e) => {
                        error!("Error finalizing saved audio: {}", e);
                        self.reporter.report(100.0, Some("Error saving file!"));
                        Err(e)
                    }
                }
            }
            Mode::Stream => {
                self.reset_to_idle();
                self.reporter.report(100.0, Some("Streaming complete"));
                Ok(())
            }
            Mode::Idle => {
                debug!("Duplicate completion ignored");
                Ok(())
            }
        }
    }

    /// Stop the active operation.
    ///
    /// Disk mode tells the producer to stop, waits out the configured grace
    /// period, then patches and closes the output file whether or not the
    /// producer ever acknowledges. The file is always left structurally
    /// valid for the chunks that landed.
    pub async fn stop(&mut self) -> Result<()> {
        match self.mode {
            Mode::Stream => {
                if let Err(e) = self.sink.stop().await {
                    warn!("Failed to stop playback: {}", e);
                }
                self.reset_to_idle();
                self.reporter.report(100.0, Some("Streaming stopped"));
                Ok(())
            }
            Mode::Disk => {
                if let Err(e) = self.send_command(WorkerCommand::Stop).await {
                    warn!("Producer unreachable during stop: {}", e);
                }

                // Let the producer's stop handling settle; finalize proceeds
                // regardless of whether it ever does.
                tokio::time::sleep(self.settings.stop_grace).await;

                if let Some(writer) = self.writer.take() {
                    writer.abort().await;
                }

                self.reset_to_idle();
                self.reporter.report(100.0, Some("Disk save stopped"));
                Ok(())
            }
            Mode::Idle => {
                debug!("Stop with no active session");
                Ok(())
            }
        }
    }

    /// Producer failure. Mirrors `stop` but never propagates cleanup errors:
    /// whatever happens, the session ends in `Idle` with controls usable.
    pub async fn on_error(&mut self, message: &str) {
        error!("Worker error: {}", message);

        match self.mode {
            Mode::Disk => {
                if let Some(writer) = self.writer.take() {
                    writer.abort().await;
                }
            }
            Mode::Stream => {
                if let Err(e) = self.sink.stop().await {
                    warn!("Failed to stop playback during error cleanup: {}", e);
                }
            }
            Mode::Idle => {}
        }

        self.reset_to_idle();
        self.reporter
            .report(100.0, Some("An error occurred! Please try again."));
    }

    pub fn on_loading_start(&self) {
        self.reporter.report(0.0, Some("Loading model..."));
    }

    pub fn on_loading_progress(&self, progress: f64) {
        let percent = loading_percent(progress);
        let message = format!("Loading model: {}%", percent.round());
        self.reporter.report(percent, Some(&message));
    }

    /// Model finished loading; publish the voice catalog.
    pub fn on_model_ready(&mut self, voices: Vec<Voice>) {
        self.model_ready = true;

        if !voices.is_empty() {
            let catalog = VoiceCatalog::build(&voices);
            info!("Voice catalog ready: {} voices", catalog.len());
            self.voices = Some(catalog);
        }

        self.reporter.report(100.0, Some("Model loaded successfully"));
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_streaming(&self) -> bool {
        self.is_streaming
    }

    pub fn model_ready(&self) -> bool {
        self.model_ready
    }

    pub fn voices(&self) -> Option<&VoiceCatalog> {
        self.voices.as_ref()
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    /// Serializable snapshot of the published state.
    pub fn snapshot(&self) -> PipelineSnapshot {
        PipelineSnapshot {
            session_id: self.settings.session_id.clone(),
            mode: self.mode,
            is_streaming: self.is_streaming,
            model_ready: self.model_ready,
            delivering: self.delivering,
            total_chunks: self.tracker.total_chunks(),
            processed_chunks: self.tracker.processed_chunks(),
            percent: self.tracker.percent(),
            started_at: self.started_at,
        }
    }

    fn ensure_idle(&self, operation: &str) -> Result<()> {
        if self.mode == Mode::Idle {
            Ok(())
        } else {
            Err(PipelineError::state(format!(
                "cannot {} while {:?} mode is active",
                operation, self.mode
            )))
        }
    }

    async fn send_generate(&self, text: &str, voice: &str) -> Result<()> {
        self.send_command(WorkerCommand::Generate {
            text: text.to_string(),
            voice: voice.to_string(),
        })
        .await
    }

    async fn send_command(&self, command: WorkerCommand) -> Result<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| PipelineError::protocol("worker command channel closed"))
    }

    fn reset_to_idle(&mut self) {
        self.mode = Mode::Idle;
        self.is_streaming = false;
        self.delivering = false;
        self.tracker.reset();
    }
}
