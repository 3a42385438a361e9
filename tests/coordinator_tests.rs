// Integration tests for the mode coordinator
//
// These tests drive the coordinator directly (no dispatcher, no worker) and
// verify the state machine contract: mode exclusivity, idempotent
// completion, stop/error cleanup, and the controls projection.

use anyhow::Result;
use async_trait::async_trait;
use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::mpsc;
use voxpipe::pipeline::{ControlState, ControlsView, Coordinator, Mode, SessionSettings};
use voxpipe::progress::ProgressReporter;
use voxpipe::worker::{command_channel, WorkerCommand};
use voxpipe::{PipelineError, PlaybackSink};

/// Reporter stub that records every status update.
struct RecordingReporter {
    reports: Mutex<Vec<(f64, Option<String>)>>,
}

impl RecordingReporter {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            reports: Mutex::new(Vec::new()),
        })
    }

    fn last(&self) -> Option<(f64, Option<String>)> {
        self.reports.lock().unwrap().last().cloned()
    }

    fn count(&self) -> usize {
        self.reports.lock().unwrap().len()
    }
}

impl ProgressReporter for RecordingReporter {
    fn report(&self, percent: f64, message: Option<&str>) {
        self.reports
            .lock()
            .unwrap()
            .push((percent, message.map(String::from)));
    }
}

/// Playback stub that counts calls.
struct CountingSink {
    queued: AtomicUsize,
    stopped: AtomicUsize,
}

impl CountingSink {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            queued: AtomicUsize::new(0),
            stopped: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl PlaybackSink for CountingSink {
    fn set_total_chunks(&self, _total_chunks: usize) {}

    async fn queue_audio(&self, _audio: Vec<u8>) -> voxpipe::Result<()> {
        self.queued.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn stop(&self) -> voxpipe::Result<()> {
        self.stopped.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn close(&self) -> voxpipe::Result<()> {
        Ok(())
    }
}

fn test_settings() -> SessionSettings {
    SessionSettings {
        stop_grace: Duration::ZERO, // no need to wait in tests
        ..SessionSettings::default()
    }
}

struct Fixture {
    coordinator: Coordinator,
    commands: mpsc::Receiver<WorkerCommand>,
    reporter: Arc<RecordingReporter>,
    sink: Arc<CountingSink>,
}

fn fixture() -> Fixture {
    let (command_tx, command_rx) = command_channel();
    let reporter = RecordingReporter::new();
    let sink = CountingSink::new();

    let coordinator = Coordinator::new(
        test_settings(),
        command_tx,
        Arc::clone(&sink) as Arc<dyn PlaybackSink>,
        Arc::clone(&reporter) as Arc<dyn ProgressReporter>,
    );

    Fixture {
        coordinator,
        commands: command_rx,
        reporter,
        sink,
    }
}

fn read_u32_le(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

#[tokio::test]
async fn test_enter_stream_issues_generate() -> Result<()> {
    let mut f = fixture();

    f.coordinator.enter_stream("hello world", "af_heart").await?;

    assert_eq!(f.coordinator.mode(), Mode::Stream);
    assert!(f.coordinator.is_streaming());

    let command = f.commands.recv().await.unwrap();
    assert_eq!(
        command,
        WorkerCommand::Generate {
            text: "hello world".to_string(),
            voice: "af_heart".to_string(),
        }
    );

    Ok(())
}

#[tokio::test]
async fn test_mode_entry_rejected_while_other_mode_active() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let mut f = fixture();

    f.coordinator.enter_stream("some text", "af_heart").await?;

    // Disk entry while streaming is a state error, not a silent mode swap
    let result = f
        .coordinator
        .enter_disk(temp_dir.path().join("out.wav"), "text", "af_heart")
        .await;
    assert!(matches!(result, Err(PipelineError::State { .. })));
    assert_eq!(f.coordinator.mode(), Mode::Stream);

    // And the other way around
    f.coordinator.stop().await?;
    f.coordinator
        .enter_disk(temp_dir.path().join("out.wav"), "text", "af_heart")
        .await?;

    let result = f.coordinator.enter_stream("more text", "af_heart").await;
    assert!(matches!(result, Err(PipelineError::State { .. })));
    assert_eq!(f.coordinator.mode(), Mode::Disk);

    Ok(())
}

#[tokio::test]
async fn test_disk_completion_is_idempotent() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("complete.wav");
    let mut f = fixture();

    // 300 chars / 100 chars-per-chunk = 3 estimated chunks
    let text = "x".repeat(300);
    f.coordinator.enter_disk(&path, &text, "af_heart").await?;
    f.coordinator.save_chunk(&[0u8; 40]).await?;

    f.coordinator.complete().await?;
    assert_eq!(f.coordinator.mode(), Mode::Idle);

    let (percent, message) = f.reporter.last().unwrap();
    assert_eq!(percent, 100.0);
    assert_eq!(message.as_deref(), Some("File saved successfully!"));

    // A second completion is a no-op: no double close, no extra reports
    let reports_before = f.reporter.count();
    f.coordinator.complete().await?;
    assert_eq!(f.reporter.count(), reports_before);

    let bytes = fs::read(&path)?;
    assert_eq!(read_u32_le(&bytes, 4), 40 + 36);
    assert_eq!(read_u32_le(&bytes, 40), 40);

    Ok(())
}

#[tokio::test]
async fn test_stop_leaves_valid_file() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("stopped.wav");
    let mut f = fixture();

    // Estimate says 5 chunks; only 2 ever arrive before the user stops
    let text = "x".repeat(500);
    f.coordinator.enter_disk(&path, &text, "af_heart").await?;
    f.coordinator.save_chunk(&[1u8; 12]).await?;
    f.coordinator.save_chunk(&[2u8; 8]).await?;

    f.coordinator.stop().await?;
    assert_eq!(f.coordinator.mode(), Mode::Idle);

    // The producer was told to stop...
    let generate = f.commands.recv().await.unwrap();
    assert!(matches!(generate, WorkerCommand::Generate { .. }));
    let stop = f.commands.recv().await.unwrap();
    assert_eq!(stop, WorkerCommand::Stop);

    // ...and the partial file still has a patched, valid header
    let bytes = fs::read(&path)?;
    assert_eq!(bytes.len(), 44 + 20);
    assert_eq!(read_u32_le(&bytes, 4), 20 + 36);
    assert_eq!(read_u32_le(&bytes, 40), 20);

    Ok(())
}

#[tokio::test]
async fn test_stop_without_session_is_noop() -> Result<()> {
    let mut f = fixture();

    f.coordinator.stop().await?;

    assert_eq!(f.coordinator.mode(), Mode::Idle);
    assert_eq!(f.reporter.count(), 0, "No status update for a no-op stop");

    Ok(())
}

#[tokio::test]
async fn test_error_resets_to_idle_and_reenables() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("errored.wav");
    let mut f = fixture();

    f.coordinator
        .enter_disk(&path, &"x".repeat(200), "af_heart")
        .await?;
    f.coordinator.save_chunk(&[0u8; 24]).await?;

    f.coordinator.on_error("inference backend crashed").await;

    assert_eq!(f.coordinator.mode(), Mode::Idle);
    let (percent, message) = f.reporter.last().unwrap();
    assert_eq!(percent, 100.0);
    assert_eq!(
        message.as_deref(),
        Some("An error occurred! Please try again.")
    );

    // The broken session's file was closed with a valid header
    let bytes = fs::read(&path)?;
    assert_eq!(read_u32_le(&bytes, 40), 24);

    // The coordinator is usable again immediately
    f.coordinator.enter_stream("try again", "af_heart").await?;
    assert_eq!(f.coordinator.mode(), Mode::Stream);

    Ok(())
}

#[tokio::test]
async fn test_save_chunk_without_session_fails() {
    let mut f = fixture();

    let result = f.coordinator.save_chunk(&[0u8; 4]).await;
    assert!(matches!(result, Err(PipelineError::State { .. })));
}

#[tokio::test]
async fn test_stream_chunks_route_to_sink() -> Result<()> {
    let mut f = fixture();

    f.coordinator.enter_stream(&"x".repeat(600), "af_heart").await?;
    f.coordinator.stream_chunk(vec![0u8; 100]).await?;
    f.coordinator.stream_chunk(vec![0u8; 100]).await?;

    assert_eq!(f.sink.queued.load(Ordering::SeqCst), 2);

    f.coordinator.stop().await?;
    assert_eq!(f.sink.stopped.load(Ordering::SeqCst), 1);

    let (percent, message) = f.reporter.last().unwrap();
    assert_eq!(percent, 100.0);
    assert_eq!(message.as_deref(), Some("Streaming stopped"));

    Ok(())
}

#[tokio::test]
async fn test_controls_projection_follows_state() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let mut f = fixture();

    // Model still loading: nothing is clickable
    let view = ControlsView::project(&f.coordinator.snapshot());
    assert_eq!(view.stream, ControlState::Disabled);
    assert_eq!(view.save, ControlState::Disabled);

    f.coordinator.on_model_ready(Vec::new());
    let view = ControlsView::project(&f.coordinator.snapshot());
    assert_eq!(view.stream, ControlState::Ready);
    assert_eq!(view.save, ControlState::Ready);

    // Disk mode: save control loads, stream control is locked out
    let path = temp_dir.path().join("controls.wav");
    f.coordinator
        .enter_disk(&path, &"x".repeat(100), "af_heart")
        .await?;
    let view = ControlsView::project(&f.coordinator.snapshot());
    assert_eq!(view.stream, ControlState::Disabled);
    assert_eq!(view.save, ControlState::Loading);

    // First delivered chunk flips the control to its stop affordance
    f.coordinator.save_chunk(&[0u8; 10]).await?;
    let view = ControlsView::project(&f.coordinator.snapshot());
    assert_eq!(view.save, ControlState::Stop);

    f.coordinator.complete().await?;
    let view = ControlsView::project(&f.coordinator.snapshot());
    assert_eq!(view.stream, ControlState::Ready);
    assert_eq!(view.save, ControlState::Ready);

    Ok(())
}

#[tokio::test]
async fn test_snapshot_reports_session_state() -> Result<()> {
    let mut f = fixture();

    let snapshot = f.coordinator.snapshot();
    assert!(snapshot.session_id.starts_with("tts-"));
    assert_eq!(snapshot.mode, Mode::Idle);
    assert!(!snapshot.is_streaming);
    assert_eq!(snapshot.processed_chunks, 0);

    f.coordinator.enter_stream(&"x".repeat(900), "af_heart").await?;
    f.coordinator.stream_chunk(vec![0u8; 10]).await?;

    let snapshot = f.coordinator.snapshot();
    assert_eq!(snapshot.mode, Mode::Stream);
    assert!(snapshot.is_streaming);
    assert!(snapshot.delivering);
    assert_eq!(snapshot.total_chunks, 3);
    assert_eq!(snapshot.processed_chunks, 1);
    assert!((snapshot.percent - 100.0 / 3.0).abs() < 1e-9);

    Ok(())
}
