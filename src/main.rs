use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::sleep;
use tracing::info;
use voxpipe::audio::{probe, DiscardSink};
use voxpipe::progress::LogReporter;
use voxpipe::worker::{spawn_synth_worker, SynthConfig};
use voxpipe::{Config, Coordinator, Dispatcher, Mode, PlaybackSink};

#[derive(Parser)]
#[command(name = "voxpipe")]
#[command(about = "Stream synthesized speech to playback or to a WAV file")]
struct Args {
    /// Text to synthesize
    #[arg(
        short,
        long,
        default_value = "The quick brown fox jumps over the lazy dog. \
                         Pack my box with five dozen liquor jugs."
    )]
    text: String,

    /// Voice to synthesize with (defaults to the configured voice)
    #[arg(short, long)]
    voice: Option<String>,

    /// Where to route the generated audio
    #[arg(short, long, value_enum, default_value = "disk")]
    mode: RunMode,

    /// Output file for disk mode
    #[arg(short, long)]
    output: Option<String>,

    /// Configuration file (falls back to built-in defaults)
    #[arg(short, long)]
    config: Option<String>,

    /// Print the final session snapshot as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum RunMode {
    Stream,
    Disk,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    let cfg = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    info!("{} v0.1.0", cfg.service.name);

    let settings = cfg.session_settings();
    let voice = args.voice.unwrap_or_else(|| settings.default_voice.clone());
    let output = args.output.unwrap_or_else(|| cfg.audio.output_path.clone());

    // Wire up the pipeline: synthetic producer, discard playback sink,
    // log-backed progress reporting.
    let (commands, events) = spawn_synth_worker(SynthConfig {
        sample_rate: cfg.audio.sample_rate,
        ..SynthConfig::default()
    });

    let sink: Arc<dyn PlaybackSink> = Arc::new(DiscardSink::new(commands.clone()));
    let coordinator = Arc::new(Mutex::new(Coordinator::new(
        settings,
        commands.clone(),
        Arc::clone(&sink),
        Arc::new(LogReporter),
    )));

    let dispatcher = Dispatcher::new(Arc::clone(&coordinator), commands.clone(), events);
    let dispatcher_handle = tokio::spawn(dispatcher.run());

    // Wait for the model-loading phase to finish before starting.
    while !coordinator.lock().await.model_ready() {
        sleep(Duration::from_millis(10)).await;
    }

    {
        let guard = coordinator.lock().await;
        if let Some(catalog) = guard.voices() {
            info!("{} voices available", catalog.len());
        }
    }

    match args.mode {
        RunMode::Stream => {
            coordinator
                .lock()
                .await
                .enter_stream(&args.text, &voice)
                .await?;
        }
        RunMode::Disk => {
            coordinator
                .lock()
                .await
                .enter_disk(&output, &args.text, &voice)
                .await?;
        }
    }

    // Run until the producer signals completion and the coordinator returns
    // to idle.
    loop {
        let snapshot = coordinator.lock().await.snapshot();
        if snapshot.mode == Mode::Idle && snapshot.model_ready {
            break;
        }
        sleep(Duration::from_millis(20)).await;
    }

    if matches!(args.mode, RunMode::Disk) {
        let info = probe(&output)?;
        info!(
            "Saved {}: {:.2}s, {} Hz, {} samples",
            output, info.duration_seconds, info.sample_rate, info.sample_count
        );
    }

    if args.json {
        let snapshot = coordinator.lock().await.snapshot();
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    }

    // The session is idle again; release the playback capability and tear
    // down the background tasks.
    sink.close().await?;
    dispatcher_handle.abort();

    Ok(())
}
