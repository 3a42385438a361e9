use super::messages::{command_channel, event_channel, WorkerCommand, WorkerEvent};
use crate::voices::Voice;
use std::f32::consts::TAU;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Tuning for the synthetic producer.
#[derive(Debug, Clone)]
pub struct SynthConfig {
    /// Sample rate of the generated audio in Hz.
    pub sample_rate: u32,
    /// Characters of input text consumed per emitted chunk.
    pub chunk_chars: usize,
    /// Samples generated per character of text.
    pub samples_per_char: usize,
    /// Number of intermediate loading-progress events to emit.
    pub loading_steps: usize,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            sample_rate: 23000,
            chunk_chars: 100,
            samples_per_char: 64,
            loading_steps: 4,
        }
    }
}

/// Spawn a synthetic inference worker.
///
/// Stands in for the real model so the pipeline can be driven end to end:
/// it reports a loading phase, publishes a voice catalog, then answers
/// `Generate` with tone chunks sized off the input text. The worker obeys
/// the backpressure handshake — after each chunk it blocks until the
/// consumer's `BufferProcessed` ack arrives, and a `Stop` received while
/// waiting abandons the generation.
pub fn spawn(config: SynthConfig) -> (mpsc::Sender<WorkerCommand>, mpsc::Receiver<WorkerEvent>) {
    let (command_tx, command_rx) = command_channel();
    let (event_tx, event_rx) = event_channel();

    tokio::spawn(run(config, command_rx, event_tx));

    (command_tx, event_rx)
}

async fn run(
    config: SynthConfig,
    mut commands: mpsc::Receiver<WorkerCommand>,
    events: mpsc::Sender<WorkerEvent>,
) {
    info!("Synthetic worker started");

    if send_loading_sequence(&config, &events).await.is_err() {
        return;
    }

    while let Some(command) = commands.recv().await {
        match command {
            WorkerCommand::Generate { text, voice } => {
                info!(
                    "Generating {} chars with voice '{}'",
                    text.len(),
                    voice
                );
                if generate(&config, &text, &mut commands, &events).await.is_err() {
                    break;
                }
            }
            WorkerCommand::Stop => {
                debug!("Stop received with no generation in flight");
            }
            WorkerCommand::BufferProcessed => {
                debug!("Stale buffer ack ignored");
            }
        }
    }

    info!("Synthetic worker stopped");
}

/// Emit the model-loading phase: start, a few progress steps, then ready.
async fn send_loading_sequence(
    config: &SynthConfig,
    events: &mpsc::Sender<WorkerEvent>,
) -> Result<(), mpsc::error::SendError<WorkerEvent>> {
    events.send(WorkerEvent::LoadingModelStart).await?;

    for step in 1..=config.loading_steps {
        let progress = step as f64 / config.loading_steps as f64;
        events
            .send(WorkerEvent::LoadingModelProgress { progress })
            .await?;
    }

    events
        .send(WorkerEvent::LoadingModelReady {
            voices: builtin_voices(),
        })
        .await?;

    Ok(())
}

/// Emit one chunk per slice of text, honoring the ack handshake.
async fn generate(
    config: &SynthConfig,
    text: &str,
    commands: &mut mpsc::Receiver<WorkerCommand>,
    events: &mpsc::Sender<WorkerEvent>,
) -> Result<(), ()> {
    let chars: Vec<char> = text.chars().collect();
    let chunk_chars = config.chunk_chars.max(1);
    let mut sample_index = 0u64;

    for (chunk_number, piece) in chars.chunks(chunk_chars).enumerate() {
        let audio = synthesize_chunk(config, piece.len(), &mut sample_index);

        if events
            .send(WorkerEvent::StreamAudioData { audio })
            .await
            .is_err()
        {
            return Err(());
        }

        // The handshake: no further chunk until the consumer acks this one.
        loop {
            match commands.recv().await {
                Some(WorkerCommand::BufferProcessed) => break,
                Some(WorkerCommand::Stop) => {
                    info!("Generation stopped after {} chunks", chunk_number + 1);
                    return Ok(());
                }
                Some(WorkerCommand::Generate { .. }) => {
                    warn!("Generate received mid-generation, ignoring");
                }
                None => return Err(()),
            }
        }
    }

    events.send(WorkerEvent::Complete).await.map_err(|_| ())
}

/// A 220 Hz tone as 32-bit float samples, phase-continuous across chunks.
fn synthesize_chunk(config: &SynthConfig, chars: usize, sample_index: &mut u64) -> Vec<u8> {
    let sample_count = chars * config.samples_per_char;
    let mut bytes = Vec::with_capacity(sample_count * 4);

    for _ in 0..sample_count {
        let t = *sample_index as f32 / config.sample_rate as f32;
        let sample = 0.2 * (TAU * 220.0 * t).sin();
        bytes.extend_from_slice(&sample.to_le_bytes());
        *sample_index += 1;
    }

    bytes
}

fn builtin_voices() -> Vec<Voice> {
    let voice = |id: &str, name: &str, language: &str, gender: &str| Voice {
        id: id.to_string(),
        name: name.to_string(),
        language: language.to_string(),
        gender: gender.to_string(),
    };

    vec![
        voice("af_heart", "Heart", "en-us", "Female"),
        voice("af_bella", "Bella", "en-us", "Female"),
        voice("af_nicole", "Nicole", "en-us", "Female"),
        voice("am_adam", "Adam", "en-us", "Male"),
        voice("am_michael", "Michael", "en-us", "Male"),
        voice("bf_emma", "Emma", "en-gb", "Female"),
        voice("bm_george", "George", "en-gb", "Male"),
    ]
}
