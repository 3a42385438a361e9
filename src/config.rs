use crate::pipeline::SessionSettings;
use anyhow::Result;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub audio: AudioConfig,
    pub synthesis: SynthesisConfig,
}

#[derive(Debug, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct AudioConfig {
    /// Sample rate of generated audio and saved WAV files
    pub sample_rate: u32,
    /// Default path for saved audio streams
    pub output_path: String,
}

#[derive(Debug, Deserialize)]
pub struct SynthesisConfig {
    /// Characters of text per estimated chunk in stream mode
    pub stream_chunk_chars: usize,
    /// Characters of text per estimated chunk in disk mode
    pub disk_chunk_chars: usize,
    /// Grace period in milliseconds before finalizing a stopped save
    pub stop_grace_ms: u64,
    /// Voice used when none is selected
    pub default_voice: String,
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Session settings derived from this configuration.
    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            sample_rate: self.audio.sample_rate,
            stream_chunk_chars: self.synthesis.stream_chunk_chars,
            disk_chunk_chars: self.synthesis.disk_chunk_chars,
            stop_grace: Duration::from_millis(self.synthesis.stop_grace_ms),
            default_voice: self.synthesis.default_voice.clone(),
            ..SessionSettings::default()
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service: ServiceConfig {
                name: "voxpipe".to_string(),
            },
            audio: AudioConfig {
                sample_rate: 23000,
                output_path: "audio_stream.wav".to_string(),
            },
            synthesis: SynthesisConfig {
                stream_chunk_chars: 300,
                disk_chunk_chars: 100,
                stop_grace_ms: 100,
                default_voice: "af_heart".to_string(),
            },
        }
    }
}
