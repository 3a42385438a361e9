use crate::error::{PipelineError, Result};
use std::io::SeekFrom;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncSeekExt, AsyncWriteExt};
use tracing::{info, warn};

/// Size of the canonical WAV header written at creation time.
pub const WAV_HEADER_LEN: u32 = 44;

/// Default output sample rate in Hz.
pub const DEFAULT_SAMPLE_RATE: u32 = 23000;

const RIFF_SIZE_OFFSET: u64 = 4;
const DATA_SIZE_OFFSET: u64 = 40;

/// Incrementally writes a mono 32-bit-float WAV file.
///
/// The header is written up front with zeroed size fields so the file is
/// structurally valid from the first byte; `finalize` patches the RIFF and
/// data sizes once the stream is over and closes the sink.
///
/// Chunks are opaque sample bytes of arbitrary length. Exactly one append is
/// in flight at a time: the producer is blocked on the backpressure ack
/// until the previous chunk has landed, so no locking is needed here.
pub struct WavStreamWriter {
    file: Option<File>,
    path: PathBuf,
    sample_rate: u32,
    data_size: u32,
    header_written: bool,
}

impl WavStreamWriter {
    /// Create the output file and write the placeholder header.
    pub async fn create(path: impl AsRef<Path>, sample_rate: u32) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut file = File::create(&path).await?;

        file.write_all(&placeholder_header(sample_rate)).await?;
        file.flush().await?;

        info!("Created WAV stream: {} ({} Hz)", path.display(), sample_rate);

        Ok(Self {
            file: Some(file),
            path,
            sample_rate,
            data_size: 0,
            header_written: true,
        })
    }

    /// Append raw sample bytes to the data section.
    pub async fn append_chunk(&mut self, bytes: &[u8]) -> Result<()> {
        let file = self
            .file
            .as_mut()
            .ok_or_else(|| PipelineError::state("append with no open sink"))?;

        file.write_all(bytes).await?;
        self.data_size += bytes.len() as u32;

        Ok(())
    }

    /// Patch the header with final sizes, flush and close the sink.
    ///
    /// Safe to call with zero chunks appended: the result is a 44-byte file
    /// with an empty data section.
    pub async fn finalize(mut self) -> Result<PathBuf> {
        let mut file = self
            .file
            .take()
            .ok_or_else(|| PipelineError::state("finalize with no open sink"))?;

        patch_sizes(&mut file, self.data_size).await?;
        file.flush().await?;

        info!(
            "Finalized WAV stream: {} ({} data bytes)",
            self.path.display(),
            self.data_size
        );

        Ok(self.path.clone())
    }

    /// Best-effort finalize for stop and error paths.
    ///
    /// Patches and closes if possible; secondary failures are logged and
    /// swallowed so cleanup always makes forward progress.
    pub async fn abort(mut self) {
        let Some(mut file) = self.file.take() else {
            return;
        };

        if let Err(e) = patch_sizes(&mut file, self.data_size).await {
            warn!(
                "Failed to patch WAV header for {}: {}",
                self.path.display(),
                e
            );
        }
        if let Err(e) = file.flush().await {
            warn!("Failed to flush {}: {}", self.path.display(), e);
        }

        info!(
            "Closed WAV stream after stop/error: {} ({} data bytes)",
            self.path.display(),
            self.data_size
        );
    }

    /// Bytes appended to the data section so far.
    pub fn data_size(&self) -> u32 {
        self.data_size
    }

    pub fn header_written(&self) -> bool {
        self.header_written
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for WavStreamWriter {
    fn drop(&mut self) {
        if self.file.is_some() {
            warn!(
                "WAV stream dropped without finalize: {} keeps placeholder sizes",
                self.path.display()
            );
        }
    }
}

/// The fixed 44-byte header: RIFF/WAVE, fmt subchunk for mono IEEE-float
/// samples, data subchunk. Both size fields start at zero and are patched at
/// finalize. All multi-byte fields are little-endian.
fn placeholder_header(sample_rate: u32) -> [u8; 44] {
    let byte_rate = sample_rate * 4; // SampleRate * NumChannels * BitsPerSample/8

    let mut header = [0u8; 44];
    header[0..4].copy_from_slice(b"RIFF");
    // bytes 4..8: ChunkSize placeholder
    header[8..12].copy_from_slice(b"WAVE");
    header[12..16].copy_from_slice(b"fmt ");
    header[16..20].copy_from_slice(&16u32.to_le_bytes()); // Subchunk1Size
    header[20..22].copy_from_slice(&3u16.to_le_bytes()); // AudioFormat: IEEE float
    header[22..24].copy_from_slice(&1u16.to_le_bytes()); // NumChannels: mono
    header[24..28].copy_from_slice(&sample_rate.to_le_bytes());
    header[28..32].copy_from_slice(&byte_rate.to_le_bytes());
    header[32..34].copy_from_slice(&4u16.to_le_bytes()); // BlockAlign
    header[34..36].copy_from_slice(&32u16.to_le_bytes()); // BitsPerSample
    header[36..40].copy_from_slice(b"data");
    // bytes 40..44: Subchunk2Size placeholder

    header
}

/// Seek back into the header and write the final RIFF and data sizes.
async fn patch_sizes(file: &mut File, data_size: u32) -> Result<()> {
    let riff_size = data_size + WAV_HEADER_LEN - 8;

    file.seek(SeekFrom::Start(RIFF_SIZE_OFFSET)).await?;
    file.write_all(&riff_size.to_le_bytes()).await?;

    file.seek(SeekFrom::Start(DATA_SIZE_OFFSET)).await?;
    file.write_all(&data_size.to_le_bytes()).await?;

    Ok(())
}

/// Summary of a finished WAV file, read back with an independent parser.
#[derive(Debug, Clone)]
pub struct WavProbe {
    pub sample_rate: u32,
    pub channels: u16,
    pub sample_count: u32,
    pub duration_seconds: f64,
}

/// Open a finished file and report its format and duration.
///
/// Used after a save completes to confirm the patched header parses.
pub fn probe(path: impl AsRef<Path>) -> Result<WavProbe> {
    let reader = hound::WavReader::open(path.as_ref()).map_err(hound_error)?;

    let spec = reader.spec();
    let sample_count = reader.len();
    let duration_seconds =
        sample_count as f64 / (spec.sample_rate as f64 * spec.channels as f64);

    Ok(WavProbe {
        sample_rate: spec.sample_rate,
        channels: spec.channels,
        sample_count,
        duration_seconds,
    })
}

fn hound_error(e: hound::Error) -> PipelineError {
    match e {
        hound::Error::IoError(io) => PipelineError::Io(io),
        other => PipelineError::protocol(format!("invalid WAV file: {}", other)),
    }
}
