pub mod playback;
pub mod wav;

pub use playback::{DiscardSink, PlaybackSink};
pub use wav::{probe, WavProbe, WavStreamWriter, DEFAULT_SAMPLE_RATE, WAV_HEADER_LEN};
