use std::fmt;
use std::path::Path;

/// Sample rate whisper.cpp expects its input at
pub const WHISPER_SAMPLE_RATE: u32 = 16000;

/// Header summary of a WAV file
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WavInfo {
    pub sample_rate: u32,
    pub channels: u16,
    pub bits_per_sample: u16,
    pub duration_secs: f32,
}

impl fmt::Display for WavInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.2}s, {} Hz, {} ch, {}-bit",
            self.duration_secs, self.sample_rate, self.channels, self.bits_per_sample
        )
    }
}

/// Read the RIFF/WAVE header of a file
pub fn probe_wav(path: &Path) -> Result<WavInfo, hound::Error> {
    let reader = hound::WavReader::open(path)?;
    let spec = reader.spec();
    // duration() counts frames (samples per channel)
    let frames = reader.duration();

    let duration_secs = if spec.sample_rate > 0 {
        frames as f32 / spec.sample_rate as f32
    } else {
        0.0
    };

    Ok(WavInfo {
        sample_rate: spec.sample_rate,
        channels: spec.channels,
        bits_per_sample: spec.bits_per_sample,
        duration_secs,
    })
}
