use crate::config::TranscribeConfig;
use std::path::PathBuf;

/// Output formats the whisper.cpp server can be asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    Text,
    Json,
    Srt,
    VerboseJson,
    Vtt,
}

impl ResponseFormat {
    /// Form value sent as `response_format`
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseFormat::Text => "text",
            ResponseFormat::Json => "json",
            ResponseFormat::Srt => "srt",
            ResponseFormat::VerboseJson => "verbose_json",
            ResponseFormat::Vtt => "vtt",
        }
    }
}

impl std::fmt::Display for ResponseFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ResponseFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(ResponseFormat::Text),
            "json" => Ok(ResponseFormat::Json),
            "srt" => Ok(ResponseFormat::Srt),
            "verbose_json" | "verbose-json" => Ok(ResponseFormat::VerboseJson),
            "vtt" => Ok(ResponseFormat::Vtt),
            _ => Err(format!(
                "Unknown response format: {}. Use text, json, srt, verbose_json, or vtt",
                s
            )),
        }
    }
}

/// A single upload to the transcription endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptionRequest {
    pub audio_path: PathBuf,
    /// Decoding temperature (0 = greedy)
    pub temperature: f32,
    pub response_format: ResponseFormat,
}

impl TranscriptionRequest {
    pub fn new(audio_path: impl Into<PathBuf>) -> Self {
        Self {
            audio_path: audio_path.into(),
            temperature: 0.0,
            response_format: ResponseFormat::Json,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_format(mut self, format: ResponseFormat) -> Self {
        self.response_format = format;
        self
    }

    /// File name sent with the `file` part
    pub fn file_name(&self) -> String {
        self.audio_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("audio.wav")
            .to_string()
    }
}

impl From<&TranscribeConfig> for TranscriptionRequest {
    fn from(config: &TranscribeConfig) -> Self {
        Self::new(&config.audio_file)
            .with_temperature(config.temperature)
            .with_format(config.response_format)
    }
}
