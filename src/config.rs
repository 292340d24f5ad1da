//! Run configuration for both clients.
//!
//! Every value has a compiled-in default. Environment variables (optionally
//! loaded from `.env` by the binaries) override individual values.

use crate::transcribe::ResponseFormat;
use std::env;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_WHISPER_URL: &str = "http://localhost:8080/inference";
pub const DEFAULT_XTTS_BASE_URL: &str = "http://localhost:8020";
pub const DEFAULT_AUDIO_FILE: &str = "output.wav";
pub const DEFAULT_TEXT: &str = "Hello, this is a test of the XTTS system.";
pub const DEFAULT_LANGUAGE: &str = "en";

/// Transcription can take minutes on CPU-only servers
pub const DEFAULT_TRANSCRIBE_TIMEOUT: Duration = Duration::from_secs(300);
pub const DEFAULT_SYNTHESIZE_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?} ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Settings for one transcription run
#[derive(Debug, Clone, PartialEq)]
pub struct TranscribeConfig {
    pub url: String,
    pub audio_file: PathBuf,
    pub temperature: f32,
    pub response_format: ResponseFormat,
    pub timeout: Duration,
}

impl Default for TranscribeConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_WHISPER_URL.to_string(),
            audio_file: PathBuf::from(DEFAULT_AUDIO_FILE),
            temperature: 0.0,
            response_format: ResponseFormat::Json,
            timeout: DEFAULT_TRANSCRIBE_TIMEOUT,
        }
    }
}

impl TranscribeConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (the process environment in production)
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let temperature = parse_var(&lookup, "WHISPER_TEMPERATURE", defaults.temperature)?;
        if !temperature.is_finite() || temperature < 0.0 {
            return Err(ConfigError::Invalid {
                key: "WHISPER_TEMPERATURE",
                value: temperature.to_string(),
                reason: "must be a finite number >= 0".to_string(),
            });
        }

        Ok(Self {
            url: string_var(&lookup, "WHISPER_URL").unwrap_or(defaults.url),
            audio_file: string_var(&lookup, "WHISPER_AUDIO_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.audio_file),
            temperature,
            response_format: parse_var(
                &lookup,
                "WHISPER_RESPONSE_FORMAT",
                defaults.response_format,
            )?,
            timeout: timeout_var(&lookup, "WHISPER_TIMEOUT_SECS", defaults.timeout)?,
        })
    }
}

/// Settings for one synthesis run
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesizeConfig {
    pub base_url: String,
    pub text: String,
    pub output_file: PathBuf,
    /// Explicit voice id; `None` picks the first voice in the catalog
    pub speaker_id: Option<String>,
    pub language: String,
    pub timeout: Duration,
}

impl Default for SynthesizeConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_XTTS_BASE_URL.to_string(),
            text: DEFAULT_TEXT.to_string(),
            output_file: PathBuf::from(DEFAULT_AUDIO_FILE),
            speaker_id: None,
            language: DEFAULT_LANGUAGE.to_string(),
            timeout: DEFAULT_SYNTHESIZE_TIMEOUT,
        }
    }
}

impl SynthesizeConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        Ok(Self {
            base_url: string_var(&lookup, "XTTS_BASE_URL").unwrap_or(defaults.base_url),
            text: string_var(&lookup, "XTTS_TEXT").unwrap_or(defaults.text),
            output_file: string_var(&lookup, "XTTS_OUTPUT_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_file),
            speaker_id: string_var(&lookup, "XTTS_SPEAKER_ID"),
            language: string_var(&lookup, "XTTS_LANGUAGE").unwrap_or(defaults.language),
            timeout: timeout_var(&lookup, "XTTS_TIMEOUT_SECS", defaults.timeout)?,
        })
    }
}

/// Non-empty trimmed value; blank counts as unset
fn string_var(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_var<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    match string_var(lookup, key) {
        Some(raw) => raw.parse::<T>().map_err(|e| ConfigError::Invalid {
            key,
            value: raw.clone(),
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}

fn timeout_var(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: Duration,
) -> Result<Duration, ConfigError> {
    let secs: u64 = parse_var(lookup, key, default.as_secs())?;
    if secs == 0 {
        return Err(ConfigError::Invalid {
            key,
            value: "0".to_string(),
            reason: "timeout must be at least one second".to_string(),
        });
    }
    Ok(Duration::from_secs(secs))
}
