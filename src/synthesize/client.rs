use super::{Voice, select_voice, stream_to_file};
use crate::audio::{WavInfo, probe_wav};
use crate::config::SynthesizeConfig;
use crate::http::{self, HttpError};
use reqwest::blocking::{Client, Response};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum SynthesizeError {
    #[error(transparent)]
    Http(#[from] HttpError),
    #[error("Could not decode the list of voices from the server response: {0}")]
    Catalog(#[source] serde_json::Error),
    #[error("No voices available on the server")]
    NoVoices,
    #[error("Could not find 'voice_id' in the first voice entry: {0}")]
    MissingVoiceId(String),
    #[error("Unexpected content type {content_type:?} received. Server response: {body}")]
    UnexpectedContentType { content_type: String, body: String },
    #[error("Failed to write audio to {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Body of a `/tts_to_audio/` request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SynthesisRequest {
    pub text: String,
    /// The XTTS server expects the voice id under this name
    #[serde(rename = "speaker_wav")]
    pub voice_id: String,
    pub language: String,
}

/// Result of a completed run
#[derive(Debug, Clone)]
pub struct SynthesisOutcome {
    pub voice_id: String,
    pub output_path: PathBuf,
    pub bytes_written: u64,
    /// `None` when the saved file could not be read back as WAV
    pub wav: Option<WavInfo>,
}

/// Client for an XTTS API server
pub struct XttsClient {
    client: Client,
    base_url: String,
}

impl XttsClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, SynthesizeError> {
        let base_url: String = base_url.into();
        Ok(Self {
            client: http::build_client(timeout)?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Fetch the voice catalog from `/speakers`
    pub fn fetch_voices(&self) -> Result<Vec<Voice>, SynthesizeError> {
        let response = self
            .client
            .get(self.endpoint("speakers"))
            .send()
            .map_err(|e| {
                let e = HttpError::from(e);
                if e.is_connect() {
                    warn!("Is the XTTS server running at {}?", self.base_url);
                }
                e
            })?;
        let response = http::ensure_success(response)?;
        let body = response.text().map_err(HttpError::from)?;

        serde_json::from_str(&body).map_err(SynthesizeError::Catalog)
    }

    /// Request synthesis and return the response once it is known to carry WAV audio.
    ///
    /// Non-audio replies are drained into `UnexpectedContentType` so the
    /// caller never sees them as a writable stream.
    pub fn synthesize(&self, request: &SynthesisRequest) -> Result<Response, SynthesizeError> {
        let response = self
            .client
            .post(self.endpoint("tts_to_audio/"))
            .json(request)
            .send()
            .map_err(HttpError::from)?;
        let response = http::ensure_success(response)?;

        let content_type = http::content_type(&response);
        if !http::is_wav_audio(&content_type) {
            let body = response.text().unwrap_or_default();
            warn!("Unexpected content type received: {:?}", content_type);
            return Err(SynthesizeError::UnexpectedContentType { content_type, body });
        }

        Ok(response)
    }

    /// Stream a validated audio response to disk
    pub fn save(&self, response: Response, path: &Path) -> Result<u64, SynthesizeError> {
        let expected_len = response.content_length();
        stream_to_file(response, expected_len, path).map_err(|source| SynthesizeError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Run the whole catalog -> voice -> synthesis -> file sequence
    pub fn run(&self, config: &SynthesizeConfig) -> Result<SynthesisOutcome, SynthesizeError> {
        info!("Fetching available voices from {}", self.base_url);
        let voices = self.fetch_voices()?;
        if voices.is_empty() {
            return Err(SynthesizeError::NoVoices);
        }
        info!("Found {} voices", voices.len());

        let voice_id = select_voice(&voices, config.speaker_id.as_deref())?;
        info!("Selected voice '{}'", voice_id);

        let request = SynthesisRequest {
            text: config.text.clone(),
            voice_id: voice_id.clone(),
            language: config.language.clone(),
        };

        info!(
            "Sending TTS request ({} chars, language {})",
            request.text.len(),
            request.language
        );
        let response = self.synthesize(&request)?;

        info!("Receiving audio data and saving to {:?}", config.output_file);
        let bytes_written = self.save(response, &config.output_file)?;

        let output_path = std::fs::canonicalize(&config.output_file)
            .unwrap_or_else(|_| config.output_file.clone());

        let wav = match probe_wav(&output_path) {
            Ok(wav) => {
                info!("Saved {} bytes of audio ({})", bytes_written, wav);
                Some(wav)
            }
            Err(e) => {
                warn!(
                    "Saved {} bytes but could not read them back as WAV: {}",
                    bytes_written, e
                );
                None
            }
        };

        Ok(SynthesisOutcome {
            voice_id,
            output_path,
            bytes_written,
            wav,
        })
    }
}
