use super::{ResponseFormat, TranscriptionRequest};
use crate::audio::{WHISPER_SAMPLE_RATE, probe_wav};
use crate::http::{self, HttpError};
use reqwest::blocking::Client;
use reqwest::blocking::multipart::{Form, Part};
use serde_json::Value;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum TranscribeError {
    #[error("Audio file not found: {0:?}")]
    AudioNotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Http(#[from] HttpError),
    #[error("Server declared JSON but the body did not parse: {0}")]
    Parse(#[from] serde_json::Error),
}

/// What the server actually sent back
#[derive(Debug, Clone, PartialEq)]
pub enum Transcript {
    /// `application/json` body
    Json(Value),
    /// Any other content type, kept verbatim
    Text(String),
}

impl Transcript {
    /// Interpret a body according to its declared content type
    pub fn from_response(content_type: &str, body: String) -> Result<Self, serde_json::Error> {
        if http::is_json(content_type) {
            Ok(Transcript::Json(serde_json::from_str(&body)?))
        } else {
            Ok(Transcript::Text(body))
        }
    }

    /// The transcript text: the `text` field of a JSON reply when present,
    /// the whole JSON document otherwise, or the raw body for non-JSON replies.
    pub fn text(&self) -> String {
        match self {
            Transcript::Json(value) => match value.get("text") {
                Some(Value::String(text)) => text.clone(),
                Some(other) => other.to_string(),
                None => value.to_string(),
            },
            Transcript::Text(body) => body.clone(),
        }
    }
}

impl fmt::Display for Transcript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}

/// Client for the whisper.cpp `/inference` endpoint
pub struct WhisperClient {
    client: Client,
    url: String,
}

impl WhisperClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, TranscribeError> {
        Ok(Self {
            client: http::build_client(timeout)?,
            url: url.into(),
        })
    }

    /// Upload the audio file and return whatever shape the server answered with
    pub fn transcribe(
        &self,
        request: &TranscriptionRequest,
    ) -> Result<Transcript, TranscribeError> {
        let path = request.audio_path.as_path();
        if !path.is_file() {
            return Err(TranscribeError::AudioNotFound(path.to_path_buf()));
        }

        match probe_wav(path) {
            Ok(wav) if wav.sample_rate != WHISPER_SAMPLE_RATE => {
                warn!(
                    "{:?} is {} Hz; whisper.cpp expects {} Hz mono",
                    path, wav.sample_rate, WHISPER_SAMPLE_RATE
                );
            }
            Ok(wav) => info!("Input {:?}: {}", path, wav),
            Err(e) => warn!("Could not read WAV header of {:?}: {}", path, e),
        }

        let file = Part::file(path)?
            .file_name(request.file_name())
            .mime_str("audio/wav")
            .map_err(HttpError::from)?;

        let form = Form::new()
            .part("file", file)
            .text("temperature", request.temperature.to_string())
            .text("response_format", request.response_format.to_string());

        info!(
            "Sending {:?} to {} (format: {}, temperature: {})",
            path, self.url, request.response_format, request.temperature
        );

        let response = self
            .client
            .post(&self.url)
            .multipart(form)
            .send()
            .map_err(HttpError::from)?;
        let response = http::ensure_success(response)?;

        let content_type = http::content_type(&response);
        let body = response.text().map_err(HttpError::from)?;

        let expects_json = matches!(
            request.response_format,
            ResponseFormat::Json | ResponseFormat::VerboseJson
        );
        if http::is_json(&content_type) != expects_json {
            warn!(
                "Requested {} but server declared {:?}; using the declared type",
                request.response_format, content_type
            );
        }

        let transcript = Transcript::from_response(&content_type, body)?;
        info!("Received {} chars of transcript", transcript.text().len());

        Ok(transcript)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use std::path::Path;

    fn client(server: &mockito::Server) -> WhisperClient {
        WhisperClient::new(format!("{}/inference", server.url()), Duration::from_secs(5)).unwrap()
    }

    fn fake_audio(dir: &Path) -> PathBuf {
        let path = dir.join("clip.wav");
        std::fs::write(&path, b"RIFF fake audio payload").unwrap();
        path
    }

    #[test]
    fn test_transcript_text_field() {
        let t = Transcript::from_response("application/json", r#"{"text": "hello world"}"#.into())
            .unwrap();
        assert_eq!(t.text(), "hello world");
    }

    #[test]
    fn test_transcript_without_text_field_emits_whole_document() {
        let t = Transcript::from_response(
            "application/json; charset=utf-8",
            r#"{"segments": []}"#.into(),
        )
        .unwrap();
        assert_eq!(t.text(), r#"{"segments":[]}"#);

        let t = Transcript::from_response("application/json", r#"["a","b"]"#.into()).unwrap();
        assert_eq!(t.text(), r#"["a","b"]"#);
    }

    #[test]
    fn test_transcript_non_string_text_field() {
        let t = Transcript::from_response("application/json", r#"{"text": 42}"#.into()).unwrap();
        assert_eq!(t.text(), "42");
    }

    #[test]
    fn test_transcript_plain_text_is_verbatim() {
        let srt = "1\n00:00:00,000 --> 00:00:01,500\nhello\n\n";
        let t = Transcript::from_response("text/plain", srt.into()).unwrap();
        assert_eq!(t.text(), srt);

        // body that looks like JSON is still text when the server says so
        let t = Transcript::from_response("text/html", r#"{"text": "x"}"#.into()).unwrap();
        assert_eq!(t.text(), r#"{"text": "x"}"#);
    }

    #[test]
    fn test_transcript_invalid_json() {
        assert!(Transcript::from_response("application/json", "not json".into()).is_err());
    }

    #[test]
    fn test_transcribe_json_response() {
        let dir = tempfile::tempdir().unwrap();
        let audio = fake_audio(dir.path());

        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/inference")
            .match_header("content-type", Matcher::Regex("^multipart/form-data".into()))
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex(r#"name="file"; filename="clip.wav""#.into()),
                Matcher::Regex(r"(?i)content-type: audio/wav".into()),
                Matcher::Regex(r#"name="temperature"\s+0\.5"#.into()),
                Matcher::Regex(r#"name="response_format"\s+json"#.into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"text": "hello world"}"#)
            .create();

        let request = TranscriptionRequest::new(&audio).with_temperature(0.5);
        let transcript = client(&server).transcribe(&request).unwrap();

        mock.assert();
        assert_eq!(transcript.to_string(), "hello world");
    }

    #[test]
    fn test_transcribe_declared_type_wins_over_request() {
        let dir = tempfile::tempdir().unwrap();
        let audio = fake_audio(dir.path());

        let mut server = mockito::Server::new();
        let _mock = server
            .mock("POST", "/inference")
            .with_status(200)
            .with_header("content-type", "text/plain; charset=utf-8")
            .with_body(" hello world\n")
            .create();

        // asked for json, got text
        let request = TranscriptionRequest::new(&audio).with_format(ResponseFormat::Json);
        let transcript = client(&server).transcribe(&request).unwrap();
        assert_eq!(transcript, Transcript::Text(" hello world\n".into()));
    }

    #[test]
    fn test_transcribe_http_error() {
        let dir = tempfile::tempdir().unwrap();
        let audio = fake_audio(dir.path());

        let mut server = mockito::Server::new();
        let _mock = server
            .mock("POST", "/inference")
            .with_status(500)
            .with_body("failed to read WAV file")
            .create();

        let err = client(&server)
            .transcribe(&TranscriptionRequest::new(&audio))
            .unwrap_err();

        match err {
            TranscribeError::Http(HttpError::Status { status, detail }) => {
                assert_eq!(status.as_u16(), 500);
                assert_eq!(detail, "failed to read WAV file");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_transcribe_bad_json_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let audio = fake_audio(dir.path());

        let mut server = mockito::Server::new();
        let _mock = server
            .mock("POST", "/inference")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("{truncated")
            .create();

        let err = client(&server)
            .transcribe(&TranscriptionRequest::new(&audio))
            .unwrap_err();
        assert!(matches!(err, TranscribeError::Parse(_)));
    }

    #[test]
    fn test_transcribe_missing_file_sends_nothing() {
        let dir = tempfile::tempdir().unwrap();

        let mut server = mockito::Server::new();
        let mock = server.mock("POST", "/inference").expect(0).create();

        let err = client(&server)
            .transcribe(&TranscriptionRequest::new(dir.path().join("missing.wav")))
            .unwrap_err();

        mock.assert();
        assert!(matches!(err, TranscribeError::AudioNotFound(_)));
    }
}
