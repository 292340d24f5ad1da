//! Shared HTTP plumbing for the inference clients.
//!
//! Both servers are called through a blocking `reqwest` client with a bounded
//! timeout. Responses are classified by their declared `Content-Type` only.

use reqwest::StatusCode;
use reqwest::blocking::{Client, Response};
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

#[derive(Error, Debug)]
pub enum HttpError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("HTTP {status}: {detail}")]
    Status { status: StatusCode, detail: String },
}

impl HttpError {
    /// True when the server could not be reached at all
    pub fn is_connect(&self) -> bool {
        matches!(self, HttpError::Request(e) if e.is_connect() || e.is_timeout())
    }
}

/// Build a blocking client with the given request timeout
pub fn build_client(timeout: Duration) -> Result<Client, HttpError> {
    let client = Client::builder().timeout(timeout).build()?;
    Ok(client)
}

/// Pass successful responses through, turn everything else into
/// `HttpError::Status` carrying whatever detail text the server sent.
pub fn ensure_success(response: Response) -> Result<Response, HttpError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = match response.text() {
        Ok(body) => body,
        Err(e) => {
            warn!("Failed to read error body of HTTP {} response: {}", status, e);
            String::new()
        }
    };
    Err(HttpError::Status {
        status,
        detail: error_detail(&body),
    })
}

/// Extract a readable message from an error body.
///
/// FastAPI-style servers answer with `{"detail": ...}`; anything else is
/// returned as the trimmed raw text.
pub fn error_detail(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "(no detail)".to_string();
    }

    match serde_json::from_str::<serde_json::Value>(trimmed) {
        Ok(serde_json::Value::Object(map)) => match map.get("detail") {
            Some(serde_json::Value::String(detail)) => detail.clone(),
            Some(other) => other.to_string(),
            None => trimmed.to_string(),
        },
        _ => trimmed.to_string(),
    }
}

/// Declared content type of a response, empty when the header is missing
pub fn content_type(response: &Response) -> String {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

/// Lowercased MIME essence (`type/subtype`) without parameters
fn essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

pub fn is_json(content_type: &str) -> bool {
    essence(content_type).starts_with("application/json")
}

/// WAV audio under any of its registered or customary names
pub fn is_wav_audio(content_type: &str) -> bool {
    matches!(
        essence(content_type).as_str(),
        "audio/wav" | "audio/x-wav" | "audio/wave" | "audio/vnd.wave"
    )
}
