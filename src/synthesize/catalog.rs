use super::SynthesizeError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One entry of the server's `/speakers` listing.
///
/// Kept as raw JSON: only the first entry's `voice_id` is ever read, and
/// entries the run never looks at must not fail the whole catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Voice(Value);

impl Voice {
    /// `voice_id` when it is present and a string
    pub fn voice_id(&self) -> Option<&str> {
        self.0.get("voice_id").and_then(Value::as_str)
    }

    pub fn name(&self) -> Option<&str> {
        self.0.get("name").and_then(Value::as_str)
    }

    pub fn preview_url(&self) -> Option<&str> {
        self.0.get("preview_url").and_then(Value::as_str)
    }
}

/// Pick the voice to synthesize with.
///
/// An explicit id always wins and is not checked against the catalog.
/// Otherwise the first catalog entry must carry a non-empty `voice_id`.
pub fn select_voice(
    voices: &[Voice],
    explicit: Option<&str>,
) -> Result<String, SynthesizeError> {
    if let Some(id) = explicit {
        return Ok(id.to_string());
    }

    let first = voices.first().ok_or(SynthesizeError::NoVoices)?;
    match first.voice_id() {
        Some(id) if !id.is_empty() => Ok(id.to_string()),
        _ => Err(SynthesizeError::MissingVoiceId(first.0.to_string())),
    }
}
