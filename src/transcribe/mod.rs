//! Speech-to-text against a whisper.cpp HTTP server.
//!
//! Uploads a WAV file to the server's `/inference` endpoint and interprets the
//! reply by its declared content type.

mod client;
mod request;

pub use client::{TranscribeError, Transcript, WhisperClient};
pub use request::{ResponseFormat, TranscriptionRequest};
