//! Text-to-speech against an XTTS API server.
//!
//! A run walks fetch catalog -> select voice -> synthesize -> validate
//! content type -> write file, stopping at the first failure.

mod catalog;
mod client;
mod writer;

pub use catalog::{Voice, select_voice};
pub use client::{SynthesisOutcome, SynthesisRequest, SynthesizeError, XttsClient};
pub use writer::{CHUNK_SIZE, partial_path, stream_to_file};
