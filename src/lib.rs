//! Command-line clients for local speech inference servers.
//!
//! `transcribe` uploads a WAV file to a whisper.cpp server and prints the
//! transcript. `synthesize` asks an XTTS server to speak a sentence and saves
//! the audio it streams back.

pub mod audio;
pub mod config;
pub mod http;
pub mod synthesize;
pub mod transcribe;

use tracing_subscriber::EnvFilter;

/// Install the stderr log subscriber, honouring `RUST_LOG` (default `info`).
///
/// Logs stay off stdout so the transcript can be piped.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}
