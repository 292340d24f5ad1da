use anyhow::Context as _;
use dotenvy::dotenv;
use tracing::info;
use voxprobe::config::TranscribeConfig;
use voxprobe::transcribe::{TranscriptionRequest, WhisperClient};

fn main() -> anyhow::Result<()> {
    dotenv().ok();
    voxprobe::init_tracing();

    let config = TranscribeConfig::from_env().context("Invalid transcription configuration")?;
    info!("Transcribing {:?} via {}", config.audio_file, config.url);

    let client = WhisperClient::new(&config.url, config.timeout)
        .context("Failed to build HTTP client")?;
    let request = TranscriptionRequest::from(&config);

    let transcript = client
        .transcribe(&request)
        .with_context(|| format!("Failed to transcribe {:?}", config.audio_file))?;

    println!("{}", transcript);
    Ok(())
}
