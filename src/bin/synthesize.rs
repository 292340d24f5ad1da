use anyhow::Context as _;
use dotenvy::dotenv;
use tracing::info;
use voxprobe::config::SynthesizeConfig;
use voxprobe::synthesize::XttsClient;

fn main() -> anyhow::Result<()> {
    dotenv().ok();
    voxprobe::init_tracing();

    let config = SynthesizeConfig::from_env().context("Invalid synthesis configuration")?;
    info!("Starting XTTS synthesis against {}", config.base_url);

    let client = XttsClient::new(&config.base_url, config.timeout)
        .context("Failed to build HTTP client")?;

    let outcome = client
        .run(&config)
        .with_context(|| format!("XTTS synthesis via {} failed", config.base_url))?;

    println!(
        "Audio saved to {} ({} bytes, voice '{}')",
        outcome.output_path.display(),
        outcome.bytes_written,
        outcome.voice_id
    );
    Ok(())
}
