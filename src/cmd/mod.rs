mod captions;
mod filter;
mod render;
mod scrape;

use std::io::Read;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};

use anyhow::{Context, Result};
use tracing::info;

use adreel::config::Settings;
use adreel::reel::{FfmpegEncoder, ProgressCallback, RenderProgress, Renderer};
use adreel::AcceleratedClient;

pub use captions::cmd_captions;
pub use filter::cmd_filter;
pub use render::cmd_render;
pub use scrape::cmd_scrape;

/// Read a file, or stdin for `-`.
fn read_input(path: &str) -> Result<String> {
    if path == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("failed to read stdin")?;
        return Ok(text);
    }
    std::fs::read_to_string(path).with_context(|| format!("failed to read {path}"))
}

/// Logs each whole-percent step once.
fn progress_logger() -> ProgressCallback {
    let last = AtomicU32::new(0);
    Box::new(move |progress: RenderProgress| {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let percent = progress.percent.floor() as u32;
        if percent > last.fetch_max(percent, Ordering::Relaxed) {
            info!("Processing: {percent}% done");
        }
    })
}

/// Fail early when ffmpeg cannot be run.
async fn ensure_encoder(settings: &Settings) -> Result<()> {
    let config = settings.encoder_config();
    if !FfmpegEncoder::new(config.clone()).check_available().await {
        anyhow::bail!(
            "ffmpeg not found at {:?}; install it or set ffmpeg_path in {}",
            config.ffmpeg_path,
            adreel::config::config_path().display()
        );
    }
    Ok(())
}

/// Build the ffmpeg-backed renderer from settings.
fn build_renderer(settings: &Settings, client: &AcceleratedClient, output_dir: Option<PathBuf>) -> Renderer {
    let encoder = FfmpegEncoder::new(settings.encoder_config());
    let output_dir = output_dir.unwrap_or_else(|| settings.output_dir());
    Renderer::new(
        settings.reel_config(),
        output_dir,
        Box::new(client.clone()),
        Box::new(encoder),
    )
    .with_temp_dir(settings.temp_dir())
}
