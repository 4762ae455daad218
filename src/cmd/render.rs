use std::path::PathBuf;

use anyhow::{Context, Result};

use adreel::config::Settings;
use adreel::reel::CaptionExtractor;
use adreel::AcceleratedClient;

use super::{build_renderer, ensure_encoder, progress_logger, read_input};

pub async fn cmd_render(image: &str, text: &str, output_dir: Option<PathBuf>) -> Result<()> {
    let copy = read_input(text)?;
    let settings = Settings::load()?;
    let config = settings.reel_config();

    let cues = CaptionExtractor::new(&config).extract(&copy);
    eprintln!("🎬 Rendering {} caption(s) over {image}", cues.len());

    ensure_encoder(&settings).await?;
    let client = AcceleratedClient::new()?;
    let renderer = build_renderer(&settings, &client, output_dir);
    eprintln!("   Output: {}", renderer.output_dir().display());

    let start = std::time::Instant::now();
    let artifact = renderer
        .render(image, &cues, Some(progress_logger()))
        .await
        .context("render failed")?;

    eprintln!("✅ Video created in {:.1}s", start.elapsed().as_secs_f64());
    println!("{}", serde_json::to_string_pretty(&artifact)?);
    Ok(())
}
