use std::path::PathBuf;

use anyhow::{Context, Result};

use adreel::config::Settings;
use adreel::{AcceleratedClient, AdJob, Copywriter, ProductRouter};

use super::{build_renderer, progress_logger};

pub async fn cmd_scrape(url: &str, generate_ad: bool, output_dir: Option<PathBuf>) -> Result<()> {
    let settings = Settings::load()?;
    let client = AcceleratedClient::new()?;

    let copywriter = Copywriter::new(
        client.inner().clone(),
        settings.gemini_api_url(),
        settings.gemini_api_key.clone(),
    );
    let renderer = build_renderer(&settings, &client, output_dir);
    let job = AdJob::new(
        client,
        ProductRouter::new(),
        Box::new(copywriter),
        renderer,
        &settings.reel_config(),
    );

    eprintln!("🌐 Scraping: {url}");
    let report = job
        .run(url, generate_ad, generate_ad.then(progress_logger))
        .await
        .with_context(|| format!("failed to scrape {url}"))?;

    if let Some(ref error) = report.generation_error {
        eprintln!("⚠️  Generation error: {error}");
    }
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
