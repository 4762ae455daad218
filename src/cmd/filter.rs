use anyhow::Result;

use adreel::config::Settings;
use adreel::reel::{CaptionExtractor, FilterChainBuilder};

use super::read_input;

pub fn cmd_filter(input: &str) -> Result<()> {
    let text = read_input(input)?;
    let config = Settings::load()?.reel_config();

    let cues = CaptionExtractor::new(&config).extract(&text);
    let program = FilterChainBuilder::new(&config).build(&cues);

    println!("{program}");
    Ok(())
}
