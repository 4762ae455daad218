use anyhow::Result;
use serde::Serialize;

use adreel::config::Settings;
use adreel::reel::{
    AlphaSchedule, CaptionCue, CaptionExtractor, CaptionSource, FadeScheduler, LayoutBlock,
    TextLayoutEngine,
};

use super::read_input;

#[derive(Serialize)]
struct CueView {
    #[serde(flatten)]
    cue: CaptionCue,
    #[serde(flatten)]
    layout: LayoutBlock,
    alpha: AlphaSchedule,
}

#[derive(Serialize)]
struct CaptionsView {
    source: CaptionSource,
    cues: Vec<CueView>,
}

pub fn cmd_captions(input: &str, json: bool) -> Result<()> {
    let text = read_input(input)?;
    let config = Settings::load()?.reel_config();

    let extraction = CaptionExtractor::new(&config).extract_detailed(&text, None);
    let layout = TextLayoutEngine::new(&config);
    let fades = FadeScheduler;

    let cues: Vec<CueView> = extraction
        .cues
        .into_iter()
        .enumerate()
        .map(|(index, cue)| CueView {
            layout: layout.layout(&cue, index),
            alpha: fades.schedule(&cue),
            cue,
        })
        .collect();

    if json {
        let view = CaptionsView { source: extraction.source, cues };
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    eprintln!("📝 {} cue(s), source: {:?}", cues.len(), extraction.source);
    for (index, view) in cues.iter().enumerate() {
        println!(
            "[{index}] {:>5.2}s - {:>5.2}s  y={}  fade {}/{}",
            view.cue.start_secs,
            view.cue.end_secs,
            view.layout.vertical_position,
            view.cue.fade_in_secs,
            view.cue.fade_out_secs,
        );
        for line in &view.layout.lines {
            println!("      {line}");
        }
    }

    Ok(())
}
