//! ffmpeg filter program construction
//!
//! A program is a fixed scale + center-crop to the output frame followed by
//! one `drawtext` stage per cue, in cue order so later cues layer on top.
//! Building is pure: identical cues always give an identical program.

use std::fmt;
use std::path::Path;

use super::captions::CaptionCue;
use super::fade::{AlphaSchedule, FadeScheduler};
use super::layout::{LayoutBlock, TextLayoutEngine};
use super::ReelConfig;

/// Parameters for one caption `drawtext` stage.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawText {
    pub text: String,
    pub font_file: String,
    pub font_size: u32,
    pub font_color: String,
    pub vertical_position: f64,
    pub box_color: String,
    pub box_border: u32,
    pub border_width: u32,
    pub border_color: String,
    pub line_spacing: u32,
    pub alpha: AlphaSchedule,
    pub start: f64,
    pub end: f64,
}

/// One stage of a filter program.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterStage {
    /// Scale so the source covers the frame, keeping aspect ratio
    Scale { width: u32, height: u32 },
    /// Center crop to the exact frame size
    Crop { width: u32, height: u32 },
    /// Timed caption
    DrawText(DrawText),
}

impl fmt::Display for FilterStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scale { width, height } => {
                write!(f, "scale={width}:{height}:force_original_aspect_ratio=increase")
            }
            Self::Crop { width, height } => write!(f, "crop={width}:{height}"),
            Self::DrawText(d) => write!(
                f,
                "drawtext=fontfile={font}:expansion=none:text={text}:\
                 fontsize={size}:fontcolor={color}:\
                 x=(w-text_w)/2:y=h*{y}:\
                 box=1:boxcolor={boxcolor}:boxborderw={boxborder}:\
                 borderw={borderw}:bordercolor={bordercolor}:\
                 line_spacing={spacing}:text_align=center:\
                 alpha='{alpha}':\
                 enable='between(t,{start},{end})'",
                font = escape_filter_text(&d.font_file),
                text = escape_filter_text(&d.text),
                size = d.font_size,
                color = d.font_color,
                y = d.vertical_position,
                boxcolor = d.box_color,
                boxborder = d.box_border,
                borderw = d.border_width,
                bordercolor = d.border_color,
                spacing = d.line_spacing,
                alpha = d.alpha.to_expression(),
                start = d.start,
                end = d.end,
            ),
        }
    }
}

/// Ordered compositing stages for one render job.
///
/// Handed to the encoder by value; it is not reused after a render.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterProgram {
    stages: Vec<FilterStage>,
}

impl FilterProgram {
    #[must_use]
    pub fn stages(&self) -> &[FilterStage] {
        &self.stages
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// The `-vf` argument.
    #[must_use]
    pub fn to_filter_string(&self) -> String {
        self.stages
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl fmt::Display for FilterProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_filter_string())
    }
}

/// Composes layout and fades into a [`FilterProgram`].
pub struct FilterChainBuilder {
    config: ReelConfig,
    layout: TextLayoutEngine,
    fades: FadeScheduler,
}

impl FilterChainBuilder {
    #[must_use]
    pub fn new(config: &ReelConfig) -> Self {
        Self {
            config: config.clone(),
            layout: TextLayoutEngine::new(config),
            fades: FadeScheduler,
        }
    }

    /// Always yields `2 + cues.len()` stages; cues are neither reordered nor dropped.
    #[must_use]
    pub fn build(&self, cues: &[CaptionCue]) -> FilterProgram {
        let (width, height) = (self.config.frame_width, self.config.frame_height);

        let mut stages = Vec::with_capacity(2 + cues.len());
        stages.push(FilterStage::Scale { width, height });
        stages.push(FilterStage::Crop { width, height });
        stages.extend(
            cues.iter()
                .enumerate()
                .map(|(index, cue)| self.draw_text(cue, &self.layout.layout(cue, index))),
        );

        FilterProgram { stages }
    }

    fn draw_text(&self, cue: &CaptionCue, block: &LayoutBlock) -> FilterStage {
        let config = &self.config;
        FilterStage::DrawText(DrawText {
            text: block.joined(),
            font_file: font_path_string(&config.font_file),
            font_size: config.font_size,
            font_color: config.font_color.clone(),
            vertical_position: block.vertical_position,
            box_color: config.box_color.clone(),
            box_border: config.box_border,
            border_width: config.border_width,
            border_color: config.border_color.clone(),
            line_spacing: config.line_spacing,
            alpha: self.fades.schedule(cue),
            start: cue.start_secs,
            end: cue.end_secs,
        })
    }
}

impl Default for FilterChainBuilder {
    fn default() -> Self {
        Self::new(&ReelConfig::default())
    }
}

/// ffmpeg wants forward slashes even on Windows.
fn font_path_string(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Escape text for use as an unquoted `drawtext` option value.
///
/// Two passes: the option parser (`\ ' :`), then the filtergraph parser
/// (`\ ' [ ] , ;`). The result unescapes back to the input exactly.
#[must_use]
pub fn escape_filter_text(text: &str) -> String {
    let option_level = escape_chars(text, &['\\', '\'', ':']);
    escape_chars(&option_level, &['\\', '\'', '[', ']', ',', ';'])
}

fn escape_chars(text: &str, special: &[char]) -> String {
    let mut out = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        if special.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
