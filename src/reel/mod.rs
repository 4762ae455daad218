//! Caption-overlay video rendering
//!
//! Turns generated ad copy into a short vertical clip with timed captions
//! burned over a still product image.
//!
//! # Stages
//!
//! - **Captions** - parse free-form ad copy into timed [`CaptionCue`]s
//! - **Layout** - greedy word wrap and vertical stacking per cue
//! - **Fades** - piecewise-linear alpha schedule per cue
//! - **Filter program** - scale/crop/drawtext chain for ffmpeg
//! - **Render** - fetch source image, invoke the encoder, clean up
//!
//! # Example
//!
//! ```rust,no_run
//! use adreel::reel::{CaptionExtractor, FilterChainBuilder, ReelConfig};
//!
//! let config = ReelConfig::default();
//! let cues = CaptionExtractor::new(&config).extract("**Scene 1: 0-3 seconds**\n**Voiceover:** Buy now!");
//! let program = FilterChainBuilder::new(&config).build(&cues);
//! println!("{}", program.to_filter_string());
//! ```

pub mod captions;
pub mod encoder;
pub mod fade;
pub mod filter;
pub mod layout;
pub mod render;

use std::path::PathBuf;

use thiserror::Error;

pub use captions::{CaptionCue, CaptionExtractor, CaptionSource, Extraction};
pub use encoder::{EncodeJob, Encoder, EncoderConfig, FfmpegEncoder, ProgressCallback, RenderProgress};
pub use fade::{AlphaSchedule, FadeScheduler};
pub use filter::{DrawText, FilterChainBuilder, FilterProgram, FilterStage};
pub use layout::{LayoutBlock, TextLayoutEngine};
pub use render::{Renderer, SourceFetcher, VideoArtifact};

/// Rendering errors
#[derive(Error, Debug)]
pub enum ReelError {
    #[error("failed to fetch source image {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("video encoding failed: {message}\n{diagnostics}")]
    Encode { message: String, diagnostics: String },

    #[error("encoder not available: {0}")]
    EncoderUnavailable(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ReelError>;

/// Font used when none is configured.
#[cfg(target_os = "windows")]
pub const DEFAULT_FONT_FILE: &str = "C:/Windows/Fonts/arialbd.ttf";
#[cfg(not(target_os = "windows"))]
pub const DEFAULT_FONT_FILE: &str = "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf";

/// Immutable rendering parameters shared by every stage.
#[derive(Debug, Clone, PartialEq)]
pub struct ReelConfig {
    /// Output frame width in pixels
    pub frame_width: u32,
    /// Output frame height in pixels
    pub frame_height: u32,
    /// Clip length in seconds
    pub duration_secs: u32,
    /// Output frame rate
    pub fps: u32,
    /// Caption font file
    pub font_file: PathBuf,
    /// Caption font size
    pub font_size: u32,
    /// Caption color
    pub font_color: String,
    /// Greedy wrap budget
    pub max_chars_per_line: usize,
    /// Vertical position of the first cue (fraction of frame height)
    pub vertical_base: f64,
    /// Vertical offset added per cue index
    pub vertical_step: f64,
    /// Lowest allowed vertical position
    pub vertical_max: f64,
    /// Default fade-in for extracted cues
    pub fade_in_secs: f64,
    /// Default fade-out for extracted cues
    pub fade_out_secs: f64,
    /// Maximum number of cues in one clip
    pub max_cues: usize,
    /// Slot length for cues synthesized from plain lines
    pub fallback_slot_secs: u32,
    /// Box drawn behind the caption
    pub box_color: String,
    pub box_border: u32,
    /// Thin outline around glyphs
    pub border_width: u32,
    pub border_color: String,
    pub line_spacing: u32,
}

impl Default for ReelConfig {
    fn default() -> Self {
        Self {
            frame_width: 720,
            frame_height: 1280,
            duration_secs: 15,
            fps: 25,
            font_file: PathBuf::from(DEFAULT_FONT_FILE),
            font_size: 36,
            font_color: "white".to_string(),
            max_chars_per_line: 30,
            vertical_base: 0.3,
            vertical_step: 0.2,
            vertical_max: 0.7,
            fade_in_secs: 0.5,
            fade_out_secs: 0.5,
            max_cues: 5,
            fallback_slot_secs: 3,
            box_color: "black@0.7".to_string(),
            box_border: 15,
            border_width: 1,
            border_color: "white@0.3".to_string(),
            line_spacing: 20,
        }
    }
}

impl ReelConfig {
    /// Use a different caption font
    #[must_use]
    pub fn with_font_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.font_file = path.into();
        self
    }

    /// Output aspect ratio as `W:H` reduced by the greatest common divisor.
    #[must_use]
    pub fn aspect_ratio(&self) -> String {
        fn gcd(a: u32, b: u32) -> u32 {
            if b == 0 { a } else { gcd(b, a % b) }
        }
        let d = gcd(self.frame_width, self.frame_height).max(1);
        format!("{}:{}", self.frame_width / d, self.frame_height / d)
    }
}
