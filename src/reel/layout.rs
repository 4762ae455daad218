//! Caption text layout: greedy word wrap and vertical stacking.

use serde::Serialize;

use super::captions::CaptionCue;
use super::ReelConfig;

/// Wrapped caption lines and where to draw them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutBlock {
    pub lines: Vec<String>,
    /// Top edge as a fraction of frame height
    pub vertical_position: f64,
}

impl LayoutBlock {
    /// Lines joined with hard line breaks.
    #[must_use]
    pub fn joined(&self) -> String {
        self.lines.join("\n")
    }
}

/// Computes [`LayoutBlock`]s for cues.
#[derive(Debug, Clone)]
pub struct TextLayoutEngine {
    max_chars: usize,
    base: f64,
    step: f64,
    max: f64,
}

impl TextLayoutEngine {
    #[must_use]
    pub fn new(config: &ReelConfig) -> Self {
        Self {
            max_chars: config.max_chars_per_line,
            base: config.vertical_base,
            step: config.vertical_step,
            max: config.vertical_max,
        }
    }

    #[must_use]
    pub fn layout(&self, cue: &CaptionCue, index: usize) -> LayoutBlock {
        LayoutBlock {
            lines: self.wrap(&cue.text),
            vertical_position: self.vertical_position(index),
        }
    }

    /// Greedy wrap on whitespace. Words are never split, so a single word
    /// longer than the budget gets a line of its own.
    #[must_use]
    pub fn wrap(&self, text: &str) -> Vec<String> {
        let mut lines = Vec::new();
        let mut current = String::new();

        for word in text.split_whitespace() {
            if current.is_empty() {
                current.push_str(word);
                continue;
            }

            let candidate_len = current.chars().count() + 1 + word.chars().count();
            if candidate_len <= self.max_chars {
                current.push(' ');
                current.push_str(word);
            } else {
                lines.push(std::mem::take(&mut current));
                current.push_str(word);
            }
        }

        if !current.is_empty() {
            lines.push(current);
        }
        lines
    }

    /// Cues stack downward with index, clamped to stay on-frame.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn vertical_position(&self, index: usize) -> f64 {
        let raw = self.base + self.step * index as f64;
        // 0.7, not 0.7000000000000001
        (raw.min(self.max) * 10_000.0).round() / 10_000.0
    }
}

impl Default for TextLayoutEngine {
    fn default() -> Self {
        Self::new(&ReelConfig::default())
    }
}
