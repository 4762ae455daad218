//! Per-cue opacity schedules.
//!
//! Each cue fades in from its start, holds, and fades out to its end. The
//! schedule is a four-breakpoint piecewise-linear function that can be
//! evaluated directly or rendered as an ffmpeg expression over `t`.

use serde::Serialize;

use super::captions::CaptionCue;

/// Piecewise-linear opacity over playback time.
///
/// Invariant: `start <= fade_in_end <= fade_out_start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AlphaSchedule {
    pub start: f64,
    pub fade_in_end: f64,
    pub fade_out_start: f64,
    pub end: f64,
}

impl AlphaSchedule {
    /// Opacity at playback time `t`, in `[0, 1]`.
    #[must_use]
    pub fn alpha_at(&self, t: f64) -> f64 {
        if t < self.start {
            0.0
        } else if t < self.fade_in_end {
            (t - self.start) / (self.fade_in_end - self.start)
        } else if t < self.fade_out_start {
            1.0
        } else if t < self.end {
            1.0 - (t - self.fade_out_start) / (self.end - self.fade_out_start)
        } else {
            0.0
        }
    }

    /// Render as an ffmpeg expression of `t`.
    ///
    /// Zero-width ramps are left out entirely so no branch divides by zero.
    #[must_use]
    pub fn to_expression(&self) -> String {
        let Self { start, fade_in_end, fade_out_start, end } = *self;

        let mut expr = String::from("0");
        if end > fade_out_start {
            expr = format!(
                "if(lt(t,{end}),1-(t-{fade_out_start})/{},{expr})",
                fmt_num(end - fade_out_start)
            );
        }
        if fade_out_start > fade_in_end {
            expr = format!("if(lt(t,{fade_out_start}),1,{expr})");
        }
        if fade_in_end > start {
            expr = format!("if(lt(t,{fade_in_end}),(t-{start})/{},{expr})", fmt_num(fade_in_end - start));
        } else if fade_out_start <= fade_in_end && end <= fade_out_start {
            // Degenerate cue with no visible span.
            return "0".to_string();
        }
        format!("if(lt(t,{start}),0,{expr})")
    }
}

/// Builds [`AlphaSchedule`]s from cues.
#[derive(Debug, Clone, Copy, Default)]
pub struct FadeScheduler;

impl FadeScheduler {
    /// Fades that overrun the cue are shrunk proportionally so the ramps
    /// meet instead of crossing.
    #[must_use]
    pub fn schedule(&self, cue: &CaptionCue) -> AlphaSchedule {
        let start = cue.start_secs;
        let end = cue.end_secs.max(start);
        let span = end - start;

        let mut fade_in = cue.fade_in_secs.max(0.0);
        let mut fade_out = cue.fade_out_secs.max(0.0);
        let total = fade_in + fade_out;
        if total > span && total > 0.0 {
            let scale = span / total;
            fade_in *= scale;
            fade_out *= scale;
        }

        let fade_in_end = round_ms(start + fade_in);
        let fade_out_start = round_ms(end - fade_out).max(fade_in_end);

        AlphaSchedule { start, fade_in_end, fade_out_start, end }
    }
}

/// Round to the millisecond to keep expressions short and reproducible.
fn round_ms(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

fn fmt_num(value: f64) -> String {
    format!("{}", round_ms(value))
}
