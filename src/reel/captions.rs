//! Caption cue extraction from generated ad copy
//!
//! Ad copy comes back from the language model as loosely formatted
//! markdown. Timed cues are recovered with an ordered list of matchers,
//! most specific first; the first matcher that produces any cue wins and
//! results are never merged across matchers.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::ReelConfig;

/// Mis-decoded UTF-8 rupee sign as it shows up in model output.
const CORRUPTED_RUPEE: &str = "\u{e2}\u{201a}\u{b9}";

const PLACEHOLDER_TITLE: &str = "New Product";
const SYNTHESIZED_TEXT_LIMIT: usize = 100;
const MIN_FALLBACK_LINE_CHARS: usize = 10;

static EMPHASIS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*\*").expect("valid regex"));
static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[.*?\]").expect("valid regex"));

/// One cue matcher: a pattern plus the capture groups holding start, end
/// and caption text.
struct CueMatcher {
    name: &'static str,
    pattern: Regex,
    start: usize,
    end: usize,
    text: usize,
}

static MATCHERS: LazyLock<Vec<CueMatcher>> = LazyLock::new(|| {
    vec![
        CueMatcher {
            name: "scene-voiceover",
            pattern: Regex::new(
                r"(?i)\*\*Scene (\d+): (\d+)-(\d+) seconds\*\*[\s\S]*?\*\*Voiceover:\*\*\s*([^\n]+)",
            )
            .expect("valid regex"),
            start: 2,
            end: 3,
            text: 4,
        },
        CueMatcher {
            name: "scene-or-part",
            pattern: Regex::new(
                r"(?i)(?:Scene|Part) (\d+)[\s\S]*?(\d+)-(\d+) seconds[\s\S]*?(?:Voiceover|Text):\s*([^\n]+)",
            )
            .expect("valid regex"),
            start: 2,
            end: 3,
            text: 4,
        },
        CueMatcher {
            name: "bare-range",
            pattern: Regex::new(r"(?i)(\d+)-(\d+) seconds[\s\S]*?:\s*([^\n]+)")
                .expect("valid regex"),
            start: 1,
            end: 2,
            text: 3,
        },
    ]
});

/// A timed caption.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptionCue {
    pub text: String,
    pub start_secs: f64,
    pub end_secs: f64,
    pub fade_in_secs: f64,
    pub fade_out_secs: f64,
}

impl CaptionCue {
    /// Create a cue with the standard half-second fades
    #[must_use]
    pub fn new(text: impl Into<String>, start_secs: f64, end_secs: f64) -> Self {
        Self {
            text: text.into(),
            start_secs,
            end_secs,
            fade_in_secs: 0.5,
            fade_out_secs: 0.5,
        }
    }

    #[must_use]
    pub fn duration(&self) -> f64 {
        self.end_secs - self.start_secs
    }
}

/// Which extraction path produced the cues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptionSource {
    /// A timed pattern matched; the value is the matcher's name
    Structured(&'static str),
    /// No timing found; cues built from plain lines
    Fallback,
    /// Nothing usable; a single full-length cue was made up
    Synthesized,
}

/// Extracted cues with their provenance.
#[derive(Debug, Clone)]
pub struct Extraction {
    pub cues: Vec<CaptionCue>,
    pub source: CaptionSource,
}

/// Parses generated ad copy into ordered caption cues.
pub struct CaptionExtractor {
    fade_in_secs: f64,
    fade_out_secs: f64,
    max_cues: usize,
    slot_secs: u32,
    duration_secs: u32,
}

impl CaptionExtractor {
    #[must_use]
    pub fn new(config: &ReelConfig) -> Self {
        Self {
            fade_in_secs: config.fade_in_secs,
            fade_out_secs: config.fade_out_secs,
            max_cues: config.max_cues.max(1),
            slot_secs: config.fallback_slot_secs,
            duration_secs: config.duration_secs,
        }
    }

    /// Extract between one and `max_cues` cues. Never fails.
    #[must_use]
    pub fn extract(&self, text: &str) -> Vec<CaptionCue> {
        self.extract_detailed(text, None).cues
    }

    /// Extract cues, reporting which path was taken.
    ///
    /// `title` is used for the synthesized cue when neither timed patterns
    /// nor usable lines are present.
    #[must_use]
    pub fn extract_detailed(&self, text: &str, title: Option<&str>) -> Extraction {
        let (mut cues, source) = match self.extract_structured(text) {
            Some((cues, name)) => (cues, CaptionSource::Structured(name)),
            None => (self.extract_lines(text), CaptionSource::Fallback),
        };

        if cues.is_empty() {
            debug!("No usable caption lines, synthesizing a full-length cue");
            return Extraction {
                cues: vec![self.synthesize(text, title)],
                source: CaptionSource::Synthesized,
            };
        }

        debug!(?source, count = cues.len(), "Extracted caption cues");
        cues.truncate(self.max_cues);
        Extraction { cues, source }
    }

    /// Run the matchers in priority order; first one with any cue wins.
    fn extract_structured(&self, text: &str) -> Option<(Vec<CaptionCue>, &'static str)> {
        MATCHERS.iter().find_map(|matcher| {
            let cues: Vec<CaptionCue> = matcher
                .pattern
                .captures_iter(text)
                .filter_map(|caps| self.cue_from_captures(matcher, &caps))
                .collect();
            (!cues.is_empty()).then_some((cues, matcher.name))
        })
    }

    fn cue_from_captures(&self, matcher: &CueMatcher, caps: &Captures<'_>) -> Option<CaptionCue> {
        let start_raw = caps.get(matcher.start).or_else(|| caps.get(matcher.end))?;
        let start: u32 = start_raw.as_str().parse().ok()?;
        let end: u32 = match caps.get(matcher.end) {
            Some(m) => m.as_str().parse().ok()?,
            None => start.checked_add(2)?,
        };
        let text = sanitize(caps.get(matcher.text)?.as_str());

        if text.is_empty() || end <= start {
            return None;
        }

        Some(CaptionCue {
            text,
            start_secs: f64::from(start),
            end_secs: f64::from(end),
            fade_in_secs: self.fade_in_secs,
            fade_out_secs: self.fade_out_secs,
        })
    }

    /// Untimed copy: one fixed slot per meaningful line.
    fn extract_lines(&self, text: &str) -> Vec<CaptionCue> {
        text.lines()
            .filter(|line| line.trim().chars().count() > MIN_FALLBACK_LINE_CHARS)
            .map(|line| EMPHASIS.replace_all(line, "").trim().to_string())
            .filter(|line| !line.is_empty())
            .take(self.max_cues)
            .zip(0u32..)
            .map(|(line, index)| CaptionCue {
                text: line,
                start_secs: f64::from(index * self.slot_secs),
                end_secs: f64::from((index + 1) * self.slot_secs),
                fade_in_secs: self.fade_in_secs,
                fade_out_secs: self.fade_out_secs,
            })
            .collect()
    }

    fn synthesize(&self, text: &str, title: Option<&str>) -> CaptionCue {
        let candidate = title
            .map(sanitize)
            .filter(|t| !t.is_empty())
            .or_else(|| {
                let collapsed = sanitize(&text.split_whitespace().collect::<Vec<_>>().join(" "));
                (!collapsed.is_empty()).then_some(collapsed)
            })
            .unwrap_or_else(|| PLACEHOLDER_TITLE.to_string());

        CaptionCue {
            text: candidate.chars().take(SYNTHESIZED_TEXT_LIMIT).collect::<String>().trim().to_string(),
            start_secs: 0.0,
            end_secs: f64::from(self.duration_secs.max(1)),
            fade_in_secs: self.fade_in_secs,
            fade_out_secs: self.fade_out_secs,
        }
    }
}

impl Default for CaptionExtractor {
    fn default() -> Self {
        Self::new(&ReelConfig::default())
    }
}

/// Strip markdown emphasis and bracketed placeholders, repair the rupee sign.
#[must_use]
pub fn sanitize(raw: &str) -> String {
    let text = EMPHASIS.replace_all(raw.trim(), "");
    let text = PLACEHOLDER.replace_all(&text, "");
    text.replace(CORRUPTED_RUPEE, "Rs.").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> CaptionExtractor {
        CaptionExtractor::default()
    }

    #[test]
    fn test_scene_voiceover_blocks() {
        let text = "**Scene 1: 0-3 seconds**:\n**Voiceover:** Buy now!\n**Scene 2: 3-6 seconds**:\n**Voiceover:** Great value";
        let extraction = extractor().extract_detailed(text, None);

        assert_eq!(extraction.source, CaptionSource::Structured("scene-voiceover"));
        assert_eq!(
            extraction.cues,
            vec![CaptionCue::new("Buy now!", 0.0, 3.0), CaptionCue::new("Great value", 3.0, 6.0)]
        );
    }

    #[test]
    fn test_caps_at_five_cues_in_order() {
        let text: String = (0..7)
            .map(|i| format!("**Scene {}: {}-{} seconds**\n**Voiceover:** Line {i}\n", i + 1, i * 3, i * 3 + 3))
            .collect();
        let cues = extractor().extract(&text);

        assert_eq!(cues.len(), 5);
        for (i, cue) in cues.iter().enumerate() {
            assert_eq!(cue.text, format!("Line {i}"));
            assert!(cue.start_secs < cue.end_secs);
        }
    }

    #[test]
    fn test_prompt_format_falls_through_to_bare_range() {
        // Colon outside the emphasis: neither scene matcher accepts it.
        let text = "**Scene 1: 0-3 seconds**:\n**Voiceover**: Tired of cold coffee?\n\n\
                    **Scene 2: 3-6 seconds**:\n**Voiceover**: Hand glazed stoneware";
        let extraction = extractor().extract_detailed(text, None);

        assert_eq!(extraction.source, CaptionSource::Structured("bare-range"));
        assert_eq!(
            extraction.cues,
            vec![
                CaptionCue::new("Voiceover: Tired of cold coffee?", 0.0, 3.0),
                CaptionCue::new("Voiceover: Hand glazed stoneware", 3.0, 6.0),
            ]
        );
    }

    #[test]
    fn test_looser_scene_format() {
        let text = "Part 1 (0-4 seconds)\nText: Fresh look\nPart 2 (4-8 seconds)\nText: Bold colors";
        let extraction = extractor().extract_detailed(text, None);

        assert_eq!(extraction.source, CaptionSource::Structured("scene-or-part"));
        assert_eq!(extraction.cues.len(), 2);
        assert_eq!(extraction.cues[0].text, "Fresh look");
        assert_eq!((extraction.cues[1].start_secs, extraction.cues[1].end_secs), (4.0, 8.0));
    }

    #[test]
    fn test_bare_range_fragments() {
        let text = "0-5 seconds: Meet your new kettle\n5-10 seconds: Boils in 60s";
        let extraction = extractor().extract_detailed(text, None);

        assert_eq!(extraction.source, CaptionSource::Structured("bare-range"));
        assert_eq!(extraction.cues[0].text, "Meet your new kettle");
        assert_eq!(extraction.cues[1].text, "Boils in 60s");
    }

    #[test]
    fn test_first_matching_tier_wins_without_merge() {
        let text = "**Scene 1: 0-3 seconds**\n**Voiceover:** Only this\n\n9-12 seconds: Not merged";
        let cues = extractor().extract(text);
        assert_eq!(cues.len(), 1);
        assert_eq!(cues[0].text, "Only this");
    }

    #[test]
    fn test_sanitizes_placeholders_and_currency() {
        let text = format!("**Scene 1: 0-3 seconds**\n**Voiceover:** Only {CORRUPTED_RUPEE}499 [price hook] **today**");
        let cues = extractor().extract(&text);
        assert_eq!(cues[0].text, "Only Rs.499  today");
    }

    #[test]
    fn test_placeholder_only_text_is_skipped() {
        let text = "**Scene 1: 0-3 seconds**\n**Voiceover:** [Opening hook]\n**Scene 2: 3-6 seconds**\n**Voiceover:** Real line";
        let cues = extractor().extract(text);
        assert_eq!(cues.len(), 1);
        assert_eq!(cues[0].text, "Real line");
        assert_eq!(cues[0].start_secs, 3.0);
    }

    #[test]
    fn test_inverted_range_dropped() {
        let text = "**Scene 1: 6-3 seconds**\n**Voiceover:** Backwards\n**Scene 2: 3-6 seconds**\n**Voiceover:** Forwards";
        let cues = extractor().extract(text);
        assert_eq!(cues.len(), 1);
        assert_eq!(cues[0].text, "Forwards");
    }

    #[test]
    fn test_unstructured_text_falls_back_to_lines() {
        let extraction = extractor().extract_detailed("random unstructured text", None);
        assert_eq!(extraction.source, CaptionSource::Fallback);
        assert_eq!(extraction.cues, vec![CaptionCue::new("random unstructured text", 0.0, 3.0)]);
    }

    #[test]
    fn test_fallback_slots_are_contiguous() {
        let text = "short\n**Amazing sound quality**\nBattery lasts all day\nok\nFolds flat for travel\nComes in five colors\nFree shipping this week\nSeventh line is dropped";
        let cues = extractor().extract(text);

        assert_eq!(cues.len(), 5);
        assert_eq!(cues[0].text, "Amazing sound quality");
        for (i, cue) in cues.iter().enumerate() {
            assert_eq!(cue.start_secs, 3.0 * i as f64);
            assert_eq!(cue.end_secs, 3.0 * (i + 1) as f64);
        }
    }

    #[test]
    fn test_synthesizes_when_nothing_usable() {
        let extraction = extractor().extract_detailed("tiny", Some("**Acme** Kettle"));
        assert_eq!(extraction.source, CaptionSource::Synthesized);
        assert_eq!(extraction.cues, vec![CaptionCue::new("Acme Kettle", 0.0, 15.0)]);

        let cues = extractor().extract("");
        assert_eq!(cues, vec![CaptionCue::new(PLACEHOLDER_TITLE, 0.0, 15.0)]);
    }

    #[test]
    fn test_synthesized_text_is_truncated() {
        let title = "x".repeat(250);
        let cues = extractor().extract_detailed("", Some(&title)).cues;
        assert_eq!(cues[0].text.chars().count(), SYNTHESIZED_TEXT_LIMIT);
    }

    #[test]
    fn test_custom_fades_propagate() {
        let config = ReelConfig { fade_in_secs: 0.25, fade_out_secs: 1.0, ..ReelConfig::default() };
        let cues = CaptionExtractor::new(&config).extract("0-3 seconds: Hello there");
        assert_eq!(cues[0].fade_in_secs, 0.25);
        assert_eq!(cues[0].fade_out_secs, 1.0);
    }
}
