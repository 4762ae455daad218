//! User settings loaded from `~/.config/adreel/config.toml`.
//!
//! Every field is optional; a missing file means defaults. `GEMINI_API_KEY`
//! and `GEMINI_API_URL` in the environment take precedence over the file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::copywriter::DEFAULT_API_URL;
use crate::reel::{EncoderConfig, ReelConfig};

/// Contents of the settings file.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Where rendered videos are written
    pub output_dir: Option<PathBuf>,
    /// Where source images are downloaded
    pub temp_dir: Option<PathBuf>,
    pub ffmpeg_path: Option<String>,
    pub font_file: Option<PathBuf>,
    pub gemini_api_url: Option<String>,
    pub gemini_api_key: Option<String>,
}

impl Settings {
    /// Load from the default location, then apply environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        let mut settings = Self::load_from(&config_path())?;
        settings.apply_env(|key| std::env::var(key).ok());
        Ok(settings)
    }

    /// Load from an explicit path; a missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("invalid TOML in {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(key) = var("GEMINI_API_KEY").filter(|v| !v.is_empty()) {
            self.gemini_api_key = Some(key);
        }
        if let Some(url) = var("GEMINI_API_URL").filter(|v| !v.is_empty()) {
            self.gemini_api_url = Some(url);
        }
    }

    #[must_use]
    pub fn output_dir(&self) -> PathBuf {
        self.output_dir.clone().unwrap_or_else(|| PathBuf::from("videos"))
    }

    #[must_use]
    pub fn temp_dir(&self) -> PathBuf {
        self.temp_dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("adreel"))
    }

    #[must_use]
    pub fn gemini_api_url(&self) -> &str {
        self.gemini_api_url.as_deref().unwrap_or(DEFAULT_API_URL)
    }

    #[must_use]
    pub fn reel_config(&self) -> ReelConfig {
        match &self.font_file {
            Some(font) => ReelConfig::default().with_font_file(font),
            None => ReelConfig::default(),
        }
    }

    #[must_use]
    pub fn encoder_config(&self) -> EncoderConfig {
        match &self.ffmpeg_path {
            Some(path) => EncoderConfig::default().with_ffmpeg_path(path),
            None => EncoderConfig::default(),
        }
    }
}

/// Return the path to the settings file.
#[must_use]
pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("adreel")
        .join("config.toml")
}
