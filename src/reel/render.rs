//! Render orchestration: source fetch, encode, cleanup.
//!
//! All filesystem side effects of a render live here. Each render is a
//! single encoder attempt; on failure both the temporary source image and
//! any partial output are removed before the error is returned.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::captions::CaptionCue;
use super::encoder::{EncodeJob, Encoder, ProgressCallback};
use super::filter::FilterChainBuilder;
use super::{ReelConfig, Result};

/// URL prefix under which rendered videos are published.
pub const PUBLIC_PREFIX: &str = "/videos";

/// Downloads the source image for a render.
#[async_trait]
pub trait SourceFetcher: Send + Sync {
    /// Write the resource at `url` to `dest`.
    async fn fetch_to(&self, url: &str, dest: &Path) -> Result<()>;
}

/// A finished video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoArtifact {
    /// Public path, e.g. `/videos/video-1718000000000-1a2b3c4d.mp4`
    pub video_path: String,
    /// Where the file was written
    pub local_path: PathBuf,
    pub filename: String,
}

/// Sequences one render job.
pub struct Renderer {
    config: ReelConfig,
    output_dir: PathBuf,
    temp_dir: PathBuf,
    fetcher: Box<dyn SourceFetcher>,
    encoder: Box<dyn Encoder>,
}

impl Renderer {
    pub fn new(
        config: ReelConfig,
        output_dir: impl Into<PathBuf>,
        fetcher: Box<dyn SourceFetcher>,
        encoder: Box<dyn Encoder>,
    ) -> Self {
        Self {
            config,
            output_dir: output_dir.into(),
            temp_dir: std::env::temp_dir().join("adreel"),
            fetcher,
            encoder,
        }
    }

    /// Directory for downloaded source images
    #[must_use]
    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = dir.into();
        self
    }

    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Render `cues` over the image at `image_url`.
    #[instrument(skip(self, cues, progress), fields(cue_count = cues.len()))]
    pub async fn render(
        &self,
        image_url: &str,
        cues: &[CaptionCue],
        progress: Option<ProgressCallback>,
    ) -> Result<VideoArtifact> {
        fs::create_dir_all(&self.temp_dir).await?;
        let source = self.temp_dir.join(format!("temp-{}.jpg", Uuid::new_v4()));

        if let Err(e) = self.fetcher.fetch_to(image_url, &source).await {
            cleanup_files(&[&source]).await;
            return Err(e);
        }
        debug!("Source image saved to {:?}", source);

        if let Err(e) = fs::create_dir_all(&self.output_dir).await {
            cleanup_files(&[&source]).await;
            return Err(e.into());
        }

        let filename = output_filename();
        let output = self.output_dir.join(&filename);
        if fs::try_exists(&output).await.unwrap_or(false) {
            match fs::remove_file(&output).await {
                Ok(()) => debug!("Removed existing output {:?}", output),
                Err(e) => warn!("Could not remove existing output {:?}: {}", output, e),
            }
        }

        let program = FilterChainBuilder::new(&self.config).build(cues);
        let job = EncodeJob {
            input: source.clone(),
            output: output.clone(),
            program,
            duration_secs: self.config.duration_secs,
            fps: self.config.fps,
            aspect: self.config.aspect_ratio(),
        };

        match self.encoder.encode(job, progress).await {
            Ok(()) => {
                cleanup_files(&[&source]).await;
                info!("Video created at {:?}", output);
                Ok(VideoArtifact {
                    video_path: format!("{PUBLIC_PREFIX}/{filename}"),
                    local_path: output,
                    filename,
                })
            }
            Err(e) => {
                warn!("Render failed: {}", e);
                cleanup_files(&[&source, &output]).await;
                Err(e)
            }
        }
    }
}

/// `video-<unix millis>-<8 hex>.mp4`
fn output_filename() -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let suffix = Uuid::new_v4().simple().to_string();
    format!("video-{millis}-{}.mp4", &suffix[..8])
}

/// Best-effort removal; failures are logged, never returned.
async fn cleanup_files(files: &[&Path]) {
    for file in files {
        if !fs::try_exists(file).await.unwrap_or(false) {
            continue;
        }
        if let Err(e) = fs::remove_file(file).await {
            warn!("Error deleting {:?}: {}", file, e);
        }
    }
}
