//! External encoder invocation
//!
//! Encodes a looped still image through a [`FilterProgram`] into a fixed
//! H.264 profile. Progress is reported through an optional callback and
//! carries no control flow.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, info, warn};

use super::filter::FilterProgram;
use super::{ReelError, Result};

/// Number of encoder stderr lines kept for error reports.
const DIAGNOSTIC_TAIL: usize = 20;

/// Callback invoked with encode progress.
pub type ProgressCallback = Box<dyn Fn(RenderProgress) + Send + Sync>;

/// Snapshot of encode progress.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderProgress {
    /// Seconds of output written so far
    pub encoded_secs: f64,
    /// 0-100
    pub percent: f64,
}

impl RenderProgress {
    #[must_use]
    pub fn new(encoded_secs: f64, duration_secs: f64) -> Self {
        let percent = if duration_secs > 0.0 {
            (encoded_secs / duration_secs * 100.0).clamp(0.0, 100.0)
        } else {
            0.0
        };
        Self { encoded_secs, percent }
    }
}

/// Everything needed for one encode.
#[derive(Debug)]
pub struct EncodeJob {
    /// Still image to loop
    pub input: PathBuf,
    /// Output file (overwritten)
    pub output: PathBuf,
    pub program: FilterProgram,
    pub duration_secs: u32,
    pub fps: u32,
    /// Display aspect ratio, e.g. `9:16`
    pub aspect: String,
}

/// Encoder backend.
#[async_trait]
pub trait Encoder: Send + Sync {
    /// Run one encode to completion. Never retried by callers.
    async fn encode(&self, job: EncodeJob, progress: Option<ProgressCallback>) -> Result<()>;
}

/// Fixed output profile for the ffmpeg encoder.
#[derive(Debug, Clone)]
pub struct EncoderConfig {
    /// Path to ffmpeg binary
    pub ffmpeg_path: String,
    pub video_codec: String,
    pub pixel_format: String,
    pub preset: String,
    pub crf: u8,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: which::which("ffmpeg").map_or_else(
                |_| "ffmpeg".to_string(),
                |p| p.to_string_lossy().to_string(),
            ),
            video_codec: "libx264".to_string(),
            pixel_format: "yuv420p".to_string(),
            preset: "fast".to_string(),
            crf: 23,
        }
    }
}

impl EncoderConfig {
    /// Use a specific ffmpeg binary
    #[must_use]
    pub fn with_ffmpeg_path(mut self, path: &str) -> Self {
        self.ffmpeg_path = path.to_string();
        self
    }
}

/// ffmpeg subprocess encoder
pub struct FfmpegEncoder {
    config: EncoderConfig,
}

impl FfmpegEncoder {
    #[must_use]
    pub fn new(config: EncoderConfig) -> Self {
        Self { config }
    }

    /// Check if ffmpeg is available
    pub async fn check_available(&self) -> bool {
        Command::new(&self.config.ffmpeg_path)
            .arg("-version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|s| s.success())
            .unwrap_or(false)
    }

    /// Build ffmpeg arguments
    fn build_args(&self, job: &EncodeJob) -> Vec<String> {
        let duration = job.duration_secs.to_string();
        let mut args: Vec<String> = [
            "-hide_banner", "-loglevel", "warning", "-nostats",
            "-progress", "pipe:1",
            "-loop", "1",
            "-t", duration.as_str(),
            "-i",
        ]
        .iter()
        .map(std::string::ToString::to_string)
        .collect();

        args.push(job.input.to_string_lossy().to_string());
        args.push("-vf".to_string());
        args.push(job.program.to_filter_string());

        args.extend([
            "-c:v".to_string(),
            self.config.video_codec.clone(),
            "-pix_fmt".to_string(),
            self.config.pixel_format.clone(),
            "-r".to_string(),
            job.fps.to_string(),
            "-preset".to_string(),
            self.config.preset.clone(),
            "-crf".to_string(),
            self.config.crf.to_string(),
            "-aspect".to_string(),
            job.aspect.clone(),
            "-an".to_string(),
        ]);

        args.push("-y".to_string());
        args.push(job.output.to_string_lossy().to_string());
        args
    }

    /// Parse encoded time from a `-progress` line (`out_time=HH:MM:SS.micros`).
    fn parse_progress(line: &str) -> Option<f64> {
        let time = line.trim().strip_prefix("out_time=")?;

        let parts: Vec<&str> = time.split(':').collect();
        if parts.len() != 3 {
            return None;
        }

        let hours: f64 = parts[0].parse().ok()?;
        let minutes: f64 = parts[1].parse().ok()?;
        let seconds: f64 = parts[2].parse().ok()?;
        let total = hours * 3600.0 + minutes * 60.0 + seconds;
        (total >= 0.0).then_some(total)
    }
}

impl Default for FfmpegEncoder {
    fn default() -> Self {
        Self::new(EncoderConfig::default())
    }
}

#[async_trait]
impl Encoder for FfmpegEncoder {
    async fn encode(&self, job: EncodeJob, progress: Option<ProgressCallback>) -> Result<()> {
        let args = self.build_args(&job);
        debug!("ffmpeg args: {:?}", args);

        let mut child = Command::new(&self.config.ffmpeg_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => ReelError::EncoderUnavailable(format!(
                    "{} not found in PATH",
                    self.config.ffmpeg_path
                )),
                _ => ReelError::Io(e),
            })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| ReelError::EncoderUnavailable("failed to capture ffmpeg stdout".into()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| ReelError::EncoderUnavailable("failed to capture ffmpeg stderr".into()))?;

        // Collect the stderr tail for error reports
        let stderr_handle = tokio::spawn(async move {
            let mut tail = VecDeque::with_capacity(DIAGNOSTIC_TAIL);
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                if line.contains("Error") || line.contains("Warning") {
                    warn!("ffmpeg: {}", line);
                } else {
                    debug!("ffmpeg: {}", line);
                }
                if tail.len() == DIAGNOSTIC_TAIL {
                    tail.pop_front();
                }
                tail.push_back(line);
            }
            Vec::from(tail).join("\n")
        });

        let duration = f64::from(job.duration_secs);
        let mut lines = BufReader::new(stdout).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if let (Some(cb), Some(secs)) = (progress.as_ref(), Self::parse_progress(&line)) {
                cb(RenderProgress::new(secs, duration));
            }
        }

        let status = child.wait().await?;
        let diagnostics = stderr_handle.await.unwrap_or_default();

        if !status.success() {
            return Err(ReelError::Encode {
                message: format!("ffmpeg exited with status: {status}"),
                diagnostics,
            });
        }

        if let Some(cb) = progress.as_ref() {
            cb(RenderProgress::new(duration, duration));
        }
        info!("Encoded {:?}", job.output);
        Ok(())
    }
}
