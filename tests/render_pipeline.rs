//! End-to-end render orchestration with in-process fakes.
//!
//! No network and no ffmpeg: the fetcher writes a placeholder image and the
//! encoder either writes a placeholder video or fails like ffmpeg would.

use std::path::Path;
use std::sync::{Arc, Mutex};

use adreel::reel::{
    CaptionCue, CaptionExtractor, EncodeJob, Encoder, ProgressCallback, ReelConfig, ReelError,
    RenderProgress, Renderer, SourceFetcher,
};
use async_trait::async_trait;

const AD_COPY: &str = "**Scene 1: 0-3 seconds**:\n**Voiceover:** Buy now!\n**Scene 2: 3-6 seconds**:\n**Voiceover:** Great value";

struct PlaceholderImage;

#[async_trait]
impl SourceFetcher for PlaceholderImage {
    async fn fetch_to(&self, _url: &str, dest: &Path) -> adreel::reel::Result<()> {
        tokio::fs::write(dest, b"\xff\xd8\xff\xe0").await?;
        Ok(())
    }
}

/// Captures the job it was given and reports halfway progress.
#[derive(Default)]
struct FakeEncoder {
    fail_with: Option<&'static str>,
    seen: Arc<Mutex<Vec<(String, String)>>>,
}

#[async_trait]
impl Encoder for FakeEncoder {
    async fn encode(&self, job: EncodeJob, progress: Option<ProgressCallback>) -> adreel::reel::Result<()> {
        self.seen
            .lock()
            .unwrap()
            .push((job.program.to_filter_string(), job.aspect.clone()));
        tokio::fs::write(&job.output, b"partial mp4").await?;
        if let Some(report) = progress {
            report(RenderProgress::new(7.5, f64::from(job.duration_secs)));
        }
        match self.fail_with {
            Some(diagnostics) => Err(ReelError::Encode {
                message: "ffmpeg exited with status: exit status: 1".to_string(),
                diagnostics: diagnostics.to_string(),
            }),
            None => Ok(()),
        }
    }
}

fn renderer(root: &Path, encoder: FakeEncoder) -> Renderer {
    Renderer::new(
        ReelConfig::default(),
        root.join("videos"),
        Box::new(PlaceholderImage),
        Box::new(encoder),
    )
    .with_temp_dir(root.join("tmp"))
}

fn entries(dir: &Path) -> usize {
    std::fs::read_dir(dir).map(Iterator::count).unwrap_or(0)
}

#[tokio::test]
async fn scene_copy_renders_two_captions() {
    let root = tempfile::tempdir().unwrap();
    let cues = CaptionExtractor::new(&ReelConfig::default()).extract(AD_COPY);
    assert_eq!(
        cues,
        vec![CaptionCue::new("Buy now!", 0.0, 3.0), CaptionCue::new("Great value", 3.0, 6.0)]
    );

    let seen = Arc::new(Mutex::new(Vec::new()));
    let encoder = FakeEncoder { fail_with: None, seen: seen.clone() };
    let progress = Arc::new(Mutex::new(Vec::new()));
    let sink = progress.clone();

    let artifact = renderer(root.path(), encoder)
        .render(
            "https://cdn.example.com/mug.jpg",
            &cues,
            Some(Box::new(move |p: RenderProgress| sink.lock().unwrap().push(p.percent))),
        )
        .await
        .unwrap();

    assert!(artifact.video_path.starts_with("/videos/"));
    assert!(artifact.video_path.ends_with(".mp4"));
    assert!(artifact.local_path.exists());
    assert_eq!(entries(&root.path().join("tmp")), 0);
    assert_eq!(*progress.lock().unwrap(), vec![50.0]);

    let seen = seen.lock().unwrap();
    let (program, aspect) = &seen[0];
    assert_eq!(aspect, "9:16");
    assert_eq!(program.matches("drawtext=").count(), 2);
    assert!(program.contains("text=Buy now!"));
    assert!(program.contains("text=Great value"));
}

#[tokio::test]
async fn encoder_failure_leaves_no_files() {
    let root = tempfile::tempdir().unwrap();
    let encoder = FakeEncoder {
        fail_with: Some("[Parsed_drawtext_2] Cannot find a valid font for the family Sans"),
        ..FakeEncoder::default()
    };
    let cues = CaptionExtractor::default().extract(AD_COPY);

    let err = renderer(root.path(), encoder)
        .render("https://cdn.example.com/mug.jpg", &cues, None)
        .await
        .unwrap_err();

    assert!(matches!(err, ReelError::Encode { .. }));
    assert!(err.to_string().contains("Cannot find a valid font"));
    assert_eq!(entries(&root.path().join("tmp")), 0);
    assert_eq!(entries(&root.path().join("videos")), 0);
}

#[tokio::test]
async fn concurrent_renders_get_distinct_outputs() {
    let root = tempfile::tempdir().unwrap();
    let cues = vec![CaptionCue::new("Limited stock", 0.0, 3.0)];
    let a = renderer(root.path(), FakeEncoder::default());
    let b = renderer(root.path(), FakeEncoder::default());

    let (first, second) = tokio::join!(
        a.render("https://cdn.example.com/a.jpg", &cues, None),
        b.render("https://cdn.example.com/b.jpg", &cues, None),
    );

    let (first, second) = (first.unwrap(), second.unwrap());
    assert_ne!(first.filename, second.filename);
    assert_eq!(entries(&root.path().join("videos")), 2);
}
