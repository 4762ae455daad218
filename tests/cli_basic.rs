//! Integration tests for basic CLI behavior.
//!
//! Tests that the binary exists, accepts standard flags, and the offline
//! subcommands (`captions`, `filter`) produce the expected output.

#![allow(deprecated)] // cargo_bin deprecation — replacement not yet stable

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;

const AD_COPY: &str = "\
**Scene 1: 0-3 seconds**
**Visual:** Close-up of the mug
**Voiceover:** Your mornings, upgraded

**Scene 2: 3-6 seconds**
**Visual:** Steam rising
**Voiceover:** Hand glazed stoneware that keeps coffee hot for hours
";

/// Helper: get a Command for the `adreel` binary with an isolated config dir.
fn adreel(config_home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("adreel").expect("binary 'adreel' should be built");
    cmd.env("XDG_CONFIG_HOME", config_home)
        .env("HOME", config_home)
        .env_remove("RUST_LOG")
        .env_remove("GEMINI_API_KEY");
    cmd
}

fn write_copy(dir: &Path, text: &str) -> std::path::PathBuf {
    let path = dir.join("copy.txt");
    std::fs::write(&path, text).unwrap();
    path
}

// ─── Top-level flags ─────────────────────────────────────────────────────────

#[test]
fn help_flag_shows_usage() {
    let home = tempfile::tempdir().unwrap();
    adreel(home.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage: adreel"))
        .stdout(predicate::str::contains("captions"))
        .stdout(predicate::str::contains("filter"))
        .stdout(predicate::str::contains("render"))
        .stdout(predicate::str::contains("scrape"));
}

#[test]
fn version_flag_shows_semver() {
    let home = tempfile::tempdir().unwrap();
    adreel(home.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"^adreel \d+\.\d+\.\d+\n$").unwrap());
}

#[test]
fn no_subcommand_fails() {
    let home = tempfile::tempdir().unwrap();
    adreel(home.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn render_help_lists_flags() {
    let home = tempfile::tempdir().unwrap();
    adreel(home.path())
        .args(["render", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--image"))
        .stdout(predicate::str::contains("--text"))
        .stdout(predicate::str::contains("--output-dir"));
}

#[test]
fn scrape_help_lists_generate_flag() {
    let home = tempfile::tempdir().unwrap();
    adreel(home.path())
        .args(["scrape", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--generate-ad"));
}

// ─── captions ────────────────────────────────────────────────────────────────

#[test]
fn captions_lists_wrapped_cues() {
    let home = tempfile::tempdir().unwrap();
    let copy = write_copy(home.path(), AD_COPY);

    adreel(home.path())
        .arg("captions")
        .arg(&copy)
        .assert()
        .success()
        .stdout(predicate::str::contains("Your mornings, upgraded"))
        .stdout(predicate::str::contains("Hand glazed stoneware that"))
        .stdout(predicate::str::contains("y=0.3"))
        .stdout(predicate::str::contains("y=0.5"));
}

#[test]
fn captions_json_reports_source_and_alpha() {
    let home = tempfile::tempdir().unwrap();
    let copy = write_copy(home.path(), AD_COPY);

    let output = adreel(home.path())
        .args(["captions", "--json"])
        .arg(&copy)
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["source"]["structured"], "scene-voiceover");
    let cues = json["cues"].as_array().unwrap();
    assert_eq!(cues.len(), 2);
    assert_eq!(cues[0]["text"], "Your mornings, upgraded");
    assert_eq!(cues[1]["start_secs"], 3.0);
    assert_eq!(cues[1]["alpha"]["fade_in_end"], 3.5);
}

#[test]
fn captions_reads_stdin() {
    let home = tempfile::tempdir().unwrap();
    adreel(home.path())
        .args(["captions", "--json", "-"])
        .write_stdin("Buy now")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"synthesized\""));
}

#[test]
fn captions_missing_file_fails() {
    let home = tempfile::tempdir().unwrap();
    adreel(home.path())
        .args(["captions", "/nonexistent/copy.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read"));
}

// ─── filter ──────────────────────────────────────────────────────────────────

#[test]
fn filter_prints_single_program() {
    let home = tempfile::tempdir().unwrap();
    let copy = write_copy(home.path(), AD_COPY);

    adreel(home.path())
        .arg("filter")
        .arg(&copy)
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "scale=720:1280:force_original_aspect_ratio=increase,crop=720:1280,drawtext=",
        ))
        .stdout(predicate::str::contains("enable='between(t,0,3)'"))
        .stdout(predicate::str::contains("enable='between(t,3,6)'"));
}

#[test]
fn filter_uses_configured_font() {
    let home = tempfile::tempdir().unwrap();
    let config_dir = home.path().join("adreel");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(config_dir.join("config.toml"), "font_file = \"/fonts/Inter.ttf\"\n").unwrap();
    let copy = write_copy(home.path(), AD_COPY);

    adreel(home.path())
        .arg("filter")
        .arg(&copy)
        .assert()
        .success()
        .stdout(predicate::str::contains("fontfile=/fonts/Inter.ttf:"));
}

// ─── render / scrape failures ────────────────────────────────────────────────

#[test]
fn render_without_ffmpeg_fails_early() {
    let home = tempfile::tempdir().unwrap();
    let config_dir = home.path().join("adreel");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(config_dir.join("config.toml"), "ffmpeg_path = \"/nonexistent/ffmpeg\"\n").unwrap();
    let copy = write_copy(home.path(), AD_COPY);

    adreel(home.path())
        .args(["render", "--image", "https://cdn.example.com/mug.jpg", "--text"])
        .arg(&copy)
        .arg("--output-dir")
        .arg(home.path().join("videos"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("ffmpeg not found"));

    assert!(!home.path().join("videos").exists());
}

#[test]
fn scrape_rejects_invalid_url() {
    let home = tempfile::tempdir().unwrap();
    adreel(home.path())
        .args(["scrape", "not a url"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid URL"));
}

#[test]
fn scrape_with_generation_does_not_require_ffmpeg_up_front() {
    let home = tempfile::tempdir().unwrap();
    let config_dir = home.path().join("adreel");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(config_dir.join("config.toml"), "ffmpeg_path = \"/nonexistent/ffmpeg\"\n").unwrap();

    adreel(home.path())
        .args(["scrape", "--generate-ad", "not a url"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid URL"))
        .stderr(predicate::str::contains("ffmpeg not found").not());
}
