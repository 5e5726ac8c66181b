//! # ffmpeg Thumbnail Extractor Tests
//!
//! These tests swap the real `ffmpeg` for small shell scripts so the extractor's
//! process handling, scaling arguments and output encoding can be checked
//! without video fixtures.
#![cfg(unix)]

use anyhow::Result;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use httpmock::{Method, MockServer};
use media_export::providers::storage::gcs::GcsClient;
use media_export::providers::thumbnail::ffmpeg::FfmpegThumbnailExtractor;
use media_export::providers::ThumbnailExtractor;
use media_export::ExportError;
use serial_test::serial;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Writes an executable stand-in for ffmpeg that logs its arguments to
/// `args.txt` and then runs `body` with `$last` bound to the output path.
fn fake_ffmpeg(dir: &Path, body: &str) -> Result<PathBuf> {
    let script = dir.join("ffmpeg");
    let args_file = dir.join("args.txt");
    let content = format!(
        "#!/bin/sh\nprintf '%s\\n' \"$@\" > '{}'\nfor last; do :; done\n{body}\n",
        args_file.display()
    );
    std::fs::write(&script, content)?;
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755))?;
    Ok(script)
}

fn recorded_args(dir: &TempDir) -> Vec<String> {
    std::fs::read_to_string(dir.path().join("args.txt"))
        .unwrap_or_default()
        .lines()
        .map(String::from)
        .collect()
}

fn offline_gcs() -> GcsClient {
    GcsClient::new("http://127.0.0.1:9", None).unwrap()
}

#[tokio::test]
#[serial]
async fn test_local_source_is_passed_straight_to_ffmpeg() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let ffmpeg = fake_ffmpeg(dir.path(), "printf 'fake png' > \"$last\"")?;
    let extractor = FfmpegThumbnailExtractor::new(ffmpeg.to_string_lossy(), offline_gcs());

    let result = extractor
        .video_thumbnail_base64("/videos/in.mp4", "16:9")
        .await?;

    assert_eq!(
        result.thumbnail_base64_data,
        Some(STANDARD.encode("fake png"))
    );
    let args = recorded_args(&dir);
    assert_eq!(&args[..6], &["-ss", "0", "-i", "/videos/in.mp4", "-vframes", "1"]);
    assert!(args.contains(&"scale=640:360".to_string()));
    Ok(())
}

#[tokio::test]
#[serial]
async fn test_gcs_source_is_downloaded_first() -> Result<()> {
    let server = MockServer::start_async().await;
    let download = server
        .mock_async(|when, then| {
            when.method(Method::GET)
                .path("/storage/v1/b/media/o/v1.mp4")
                .query_param("alt", "media");
            then.status(200).body("video bytes");
        })
        .await;

    let dir = tempfile::tempdir()?;
    let ffmpeg = fake_ffmpeg(dir.path(), "printf 'fake png' > \"$last\"")?;
    let gcs = GcsClient::new(server.base_url(), None)?;
    let extractor = FfmpegThumbnailExtractor::new(ffmpeg.to_string_lossy(), gcs);

    let result = extractor
        .video_thumbnail_base64("gs://media/v1.mp4", "9:16")
        .await?;

    download.assert_async().await;
    assert!(result.thumbnail_base64_data.is_some());
    let args = recorded_args(&dir);
    assert!(args[3].ends_with("source.mp4"), "input was {}", args[3]);
    assert!(args.contains(&"scale=360:640".to_string()));
    Ok(())
}

#[tokio::test]
#[serial]
async fn test_failed_download_skips_ffmpeg() -> Result<()> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(Method::GET);
            then.status(404).body("No such object");
        })
        .await;

    let dir = tempfile::tempdir()?;
    let ffmpeg = fake_ffmpeg(dir.path(), "printf 'fake png' > \"$last\"")?;
    let extractor =
        FfmpegThumbnailExtractor::new(ffmpeg.to_string_lossy(), GcsClient::new(server.base_url(), None)?);

    let result = extractor
        .video_thumbnail_base64("gs://media/gone.mp4", "16:9")
        .await;

    assert!(matches!(result, Err(ExportError::Api { status: 404, .. })));
    assert!(recorded_args(&dir).is_empty());
    Ok(())
}

#[tokio::test]
#[serial]
async fn test_nonzero_exit_reports_stderr() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let ffmpeg = fake_ffmpeg(dir.path(), "echo 'Invalid data found' >&2\nexit 1")?;
    let extractor = FfmpegThumbnailExtractor::new(ffmpeg.to_string_lossy(), offline_gcs());

    let result = extractor.video_thumbnail_base64("/videos/in.mp4", "16:9").await;

    match result {
        Err(ExportError::Ffmpeg(stderr)) => assert_eq!(stderr, "Invalid data found"),
        other => panic!("expected an ffmpeg error, got {other:?}"),
    }
    Ok(())
}

#[tokio::test]
#[serial]
async fn test_empty_output_yields_no_data() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let ffmpeg = fake_ffmpeg(dir.path(), ": > \"$last\"")?;
    let extractor = FfmpegThumbnailExtractor::new(ffmpeg.to_string_lossy(), offline_gcs());

    let result = extractor.video_thumbnail_base64("/videos/in.mp4", "")
        .await?;

    assert!(result.thumbnail_base64_data.is_none());
    assert!(!recorded_args(&dir).contains(&"-vf".to_string()));
    Ok(())
}

#[tokio::test]
#[serial]
async fn test_missing_binary_is_an_io_error() {
    let extractor = FfmpegThumbnailExtractor::new("/nonexistent/ffmpeg", offline_gcs());

    let result = extractor.video_thumbnail_base64("/videos/in.mp4", "16:9").await;

    assert!(matches!(result, Err(ExportError::Io(_))));
}

#[tokio::test]
#[serial]
async fn test_blank_source_is_rejected() {
    let extractor = FfmpegThumbnailExtractor::new("/nonexistent/ffmpeg", offline_gcs());

    let result = extractor.video_thumbnail_base64("  ", "16:9").await;

    assert!(matches!(result, Err(ExportError::Thumbnail(_))));
}
