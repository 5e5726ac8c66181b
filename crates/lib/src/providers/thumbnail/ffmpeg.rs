//! # ffmpeg Thumbnail Extraction
//!
//! Grabs the first frame of a video with the `ffmpeg` binary, scaled to the
//! item's aspect ratio, and returns it as a base64 PNG.

use crate::{
    errors::ExportError,
    providers::{storage::gcs::GcsClient, thumbnail::ThumbnailExtractor},
    types::ThumbnailResult,
};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info};

/// Length in pixels of the long side of a generated thumbnail.
pub const THUMBNAIL_LONG_SIDE: u32 = 640;

/// Computes thumbnail dimensions for an aspect ratio such as `"16:9"`.
///
/// The long side is [`THUMBNAIL_LONG_SIDE`]; the short side is rounded down
/// to an even number, since most encoders reject odd frame sizes.
pub fn thumbnail_dimensions(ratio: &str) -> Option<(u32, u32)> {
    let (w, h) = ratio.split_once(':')?;
    let w: u32 = w.trim().parse().ok()?;
    let h: u32 = h.trim().parse().ok()?;
    if w == 0 || h == 0 {
        return None;
    }

    let short = |long_part: u32, short_part: u32| {
        let scaled = u64::from(THUMBNAIL_LONG_SIDE) * u64::from(short_part) / u64::from(long_part);
        ((scaled as u32) & !1).max(2)
    };
    Some(if w >= h {
        (THUMBNAIL_LONG_SIDE, short(w, h))
    } else {
        (short(h, w), THUMBNAIL_LONG_SIDE)
    })
}

fn ffmpeg_args(input: &str, output: &Path, dimensions: Option<(u32, u32)>) -> Vec<String> {
    let mut args = vec![
        "-ss".to_string(),
        "0".to_string(),
        "-i".to_string(),
        input.to_string(),
        "-vframes".to_string(),
        "1".to_string(),
    ];
    if let Some((width, height)) = dimensions {
        args.extend_from_slice(&["-vf".to_string(), format!("scale={width}:{height}")]);
    }
    args.extend_from_slice(&["-y".to_string(), output.to_string_lossy().to_string()]);
    args
}

/// Grabs the first frame of a video with the `ffmpeg` binary.
///
/// `gs://` sources are downloaded to a scratch directory first; anything else
/// (a local path or an http URL) is passed to ffmpeg as-is.
#[derive(Clone, Debug)]
pub struct FfmpegThumbnailExtractor {
    ffmpeg_path: String,
    gcs: GcsClient,
}

impl FfmpegThumbnailExtractor {
    pub fn new(ffmpeg_path: impl Into<String>, gcs: GcsClient) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
            gcs,
        }
    }
}

#[async_trait]
impl ThumbnailExtractor for FfmpegThumbnailExtractor {
    async fn video_thumbnail_base64(
        &self,
        source_uri: &str,
        aspect_ratio: &str,
    ) -> Result<ThumbnailResult, ExportError> {
        if source_uri.trim().is_empty() {
            return Err(ExportError::Thumbnail("video source URI is empty".to_string()));
        }

        // Removed when dropped, including on the error paths below.
        let work_dir = tempfile::tempdir()?;

        let input = if source_uri.starts_with("gs://") {
            let path = work_dir.path().join("source.mp4");
            self.gcs.download_to_file(source_uri, &path).await?;
            path.to_string_lossy().to_string()
        } else {
            source_uri.to_string()
        };

        let output_path = work_dir.path().join("thumbnail.png");
        let args = ffmpeg_args(&input, &output_path, thumbnail_dimensions(aspect_ratio));
        debug!(source_uri, ?args, "Running ffmpeg for thumbnail");

        let output = Command::new(&self.ffmpeg_path)
            .args(&args)
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExportError::Ffmpeg(stderr.trim().to_string()));
        }

        let png = tokio::fs::read(&output_path).await?;
        if png.is_empty() {
            info!(source_uri, "ffmpeg produced an empty thumbnail");
            return Ok(ThumbnailResult::default());
        }

        Ok(ThumbnailResult {
            thumbnail_base64_data: Some(STANDARD.encode(png)),
        })
    }
}
