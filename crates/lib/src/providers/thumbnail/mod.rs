pub mod ffmpeg;

use crate::errors::ExportError;
use crate::types::ThumbnailResult;
use async_trait::async_trait;
use dyn_clone::DynClone;
use std::fmt::Debug;

/// A trait for deriving a still preview image from a video.
#[async_trait]
pub trait ThumbnailExtractor: Send + Sync + DynClone + Debug {
    /// Returns a base64-encoded PNG taken from the video at `source_uri`,
    /// sized for `aspect_ratio` (e.g. `"16:9"`).
    async fn video_thumbnail_base64(
        &self,
        source_uri: &str,
        aspect_ratio: &str,
    ) -> Result<ThumbnailResult, ExportError>;
}

dyn_clone::clone_trait_object!(ThumbnailExtractor);
