//! # Media Export
//!
//! This crate saves batches of generated images and videos to a metadata store.
//! Each item gets exactly one attempt; videos are enriched with an uploaded
//! thumbnail when a team bucket is configured. Failures are logged per item
//! and never abort the batch.

pub mod errors;
pub mod media;
pub mod providers;
pub mod types;

pub use errors::ExportError;
pub use media::{
    ExportFieldSelection, ExportFieldSpec, ExportFormPayload, GeneratedMedia, MediaItem, MediaKind,
};
pub use types::{AutoSaver, AutoSaverBuilder, ItemOutcome, ItemStatus, ThumbnailResult, UploadResult};

use tracing::{debug, info, warn};
use types::{thumbnail_object_name, THUMBNAIL_MIME_TYPE};

impl AutoSaver {
    /// Saves every item in `items` to the metadata store, one at a time.
    ///
    /// This is fire-and-forget: nothing is returned and no error escapes. Use
    /// [`AutoSaver::save_batch`] to get a per-item report instead.
    pub async fn auto_save_media_batch(
        &self,
        items: &[MediaItem],
        export_fields: Option<&ExportFieldSelection>,
    ) {
        self.save_batch(items, export_fields).await;
    }

    /// Saves every item in `items` and reports what happened to each one.
    ///
    /// Returns an empty report without touching any collaborator when `items`
    /// is empty or `export_fields` is absent.
    pub async fn save_batch(
        &self,
        items: &[MediaItem],
        export_fields: Option<&ExportFieldSelection>,
    ) -> Vec<ItemOutcome> {
        let Some(export_fields) = export_fields else {
            debug!("[auto_save] No export fields provided; skipping batch.");
            return Vec::new();
        };
        if items.is_empty() {
            return Vec::new();
        }

        info!(
            items = items.len(),
            store = self.metadata_store.name(),
            "[auto_save] Saving media batch."
        );

        let mut outcomes = Vec::with_capacity(items.len());
        for item in items {
            outcomes.push(self.save_item(item, export_fields).await);
        }

        let persisted = outcomes.iter().filter(|o| o.is_persisted()).count();
        info!(
            persisted,
            failed = outcomes.len() - persisted,
            "[auto_save] Batch finished."
        );
        outcomes
    }

    async fn save_item(&self, item: &MediaItem, export_fields: &ExportFieldSelection) -> ItemOutcome {
        let mut payload = ExportFormPayload::for_item(item);
        let mut thumbnail_error = None;

        if let Some(video) = item.as_video() {
            match self.upload_video_thumbnail(video).await {
                Ok(uri) => payload.video_thumbnail_gcs_uri = uri,
                Err(e) => {
                    warn!(key = %video.key, error = %e, "Auto-save thumbnail generation failed");
                    thumbnail_error = Some(e.to_string());
                }
            }
        }

        let status = match self
            .metadata_store
            .add_entry(item.key(), &payload, export_fields)
            .await
        {
            Ok(()) => {
                debug!(key = item.key(), "[auto_save] Metadata saved.");
                ItemStatus::Persisted {
                    video_thumbnail_gcs_uri: payload.video_thumbnail_gcs_uri,
                }
            }
            Err(e) => {
                warn!(key = item.key(), error = %e, "Auto-save failed for media");
                ItemStatus::Failed {
                    reason: e.to_string(),
                }
            }
        };

        ItemOutcome {
            key: item.key().to_string(),
            status,
            thumbnail_error,
        }
    }

    /// Extracts and uploads the thumbnail for `video`, returning its file URL.
    ///
    /// `Ok(None)` covers every non-error reason for not having one: no image
    /// data, no team bucket, or an upload the service did not accept.
    async fn upload_video_thumbnail(
        &self,
        video: &GeneratedMedia,
    ) -> Result<Option<String>, ExportError> {
        let thumbnail = self
            .thumbnail_extractor
            .video_thumbnail_base64(&video.gcs_uri, &video.ratio)
            .await?;

        let data = thumbnail.thumbnail_base64_data.filter(|d| !d.is_empty());
        let (Some(data), Some(bucket)) = (data, self.team_bucket.as_deref()) else {
            debug!(key = %video.key, "[auto_save] No thumbnail data or team bucket; skipping upload.");
            return Ok(None);
        };

        let upload = self
            .object_uploader
            .upload_base64_image(&data, bucket, &thumbnail_object_name(&video.key), THUMBNAIL_MIME_TYPE)
            .await?;

        Ok(match upload {
            UploadResult {
                success: true,
                file_url: Some(url),
            } if !url.is_empty() => Some(url),
            _ => None,
        })
    }
}
