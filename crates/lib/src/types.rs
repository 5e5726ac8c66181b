use crate::errors::ExportError;
use crate::providers::{MetadataStore, ObjectUploader, ThumbnailExtractor};
use serde::{Deserialize, Serialize};
use std::fmt;

/// MIME type of uploaded video thumbnails.
pub const THUMBNAIL_MIME_TYPE: &str = "image/png";

/// The object name a video's thumbnail is uploaded under.
pub fn thumbnail_object_name(key: &str) -> String {
    format!("{key}_thumbnail.png")
}

/// What a thumbnail extractor produced for one video.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThumbnailResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_base64_data: Option<String>,
}

/// What an object uploader reported for one upload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
}

/// The final state of one item in a batch.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemStatus {
    /// The metadata record was written.
    Persisted {
        video_thumbnail_gcs_uri: Option<String>,
    },
    /// The metadata store rejected the record.
    Failed { reason: String },
}

/// A per-item report returned by [`AutoSaver::save_batch`].
#[derive(Debug, Clone, PartialEq)]
pub struct ItemOutcome {
    pub key: String,
    pub status: ItemStatus,
    /// Set when the thumbnail step failed. The item may still be persisted.
    pub thumbnail_error: Option<String>,
}

impl ItemOutcome {
    pub fn is_persisted(&self) -> bool {
        matches!(self.status, ItemStatus::Persisted { .. })
    }
}

/// Saves batches of generated media to the metadata store, attaching
/// uploaded thumbnails to videos when it can.
pub struct AutoSaver {
    pub(crate) metadata_store: Box<dyn MetadataStore>,
    pub(crate) thumbnail_extractor: Box<dyn ThumbnailExtractor>,
    pub(crate) object_uploader: Box<dyn ObjectUploader>,
    pub(crate) team_bucket: Option<String>,
}

impl fmt::Debug for AutoSaver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AutoSaver")
            .field("metadata_store", &self.metadata_store.name())
            .field("team_bucket", &self.team_bucket)
            .finish_non_exhaustive()
    }
}

impl Clone for AutoSaver {
    fn clone(&self) -> Self {
        Self {
            metadata_store: dyn_clone::clone_box(&*self.metadata_store),
            thumbnail_extractor: dyn_clone::clone_box(&*self.thumbnail_extractor),
            object_uploader: dyn_clone::clone_box(&*self.object_uploader),
            team_bucket: self.team_bucket.clone(),
        }
    }
}

/// A builder for creating `AutoSaver` instances.
#[derive(Default)]
pub struct AutoSaverBuilder {
    metadata_store: Option<Box<dyn MetadataStore>>,
    thumbnail_extractor: Option<Box<dyn ThumbnailExtractor>>,
    object_uploader: Option<Box<dyn ObjectUploader>>,
    team_bucket: Option<String>,
}

impl AutoSaverBuilder {
    /// Creates a new `AutoSaverBuilder`.
    ///
    /// # Examples
    ///
    /// ```
    /// use media_export::AutoSaverBuilder;
    ///
    /// let builder = AutoSaverBuilder::new();
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the store that receives one metadata record per item.
    pub fn metadata_store(mut self, store: Box<dyn MetadataStore>) -> Self {
        self.metadata_store = Some(store);
        self
    }

    /// Sets the extractor used to derive video thumbnails.
    pub fn thumbnail_extractor(mut self, extractor: Box<dyn ThumbnailExtractor>) -> Self {
        self.thumbnail_extractor = Some(extractor);
        self
    }

    /// Sets the uploader that stores thumbnails in the team bucket.
    pub fn object_uploader(mut self, uploader: Box<dyn ObjectUploader>) -> Self {
        self.object_uploader = Some(uploader);
        self
    }

    /// Sets the team bucket. A blank name leaves thumbnail uploads disabled.
    pub fn team_bucket(mut self, bucket: impl Into<String>) -> Self {
        let bucket = bucket.into();
        self.team_bucket = if bucket.trim().is_empty() {
            None
        } else {
            Some(bucket)
        };
        self
    }

    /// Builds the `AutoSaver`.
    ///
    /// Fails with `ExportError::MissingProvider` if any collaborator was not set.
    pub fn build(self) -> Result<AutoSaver, ExportError> {
        Ok(AutoSaver {
            metadata_store: self
                .metadata_store
                .ok_or(ExportError::MissingProvider("metadata store"))?,
            thumbnail_extractor: self
                .thumbnail_extractor
                .ok_or(ExportError::MissingProvider("thumbnail extractor"))?,
            object_uploader: self
                .object_uploader
                .ok_or(ExportError::MissingProvider("object uploader"))?,
            team_bucket: self.team_bucket,
        })
    }
}
