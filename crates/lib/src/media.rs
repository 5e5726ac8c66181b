//! # Media Data Model
//!
//! Generated images and videos as they arrive from the generation front-end,
//! the caller's export field selection, and the per-item payload handed to the
//! metadata store.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// The `format` value that marks a generated item as a video.
pub const VIDEO_FORMAT: &str = "MP4";

/// The flat wire shape shared by generated images and videos.
///
/// Any attribute beyond the ones the export pipeline reads (prompt, model
/// version, dimensions, ...) is kept in `attributes` and written back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedMedia {
    /// The unique identifier of the item. Used as the metadata document id.
    pub key: String,
    /// The format discriminant, e.g. `"PNG"` or `"MP4"`.
    pub format: String,
    /// Where the generated file lives, usually a `gs://` URI.
    pub gcs_uri: String,
    /// The aspect ratio, e.g. `"16:9"`.
    #[serde(default)]
    pub ratio: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upscale_factor: Option<String>,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl GeneratedMedia {
    pub fn new(
        key: impl Into<String>,
        format: impl Into<String>,
        gcs_uri: impl Into<String>,
        ratio: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            format: format.into(),
            gcs_uri: gcs_uri.into(),
            ratio: ratio.into(),
            upscale_factor: None,
            attributes: Map::new(),
        }
    }

    pub fn with_upscale_factor(mut self, upscale_factor: impl Into<String>) -> Self {
        self.upscale_factor = Some(upscale_factor.into());
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }
}

/// The two kinds of generated media.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    /// Classifies a `format` value. Only an exact `"MP4"` is a video.
    pub fn from_format(format: &str) -> Self {
        if format == VIDEO_FORMAT {
            MediaKind::Video
        } else {
            MediaKind::Image
        }
    }

    /// A lowercase label, as stored in metadata records.
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A generated image or video.
///
/// The wrapped media is read-only, so the kind is always the one its
/// `format` names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "GeneratedMedia", into = "GeneratedMedia")]
pub struct MediaItem {
    media: GeneratedMedia,
}

impl From<GeneratedMedia> for MediaItem {
    fn from(media: GeneratedMedia) -> Self {
        Self { media }
    }
}

impl From<MediaItem> for GeneratedMedia {
    fn from(item: MediaItem) -> Self {
        item.media
    }
}

impl MediaItem {
    pub fn media(&self) -> &GeneratedMedia {
        &self.media
    }

    pub fn key(&self) -> &str {
        &self.media.key
    }

    pub fn kind(&self) -> MediaKind {
        MediaKind::from_format(&self.media.format)
    }

    pub fn is_video(&self) -> bool {
        self.kind() == MediaKind::Video
    }

    /// The media, when this item is a video.
    pub fn as_video(&self) -> Option<&GeneratedMedia> {
        match self.kind() {
            MediaKind::Video => Some(&self.media),
            MediaKind::Image => None,
        }
    }
}

fn default_exported() -> bool {
    true
}

/// How a single metadata field is exported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportFieldSpec {
    #[serde(default)]
    pub label: String,
    #[serde(default = "default_exported")]
    pub is_exported: bool,
}

/// The caller's selection of metadata fields to export, keyed by field name.
///
/// The batch saver never inspects it; it goes to the metadata store as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExportFieldSelection {
    fields: BTreeMap<String, ExportFieldSpec>,
}

impl ExportFieldSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an exported field.
    pub fn with_field(mut self, name: impl Into<String>, label: impl Into<String>) -> Self {
        self.fields.insert(
            name.into(),
            ExportFieldSpec {
                label: label.into(),
                is_exported: true,
            },
        );
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, spec: ExportFieldSpec) {
        self.fields.insert(name.into(), spec);
    }

    pub fn get(&self, name: &str) -> Option<&ExportFieldSpec> {
        self.fields.get(name)
    }

    /// Names of the fields marked for export, in name order.
    pub fn exported_names(&self) -> impl Iterator<Item = &str> {
        self.fields
            .iter()
            .filter(|(_, spec)| spec.is_exported)
            .map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// The form data persisted for one item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportFormPayload {
    pub media_to_export: MediaItem,
    pub upscale_factor: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_thumbnail_gcs_uri: Option<String>,
}

impl ExportFormPayload {
    /// Builds a fresh payload for `item` with no thumbnail reference.
    pub fn for_item(item: &MediaItem) -> Self {
        Self {
            media_to_export: item.clone(),
            upscale_factor: item.media().upscale_factor.clone().unwrap_or_default(),
            video_thumbnail_gcs_uri: None,
        }
    }
}
