use chrono::{DateTime, Utc};
use media_export::{ExportFieldSelection, ExportFormPayload};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// The Firestore record written for one generated item.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MetadataDocument {
    pub id: String,
    /// `"image"` or `"video"`.
    pub media_type: String,
    pub format: String,
    pub gcs_uri: String,
    pub ratio: String,
    pub upscale_factor: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_thumbnail_gcs_uri: Option<String>,
    /// The selected export fields that the item actually carries.
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
    #[serde(with = "firestore::serialize_as_timestamp")]
    pub created_at: DateTime<Utc>,
}

impl MetadataDocument {
    /// Projects a payload onto the caller's field selection.
    ///
    /// Exported fields are looked up on the media item (core fields and extra
    /// attributes alike). Fields the item lacks, or that are null, are left out.
    pub fn from_payload(
        key: &str,
        payload: &ExportFormPayload,
        export_fields: &ExportFieldSelection,
        created_at: DateTime<Utc>,
    ) -> Self {
        let media = payload.media_to_export.media();
        let flattened = serde_json::to_value(media).unwrap_or(Value::Null);

        let fields = export_fields
            .exported_names()
            .filter_map(|name| {
                let value = match flattened.get(name)? {
                    Value::Null => return None,
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                Some((name.to_string(), value))
            })
            .collect();

        Self {
            id: key.to_string(),
            media_type: payload.media_to_export.kind().to_string(),
            format: media.format.clone(),
            gcs_uri: media.gcs_uri.clone(),
            ratio: media.ratio.clone(),
            upscale_factor: payload.upscale_factor.clone(),
            video_thumbnail_gcs_uri: payload.video_thumbnail_gcs_uri.clone(),
            fields,
            created_at,
        }
    }
}
