use crate::config::AppConfig;
use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::Parser;
use media_export::providers::storage::gcs::GcsClient;
use media_export::providers::thumbnail::ffmpeg::FfmpegThumbnailExtractor;
use media_export::providers::MetadataStore;
use media_export::{
    AutoSaverBuilder, ExportError, ExportFieldSelection, ExportFormPayload, ItemOutcome,
    ItemStatus, MediaItem,
};
use media_export_firebase::FirestoreMetadataStore;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;
use tracing::info;

#[derive(Parser, Debug)]
pub struct SaveArgs {
    /// JSON file holding an array of generated images and videos
    #[arg(long, required = true)]
    items: String,
    /// JSON file mapping exported field names to their settings. Without it nothing is saved.
    #[arg(long)]
    fields: Option<String>,
    /// Bucket for video thumbnails, overriding TEAM_BUCKET
    #[arg(long)]
    team_bucket: Option<String>,
    /// Log the records instead of writing them to Firestore
    #[arg(long)]
    dry_run: bool,
}

/// A metadata store that only logs what it would write.
#[derive(Clone, Debug)]
pub struct DryRunStore;

#[async_trait]
impl MetadataStore for DryRunStore {
    fn name(&self) -> &str {
        "DryRun"
    }

    async fn add_entry(
        &self,
        key: &str,
        payload: &ExportFormPayload,
        export_fields: &ExportFieldSelection,
    ) -> Result<(), ExportError> {
        info!(
            key,
            thumbnail = payload.video_thumbnail_gcs_uri.as_deref().unwrap_or("-"),
            fields = export_fields.len(),
            "[dry-run] Would save metadata record."
        );
        Ok(())
    }
}

fn read_json<T: DeserializeOwned>(path: &str) -> Result<T> {
    let content = fs::read_to_string(Path::new(path))
        .with_context(|| format!("Failed to read '{path}'"))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse '{path}'"))
}

fn summary_line(outcome: &ItemOutcome) -> String {
    let mut line = match &outcome.status {
        ItemStatus::Persisted {
            video_thumbnail_gcs_uri: Some(uri),
        } => format!("✅ {} (thumbnail: {uri})", outcome.key),
        ItemStatus::Persisted { .. } => format!("✅ {}", outcome.key),
        ItemStatus::Failed { reason } => format!("❌ {}: {reason}", outcome.key),
    };
    if let Some(error) = &outcome.thumbnail_error {
        line.push_str(&format!(" [thumbnail skipped: {error}]"));
    }
    line
}

pub async fn handle_save(args: &SaveArgs, config: &AppConfig) -> Result<()> {
    let items: Vec<MediaItem> = read_json(&args.items)?;
    let export_fields: Option<ExportFieldSelection> =
        args.fields.as_deref().map(read_json).transpose()?;
    info!("Loaded {} items from '{}'.", items.len(), args.items);

    let store: Box<dyn MetadataStore> = if args.dry_run {
        Box::new(DryRunStore)
    } else {
        let project_id = config.require_project_id()?;
        Box::new(FirestoreMetadataStore::new(project_id, config.collection.clone()).await?)
    };

    let gcs = GcsClient::new(config.gcs_api_url.clone(), config.gcs_access_token.clone())?;
    let extractor = FfmpegThumbnailExtractor::new(config.ffmpeg_path.clone(), gcs.clone());

    let mut builder = AutoSaverBuilder::new()
        .metadata_store(store)
        .thumbnail_extractor(Box::new(extractor))
        .object_uploader(Box::new(gcs));
    if let Some(bucket) = args.team_bucket.as_ref().or(config.team_bucket.as_ref()) {
        builder = builder.team_bucket(bucket.clone());
    }
    let saver = builder.build()?;

    if export_fields.is_none() {
        println!("No export fields given; nothing to save.");
    }

    let outcomes = saver.save_batch(&items, export_fields.as_ref()).await;
    for outcome in &outcomes {
        println!("{}", summary_line(outcome));
    }

    let persisted = outcomes.iter().filter(|o| o.is_persisted()).count();
    if !outcomes.is_empty() {
        println!("Saved {persisted} of {} items.", outcomes.len());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_line_variants() {
        let saved = ItemOutcome {
            key: "v1".to_string(),
            status: ItemStatus::Persisted {
                video_thumbnail_gcs_uri: Some("gs://team/v1_thumbnail.png".to_string()),
            },
            thumbnail_error: None,
        };
        assert_eq!(
            summary_line(&saved),
            "✅ v1 (thumbnail: gs://team/v1_thumbnail.png)"
        );

        let failed = ItemOutcome {
            key: "i2".to_string(),
            status: ItemStatus::Failed {
                reason: "denied".to_string(),
            },
            thumbnail_error: None,
        };
        assert_eq!(summary_line(&failed), "❌ i2: denied");

        let no_thumbnail = ItemOutcome {
            key: "v3".to_string(),
            status: ItemStatus::Persisted {
                video_thumbnail_gcs_uri: None,
            },
            thumbnail_error: Some("ffmpeg failed".to_string()),
        };
        assert_eq!(
            summary_line(&no_thumbnail),
            "✅ v3 [thumbnail skipped: ffmpeg failed]"
        );
    }

    #[test]
    fn test_read_json_reports_the_path() {
        let err = read_json::<Vec<MediaItem>>("/nonexistent/items.json").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/items.json"));
    }

    #[tokio::test]
    async fn test_dry_run_store_accepts_everything() {
        let item: MediaItem = serde_json::from_str(
            r#"{"key": "i1", "format": "PNG", "gcsUri": "gs://b/i1.png", "ratio": "1:1"}"#,
        )
        .unwrap();
        let payload = ExportFormPayload::for_item(&item);

        let result = DryRunStore
            .add_entry("i1", &payload, &ExportFieldSelection::new())
            .await;

        assert!(result.is_ok());
    }
}
