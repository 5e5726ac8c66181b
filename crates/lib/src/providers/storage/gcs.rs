//! # Cloud Storage Client
//!
//! A thin `reqwest` client for the Cloud Storage JSON API: media uploads for
//! thumbnails and streamed media downloads for source videos.

use crate::{errors::ExportError, providers::storage::ObjectUploader, types::UploadResult};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::{Client as ReqwestClient, RequestBuilder, Url};
use std::path::Path;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

pub const DEFAULT_GCS_API_URL: &str = "https://storage.googleapis.com";

/// Splits a `gs://bucket/object` URI into its bucket and object name.
pub fn parse_gcs_uri(uri: &str) -> Result<(&str, &str), ExportError> {
    let rest = uri
        .strip_prefix("gs://")
        .ok_or_else(|| ExportError::InvalidGcsUri(uri.to_string()))?;
    match rest.split_once('/') {
        Some((bucket, object)) if !bucket.is_empty() && !object.is_empty() => Ok((bucket, object)),
        _ => Err(ExportError::InvalidGcsUri(uri.to_string())),
    }
}

/// Decodes standard base64, tolerating a `data:<mime>;base64,` prefix.
fn decode_base64_image(data: &str) -> Result<Vec<u8>, ExportError> {
    let encoded = match data.split_once(";base64,") {
        Some((prefix, rest)) if prefix.starts_with("data:") => rest,
        _ => data,
    };
    Ok(STANDARD.decode(encoded.trim())?)
}

/// A client for the Cloud Storage JSON API.
#[derive(Clone, Debug)]
pub struct GcsClient {
    client: ReqwestClient,
    api_url: String,
    access_token: Option<String>,
}

impl GcsClient {
    /// Creates a new `GcsClient` against `api_url` (normally [`DEFAULT_GCS_API_URL`]).
    pub fn new(api_url: impl Into<String>, access_token: Option<String>) -> Result<Self, ExportError> {
        let client = ReqwestClient::builder()
            .build()
            .map_err(ExportError::ReqwestClientBuild)?;
        Ok(Self {
            client,
            api_url: api_url.into(),
            access_token: access_token.filter(|t| !t.is_empty()),
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ExportError> {
        let mut url =
            Url::parse(&self.api_url).map_err(|e| ExportError::InvalidApiUrl(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| ExportError::InvalidApiUrl(self.api_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.access_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Stores raw bytes as `object_name` in `bucket`.
    pub async fn upload_bytes(
        &self,
        bucket: &str,
        object_name: &str,
        mime_type: &str,
        data: Vec<u8>,
    ) -> Result<UploadResult, ExportError> {
        if bucket.is_empty() || object_name.is_empty() {
            return Err(ExportError::Upload(
                "bucket and object name are required".to_string(),
            ));
        }

        let mut url = self.endpoint(&["upload", "storage", "v1", "b", bucket, "o"])?;
        url.query_pairs_mut()
            .append_pair("uploadType", "media")
            .append_pair("name", object_name);

        debug!(bucket, object_name, bytes = data.len(), "--> Uploading object");
        let response = self
            .authorize(self.client.post(url))
            .header(reqwest::header::CONTENT_TYPE, mime_type)
            .body(data)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!(bucket, object_name, %status, body = %body, "Cloud Storage rejected the upload");
            return Ok(UploadResult::default());
        }

        Ok(UploadResult {
            success: true,
            file_url: Some(format!("gs://{bucket}/{object_name}")),
        })
    }

    /// Streams the object behind a `gs://` URI into a new file at `destination`.
    /// Returns the number of bytes written.
    pub async fn download_to_file(&self, gs_uri: &str, destination: &Path) -> Result<u64, ExportError> {
        let (bucket, object) = parse_gcs_uri(gs_uri)?;
        let mut url = self.endpoint(&["storage", "v1", "b", bucket, "o", object])?;
        url.query_pairs_mut().append_pair("alt", "media");

        debug!(gs_uri, "--> Downloading object");
        let mut response = self.authorize(self.client.get(url)).send().await?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ExportError::Api { status, body });
        }

        let mut file = File::create(destination).await?;
        let mut written: u64 = 0;
        while let Some(chunk) = response.chunk().await? {
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;

        debug!(gs_uri, bytes = written, "<-- Download complete");
        Ok(written)
    }
}

#[async_trait]
impl ObjectUploader for GcsClient {
    async fn upload_base64_image(
        &self,
        base64_data: &str,
        bucket: &str,
        object_name: &str,
        mime_type: &str,
    ) -> Result<UploadResult, ExportError> {
        let data = decode_base64_image(base64_data)?;
        self.upload_bytes(bucket, object_name, mime_type, data).await
    }
}
