use thiserror::Error;

/// Custom error types for the media export pipeline.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Metadata store error: {0}")]
    Store(String),
    #[error("Thumbnail extraction failed: {0}")]
    Thumbnail(String),
    #[error("Upload failed: {0}")]
    Upload(String),
    #[error("Failed to build Reqwest client: {0}")]
    ReqwestClientBuild(reqwest::Error),
    #[error("Request to Cloud Storage failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Cloud Storage API returned {status}: {body}")]
    Api { status: u16, body: String },
    #[error("Invalid Cloud Storage API URL: {0}")]
    InvalidApiUrl(String),
    #[error("Invalid Cloud Storage URI: {0}")]
    InvalidGcsUri(String),
    #[error("Invalid base64 image data: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("ffmpeg failed: {0}")]
    Ffmpeg(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Missing collaborator: {0}")]
    MissingProvider(&'static str),
}
