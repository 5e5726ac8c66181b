//! # Application Configuration
//!
//! This module defines the configuration for the `media-export` CLI and loads
//! it from an optional `config.yml` file layered under environment variables.

use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use media_export::providers::storage::gcs::DEFAULT_GCS_API_URL;
use media_export_firebase::DEFAULT_COLLECTION;
use regex::Regex;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;
use tracing::info;

/// The config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_PATH: &str = "config.yml";

/// Service-account key file the project id can be inferred from.
pub const GCP_CREDENTIALS_PATH: &str = "gcp_creds.json";

/// A custom error type for configuration issues.
#[derive(Debug)]
pub enum ConfigError {
    /// Indicates an error from the underlying `config` crate.
    General(String),
    /// Indicates a required configuration file was not found.
    NotFound(String),
    /// Indicates a required value was not set anywhere.
    Missing(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::General(msg) => write!(f, "Configuration error: {msg}"),
            ConfigError::NotFound(msg) => write!(f, "{msg}"),
            ConfigError::Missing(key) => write!(f, "Missing required configuration value: {key}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::General(err.to_string())
    }
}

/// The root configuration structure, mapping directly to `config.yml`.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// The Google Cloud project holding the Firestore database. Loaded from `PROJECT_ID`.
    #[serde(default)]
    pub project_id: String,
    /// The Firestore collection export records are written to.
    pub collection: String,
    /// The bucket video thumbnails are uploaded to. Loaded from `TEAM_BUCKET`.
    #[serde(default)]
    pub team_bucket: Option<String>,
    /// The ffmpeg binary used for thumbnail extraction.
    pub ffmpeg_path: String,
    /// Base URL of the Cloud Storage JSON API.
    pub gcs_api_url: String,
    /// An OAuth access token sent to Cloud Storage as a bearer token.
    #[serde(default)]
    pub gcs_access_token: Option<String>,
}

impl AppConfig {
    /// Returns the project id, which is only required when writing to Firestore.
    pub fn require_project_id(&self) -> Result<&str, ConfigError> {
        if self.project_id.is_empty() {
            return Err(ConfigError::Missing(
                "project_id (set PROJECT_ID or provide gcp_creds.json)".to_string(),
            ));
        }
        Ok(&self.project_id)
    }
}

// Helper to read a file, substitute env vars, and return its content.
// Returns Ok(None) if the file does not exist, or an error if it fails to read.
fn read_and_substitute(path: &str) -> Result<Option<String>, ConfigError> {
    if !Path::new(path).exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path)
        .map_err(|e| ConfigError::General(format!("Failed to read config file '{path}': {e}")))?;

    let re = Regex::new(r"\$\{(?P<var>[A-Z0-9_]+)\}")
        .map_err(|e| ConfigError::General(e.to_string()))?;
    let expanded_content = re.replace_all(&content, |caps: &regex::Captures| {
        let var_name = &caps["var"];
        env::var(var_name).unwrap_or_default()
    });

    Ok(Some(expanded_content.to_string()))
}

/// Reads `project_id` from a service-account key file, if there is one.
fn infer_project_id(path: &str) -> Option<String> {
    let content = fs::read_to_string(path).ok()?;
    let json: serde_json::Value = serde_json::from_str(&content).ok()?;
    json["project_id"].as_str().map(String::from)
}

/// Loads the application configuration from a file and environment variables.
///
/// - Defaults cover everything except `project_id` and `team_bucket`.
/// - The YAML file may reference environment variables as `${VAR}`.
/// - Top-level keys are overridden by plain variables (`TEAM_BUCKET`), and
///   those by `MEDIA_EXPORT_`-prefixed ones (`MEDIA_EXPORT_TEAM_BUCKET`).
pub fn get_config(config_path_override: Option<&str>) -> Result<AppConfig, ConfigError> {
    let mut builder = ConfigBuilder::builder()
        // Layer 1: Programmatic defaults.
        .set_default("collection", DEFAULT_COLLECTION)?
        .set_default("ffmpeg_path", "ffmpeg")?
        .set_default("gcs_api_url", DEFAULT_GCS_API_URL)?;

    // Layer 2: Config file. Only an explicitly requested file is mandatory.
    let config_path = config_path_override.unwrap_or(DEFAULT_CONFIG_PATH);
    match read_and_substitute(config_path)? {
        Some(content) => {
            info!("Loading configuration from '{config_path}'.");
            builder = builder.add_source(File::from_str(&content, FileFormat::Yaml));
        }
        None if config_path_override.is_some() => {
            return Err(ConfigError::NotFound(format!(
                "Config file not found at '{config_path}'."
            )));
        }
        None => {}
    }

    let settings = builder
        // Layer 3: Environment variables for top-level keys like TEAM_BUCKET.
        .add_source(Environment::default())
        // Layer 4: Prefixed environment variables.
        .add_source(
            Environment::with_prefix("MEDIA_EXPORT")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    let mut config: AppConfig = settings.try_deserialize()?;

    config.team_bucket = config.team_bucket.filter(|b| !b.trim().is_empty());
    config.gcs_access_token = config.gcs_access_token.filter(|t| !t.is_empty());
    if config.project_id.is_empty() {
        if let Some(project_id) = infer_project_id(GCP_CREDENTIALS_PATH) {
            info!("Inferred project ID '{project_id}' from {GCP_CREDENTIALS_PATH}.");
            config.project_id = project_id;
        }
    }

    Ok(config)
}
