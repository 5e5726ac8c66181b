//! # `media-export-firebase`: Firestore Metadata Store
//!
//! This crate stores export records in Google Firestore. It implements the
//! `MetadataStore` trait from the core `media-export` library, writing one
//! document per generated item keyed by the item's key.

pub mod document;

pub use document::MetadataDocument;

use async_trait::async_trait;
use chrono::Utc;
use firestore::FirestoreDb;
use media_export::providers::MetadataStore;
use media_export::{ExportError, ExportFieldSelection, ExportFormPayload};
use std::{fmt, path::Path};
use thiserror::Error;
use tracing::{debug, info};

/// The collection export records go to unless configured otherwise.
pub const DEFAULT_COLLECTION: &str = "metadata";

// --- Error Definitions ---

#[derive(Error, Debug)]
pub enum FirebaseStoreError {
    #[error("Firestore error: {0}")]
    Firestore(#[from] firestore::errors::FirestoreError),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<FirebaseStoreError> for ExportError {
    fn from(err: FirebaseStoreError) -> Self {
        ExportError::Store(err.to_string())
    }
}

// --- Store Implementation ---

#[derive(Clone)]
pub struct FirestoreMetadataStore {
    db: FirestoreDb,
    collection: String,
}

impl fmt::Debug for FirestoreMetadataStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FirestoreMetadataStore")
            .field("collection", &self.collection)
            .finish_non_exhaustive()
    }
}

impl FirestoreMetadataStore {
    /// Connects to Firestore in `project_id` with application default credentials.
    ///
    /// A `gcp_creds.json` in the working directory takes precedence.
    pub async fn new(
        project_id: &str,
        collection: impl Into<String>,
    ) -> Result<Self, FirebaseStoreError> {
        if project_id.is_empty() {
            return Err(FirebaseStoreError::Internal(
                "a Google Cloud project id is required".to_string(),
            ));
        }
        if Path::new("gcp_creds.json").exists() {
            info!("Setting GOOGLE_APPLICATION_CREDENTIALS to use gcp_creds.json");
            std::env::set_var("GOOGLE_APPLICATION_CREDENTIALS", "gcp_creds.json");
        }

        let db = FirestoreDb::new(project_id).await?;
        Ok(Self::with_db(db, collection))
    }

    /// Wraps an existing connection, e.g. one pointed at the Firestore emulator.
    pub fn with_db(db: FirestoreDb, collection: impl Into<String>) -> Self {
        Self {
            db,
            collection: collection.into(),
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    async fn write_document(&self, document: &MetadataDocument) -> Result<(), FirebaseStoreError> {
        let _written: MetadataDocument = self
            .db
            .fluent()
            .update()
            .in_col(&self.collection)
            .document_id(&document.id)
            .object(document)
            .execute()
            .await?;
        Ok(())
    }
}

#[async_trait]
impl MetadataStore for FirestoreMetadataStore {
    fn name(&self) -> &str {
        "Firestore"
    }

    async fn add_entry(
        &self,
        key: &str,
        payload: &ExportFormPayload,
        export_fields: &ExportFieldSelection,
    ) -> Result<(), ExportError> {
        let document = MetadataDocument::from_payload(key, payload, export_fields, Utc::now());
        debug!(
            collection = %self.collection,
            key,
            fields = document.fields.len(),
            "--> Writing metadata document"
        );
        self.write_document(&document).await?;
        Ok(())
    }
}
