use crate::errors::ExportError;
use crate::media::{ExportFieldSelection, ExportFormPayload};
use async_trait::async_trait;
use dyn_clone::DynClone;
use std::fmt::Debug;

/// A trait for the document store that holds per-media export records.
#[async_trait]
pub trait MetadataStore: Send + Sync + DynClone + Debug {
    /// Returns the name of the store (e.g., "Firestore").
    fn name(&self) -> &str;

    /// Writes the record for `key`, built from `payload` and the caller's
    /// field selection.
    async fn add_entry(
        &self,
        key: &str,
        payload: &ExportFormPayload,
        export_fields: &ExportFieldSelection,
    ) -> Result<(), ExportError>;
}

dyn_clone::clone_trait_object!(MetadataStore);
