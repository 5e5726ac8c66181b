pub mod gcs;

use crate::errors::ExportError;
use crate::types::UploadResult;
use async_trait::async_trait;
use dyn_clone::DynClone;
use std::fmt::Debug;

/// A trait for storing base64-encoded images in an object storage bucket.
#[async_trait]
pub trait ObjectUploader: Send + Sync + DynClone + Debug {
    /// Decodes `base64_data` and stores it as `object_name` in `bucket`.
    ///
    /// A rejected upload is reported through `UploadResult::success`; only
    /// failures to reach the service or to decode the data are errors.
    async fn upload_base64_image(
        &self,
        base64_data: &str,
        bucket: &str,
        object_name: &str,
        mime_type: &str,
    ) -> Result<UploadResult, ExportError>;
}

dyn_clone::clone_trait_object!(ObjectUploader);
