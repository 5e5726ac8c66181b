use async_trait::async_trait;
use media_export::providers::{MetadataStore, ObjectUploader, ThumbnailExtractor};
use media_export::{
    ExportError, ExportFieldSelection, ExportFormPayload, ThumbnailResult, UploadResult,
};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, Once};

// --- Test Setup ---

static INIT: Once = Once::new();

/// Initializes the tracing subscriber once per test binary.
pub fn setup_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// A call log shared between mocks, for asserting cross-collaborator order.
#[derive(Clone, Debug, Default)]
pub struct EventLog(Arc<Mutex<Vec<String>>>);

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, event: String) {
        self.0.lock().unwrap().push(event);
    }

    pub fn events(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

// --- Mock Metadata Store ---

/// One recorded `add_entry` call.
#[derive(Clone, Debug)]
pub struct StoreCall {
    pub key: String,
    pub payload: ExportFormPayload,
    pub export_fields: ExportFieldSelection,
}

#[derive(Clone, Debug, Default)]
pub struct MockMetadataStore {
    calls: Arc<Mutex<Vec<StoreCall>>>,
    failing_keys: Arc<Mutex<HashSet<String>>>,
    log: EventLog,
}

impl MockMetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_log(mut self, log: EventLog) -> Self {
        self.log = log;
        self
    }

    /// Makes every write for `key` fail.
    pub fn fail_for(&self, key: &str) {
        self.failing_keys.lock().unwrap().insert(key.to_string());
    }

    /// Retrieves the recorded calls for assertion, failed ones included.
    pub fn get_calls(&self) -> Vec<StoreCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl MetadataStore for MockMetadataStore {
    fn name(&self) -> &str {
        "MockStore"
    }

    async fn add_entry(
        &self,
        key: &str,
        payload: &ExportFormPayload,
        export_fields: &ExportFieldSelection,
    ) -> Result<(), ExportError> {
        self.log.record(format!("store:{key}"));
        self.calls.lock().unwrap().push(StoreCall {
            key: key.to_string(),
            payload: payload.clone(),
            export_fields: export_fields.clone(),
        });

        if self.failing_keys.lock().unwrap().contains(key) {
            return Err(ExportError::Store(format!("MockStore: write rejected for '{key}'")));
        }
        Ok(())
    }
}

// --- Mock Thumbnail Extractor ---

#[derive(Clone, Debug)]
pub struct MockThumbnailExtractor {
    response: Result<ThumbnailResult, String>,
    calls: Arc<Mutex<Vec<(String, String)>>>,
    log: EventLog,
}

impl MockThumbnailExtractor {
    /// An extractor that always yields `base64_data`.
    pub fn returning(base64_data: &str) -> Self {
        Self::with_response(Ok(ThumbnailResult {
            thumbnail_base64_data: Some(base64_data.to_string()),
        }))
    }

    /// An extractor that succeeds without producing image data.
    pub fn empty() -> Self {
        Self::with_response(Ok(ThumbnailResult::default()))
    }

    /// An extractor that always fails with `message`.
    pub fn failing(message: &str) -> Self {
        Self::with_response(Err(message.to_string()))
    }

    fn with_response(response: Result<ThumbnailResult, String>) -> Self {
        Self {
            response,
            calls: Arc::new(Mutex::new(Vec::new())),
            log: EventLog::new(),
        }
    }

    pub fn with_log(mut self, log: EventLog) -> Self {
        self.log = log;
        self
    }

    /// Recorded `(source_uri, aspect_ratio)` pairs.
    pub fn get_calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ThumbnailExtractor for MockThumbnailExtractor {
    async fn video_thumbnail_base64(
        &self,
        source_uri: &str,
        aspect_ratio: &str,
    ) -> Result<ThumbnailResult, ExportError> {
        self.log.record(format!("extract:{source_uri}"));
        self.calls
            .lock()
            .unwrap()
            .push((source_uri.to_string(), aspect_ratio.to_string()));

        self.response.clone().map_err(ExportError::Thumbnail)
    }
}

// --- Mock Object Uploader ---

/// One recorded `upload_base64_image` call.
#[derive(Clone, Debug, PartialEq)]
pub struct UploadCall {
    pub base64_data: String,
    pub bucket: String,
    pub object_name: String,
    pub mime_type: String,
}

/// What the mock uploader answers with.
#[derive(Clone, Debug)]
enum UploadBehavior {
    /// Succeeds with `gs://{bucket}/{object_name}`.
    Echo,
    Respond(UploadResult),
    Fail(String),
}

#[derive(Clone, Debug)]
pub struct MockObjectUploader {
    behavior: UploadBehavior,
    calls: Arc<Mutex<Vec<UploadCall>>>,
    log: EventLog,
}

impl MockObjectUploader {
    pub fn new() -> Self {
        Self::with_behavior(UploadBehavior::Echo)
    }

    pub fn returning(result: UploadResult) -> Self {
        Self::with_behavior(UploadBehavior::Respond(result))
    }

    pub fn failing(message: &str) -> Self {
        Self::with_behavior(UploadBehavior::Fail(message.to_string()))
    }

    fn with_behavior(behavior: UploadBehavior) -> Self {
        Self {
            behavior,
            calls: Arc::new(Mutex::new(Vec::new())),
            log: EventLog::new(),
        }
    }

    pub fn with_log(mut self, log: EventLog) -> Self {
        self.log = log;
        self
    }

    pub fn get_calls(&self) -> Vec<UploadCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl Default for MockObjectUploader {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ObjectUploader for MockObjectUploader {
    async fn upload_base64_image(
        &self,
        base64_data: &str,
        bucket: &str,
        object_name: &str,
        mime_type: &str,
    ) -> Result<UploadResult, ExportError> {
        self.log.record(format!("upload:{object_name}"));
        self.calls.lock().unwrap().push(UploadCall {
            base64_data: base64_data.to_string(),
            bucket: bucket.to_string(),
            object_name: object_name.to_string(),
            mime_type: mime_type.to_string(),
        });

        match &self.behavior {
            UploadBehavior::Echo => Ok(UploadResult {
                success: true,
                file_url: Some(format!("gs://{bucket}/{object_name}")),
            }),
            UploadBehavior::Respond(result) => Ok(result.clone()),
            UploadBehavior::Fail(message) => Err(ExportError::Upload(message.clone())),
        }
    }
}
