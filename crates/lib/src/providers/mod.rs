pub mod metadata;
pub mod storage;
pub mod thumbnail;

pub use metadata::MetadataStore;
pub use storage::ObjectUploader;
pub use thumbnail::ThumbnailExtractor;
