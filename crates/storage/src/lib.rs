//! Object storage boundary.
//!
//! [`ObjectStore`] abstracts the artifact store so the pipeline never
//! touches an SDK directly. [`S3Store`] is the production implementation
//! over S3-compatible providers; [`MemoryStore`] backs tests.

pub mod memory;
pub mod s3;

use async_trait::async_trait;

pub use memory::MemoryStore;
pub use s3::{S3Config, S3Store};

/// Bucket holding rendered listing images.
pub const GENERATED_BUCKET: &str = "generated-images";
/// Bucket holding style reference images.
pub const STYLE_REFERENCES_BUCKET: &str = "style-references";

/// Download URLs expire after one hour.
pub const SIGNED_URL_TTL_SECS: u64 = 3600;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Object not found: {bucket}/{key}")]
    NotFound { bucket: String, key: String },

    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Artifact store: opaque bytes addressed by `(bucket, key)`.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Write an object, overwriting any existing one at the same key.
    async fn put(
        &self,
        bucket: &str,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError>;

    /// Produce a time-limited download URL for an existing object.
    async fn signed_url(
        &self,
        bucket: &str,
        key: &str,
        expires_in_secs: u64,
    ) -> Result<String, StorageError>;

    /// Remove an object. Deleting a missing key is not an error.
    async fn delete(&self, bucket: &str, key: &str) -> Result<(), StorageError>;
}
