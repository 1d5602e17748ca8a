//! Storage abstraction trait
//!
//! This module defines the Storage trait that all video storage backends implement.

use crate::StorageBackend;
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tubely_core::StoredObjectRef;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Presign failed: {0}")]
    PresignFailed(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Invalid stored reference: {0}")]
    InvalidReference(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage abstraction trait
///
/// Objects are addressed by [`StoredObjectRef`] so one backend can serve any
/// bucket the record store points at.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Stream a local file into the store. Returns the number of bytes written.
    ///
    /// Implementations must not read the whole file into memory.
    async fn upload_file(
        &self,
        object: &StoredObjectRef,
        content_type: &str,
        source: &Path,
    ) -> StorageResult<u64>;

    /// Produce a URL granting read access to `object` for `expires_in`.
    ///
    /// Signing is local; no request is made to the backend.
    async fn presigned_get_url(
        &self,
        object: &StoredObjectRef,
        expires_in: Duration,
    ) -> StorageResult<String>;

    fn backend_type(&self) -> StorageBackend;
}

/// Reject keys that could escape a bucket or break path-style URLs.
pub(crate) fn validate_key(key: &str) -> StorageResult<()> {
    if key.is_empty() || key.contains("..") || key.starts_with('/') || key.contains('\\') {
        return Err(StorageError::InvalidKey(format!(
            "Storage key contains invalid characters: {:?}",
            key
        )));
    }
    Ok(())
}
