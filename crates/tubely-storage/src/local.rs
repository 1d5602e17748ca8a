use crate::traits::{validate_key, Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tubely_core::StoredObjectRef;

/// Local filesystem storage implementation
///
/// Buckets become directories under `base_path`. URLs are not signed; the
/// files are expected to be served from `base_url` by the API itself.
#[derive(Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory for stored objects (e.g., "/var/lib/tubely/media")
    /// * `base_url` - Base URL objects are served from (e.g., "http://localhost:8091/media")
    pub async fn new(base_path: impl Into<PathBuf>, base_url: String) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage {
            base_path,
            base_url,
        })
    }

    fn object_path(&self, object: &StoredObjectRef) -> StorageResult<PathBuf> {
        if object.bucket.is_empty()
            || object.bucket.contains('/')
            || object.bucket.contains("..")
        {
            return Err(StorageError::InvalidReference(format!(
                "Invalid bucket name: {:?}",
                object.bucket
            )));
        }
        validate_key(&object.key)?;

        Ok(self.base_path.join(&object.bucket).join(&object.key))
    }

    fn generate_url(&self, object: &StoredObjectRef) -> String {
        format!(
            "{}/{}/{}",
            self.base_url.trim_end_matches('/'),
            object.bucket,
            object.key
        )
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn upload_file(
        &self,
        object: &StoredObjectRef,
        _content_type: &str,
        source: &Path,
    ) -> StorageResult<u64> {
        let path = self.object_path(object)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let start = std::time::Instant::now();
        let size = fs::copy(source, &path).await.map_err(|e| {
            tracing::error!(
                error = %e,
                path = %path.display(),
                "Local storage upload failed"
            );
            StorageError::UploadFailed(e.to_string())
        })?;

        tracing::info!(
            bucket = %object.bucket,
            key = %object.key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage upload successful"
        );

        Ok(size)
    }

    async fn presigned_get_url(
        &self,
        object: &StoredObjectRef,
        _expires_in: Duration,
    ) -> StorageResult<String> {
        self.object_path(object)?;
        Ok(self.generate_url(object))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_upload_copies_into_bucket_dir() {
        let root = TempDir::new().unwrap();
        let storage = LocalStorage::new(root.path(), "http://localhost:8091/media/".to_string())
            .await
            .unwrap();

        let source = root.path().join("incoming.mp4");
        tokio::fs::write(&source, b"fake mp4 bytes").await.unwrap();

        let object = StoredObjectRef::new("videos", "other/ab12CD.mp4");
        let size = storage
            .upload_file(&object, "video/mp4", &source)
            .await
            .unwrap();

        assert_eq!(size, 14);
        let stored = tokio::fs::read(root.path().join("videos/other/ab12CD.mp4"))
            .await
            .unwrap();
        assert_eq!(stored, b"fake mp4 bytes");

        let url = storage
            .presigned_get_url(&object, Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(url, "http://localhost:8091/media/videos/other/ab12CD.mp4");
    }

    #[tokio::test]
    async fn test_traversal_rejected() {
        let root = TempDir::new().unwrap();
        let storage = LocalStorage::new(root.path(), "http://localhost/media".to_string())
            .await
            .unwrap();

        let bad_key = StoredObjectRef::new("videos", "../../etc/passwd");
        assert!(matches!(
            storage
                .presigned_get_url(&bad_key, Duration::from_secs(1))
                .await,
            Err(StorageError::InvalidKey(_))
        ));

        let bad_bucket = StoredObjectRef::new("..", "a.mp4");
        assert!(matches!(
            storage
                .presigned_get_url(&bad_bucket, Duration::from_secs(1))
                .await,
            Err(StorageError::InvalidReference(_))
        ));
    }
}
