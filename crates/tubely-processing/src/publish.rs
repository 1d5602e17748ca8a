use std::path::Path;
use std::sync::Arc;
use tubely_core::{MediaType, StoredObjectRef};
use tubely_storage::Storage;

use crate::error::{ProcessingError, ProcessingResult};

/// Uploads finished files to object storage.
pub struct Publisher {
    storage: Arc<dyn Storage>,
}

impl Publisher {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Stream `local_path` to `bucket`/`key`.
    ///
    /// The returned reference is what the caller records; nothing is written
    /// to the record store here.
    pub async fn publish(
        &self,
        local_path: &Path,
        bucket: &str,
        key: &str,
        content_type: &str,
    ) -> ProcessingResult<StoredObjectRef> {
        let media: MediaType = content_type
            .parse()
            .map_err(|e: tubely_core::AppError| ProcessingError::InvalidContentType(e.to_string()))?;

        let object = StoredObjectRef::new(bucket, key);
        let size = self
            .storage
            .upload_file(&object, &media.essence(), local_path)
            .await?;

        tracing::info!(
            bucket = %object.bucket,
            key = %object.key,
            size_bytes = size,
            backend = %self.storage.backend_type(),
            "Video published"
        );

        Ok(object)
    }
}
