//! Read-time URL signing.
//!
//! Records keep `bucket,key` references; clients get a short-lived URL minted
//! on every read. Signed URLs are never cached or written back.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tubely_core::{StoredObjectRef, Video};

use crate::traits::{Storage, StorageError, StorageResult};

/// A URL plus the instant it stops working.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedUrl {
    pub url: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct UrlSigner {
    storage: Arc<dyn Storage>,
    ttl: Duration,
}

impl UrlSigner {
    pub fn new(storage: Arc<dyn Storage>, ttl: Duration) -> Self {
        Self { storage, ttl }
    }

    pub async fn sign(&self, object: &StoredObjectRef) -> StorageResult<SignedUrl> {
        let issued_at = Utc::now();
        let url = self.storage.presigned_get_url(object, self.ttl).await?;
        let ttl = chrono::Duration::from_std(self.ttl)
            .map_err(|e| StorageError::PresignFailed(format!("TTL out of range: {}", e)))?;

        Ok(SignedUrl {
            url,
            expires_at: issued_at + ttl,
        })
    }

    /// Parse a stored `bucket,key` reference and sign it.
    pub async fn sign_reference(&self, raw: &str) -> StorageResult<SignedUrl> {
        let object: StoredObjectRef = raw
            .parse()
            .map_err(|e: tubely_core::AppError| StorageError::InvalidReference(e.to_string()))?;
        self.sign(&object).await
    }

    /// Replace a record's stored reference with a signed URL.
    ///
    /// Records without a video are returned unchanged.
    pub async fn sign_video(&self, mut video: Video) -> StorageResult<Video> {
        let Some(reference) = video.video_url.take() else {
            return Ok(video);
        };

        let signed = self.sign_reference(&reference).await?;
        video.video_url = Some(signed.url);
        Ok(video)
    }
}
