use crate::traits::{validate_key, Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use http::Method;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::buffered::BufWriter;
use object_store::path::Path as ObjectPath;
use object_store::signer::Signer;
use object_store::{Attribute, Attributes, ObjectStore, Result as ObjectResult};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tubely_core::StoredObjectRef;

/// Static access key pair, used instead of the environment credential chain.
#[derive(Clone)]
pub struct S3Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl std::fmt::Debug for S3Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .finish()
    }
}

/// S3 storage implementation
///
/// An `AmazonS3` client is bound to a single bucket, so clients are built on
/// first use per bucket and cached.
pub struct S3Storage {
    stores: Mutex<HashMap<String, Arc<AmazonS3>>>,
    region: String,
    endpoint_url: Option<String>, // Custom endpoint for S3-compatible providers
    credentials: Option<S3Credentials>,
}

impl S3Storage {
    /// Create a new S3Storage instance
    ///
    /// # Arguments
    /// * `region` - AWS region (or region identifier for S3-compatible providers)
    /// * `endpoint_url` - Optional custom endpoint URL for S3-compatible providers
    ///   (e.g., "http://localhost:9000" for MinIO)
    /// * `credentials` - Optional static credentials; the environment chain is used otherwise
    pub fn new(
        region: String,
        endpoint_url: Option<String>,
        credentials: Option<S3Credentials>,
    ) -> StorageResult<Self> {
        if region.trim().is_empty() {
            return Err(StorageError::ConfigError(
                "S3 region must not be empty".to_string(),
            ));
        }

        Ok(S3Storage {
            stores: Mutex::new(HashMap::new()),
            region,
            endpoint_url,
            credentials,
        })
    }

    fn build_store(&self, bucket: &str) -> StorageResult<AmazonS3> {
        let mut builder = AmazonS3Builder::from_env()
            .with_region(self.region.clone())
            .with_bucket_name(bucket);

        if let Some(ref endpoint) = self.endpoint_url {
            let allow_http = endpoint.starts_with("http://");
            builder = builder
                .with_endpoint(endpoint.clone())
                .with_allow_http(allow_http);
        }

        if let Some(ref creds) = self.credentials {
            builder = builder
                .with_access_key_id(creds.access_key_id.clone())
                .with_secret_access_key(creds.secret_access_key.clone());
        }

        builder
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))
    }

    fn store_for(&self, bucket: &str) -> StorageResult<Arc<AmazonS3>> {
        if bucket.is_empty() || bucket.contains('/') {
            return Err(StorageError::InvalidReference(format!(
                "Invalid bucket name: {:?}",
                bucket
            )));
        }

        let mut stores = self
            .stores
            .lock()
            .map_err(|_| StorageError::BackendError("S3 client cache poisoned".to_string()))?;

        if let Some(store) = stores.get(bucket) {
            return Ok(Arc::clone(store));
        }

        let store = Arc::new(self.build_store(bucket)?);
        stores.insert(bucket.to_string(), Arc::clone(&store));
        Ok(store)
    }
}

#[async_trait]
impl Storage for S3Storage {
    async fn upload_file(
        &self,
        object: &StoredObjectRef,
        content_type: &str,
        source: &Path,
    ) -> StorageResult<u64> {
        validate_key(&object.key)?;
        let store: Arc<dyn ObjectStore> = self.store_for(&object.bucket)?;
        let location = ObjectPath::from(object.key.as_str());
        let start = std::time::Instant::now();

        let mut attributes = Attributes::new();
        attributes.insert(Attribute::ContentType, content_type.to_string().into());

        let mut file = tokio::fs::File::open(source).await?;
        let mut writer = BufWriter::new(store, location).with_attributes(attributes);

        let copied = match tokio::io::copy(&mut file, &mut writer).await {
            Ok(n) => writer.shutdown().await.map(|_| n),
            Err(e) => Err(e),
        };

        match copied {
            Ok(size) => {
                tracing::info!(
                    bucket = %object.bucket,
                    key = %object.key,
                    size_bytes = size,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 upload successful"
                );
                Ok(size)
            }
            Err(e) => {
                let abort: ObjectResult<()> = writer.abort().await;
                if let Err(abort_err) = abort {
                    tracing::warn!(error = %abort_err, key = %object.key, "Failed to abort S3 upload");
                }
                tracing::error!(
                    error = %e,
                    bucket = %object.bucket,
                    key = %object.key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 upload failed"
                );
                Err(StorageError::UploadFailed(e.to_string()))
            }
        }
    }

    async fn presigned_get_url(
        &self,
        object: &StoredObjectRef,
        expires_in: Duration,
    ) -> StorageResult<String> {
        validate_key(&object.key)?;
        let store = self.store_for(&object.bucket)?;
        let location = ObjectPath::from(object.key.as_str());

        let url_result: ObjectResult<_> = store
            .signed_url(Method::GET, &location, expires_in)
            .await;

        let url = url_result
            .map_err(|e| StorageError::PresignFailed(e.to_string()))?
            .to_string();

        Ok(url)
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}
