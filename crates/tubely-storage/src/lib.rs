//! Tubely Storage Library
//!
//! Object storage for published videos: the [`Storage`] trait, S3 and local
//! filesystem backends, object key generation and presigned URL signing.
//!
//! # Object key format
//!
//! Video keys are `{prefix}/{random_id}.{extension}` where `prefix` is the
//! aspect-ratio label chosen during processing. A published object is
//! referenced from the database as `bucket,key`
//! (see [`tubely_core::StoredObjectRef`]).
//!
//! Keys must not contain `..` or a leading `/`.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod signer;
pub mod traits;

pub use factory::create_storage;
pub use keys::{object_key, random_object_id};
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-s3")]
pub use s3::{S3Credentials, S3Storage};
pub use signer::{SignedUrl, UrlSigner};
pub use traits::{Storage, StorageError, StorageResult};
pub use tubely_core::StorageBackend;
