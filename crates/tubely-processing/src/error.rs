use thiserror::Error;
use tubely_storage::StorageError;

/// Failures raised by the upload pipeline stages.
#[derive(Debug, Error)]
pub enum ProcessingError {
    #[error("Upload exceeds the {limit} byte limit")]
    PayloadTooLarge { limit: u64 },

    #[error("Failed to read upload stream: {0}")]
    UploadStream(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unsupported media: {0}")]
    UnsupportedMedia(String),

    #[error("Transcode failed: {0}")]
    Transcode(String),

    #[error("Invalid content type: {0}")]
    InvalidContentType(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type ProcessingResult<T> = Result<T, ProcessingError>;
