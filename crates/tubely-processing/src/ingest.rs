//! Materialize an upload byte stream as a temporary file.

use bytes::Bytes;
use futures::{Stream, StreamExt};
use std::fmt::Display;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;

use crate::error::{ProcessingError, ProcessingResult};

/// An upload written to disk. The file is removed when this is dropped,
/// unless it is persisted first.
#[derive(Debug)]
pub struct IngestedFile {
    file: NamedTempFile,
    size_bytes: u64,
}

impl IngestedFile {
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    /// Move the file to `dest`, keeping it past the request.
    ///
    /// `dest` must be on the same filesystem as the scratch directory.
    pub async fn persist(self, dest: PathBuf) -> ProcessingResult<PathBuf> {
        let file = self.file;
        tokio::task::spawn_blocking(move || {
            file.persist(&dest)
                .map(|_| dest)
                .map_err(|e| ProcessingError::Io(e.error))
        })
        .await
        .map_err(|e| ProcessingError::Io(std::io::Error::other(e)))?
    }
}

/// Writes upload streams into a scratch directory under a size limit.
#[derive(Debug, Clone)]
pub struct Ingestor {
    scratch_dir: PathBuf,
    max_bytes: u64,
}

impl Ingestor {
    pub fn new(scratch_dir: impl Into<PathBuf>, max_bytes: u64) -> Self {
        Self {
            scratch_dir: scratch_dir.into(),
            max_bytes,
        }
    }

    /// Drain `stream` into a uniquely named file.
    ///
    /// Any error, including the size limit being crossed mid-stream, drops the
    /// partial file before returning.
    pub async fn materialize<S, E>(&self, stream: S, suffix: &str) -> ProcessingResult<IngestedFile>
    where
        S: Stream<Item = Result<Bytes, E>>,
        E: Display,
    {
        tokio::fs::create_dir_all(&self.scratch_dir).await?;

        let temp = tempfile::Builder::new()
            .prefix("tubely-upload-")
            .suffix(suffix)
            .tempfile_in(&self.scratch_dir)?;
        let mut writer = tokio::fs::File::from_std(temp.reopen()?);

        let mut stream = std::pin::pin!(stream);
        let mut written: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| ProcessingError::UploadStream(e.to_string()))?;
            written += chunk.len() as u64;
            if written > self.max_bytes {
                tracing::debug!(
                    limit = self.max_bytes,
                    "Upload rejected, size limit exceeded"
                );
                return Err(ProcessingError::PayloadTooLarge {
                    limit: self.max_bytes,
                });
            }
            writer.write_all(&chunk).await?;
        }

        writer.flush().await?;
        writer.sync_all().await?;

        tracing::debug!(
            path = %temp.path().display(),
            size_bytes = written,
            "Upload materialized"
        );

        Ok(IngestedFile {
            file: temp,
            size_bytes: written,
        })
    }
}
