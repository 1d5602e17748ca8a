//! Common utilities for file upload handlers

use axum::extract::Multipart;
use tubely_core::{AppError, MediaCategory, MediaType};
use tubely_processing::{IngestedFile, Ingestor};

use crate::error::HttpAppError;

/// Find the form field named `field_name` and write its body to a temporary file.
///
/// The declared content type is checked against `category` before any bytes are
/// read, so rejected uploads never touch the disk. The file is removed when the
/// returned [`IngestedFile`] is dropped.
pub async fn ingest_form_file(
    multipart: &mut Multipart,
    field_name: &str,
    category: MediaCategory,
    ingestor: &Ingestor,
) -> Result<(IngestedFile, MediaType), HttpAppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Failed to read multipart: {}", e)))?
    {
        if field.name() != Some(field_name) {
            continue;
        }

        let media_type: MediaType = field
            .content_type()
            .ok_or_else(|| AppError::InvalidInput("Missing Content-Type for file".to_string()))?
            .parse()?;
        media_type.require(category)?;

        let suffix = format!(".{}", media_type.subtype());
        let file = ingestor.materialize(field, &suffix).await?;
        return Ok((file, media_type));
    }

    Err(AppError::InvalidInput(format!("Unable to parse form file '{}'", field_name)).into())
}
