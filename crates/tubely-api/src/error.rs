//! HTTP error response conversion
//!
//! Handlers return `Result<impl IntoResponse, HttpAppError>`. Domain errors from
//! the storage and processing crates convert into `HttpAppError` with `?`, so
//! every failure is rendered and logged in one place.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use tubely_core::{AppError, ErrorMetadata, LogLevel};
use tubely_processing::ProcessingError;
use tubely_storage::StorageError;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    /// Machine-readable error code for programmatic handling
    pub code: String,
    /// Whether this error is recoverable (can be retried)
    pub recoverable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_action: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
            error_type: None,
            code: code.into(),
            recoverable: false,
            suggested_action: None,
        }
    }
}

/// Wrapper type for AppError to implement IntoResponse.
/// Needed because of the orphan rule: both the trait and AppError are foreign here.
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        HttpAppError(AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        })
    }
}

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Error => {
            tracing::error!(error = %error, error_type = error_type, "Error occurred");
        }
    }
}

/// Set once from `Config::is_production()` when the router is built.
static HIDE_ERROR_DETAILS: AtomicBool = AtomicBool::new(false);

pub fn set_hide_error_details(hide: bool) {
    HIDE_ERROR_DETAILS.store(hide, Ordering::Relaxed);
}

fn error_body(app_error: &AppError, hide_details: bool) -> ErrorResponse {
    let mut body = ErrorResponse {
        error: app_error.client_message(),
        details: None,
        error_type: None,
        code: app_error.error_code().to_string(),
        recoverable: app_error.is_recoverable(),
        suggested_action: app_error.suggested_action().map(String::from),
    };

    // Never leak internals in production or for sensitive errors
    if !hide_details && !app_error.is_sensitive() {
        body.details = Some(app_error.detailed_message());
        body.error_type = Some(app_error.error_type().to_string());
    }

    body
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let app_error = &self.0;

        let status = StatusCode::from_u16(app_error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(app_error);

        let body = error_body(app_error, HIDE_ERROR_DETAILS.load(Ordering::Relaxed));
        (status, Json(body)).into_response()
    }
}

fn storage_to_app_error(err: StorageError) -> AppError {
    match err {
        StorageError::InvalidReference(msg) => AppError::InvalidReference(msg),
        StorageError::UploadFailed(msg)
        | StorageError::PresignFailed(msg)
        | StorageError::BackendError(msg) => AppError::StorageUnavailable(msg),
        StorageError::InvalidKey(msg) => AppError::Internal(format!("Invalid storage key: {}", msg)),
        StorageError::IoError(err) => AppError::Io(err),
        StorageError::ConfigError(msg) => AppError::Internal(msg),
    }
}

impl From<StorageError> for HttpAppError {
    fn from(err: StorageError) -> Self {
        HttpAppError(storage_to_app_error(err))
    }
}

impl From<ProcessingError> for HttpAppError {
    fn from(err: ProcessingError) -> Self {
        let app = match err {
            ProcessingError::PayloadTooLarge { limit } => {
                AppError::PayloadTooLarge(format!("Upload exceeds the {} byte limit", limit))
            }
            ProcessingError::UploadStream(msg) => AppError::InvalidInput(msg),
            ProcessingError::Io(err) => AppError::Io(err),
            ProcessingError::UnsupportedMedia(msg) => AppError::UnsupportedMedia(msg),
            ProcessingError::Transcode(msg) => AppError::Transcode(msg),
            ProcessingError::InvalidContentType(msg) => AppError::InvalidInput(msg),
            ProcessingError::Storage(err) => storage_to_app_error(err),
        };
        HttpAppError(app)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_storage_error_invalid_reference() {
        let HttpAppError(app_err) = StorageError::InvalidReference("videos".to_string()).into();
        match app_err {
            AppError::InvalidReference(msg) => assert_eq!(msg, "videos"),
            _ => panic!("Expected InvalidReference variant"),
        }
    }

    #[test]
    fn test_from_storage_error_upload_failed() {
        let HttpAppError(app_err) = StorageError::UploadFailed("Upload failed".to_string()).into();
        assert!(matches!(app_err, AppError::StorageUnavailable(_)));
        assert_eq!(app_err.http_status_code(), 500);
    }

    #[test]
    fn test_from_processing_error_unsupported_media() {
        let HttpAppError(app_err) =
            ProcessingError::UnsupportedMedia("not a video".to_string()).into();
        assert_eq!(app_err.http_status_code(), 415);
    }

    #[test]
    fn test_from_processing_error_too_large() {
        let HttpAppError(app_err) = ProcessingError::PayloadTooLarge { limit: 500 }.into();
        match app_err {
            AppError::PayloadTooLarge(msg) => assert!(msg.contains("500")),
            _ => panic!("Expected PayloadTooLarge variant"),
        }
    }

    #[test]
    fn test_from_processing_error_wrapped_storage() {
        let err = ProcessingError::Storage(StorageError::BackendError("timeout".to_string()));
        let HttpAppError(app_err) = err.into();
        assert!(matches!(app_err, AppError::StorageUnavailable(_)));
    }

    #[test]
    fn test_transcode_is_internal() {
        let HttpAppError(app_err) = ProcessingError::Transcode("exit status: 1".to_string()).into();
        assert_eq!(app_err.http_status_code(), 500);
        assert!(app_err.is_sensitive());
    }

    #[test]
    fn test_error_response_shape() {
        let response = ErrorResponse::new("Not found", "NOT_FOUND");
        let json = serde_json::to_value(&response).expect("serialize");
        assert_eq!(json.get("code").and_then(|v| v.as_str()), Some("NOT_FOUND"));
        assert_eq!(json.get("recoverable").and_then(|v| v.as_bool()), Some(false));
        assert!(json.get("details").is_none());
    }

    #[test]
    fn test_error_details_follow_production_flag() {
        let err = AppError::NotFound("Couldn't find video".to_string());

        let body = error_body(&err, false);
        assert_eq!(body.error_type.as_deref(), Some("NotFound"));
        assert!(body.details.is_some());

        let body = error_body(&err, true);
        assert_eq!(body.error, "Couldn't find video");
        assert!(body.details.is_none());
        assert!(body.error_type.is_none());
    }

    #[test]
    fn test_sensitive_error_details_always_hidden() {
        let err = AppError::Transcode("exit status: 1".to_string());
        let body = error_body(&err, false);
        assert!(body.details.is_none());
        assert_eq!(body.code, "TRANSCODE_ERROR");
    }
}
