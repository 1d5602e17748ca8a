use crate::auth::models::AuthUser;
use crate::error::{ErrorResponse, HttpAppError};
use crate::handlers::videos::load_owned_video;
use crate::state::AppState;
use crate::utils::upload::ingest_form_file;
use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use std::sync::Arc;
use std::time::Instant;
use tubely_core::constants::VIDEO_FORM_FIELD;
use tubely_core::{MediaCategory, Video};

#[utoipa::path(
    post,
    path = "/api/video_upload/{videoID}",
    tag = "videos",
    params(
        ("videoID" = String, Path, description = "Video ID")
    ),
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Video published, URL signed", body = Video),
        (status = 400, description = "Invalid video ID or form", body = ErrorResponse),
        (status = 401, description = "Not authenticated or not the owner", body = ErrorResponse),
        (status = 404, description = "Video not found", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 415, description = "Not a video", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip_all, fields(user_id = %user.user_id, video_id = %video_id))]
pub async fn upload_video(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(video_id): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<Video>, HttpAppError> {
    let started = Instant::now();
    let mut video = load_owned_video(&state, user, &video_id).await?;

    let (file, media_type) = ingest_form_file(
        &mut multipart,
        VIDEO_FORM_FIELD,
        MediaCategory::Video,
        &state.media.video_ingestor,
    )
    .await?;

    let object = state.media.pipeline.publish(file.path(), &media_type).await?;
    let size_bytes = file.size_bytes();
    drop(file);

    video.video_url = Some(object.to_string());
    let updated = match state.videos.update_video(&video).await {
        Ok(updated) => updated,
        Err(e) => {
            // The object stays in the bucket with nothing pointing at it
            tracing::warn!(
                bucket = %object.bucket,
                key = %object.key,
                error = %e,
                "Video record update failed after upload, object orphaned"
            );
            return Err(e.into());
        }
    };

    tracing::info!(
        bucket = %object.bucket,
        key = %object.key,
        size_bytes = size_bytes,
        duration_ms = started.elapsed().as_millis() as u64,
        "Video uploaded"
    );

    Ok(Json(state.signer.sign_video(updated).await?))
}
