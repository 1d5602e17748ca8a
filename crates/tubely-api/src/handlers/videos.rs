use crate::auth::models::AuthUser;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use tubely_core::{AppError, Video};
use uuid::Uuid;

/// Fetch a record and check that `user` owns it.
///
/// Unknown ids are `NotFound`; records owned by someone else are
/// `Unauthorized`.
pub(crate) async fn load_owned_video(
    state: &AppState,
    user: AuthUser,
    video_id: &str,
) -> Result<Video, HttpAppError> {
    let id = Uuid::parse_str(video_id)
        .map_err(|_| AppError::InvalidInput("Invalid video ID".to_string()))?;

    let video = state
        .videos
        .get_video(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Couldn't find video".to_string()))?;

    if !video.is_owned_by(user.user_id) {
        return Err(AppError::Unauthorized("You are not the owner of this video".to_string()).into());
    }

    Ok(video)
}

#[utoipa::path(
    get,
    path = "/api/videos/{videoID}",
    tag = "videos",
    params(
        ("videoID" = String, Path, description = "Video ID")
    ),
    responses(
        (status = 200, description = "Video with a freshly signed URL", body = Video),
        (status = 400, description = "Invalid video ID", body = ErrorResponse),
        (status = 401, description = "Not authenticated or not the owner", body = ErrorResponse),
        (status = 404, description = "Video not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip_all, fields(user_id = %user.user_id, video_id = %video_id))]
pub async fn get_video(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(video_id): Path<String>,
) -> Result<Json<Video>, HttpAppError> {
    let video = load_owned_video(&state, user, &video_id).await?;
    let video = state.signer.sign_video(video).await?;
    Ok(Json(video))
}

#[utoipa::path(
    get,
    path = "/api/videos",
    tag = "videos",
    responses(
        (status = 200, description = "Caller's videos, newest first", body = [Video]),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip_all, fields(user_id = %user.user_id))]
pub async fn list_videos(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<Vec<Video>>, HttpAppError> {
    let videos = state.videos.list_videos_for_user(user.user_id).await?;

    let mut signed = Vec::with_capacity(videos.len());
    for video in videos {
        signed.push(state.signer.sign_video(video).await?);
    }

    Ok(Json(signed))
}
