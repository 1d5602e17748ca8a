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
use tubely_core::constants::{ASSETS_ROUTE, THUMBNAIL_FORM_FIELD};
use tubely_core::{MediaCategory, Video};
use tubely_storage::random_object_id;

#[utoipa::path(
    post,
    path = "/api/thumbnail_upload/{videoID}",
    tag = "videos",
    params(
        ("videoID" = String, Path, description = "Video ID")
    ),
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Thumbnail stored", body = Video),
        (status = 400, description = "Invalid video ID or form", body = ErrorResponse),
        (status = 401, description = "Not authenticated or not the owner", body = ErrorResponse),
        (status = 404, description = "Video not found", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 415, description = "Not an image", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip_all, fields(user_id = %user.user_id, video_id = %video_id))]
pub async fn upload_thumbnail(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(video_id): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<Video>, HttpAppError> {
    let mut video = load_owned_video(&state, user, &video_id).await?;

    let (file, media_type) = ingest_form_file(
        &mut multipart,
        THUMBNAIL_FORM_FIELD,
        MediaCategory::Image,
        &state.media.thumbnail_ingestor,
    )
    .await?;

    let size_bytes = file.size_bytes();
    let file_name = format!("{}.{}", random_object_id(), media_type.subtype());
    file.persist(state.config.assets_root().join(&file_name))
        .await?;

    video.thumbnail_url = Some(format!(
        "{}{}/{}",
        state.config.public_base_url(),
        ASSETS_ROUTE,
        file_name
    ));

    let updated = state.videos.update_video(&video).await?;

    tracing::info!(
        file_name = %file_name,
        size_bytes = size_bytes,
        "Thumbnail uploaded"
    );

    Ok(Json(state.signer.sign_video(updated).await?))
}
