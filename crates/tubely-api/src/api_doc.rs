//! OpenAPI documentation, served at `/api/openapi.json`.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use tubely_core::models;

pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Tubely API",
        version = "0.1.0",
        description = "Video upload service. Thumbnails are stored on the server and served under /assets; videos are remuxed for streaming, stored in object storage and returned with short-lived signed URLs."
    ),
    paths(
        handlers::health::health_check,
        // Uploads
        handlers::thumbnail_upload::upload_thumbnail,
        handlers::video_upload::upload_video,
        // Videos
        handlers::videos::get_video,
        handlers::videos::list_videos,
    ),
    components(
        schemas(
            models::Video,
            handlers::health::HealthResponse,
            error::ErrorResponse,
        )
    ),
    tags(
        (name = "videos", description = "Video records and uploads"),
        (name = "health", description = "Liveness")
    )
)]
pub struct ApiDoc;
