//! Router assembly

use crate::auth::middleware::AuthState;
use crate::handlers;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tubely_core::constants::{API_PREFIX, ASSETS_ROUTE, LOCAL_MEDIA_ROUTE};
use tubely_core::{Config, StorageBackend};

/// Slack on top of the largest upload limit for multipart framing. The
/// ingestor enforces the real per-file limit.
const MULTIPART_OVERHEAD_BYTES: u64 = 1024 * 1024;

/// Build the application router around an initialized state.
pub fn build_router(state: Arc<AppState>) -> Result<Router, anyhow::Error> {
    let config = &state.config;
    crate::error::set_hide_error_details(config.is_production());
    let cors = setup_cors(config)?;
    let auth_state = AuthState {
        jwt_secret: config.jwt_secret().to_string(),
    };

    let protected_routes = protected_routes().layer(axum::middleware::from_fn_with_state(
        Arc::new(auth_state),
        crate::auth::middleware::auth_middleware,
    ));

    let body_limit = config
        .max_video_size_bytes()
        .max(config.max_thumbnail_size_bytes())
        .saturating_add(MULTIPART_OVERHEAD_BYTES);
    let body_limit = usize::try_from(body_limit).unwrap_or(usize::MAX);

    let mut app = public_routes()
        .merge(protected_routes)
        .with_state(state.clone())
        .nest_service(ASSETS_ROUTE, ServeDir::new(config.assets_root()));

    if config.storage_backend() == StorageBackend::Local {
        if let Some(path) = config.local_storage_path() {
            tracing::info!(path = %path, route = LOCAL_MEDIA_ROUTE, "Serving local video storage");
            app = app.nest_service(LOCAL_MEDIA_ROUTE, ServeDir::new(path));
        }
    }

    let app = app
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(DefaultBodyLimit::disable())
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    Ok(app)
}

fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route(
            "/api/openapi.json",
            get(|| async { Json(crate::api_doc::get_openapi_spec()) }),
        )
}

fn protected_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/thumbnail_upload/{{videoID}}", API_PREFIX),
            post(handlers::thumbnail_upload::upload_thumbnail),
        )
        .route(
            &format!("{}/video_upload/{{videoID}}", API_PREFIX),
            post(handlers::video_upload::upload_video),
        )
        .route(
            &format!("{}/videos", API_PREFIX),
            get(handlers::videos::list_videos),
        )
        .route(
            &format!("{}/videos/{{videoID}}", API_PREFIX),
            get(handlers::videos::get_video),
        )
}

fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let cors = if config.cors_origins().iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins()
            .iter()
            .map(|o| o.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| anyhow::anyhow!("Invalid CORS origin: {}", e))?;

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any)
    };
    Ok(cors)
}
