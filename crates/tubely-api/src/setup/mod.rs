//! Application setup and initialization
//!
//! Everything `main` needs to turn a [`Config`] into a running router.

pub mod database;
pub mod routes;
pub mod server;
pub mod storage;

use crate::state::AppState;
use anyhow::{Context, Result};
use std::sync::Arc;
use tubely_core::Config;
use tubely_db::PgVideoRepository;
use tubely_processing::FfmpegTool;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Fail fast on misconfiguration
    config
        .validate()
        .context("Configuration validation failed")?;

    crate::telemetry::init_telemetry()
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    tracing::info!(
        environment = %config.environment(),
        "Configuration loaded and validated successfully"
    );

    let pool = database::setup_database(&config).await?;
    let storage = storage::setup_storage(&config).await?;

    for dir in [config.assets_root(), config.upload_scratch_dir()] {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("Failed to create directory {}", dir.display()))?;
    }

    let tool = FfmpegTool::new(
        config.ffmpeg_path(),
        config.ffprobe_path(),
        config.media_tool_timeout(),
    )
    .context("Invalid media tool configuration")?;

    let state = Arc::new(AppState::from_parts(
        config,
        Arc::new(PgVideoRepository::new(pool)),
        storage,
        Arc::new(tool),
    ));

    let router = routes::build_router(state.clone())?;

    Ok((state, router))
}
