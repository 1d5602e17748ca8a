//! Shared harness for API integration tests.
//!
//! The app runs against an in-memory record store, a scripted media tool and
//! local object storage inside a temp dir, so no database, ffmpeg or network
//! is needed.

#![allow(dead_code)]

use async_trait::async_trait;
use axum_test::TestServer;
use chrono::{Duration as ChronoDuration, Utc};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use tubely_api::auth::jwt::issue_access_token;
use tubely_api::state::THUMBNAIL_INCOMING_DIR;
use tubely_api::{build_router, AppState};
use tubely_core::{AppError, BaseConfig, Config, StorageBackend, TubelyConfig, Video};
use tubely_db::VideoRepository;
use tubely_processing::{MediaTool, ProcessingError, ProcessingResult, StreamDimensions};
use tubely_storage::LocalStorage;
use uuid::Uuid;

pub const JWT_SECRET: &str = "integration-test-secret-with-enough-length";
pub const PUBLIC_BASE_URL: &str = "http://localhost:8091";
pub const MEDIA_BASE_URL: &str = "http://localhost:8091/media";

#[derive(Default)]
pub struct InMemoryVideoRepository {
    videos: Mutex<HashMap<Uuid, Video>>,
    fail_updates: AtomicBool,
}

impl InMemoryVideoRepository {
    pub fn insert(&self, video: Video) {
        self.videos.lock().unwrap().insert(video.id, video);
    }

    pub fn get(&self, id: Uuid) -> Option<Video> {
        self.videos.lock().unwrap().get(&id).cloned()
    }

    pub fn fail_updates(&self) {
        self.fail_updates.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl VideoRepository for InMemoryVideoRepository {
    async fn get_video(&self, id: Uuid) -> Result<Option<Video>, AppError> {
        Ok(self.get(id))
    }

    async fn update_video(&self, video: &Video) -> Result<Video, AppError> {
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(AppError::Internal("update rejected".to_string()));
        }

        let mut videos = self.videos.lock().unwrap();
        let stored = videos
            .get_mut(&video.id)
            .ok_or_else(|| AppError::NotFound(format!("Video {} not found", video.id)))?;
        *stored = Video {
            updated_at: Utc::now(),
            ..video.clone()
        };
        Ok(stored.clone())
    }

    async fn list_videos_for_user(&self, user_id: Uuid) -> Result<Vec<Video>, AppError> {
        let mut videos: Vec<Video> = self
            .videos
            .lock()
            .unwrap()
            .values()
            .filter(|v| v.user_id == user_id)
            .cloned()
            .collect();
        videos.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(videos)
    }
}

/// Reports fixed stream dimensions; remux copies the input unless told to fail.
#[derive(Clone)]
pub struct FakeTool {
    pub dimensions: Vec<StreamDimensions>,
    pub remux_fails: bool,
}

impl FakeTool {
    pub fn with_dimensions(width: u32, height: u32) -> Self {
        Self {
            dimensions: vec![StreamDimensions { width, height }],
            remux_fails: false,
        }
    }

    pub fn failing_remux() -> Self {
        Self {
            remux_fails: true,
            ..Self::with_dimensions(640, 480)
        }
    }
}

#[async_trait]
impl MediaTool for FakeTool {
    async fn probe(&self, _path: &Path) -> ProcessingResult<Vec<StreamDimensions>> {
        Ok(self.dimensions.clone())
    }

    async fn remux_faststart(&self, input: &Path, output: &Path) -> ProcessingResult<()> {
        // Leave a partial output behind, like a crashed ffmpeg would
        tokio::fs::copy(input, output).await?;
        if self.remux_fails {
            return Err(ProcessingError::Transcode("exit status: 1".to_string()));
        }
        Ok(())
    }
}

pub struct TestApp {
    pub server: TestServer,
    pub repo: Arc<InMemoryVideoRepository>,
    pub dir: TempDir,
}

impl TestApp {
    pub async fn spawn(tool: FakeTool) -> Self {
        Self::spawn_with(tool, |_| {}).await
    }

    pub async fn spawn_with(tool: FakeTool, configure: impl FnOnce(&mut TubelyConfig)) -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let mut config = test_config(dir.path());
        configure(&mut config);
        let config = Config(Box::new(config));

        std::fs::create_dir_all(config.assets_root()).unwrap();
        std::fs::create_dir_all(config.upload_scratch_dir()).unwrap();

        let storage = LocalStorage::new(dir.path().join("store"), MEDIA_BASE_URL.to_string())
            .await
            .expect("Failed to create local storage");

        let repo = Arc::new(InMemoryVideoRepository::default());
        let state = Arc::new(AppState::from_parts(
            config,
            repo.clone(),
            Arc::new(storage),
            Arc::new(tool),
        ));

        let app = build_router(state).expect("Failed to build router");
        let server =
            TestServer::new(app.into_make_service()).expect("Failed to create test server");

        TestApp { server, repo, dir }
    }

    pub fn scratch_dir(&self) -> PathBuf {
        self.dir.path().join("scratch")
    }

    pub fn assets_dir(&self) -> PathBuf {
        self.dir.path().join("assets")
    }

    pub fn incoming_dir(&self) -> PathBuf {
        self.assets_dir().join(THUMBNAIL_INCOMING_DIR)
    }

    pub fn store_dir(&self) -> PathBuf {
        self.dir.path().join("store")
    }

    /// Insert a record owned by `owner` and return it.
    pub fn seed_video(&self, owner: Uuid, video_url: Option<&str>) -> Video {
        let video = Video {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            title: "Boot.dev beats".to_string(),
            description: "A test video".to_string(),
            thumbnail_url: None,
            video_url: video_url.map(String::from),
            user_id: owner,
        };
        self.repo.insert(video.clone());
        video
    }

    /// Like [`seed_video`](Self::seed_video) but created `minutes_ago` in the past.
    pub fn seed_video_at(&self, owner: Uuid, minutes_ago: i64) -> Video {
        let mut video = self.seed_video(owner, None);
        video.created_at = Utc::now() - ChronoDuration::minutes(minutes_ago);
        self.repo.insert(video.clone());
        video
    }
}

pub fn test_config(root: &Path) -> TubelyConfig {
    TubelyConfig {
        base: BaseConfig {
            server_port: 8091,
            cors_origins: vec!["*".to_string()],
            db_max_connections: 1,
            db_timeout_seconds: 1,
            jwt_secret: JWT_SECRET.to_string(),
            environment: "test".to_string(),
        },
        database_url: "postgresql://localhost/tubely_test".to_string(),
        assets_root: root.join("assets"),
        public_base_url: PUBLIC_BASE_URL.to_string(),
        storage_backend: Some(StorageBackend::Local),
        s3_bucket: None,
        s3_region: None,
        s3_endpoint: None,
        aws_region: None,
        aws_access_key_id: None,
        aws_secret_access_key: None,
        local_storage_path: Some(root.join("store").to_string_lossy().into_owned()),
        local_storage_base_url: Some(MEDIA_BASE_URL.to_string()),
        max_thumbnail_size_bytes: 10 * 1024 * 1024,
        max_video_size_bytes: 10 * 1024 * 1024,
        upload_scratch_dir: root.join("scratch"),
        ffmpeg_path: "ffmpeg".to_string(),
        ffprobe_path: "ffprobe".to_string(),
        media_tool_timeout_secs: 5,
        presign_ttl_secs: 60,
    }
}

pub fn bearer(user_id: Uuid) -> String {
    let token = issue_access_token(user_id, JWT_SECRET, Duration::from_secs(3600))
        .expect("Failed to issue token");
    format!("Bearer {}", token)
}

/// Number of entries in `dir`, treating a missing directory as empty.
pub fn count_entries(dir: &Path) -> usize {
    match std::fs::read_dir(dir) {
        Ok(entries) => entries.count(),
        Err(_) => 0,
    }
}

/// Every regular file below `dir`, recursively.
pub fn files_under(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    let Ok(entries) = std::fs::read_dir(dir) else {
        return files;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            files.extend(files_under(&path));
        } else {
            files.push(path);
        }
    }
    files
}
