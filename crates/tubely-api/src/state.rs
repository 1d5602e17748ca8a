//! Application state shared by every handler.

use std::sync::Arc;
use tubely_core::Config;
use tubely_db::VideoRepository;
use tubely_processing::{Ingestor, MediaTool, VideoPipeline};
use tubely_storage::{Storage, UrlSigner};

/// Scratch directory for thumbnail uploads, relative to the assets root.
pub const THUMBNAIL_INCOMING_DIR: &str = ".incoming";

/// Upload limits and the video pipeline.
#[derive(Clone)]
pub struct MediaState {
    /// Streams videos into the scratch directory
    pub video_ingestor: Ingestor,
    /// Streams thumbnails into a hidden directory under the assets root so
    /// partial uploads are never served and the final rename stays on one
    /// filesystem
    pub thumbnail_ingestor: Ingestor,
    pub pipeline: Arc<VideoPipeline>,
}

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub videos: Arc<dyn VideoRepository>,
    pub storage: Arc<dyn Storage>,
    pub signer: UrlSigner,
    pub media: MediaState,
}

impl AppState {
    /// Wire the state from already-initialized collaborators.
    pub fn from_parts(
        config: Config,
        videos: Arc<dyn VideoRepository>,
        storage: Arc<dyn Storage>,
        tool: Arc<dyn MediaTool>,
    ) -> Self {
        let media = MediaState {
            video_ingestor: Ingestor::new(
                config.upload_scratch_dir(),
                config.max_video_size_bytes(),
            ),
            thumbnail_ingestor: Ingestor::new(
                config.assets_root().join(THUMBNAIL_INCOMING_DIR),
                config.max_thumbnail_size_bytes(),
            ),
            pipeline: Arc::new(VideoPipeline::new(
                tool,
                Arc::clone(&storage),
                config.video_bucket().to_string(),
            )),
        };

        let signer = UrlSigner::new(Arc::clone(&storage), config.presign_ttl());

        Self {
            config,
            videos,
            storage,
            signer,
            media,
        }
    }
}
