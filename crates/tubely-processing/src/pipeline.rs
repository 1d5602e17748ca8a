//! Classify, remux and publish an ingested video.

use std::path::Path;
use std::sync::Arc;
use tubely_core::{MediaType, StoredObjectRef};
use tubely_storage::{object_key, random_object_id, Storage};

use crate::classify::Classifier;
use crate::error::ProcessingResult;
use crate::publish::Publisher;
use crate::remux::Remuxer;
use crate::tool::MediaTool;

pub struct VideoPipeline {
    classifier: Classifier,
    remuxer: Remuxer,
    publisher: Publisher,
    bucket: String,
}

impl VideoPipeline {
    pub fn new(tool: Arc<dyn MediaTool>, storage: Arc<dyn Storage>, bucket: String) -> Self {
        Self {
            classifier: Classifier::new(Arc::clone(&tool)),
            remuxer: Remuxer::new(tool),
            publisher: Publisher::new(storage),
            bucket,
        }
    }

    /// Run the remaining stages on a materialized upload.
    ///
    /// The remuxed file is removed before this returns, on success or failure.
    /// The caller still owns `local_path`.
    pub async fn publish(
        &self,
        local_path: &Path,
        media_type: &MediaType,
    ) -> ProcessingResult<StoredObjectRef> {
        let aspect = self.classifier.classify(local_path).await?;
        let remuxed = self.remuxer.prepare_for_streaming(local_path).await?;

        let key = object_key(aspect.as_prefix(), &random_object_id(), media_type.subtype());

        self.publisher
            .publish(&remuxed, &self.bucket, &key, &media_type.essence())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProcessingError;
    use crate::tool::StreamDimensions;
    use async_trait::async_trait;
    use tempfile::TempDir;
    use tubely_storage::LocalStorage;

    struct FakeTool {
        dimensions: Vec<StreamDimensions>,
        remux_fails: bool,
    }

    #[async_trait]
    impl MediaTool for FakeTool {
        async fn probe(&self, _path: &Path) -> ProcessingResult<Vec<StreamDimensions>> {
            Ok(self.dimensions.clone())
        }

        async fn remux_faststart(&self, input: &Path, output: &Path) -> ProcessingResult<()> {
            tokio::fs::copy(input, output).await?;
            if self.remux_fails {
                return Err(ProcessingError::Transcode("boom".to_string()));
            }
            Ok(())
        }
    }

    async fn setup(tool: FakeTool) -> (TempDir, VideoPipeline) {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path().join("store"), "http://localhost/media".into())
            .await
            .unwrap();
        let pipeline = VideoPipeline::new(Arc::new(tool), Arc::new(storage), "videos".to_string());
        std::fs::create_dir_all(dir.path().join("scratch")).unwrap();
        (dir, pipeline)
    }

    fn scratch_entries(dir: &TempDir) -> usize {
        std::fs::read_dir(dir.path().join("scratch")).unwrap().count()
    }

    #[tokio::test]
    async fn test_publish_tall_video() {
        let (dir, pipeline) = setup(FakeTool {
            dimensions: vec![StreamDimensions {
                width: 1080,
                height: 1920,
            }],
            remux_fails: false,
        })
        .await;

        let input = dir.path().join("scratch/upload.mp4");
        std::fs::write(&input, b"video").unwrap();
        let media: MediaType = "video/mp4".parse().unwrap();

        let object = pipeline.publish(&input, &media).await.unwrap();

        assert_eq!(object.bucket, "videos");
        assert!(object.key.starts_with("landscape/"));
        assert!(object.key.ends_with(".mp4"));
        assert!(dir.path().join("store/videos").join(&object.key).exists());
        // only the caller-owned input is left
        assert_eq!(scratch_entries(&dir), 1);
    }

    #[tokio::test]
    async fn test_remux_failure_cleans_up() {
        let (dir, pipeline) = setup(FakeTool {
            dimensions: vec![StreamDimensions {
                width: 640,
                height: 480,
            }],
            remux_fails: true,
        })
        .await;

        let input = dir.path().join("scratch/upload.mp4");
        std::fs::write(&input, b"video").unwrap();
        let media: MediaType = "video/mp4".parse().unwrap();

        let err = pipeline.publish(&input, &media).await.unwrap_err();
        assert!(matches!(err, ProcessingError::Transcode(_)));
        assert_eq!(scratch_entries(&dir), 1);
        assert!(!dir.path().join("store/videos").exists());
    }

    #[tokio::test]
    async fn test_no_streams_is_unsupported() {
        let (dir, pipeline) = setup(FakeTool {
            dimensions: Vec::new(),
            remux_fails: false,
        })
        .await;

        let input = dir.path().join("scratch/upload.mp4");
        std::fs::write(&input, b"video").unwrap();
        let media: MediaType = "video/mp4".parse().unwrap();

        let err = pipeline.publish(&input, &media).await.unwrap_err();
        assert!(matches!(err, ProcessingError::UnsupportedMedia(_)));
    }
}
