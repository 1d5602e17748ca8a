//! Aspect-ratio classification of uploaded videos.
//!
//! The label only picks the object key prefix. Note that the label names are
//! swapped relative to their usual meaning: wide (~16:9) video lands under
//! `portrait/` and tall (~9:16) video under `landscape/`. Existing objects are
//! already stored under these prefixes, so the mapping is kept as is.

use std::path::Path;
use std::sync::Arc;

use crate::error::{ProcessingError, ProcessingResult};
use crate::tool::{MediaTool, StreamDimensions};

const WIDE_RANGE: (f64, f64) = (1.70, 1.78);
const TALL_RANGE: (f64, f64) = (0.50, 0.58);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AspectRatio {
    /// Width/height in [1.70, 1.78]
    Portrait,
    /// Width/height in [0.50, 0.58]
    Landscape,
    Other,
}

impl AspectRatio {
    /// Classify declared stream dimensions. Fails on zero height.
    pub fn from_dimensions(dimensions: StreamDimensions) -> ProcessingResult<Self> {
        if dimensions.height == 0 {
            return Err(ProcessingError::UnsupportedMedia(
                "Video stream reports zero height".to_string(),
            ));
        }

        let ratio = f64::from(dimensions.width) / f64::from(dimensions.height);

        if ratio >= WIDE_RANGE.0 && ratio <= WIDE_RANGE.1 {
            Ok(AspectRatio::Portrait)
        } else if ratio >= TALL_RANGE.0 && ratio <= TALL_RANGE.1 {
            Ok(AspectRatio::Landscape)
        } else {
            Ok(AspectRatio::Other)
        }
    }

    pub fn as_prefix(&self) -> &'static str {
        match self {
            AspectRatio::Portrait => "portrait",
            AspectRatio::Landscape => "landscape",
            AspectRatio::Other => "other",
        }
    }
}

impl std::fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_prefix())
    }
}

pub struct Classifier {
    tool: Arc<dyn MediaTool>,
}

impl Classifier {
    pub fn new(tool: Arc<dyn MediaTool>) -> Self {
        Self { tool }
    }

    /// Probe `path` and classify its first video stream.
    pub async fn classify(&self, path: &Path) -> ProcessingResult<AspectRatio> {
        let streams = self.tool.probe(path).await?;
        let first = streams.first().copied().ok_or_else(|| {
            ProcessingError::UnsupportedMedia("No video stream found".to_string())
        })?;

        let aspect = AspectRatio::from_dimensions(first)?;
        tracing::debug!(
            width = first.width,
            height = first.height,
            aspect = %aspect,
            "Video classified"
        );
        Ok(aspect)
    }
}
