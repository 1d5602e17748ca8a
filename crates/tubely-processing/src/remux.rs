//! Faststart remux: move the MP4 index ahead of the media payload so players
//! can start before the download finishes.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempPath;

use crate::error::{ProcessingError, ProcessingResult};
use crate::tool::MediaTool;

const OUTPUT_SUFFIX: &str = ".processing";

pub struct Remuxer {
    tool: Arc<dyn MediaTool>,
}

impl Remuxer {
    pub fn new(tool: Arc<dyn MediaTool>) -> Self {
        Self { tool }
    }

    /// `input` with `.processing` appended.
    pub fn output_path(input: &Path) -> PathBuf {
        let mut name: OsString = input.as_os_str().to_owned();
        name.push(OUTPUT_SUFFIX);
        PathBuf::from(name)
    }

    /// Remux `input` into a sibling file that is deleted when the returned
    /// guard is dropped. The input is left untouched.
    pub async fn prepare_for_streaming(&self, input: &Path) -> ProcessingResult<TempPath> {
        let output = TempPath::try_from_path(Self::output_path(input))?;

        self.tool.remux_faststart(input, &output).await?;

        let produced = match tokio::fs::metadata(&output).await {
            Ok(meta) => meta.len(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => 0,
            Err(e) => return Err(e.into()),
        };
        if produced == 0 {
            return Err(ProcessingError::Transcode(
                "Remux produced no output".to_string(),
            ));
        }

        Ok(output)
    }
}
