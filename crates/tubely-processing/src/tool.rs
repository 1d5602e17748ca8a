//! External media tools.
//!
//! [`FfmpegTool`] shells out to `ffprobe` and `ffmpeg`. Each child process is
//! killed if it outlives the configured timeout.

use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;
use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::process::Command;

use crate::error::{ProcessingError, ProcessingResult};

/// Declared pixel size of a video stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamDimensions {
    pub width: u32,
    pub height: u32,
}

#[async_trait]
pub trait MediaTool: Send + Sync {
    /// Dimensions of the video streams in `path`, first stream first.
    async fn probe(&self, path: &Path) -> ProcessingResult<Vec<StreamDimensions>>;

    /// Copy every stream of `input` into an MP4 at `output` with the index
    /// ahead of the payload. No re-encoding.
    async fn remux_faststart(&self, input: &Path, output: &Path) -> ProcessingResult<()>;
}

/// Tool binaries are restricted to plain path characters. File arguments are
/// passed to the child verbatim and need no such check.
fn validate_binary(path: &str) -> Result<(), String> {
    if path.contains("..") {
        return Err(format!("Path contains directory traversal: {}", path));
    }
    if path.is_empty()
        || !path.chars().all(|c| {
            c.is_alphanumeric() || c == '/' || c == '-' || c == '_' || c == '.' || c == '\\'
        })
    {
        return Err(format!("Invalid binary path: {}", path));
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
struct ProbeReport {
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    width: Option<u32>,
    height: Option<u32>,
}

/// Parse `ffprobe -print_format json -show_streams` output.
///
/// Streams that report no dimensions are skipped.
pub fn parse_probe_output(stdout: &[u8]) -> ProcessingResult<Vec<StreamDimensions>> {
    let report: ProbeReport = serde_json::from_slice(stdout).map_err(|e| {
        ProcessingError::UnsupportedMedia(format!("Failed to parse ffprobe output: {}", e))
    })?;

    Ok(report
        .streams
        .into_iter()
        .filter_map(|s| match (s.width, s.height) {
            (Some(width), Some(height)) => Some(StreamDimensions { width, height }),
            _ => None,
        })
        .collect())
}

pub struct FfmpegTool {
    ffmpeg_path: String,
    ffprobe_path: String,
    timeout: Duration,
}

impl FfmpegTool {
    pub fn new(
        ffmpeg_path: impl Into<String>,
        ffprobe_path: impl Into<String>,
        timeout: Duration,
    ) -> ProcessingResult<Self> {
        let ffmpeg_path = ffmpeg_path.into();
        let ffprobe_path = ffprobe_path.into();
        validate_binary(&ffmpeg_path).map_err(ProcessingError::Transcode)?;
        validate_binary(&ffprobe_path).map_err(ProcessingError::UnsupportedMedia)?;

        Ok(Self {
            ffmpeg_path,
            ffprobe_path,
            timeout,
        })
    }

    /// Run `command` to completion or until the timeout; `None` means it timed out.
    async fn run(&self, mut command: Command) -> std::io::Result<Option<Output>> {
        command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        match tokio::time::timeout(self.timeout, command.output()).await {
            Ok(output) => output.map(Some),
            Err(_) => Ok(None),
        }
    }
}

#[async_trait]
impl MediaTool for FfmpegTool {
    #[tracing::instrument(skip(self), fields(
        process.executable.name = "ffprobe",
        process.executable.path = %self.ffprobe_path,
        ffmpeg.operation = "probe"
    ))]
    async fn probe(&self, path: &Path) -> ProcessingResult<Vec<StreamDimensions>> {
        let start = std::time::Instant::now();

        let mut command = Command::new(&self.ffprobe_path);
        command
            .args([
                "-v",
                "error",
                "-print_format",
                "json",
                "-show_streams",
                "-select_streams",
                "v:0",
            ])
            .arg(path);

        let output = self
            .run(command)
            .await?
            .ok_or_else(|| {
                ProcessingError::UnsupportedMedia(format!(
                    "ffprobe timed out after {:?}",
                    self.timeout
                ))
            })?;

        if !output.status.success() {
            return Err(ProcessingError::UnsupportedMedia(format!(
                "ffprobe failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let streams = parse_probe_output(&output.stdout)?;

        tracing::info!(
            duration_ms = start.elapsed().as_millis(),
            streams = streams.len(),
            "Video probe completed"
        );

        Ok(streams)
    }

    #[tracing::instrument(skip(self), fields(
        process.executable.name = "ffmpeg",
        process.executable.path = %self.ffmpeg_path,
        ffmpeg.operation = "remux"
    ))]
    async fn remux_faststart(&self, input: &Path, output: &Path) -> ProcessingResult<()> {
        let start = std::time::Instant::now();

        let mut command = Command::new(&self.ffmpeg_path);
        command
            .args(["-y", "-v", "error", "-i"])
            .arg(input)
            .args(["-c", "copy", "-movflags", "faststart", "-f", "mp4"])
            .arg(output);

        let result = self
            .run(command)
            .await
            .map_err(|e| ProcessingError::Transcode(format!("Failed to execute ffmpeg: {}", e)))?
            .ok_or_else(|| {
                ProcessingError::Transcode(format!(
                    "ffmpeg timed out after {:?}",
                    self.timeout
                ))
            })?;

        if !result.status.success() {
            return Err(ProcessingError::Transcode(format!(
                "ffmpeg exited with {}: {}",
                result.status,
                String::from_utf8_lossy(&result.stderr).trim()
            )));
        }

        tracing::info!(
            duration_ms = start.elapsed().as_millis(),
            "Faststart remux completed"
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_probe_output() {
        let json = br#"{
            "streams": [
                {"index": 0, "codec_type": "video", "width": 1920, "height": 1080}
            ]
        }"#;
        let streams = parse_probe_output(json).unwrap();
        assert_eq!(
            streams,
            vec![StreamDimensions {
                width: 1920,
                height: 1080
            }]
        );
    }

    #[test]
    fn test_parse_probe_output_without_streams() {
        assert!(parse_probe_output(b"{}").unwrap().is_empty());
        assert!(parse_probe_output(br#"{"streams": []}"#).unwrap().is_empty());
        assert!(parse_probe_output(br#"{"streams": [{"codec_type": "audio"}]}"#)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_parse_probe_output_garbage() {
        let err = parse_probe_output(b"not json").unwrap_err();
        assert!(matches!(err, ProcessingError::UnsupportedMedia(_)));
    }

    #[test]
    fn test_binary_validation() {
        assert!(FfmpegTool::new("ffmpeg", "ffprobe", Duration::from_secs(1)).is_ok());
        assert!(
            FfmpegTool::new("/usr/bin/ffmpeg", "/usr/bin/ffprobe", Duration::from_secs(1)).is_ok()
        );
        assert!(FfmpegTool::new("ffmpeg; rm -rf /", "ffprobe", Duration::from_secs(1)).is_err());
        assert!(FfmpegTool::new("ffmpeg", "", Duration::from_secs(1)).is_err());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failing_ffmpeg_is_transcode_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let input = dir.path().join("in.mp4");
        std::fs::write(&input, b"x").unwrap();

        // `false` exits non-zero for any arguments.
        let tool = FfmpegTool::new("false", "false", Duration::from_secs(5)).unwrap();
        let err = tool
            .remux_faststart(&input, &dir.path().join("out.mp4"))
            .await
            .unwrap_err();
        assert!(matches!(err, ProcessingError::Transcode(_)));

        let err = tool.probe(&input).await.unwrap_err();
        assert!(matches!(err, ProcessingError::UnsupportedMedia(_)));
    }

    /// Write an executable shell script into `dir`.
    #[cfg(unix)]
    fn write_script(dir: &Path, name: &str, body: &str) -> std::path::PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_slow_tool_is_killed_at_timeout() {
        let dir = tempfile::TempDir::new().unwrap();
        let input = dir.path().join("in.mp4");
        std::fs::write(&input, b"x").unwrap();
        let slow = write_script(dir.path(), "slow-tool", "exec sleep 5");
        let slow = slow.to_string_lossy().into_owned();

        let tool = FfmpegTool::new(slow.clone(), slow, Duration::from_millis(300)).unwrap();

        let start = std::time::Instant::now();
        let err = tool.probe(&input).await.unwrap_err();
        assert!(start.elapsed() < Duration::from_secs(3));
        match err {
            ProcessingError::UnsupportedMedia(msg) => assert!(msg.contains("300ms"), "{msg}"),
            other => panic!("expected UnsupportedMedia, got {other:?}"),
        }

        let start = std::time::Instant::now();
        let err = tool
            .remux_faststart(&input, &dir.path().join("out.mp4"))
            .await
            .unwrap_err();
        assert!(start.elapsed() < Duration::from_secs(3));
        match err {
            ProcessingError::Transcode(msg) => assert!(msg.contains("300ms"), "{msg}"),
            other => panic!("expected Transcode, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_file_arguments_with_shell_characters_reach_the_tool() {
        let dir = tempfile::TempDir::new().unwrap();
        let scratch = dir.path().join("uploads (staging) & $HOME");
        std::fs::create_dir_all(&scratch).unwrap();
        let input = scratch.join("in.mp4");
        std::fs::write(&input, b"x").unwrap();

        let bin = dir.path().join("bin");
        std::fs::create_dir_all(&bin).unwrap();
        let ffprobe = write_script(
            &bin,
            "fake-ffprobe",
            r#"echo '{"streams":[{"width":1920,"height":1080}]}'"#,
        );

        let tool = FfmpegTool::new(
            "true",
            ffprobe.to_string_lossy().into_owned(),
            Duration::from_secs(5),
        )
        .unwrap();

        let streams = tool.probe(&input).await.unwrap();
        assert_eq!(
            streams,
            vec![StreamDimensions {
                width: 1920,
                height: 1080
            }]
        );
        tool.remux_faststart(&input, &scratch.join("out.mp4"))
            .await
            .unwrap();
    }
}
