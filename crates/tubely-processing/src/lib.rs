//! Tubely Processing Library
//!
//! The video upload pipeline: an upload is materialized on local disk
//! ([`ingest`]), classified by aspect ratio ([`classify`]), remuxed for
//! progressive playback ([`remux`]) and pushed to object storage
//! ([`publish`]). [`pipeline::VideoPipeline`] runs the last three stages in
//! order for one request.
//!
//! External tools sit behind the [`tool::MediaTool`] trait.

pub mod classify;
pub mod error;
pub mod ingest;
pub mod pipeline;
pub mod publish;
pub mod remux;
pub mod tool;

pub use classify::{AspectRatio, Classifier};
pub use error::{ProcessingError, ProcessingResult};
pub use ingest::{IngestedFile, Ingestor};
pub use pipeline::VideoPipeline;
pub use publish::Publisher;
pub use remux::Remuxer;
pub use tool::{FfmpegTool, MediaTool, StreamDimensions};
