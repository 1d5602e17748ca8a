//! Tubely record store.
//!
//! [`VideoRepository`] is the narrow interface the upload handlers depend on;
//! [`PgVideoRepository`] implements it on PostgreSQL.

pub mod video;

pub use video::{PgVideoRepository, VideoRepository};
