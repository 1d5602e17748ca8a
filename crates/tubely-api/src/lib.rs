//! Tubely API Library
//!
//! HTTP handlers, authentication, and application setup for the Tubely
//! upload service.

mod api_doc;
mod handlers;
mod utils;

pub mod auth;
pub mod error;
pub mod setup;
pub mod state;
pub mod telemetry;

pub use error::{ErrorResponse, HttpAppError};
pub use setup::routes::build_router;
pub use state::AppState;
