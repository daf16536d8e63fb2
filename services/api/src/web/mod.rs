pub mod protocol;
pub mod rest;
pub mod state;

pub use rest::{health_handler, quiz_handler, summary_handler, upload_document_handler};

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use state::AppState;
use std::sync::Arc;

/// Uploads larger than this are rejected before extraction.
pub const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Builds the API router around the shared state.
pub fn router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/documents", post(upload_document_handler))
        .route("/summary", post(summary_handler))
        .route("/quiz", post(quiz_handler))
        .route("/health", get(health_handler))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(app_state)
}
