//! HTTP front end for jpegfit.
//!
//! Accepts a multipart upload, validates it, and answers with a JPEG that
//! fits the configured size budget, either as raw bytes or as base64 JSON.

pub mod config;
pub mod errors;
pub mod routes;
pub mod state;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use config::{Args, ServerConfig};
pub use errors::{AppError, AppResult};
pub use state::AppState;

/// Room for multipart boundaries and headers on top of the file itself.
const MULTIPART_OVERHEAD: u64 = 64 * 1024;

/// Build the application router.
pub fn app(state: AppState) -> Router {
    let body_limit = state
        .intake
        .max_input_bytes
        .saturating_add(MULTIPART_OVERHEAD)
        .try_into()
        .unwrap_or(usize::MAX);

    Router::new()
        .route("/health", get(routes::health))
        .route("/api/resize", post(routes::resize))
        .route("/api/resize/base64", post(routes::resize_base64))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
