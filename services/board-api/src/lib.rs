//! Strategy board render service.
//!
//! Serves board images rendered from board codes, backed by the
//! content-addressed render cache, plus code/JSON conversion utilities.

pub mod config;
pub mod handlers;
pub mod metrics;
pub mod pipeline;
pub mod state;

use axum::{
    extract::Extension,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

pub use config::RenderConfig;
pub use pipeline::BoardPipeline;
pub use state::AppState;

/// Build the service router around shared state.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Board images
        .route("/board", get(handlers::board_default_handler))
        .route("/board/", get(handlers::board_default_handler))
        .route("/board/:code", get(handlers::board_handler))
        .route("/preview/:hash", get(handlers::preview_handler))
        // Offline path
        .route("/api/prerender", post(handlers::prerender_handler))
        // Conversion utilities
        .route("/utils/code2json", post(handlers::code2json_handler))
        .route("/utils/json2code", post(handlers::json2code_handler))
        // Health, metrics and statistics
        .route("/health", get(handlers::health_handler))
        .route("/metrics", get(handlers::metrics_handler))
        .route("/api/cache/stats", get(handlers::cache_stats_handler))
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
}
