//! Health checks, metrics, and cache statistics.

use axum::{
    extract::Extension,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tracing::{instrument, warn};

use crate::state::AppState;

// ============================================================================
// Health Checks
// ============================================================================

/// GET /health - Basic health check
pub async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

// ============================================================================
// Prometheus Metrics
// ============================================================================

/// GET /metrics - Prometheus metrics endpoint
#[instrument(skip(state))]
pub async fn metrics_handler(Extension(state): Extension<Arc<AppState>>) -> Response {
    let cache_stats = state.cache.stats().await;
    state.metrics.record_cache_stats(&cache_stats);

    match &state.prometheus {
        Some(handle) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        )
            .into_response(),
        None => (StatusCode::SERVICE_UNAVAILABLE, "Metrics recorder not installed").into_response(),
    }
}

// ============================================================================
// JSON Cache Statistics
// ============================================================================

/// GET /api/cache/stats - Render cache and request counters
#[instrument(skip(state))]
pub async fn cache_stats_handler(Extension(state): Extension<Arc<AppState>>) -> Response {
    let cache = state.cache.stats().await;
    let stored = match state.cache.store().count().await {
        Ok(count) => Some(count),
        Err(e) => {
            warn!(error = %e, "Failed to count stored boards");
            None
        }
    };
    let service = state.metrics.snapshot().await;

    Json(serde_json::json!({
        "cache": cache,
        "stored_boards": stored,
        "service": service,
    }))
    .into_response()
}
