//! Offline render path over HTTP.

use axum::{
    extract::Extension,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, info, instrument};

use super::common::error_response;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct PrerenderRequest {
    #[serde(default)]
    pub code: Option<String>,
}

/// POST /api/prerender - Render (or reuse) a board, return its hash and thumbnail
///
/// Repeated calls for the same code reuse the stored render, but callers
/// should not fire them in rapid succession.
#[instrument(skip(state, request))]
pub async fn prerender_handler(
    Extension(state): Extension<Arc<AppState>>,
    Json(request): Json<PrerenderRequest>,
) -> Response {
    state.metrics.record_prerender_request();
    let code = state.code_or_default(request.code.as_deref());

    match state.cache.resolve_offline(code).await {
        Ok(result) => {
            info!(hash = %result.hash, "Prerendered board");
            Json(result).into_response()
        }
        Err(e) => {
            error!(error = %e, "Prerender failed");
            error_response(&e)
        }
    }
}
