//! Board image and preview handlers.

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tracing::{error, instrument};

use board_common::BoardError;

use super::common::{error_response, webp_response};
use crate::state::AppState;

/// GET /board - The built-in default board
#[instrument(skip(state))]
pub async fn board_default_handler(Extension(state): Extension<Arc<AppState>>) -> Response {
    render_board(&state, None).await
}

/// GET /board/:code - Board image for a code
#[instrument(skip(state, code))]
pub async fn board_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(code): Path<String>,
) -> Response {
    render_board(&state, Some(&code)).await
}

async fn render_board(state: &AppState, code: Option<&str>) -> Response {
    state.metrics.record_board_request();
    let code = state.code_or_default(code);

    match state.cache.resolve(code).await {
        Ok(bytes) => webp_response(bytes),
        Err(e) => {
            error!(error = %e, "Board render failed");
            error_response(&e)
        }
    }
}

/// GET /preview/:hash - A previously rendered board, by hash
#[instrument(skip(state))]
pub async fn preview_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(hash): Path<String>,
) -> Response {
    state.metrics.record_preview_request();

    match state.cache.preview(&hash).await {
        Ok(Some(bytes)) => webp_response(bytes),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({
                "error": "NotFound",
                "message": format!("No rendered board for {}", hash),
            })),
        )
            .into_response(),
        Err(e @ BoardError::InvalidParameter { .. }) => error_response(&e),
        Err(e) => {
            error!(error = %e, "Preview lookup failed");
            error_response(&e)
        }
    }
}
