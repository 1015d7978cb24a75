//! Conversion between board codes and layout JSON.

use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{instrument, warn};

use board_codec::{DEFAULT_KEY, MAX_KEY};
use board_common::{BoardError, DecodedLayout};

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct Code2JsonRequest {
    pub code: String,
}

#[derive(Debug, Deserialize)]
pub struct Json2CodeRequest {
    /// Layout JSON, validated by the handler so failures keep the JSON error shape.
    pub board: serde_json::Value,
    #[serde(default)]
    pub key: Option<i64>,
}

fn failure(status: StatusCode, error: impl ToString) -> Response {
    (
        status,
        Json(serde_json::json!({ "ok": false, "error": error.to_string() })),
    )
        .into_response()
}

/// POST /utils/code2json - Decode a board code
#[instrument(skip(state, request))]
pub async fn code2json_handler(
    Extension(state): Extension<Arc<AppState>>,
    Json(request): Json<Code2JsonRequest>,
) -> Response {
    state.metrics.record_conversion_request("code2json");

    match state.codec.decode(&request.code) {
        Ok(layout) => Json(serde_json::json!({ "ok": true, "data": layout })).into_response(),
        Err(e) => {
            warn!(error = %e, "code2json failed");
            failure(StatusCode::INTERNAL_SERVER_ERROR, e)
        }
    }
}

/// POST /utils/json2code - Encode a layout as a board code
#[instrument(skip(state, request))]
pub async fn json2code_handler(
    Extension(state): Extension<Arc<AppState>>,
    Json(request): Json<Json2CodeRequest>,
) -> Response {
    state.metrics.record_conversion_request("json2code");

    let key = request.key.unwrap_or(DEFAULT_KEY as i64);
    let key = match u8::try_from(key) {
        Ok(key) if key <= MAX_KEY => key,
        _ => {
            return failure(
                StatusCode::UNPROCESSABLE_ENTITY,
                format!("key must be between 0 and {}, got {}", MAX_KEY, key),
            )
        }
    };

    let board: DecodedLayout = match serde_json::from_value(request.board) {
        Ok(board) => board,
        Err(e) => {
            let e = BoardError::from(e);
            warn!(error = %e, "json2code received an invalid board");
            return failure(StatusCode::INTERNAL_SERVER_ERROR, e);
        }
    };

    match state.codec.encode(&board, key) {
        Ok(code) => Json(serde_json::json!({ "ok": true, "code": code })).into_response(),
        Err(e) => {
            warn!(error = %e, "json2code failed");
            failure(StatusCode::INTERNAL_SERVER_ERROR, e)
        }
    }
}
