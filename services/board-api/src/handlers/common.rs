//! Shared response helpers.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;

use board_common::BoardError;

/// Rendered boards are content-addressed, so a response for a given URL never changes.
const BOARD_CACHE_CONTROL: &str = "public, max-age=31536000, immutable";

/// JSON error body with the status the error maps to.
pub fn error_response(err: &BoardError) -> Response {
    let status =
        StatusCode::from_u16(err.http_status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        Json(serde_json::json!({
            "error": err.code(),
            "message": err.to_string(),
        })),
    )
        .into_response()
}

/// Encoded board with its content type.
pub fn webp_response(bytes: Bytes) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "image/webp"),
            (header::CACHE_CONTROL, BOARD_CACHE_CONTROL),
        ],
        bytes,
    )
        .into_response()
}
