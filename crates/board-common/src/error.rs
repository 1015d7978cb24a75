//! Error types for strategy-board services.

use thiserror::Error;

/// Result type alias using BoardError.
pub type BoardResult<T> = Result<T, BoardError>;

/// Primary error type for board decoding, rendering and caching.
///
/// Cloneable so a single failed render can be handed to every request that
/// was waiting on it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BoardError {
    // === Input Errors ===
    #[error("Failed to decode board code: {0}")]
    Decode(String),

    #[error("Failed to encode board: {0}")]
    Encode(String),

    #[error("Invalid parameter value for '{param}': {message}")]
    InvalidParameter { param: String, message: String },

    // === Asset Errors ===
    #[error("Asset not found: {0}")]
    AssetMissing(String),

    // === Rendering Errors ===
    #[error("Rendering failed: {0}")]
    Render(String),

    // === Storage Errors ===
    #[error("Storage error: {0}")]
    Storage(String),

    // === Infrastructure Errors ===
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Render timed out")]
    Timeout,
}

impl BoardError {
    /// Short machine-readable code, used in JSON error bodies and metric labels.
    pub fn code(&self) -> &'static str {
        match self {
            BoardError::Decode(_) => "DecodeError",
            BoardError::Encode(_) => "EncodeError",
            BoardError::InvalidParameter { .. } => "InvalidParameterValue",
            BoardError::AssetMissing(_) => "AssetMissing",
            BoardError::Render(_) => "RenderError",
            BoardError::Storage(_) => "StorageError",
            BoardError::Internal(_) => "InternalError",
            BoardError::Timeout => "Timeout",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn http_status_code(&self) -> u16 {
        match self {
            BoardError::Decode(_) | BoardError::InvalidParameter { .. } => 400,
            BoardError::AssetMissing(_) => 404,
            BoardError::Timeout => 504,
            _ => 500,
        }
    }
}

// Conversion from common error types
impl From<std::io::Error> for BoardError {
    fn from(err: std::io::Error) -> Self {
        BoardError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for BoardError {
    fn from(err: serde_json::Error) -> Self {
        BoardError::Decode(format!("JSON error: {}", err))
    }
}
