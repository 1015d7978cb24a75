//! HTTP request handlers.
//!
//! This module is organized into submodules:
//! - `board`: board images and stored previews
//! - `prerender`: offline render path (hash + thumbnail)
//! - `utils`: code/JSON conversion
//! - `metrics`: health checks, Prometheus metrics, cache statistics
//! - `common`: shared response helpers

pub mod board;
pub mod common;
pub mod metrics;
pub mod prerender;
pub mod utils;

pub use board::{board_default_handler, board_handler, preview_handler};
pub use common::{error_response, webp_response};
pub use metrics::{cache_stats_handler, health_handler, metrics_handler};
pub use prerender::{prerender_handler, PrerenderRequest};
pub use utils::{code2json_handler, json2code_handler, Code2JsonRequest, Json2CodeRequest};
