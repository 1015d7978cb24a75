//! Application state and shared resources.

use anyhow::Result;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tracing::info;

use board_codec::{BoardCodec, StgyCodec, DEFAULT_KEY};
use board_common::DecodedLayout;
use board_renderer::{BoardRenderer, DirectoryAssets, TextRenderer};
use render_cache::{MemoryCache, RenderCache, RenderPipeline, RenderStore};

use crate::config::RenderConfig;
use crate::metrics::MetricsCollector;
use crate::pipeline::BoardPipeline;

/// Shared application state.
pub struct AppState {
    pub cache: Arc<RenderCache>,
    pub codec: Arc<dyn BoardCodec>,
    /// Code of the built-in board, served when a request carries no code.
    pub default_code: String,
    pub metrics: Arc<MetricsCollector>,
    /// Present when the process installed a Prometheus recorder.
    pub prometheus: Option<PrometheusHandle>,
}

impl AppState {
    /// State wired to the production pipeline.
    pub fn new(config: &RenderConfig) -> Result<Self> {
        let metrics = Arc::new(MetricsCollector::new());
        let codec: Arc<dyn BoardCodec> = Arc::new(StgyCodec::new());
        let pipeline = Arc::new(build_pipeline(config, Arc::clone(&codec), Arc::clone(&metrics)));
        Self::with_pipeline(config, codec, pipeline, metrics)
    }

    /// State around an arbitrary render pipeline.
    pub fn with_pipeline(
        config: &RenderConfig,
        codec: Arc<dyn BoardCodec>,
        pipeline: Arc<dyn RenderPipeline>,
        metrics: Arc<MetricsCollector>,
    ) -> Result<Self> {
        let default_code = codec.encode(&DecodedLayout::default_board(), DEFAULT_KEY)?;

        let cache = RenderCache::new(pipeline, RenderStore::new(&config.cache_dir))
            .with_memory_cache(MemoryCache::new(config.memory_cache_mb))
            .with_render_timeout(config.render_timeout());

        info!(
            cache_dir = %config.cache_dir.display(),
            memory_cache_mb = config.memory_cache_mb,
            render_timeout_secs = config.render_timeout().as_secs(),
            "Render cache ready"
        );

        Ok(Self {
            cache: Arc::new(cache),
            codec,
            default_code,
            metrics,
            prometheus: None,
        })
    }

    pub fn with_prometheus(mut self, handle: PrometheusHandle) -> Self {
        self.prometheus = Some(handle);
        self
    }

    /// The code to render for a request, substituting the default board for
    /// an absent or blank one.
    pub fn code_or_default<'a>(&'a self, code: Option<&'a str>) -> &'a str {
        match code.map(str::trim) {
            Some(code) if !code.is_empty() => code,
            _ => &self.default_code,
        }
    }
}

/// Codec, asset store, font and encoder settings assembled into a pipeline.
pub fn build_pipeline(
    config: &RenderConfig,
    codec: Arc<dyn BoardCodec>,
    metrics: Arc<MetricsCollector>,
) -> BoardPipeline {
    let assets = Arc::new(DirectoryAssets::new(&config.asset_dir));
    let text = TextRenderer::discover(&config.asset_dir);
    let renderer = BoardRenderer::new(assets, text).with_quality(config.webp_quality);
    info!(
        asset_dir = %config.asset_dir.display(),
        webp_quality = config.webp_quality,
        "Board renderer ready"
    );
    BoardPipeline::new(codec, renderer, metrics)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_code_decodes_to_default_board() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::new(&RenderConfig::new(dir.path(), dir.path())).unwrap();
        assert_eq!(
            state.codec.decode(&state.default_code).unwrap(),
            DecodedLayout::default_board()
        );
    }

    #[test]
    fn test_code_or_default() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::new(&RenderConfig::new(dir.path(), dir.path())).unwrap();
        assert_eq!(state.code_or_default(None), state.default_code);
        assert_eq!(state.code_or_default(Some("  ")), state.default_code);
        assert_eq!(state.code_or_default(Some("[stgy:abc]")), "[stgy:abc]");
        assert_eq!(state.code_or_default(Some(" [stgy:abc]\n")), "[stgy:abc]");
    }
}
