//! Board code to WebP: codec, compositor, assets, assembler and encoder.

use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

use board_codec::BoardCodec;
use board_common::{BoardResult, DecodedLayout};
use board_renderer::BoardRenderer;
use render_cache::RenderPipeline;

use crate::metrics::MetricsCollector;

/// The production render pipeline behind the render cache.
///
/// Codes that do not decode are rendered as the default board, so every code
/// yields an image.
pub struct BoardPipeline {
    codec: Arc<dyn BoardCodec>,
    renderer: BoardRenderer,
    metrics: Arc<MetricsCollector>,
}

impl BoardPipeline {
    pub fn new(
        codec: Arc<dyn BoardCodec>,
        renderer: BoardRenderer,
        metrics: Arc<MetricsCollector>,
    ) -> Self {
        Self {
            codec,
            renderer,
            metrics,
        }
    }

    /// Layout drawn for `code`.
    pub fn layout_for(&self, code: &str) -> DecodedLayout {
        if code.trim().is_empty() {
            return DecodedLayout::default_board();
        }
        if !self.codec.looks_like_code(code) {
            warn!(code_len = code.len(), "Not a board code, rendering default board");
            self.metrics.record_decode_fallback();
            return DecodedLayout::default_board();
        }
        match self.codec.decode(code) {
            Ok(layout) => layout,
            Err(e) => {
                warn!(error = %e, "Undecodable board code, rendering default board");
                self.metrics.record_decode_fallback();
                DecodedLayout::default_board()
            }
        }
    }
}

#[async_trait]
impl RenderPipeline for BoardPipeline {
    async fn render(&self, code: &str) -> BoardResult<Bytes> {
        let start = Instant::now();
        let layout = self.layout_for(code);
        let result = self.renderer.render_webp(&layout).await;
        self.metrics
            .record_render(start.elapsed(), result.is_ok())
            .await;

        let encoded = result?;
        debug!(
            markers = layout.markers.len(),
            bytes = encoded.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Rendered board"
        );
        Ok(Bytes::from(encoded))
    }

    async fn thumbnail(&self, webp: &[u8]) -> BoardResult<String> {
        self.renderer.thumbnail(webp.to_vec()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use board_codec::{StgyCodec, DEFAULT_KEY};
    use board_renderer::{DirectoryAssets, TextRenderer};
    use std::sync::atomic::Ordering;

    fn pipeline() -> BoardPipeline {
        let renderer = BoardRenderer::new(
            Arc::new(DirectoryAssets::new("/nonexistent/board-assets")),
            TextRenderer::disabled(),
        );
        BoardPipeline::new(
            Arc::new(StgyCodec::new()),
            renderer,
            Arc::new(MetricsCollector::new()),
        )
    }

    #[test]
    fn test_empty_code_is_default_board() {
        let pipeline = pipeline();
        assert_eq!(pipeline.layout_for(""), DecodedLayout::default_board());
        assert_eq!(pipeline.metrics.decode_fallbacks.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_malformed_code_falls_back() {
        let pipeline = pipeline();
        assert_eq!(pipeline.layout_for("hello"), DecodedLayout::default_board());
        assert_eq!(pipeline.metrics.decode_fallbacks.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_broken_payload_falls_back() {
        let pipeline = pipeline();
        assert_eq!(
            pipeline.layout_for("[stgy:a%%%]"),
            DecodedLayout::default_board()
        );
        assert_eq!(pipeline.metrics.decode_fallbacks.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_padded_code_decodes() {
        let pipeline = pipeline();
        let layout = test_utils::every_shape_layout();
        let code = StgyCodec::new().encode(&layout, 3).unwrap();
        assert_eq!(pipeline.layout_for(&format!("  {}\n", code)), layout);
        assert_eq!(pipeline.metrics.decode_fallbacks.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_valid_code_decodes() {
        let pipeline = pipeline();
        let layout = test_utils::every_shape_layout();
        let code = StgyCodec::new().encode(&layout, DEFAULT_KEY).unwrap();
        assert_eq!(pipeline.layout_for(&code), layout);
    }

    #[tokio::test]
    async fn test_render_records_metrics() {
        let pipeline = pipeline();
        let bytes = pipeline.render("").await.unwrap();
        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(pipeline.metrics.renders_total.load(Ordering::Relaxed), 1);
        assert_eq!(pipeline.metrics.render_errors.load(Ordering::Relaxed), 0);
    }
}
