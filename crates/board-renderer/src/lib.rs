//! Strategy board rendering.
//!
//! Pipeline stages, in order:
//! - [`compose`]: decoded layout to paint-ordered primitives (using [`geometry`])
//! - [`assets`]: concurrent loading of the artwork those primitives reference
//! - [`assemble`]: background and primitives painted onto a 1024×768 surface
//! - [`encode`]: WebP output and ThumbHash placeholders

pub mod assemble;
pub mod assets;
pub mod compose;
pub mod encode;
pub mod geometry;
pub mod icons;
pub mod text;

use std::sync::Arc;

use board_common::{BoardError, BoardResult, DecodedLayout};
use tiny_skia::Pixmap;
use tracing::debug;

pub use assemble::{assemble, BOARD_HEIGHT, BOARD_WIDTH};
pub use assets::{load_assets, AssetStore, DirectoryAssets, LoadedAssets};
pub use compose::{compose, compose_marker, Composition, DrawablePrimitive, PrimitiveKind};
pub use encode::{encode_webp, thumbnail_hash, DEFAULT_WEBP_QUALITY};
pub use geometry::{ArcSpan, Placement};
pub use icons::{icon_spec, IconSpec};
pub use text::TextRenderer;

/// Renders decoded layouts to encoded images.
///
/// Compositing and encoding are CPU-bound and run on the blocking pool; asset
/// loading stays on the async runtime.
#[derive(Clone)]
pub struct BoardRenderer {
    assets: Arc<dyn AssetStore>,
    text: Arc<TextRenderer>,
    quality: f32,
}

impl BoardRenderer {
    pub fn new(assets: Arc<dyn AssetStore>, text: TextRenderer) -> Self {
        Self {
            assets,
            text: Arc::new(text),
            quality: DEFAULT_WEBP_QUALITY,
        }
    }

    pub fn with_quality(mut self, quality: f32) -> Self {
        self.quality = quality;
        self
    }

    pub fn quality(&self) -> f32 {
        self.quality
    }

    /// Render a layout to its raster surface.
    pub async fn render_pixmap(&self, layout: &DecodedLayout) -> BoardResult<Pixmap> {
        let composition = compose(layout);
        let loaded = load_assets(self.assets.as_ref(), &composition).await;
        let text = Arc::clone(&self.text);

        tokio::task::spawn_blocking(move || assemble(&composition, &loaded, &text))
            .await
            .map_err(|e| BoardError::Internal(format!("assemble task failed: {}", e)))?
    }

    /// Render a layout to WebP bytes.
    pub async fn render_webp(&self, layout: &DecodedLayout) -> BoardResult<Vec<u8>> {
        let pixmap = self.render_pixmap(layout).await?;
        let quality = self.quality;

        let encoded = tokio::task::spawn_blocking(move || encode_webp(&pixmap, quality))
            .await
            .map_err(|e| BoardError::Internal(format!("encode task failed: {}", e)))??;
        debug!(
            markers = layout.markers.len(),
            bytes = encoded.len(),
            "Board rendered"
        );
        Ok(encoded)
    }

    /// ThumbHash (base64) of encoded board bytes.
    pub async fn thumbnail(&self, encoded: Vec<u8>) -> BoardResult<String> {
        tokio::task::spawn_blocking(move || thumbnail_hash(&encoded))
            .await
            .map_err(|e| BoardError::Internal(format!("thumbnail task failed: {}", e)))?
    }
}
