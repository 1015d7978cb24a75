//! Encode stage: WebP output and ThumbHash placeholders.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::imageops::FilterType;
use tiny_skia::Pixmap;

use board_common::{BoardError, BoardResult};

/// Default lossy WebP quality.
pub const DEFAULT_WEBP_QUALITY: f32 = 80.0;

/// ThumbHash input is limited to 100×100.
pub const THUMBNAIL_MAX_DIMENSION: u32 = 100;

/// Encode a finished board as lossy WebP.
pub fn encode_webp(pixmap: &Pixmap, quality: f32) -> BoardResult<Vec<u8>> {
    let rgba = demultiplied_rgba(pixmap);
    let encoder = webp::Encoder::from_rgba(&rgba, pixmap.width(), pixmap.height());
    let encoded = encoder.encode(quality.clamp(0.0, 100.0));
    if encoded.is_empty() {
        return Err(BoardError::Render("WebP encoder produced no output".to_string()));
    }
    Ok(encoded.to_vec())
}

/// Straight-alpha RGBA bytes of a pixmap.
pub fn demultiplied_rgba(pixmap: &Pixmap) -> Vec<u8> {
    let mut rgba = Vec::with_capacity(pixmap.data().len());
    for pixel in pixmap.pixels() {
        let c = pixel.demultiply();
        rgba.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
    }
    rgba
}

/// ThumbHash of an encoded image, base64 (standard alphabet).
///
/// The image is downscaled to fit within 100×100, keeping its aspect ratio.
pub fn thumbnail_hash(encoded: &[u8]) -> BoardResult<String> {
    let image = image::load_from_memory(encoded)
        .map_err(|e| BoardError::Render(format!("failed to decode image for thumbnail: {}", e)))?;

    let small = if image.width() > THUMBNAIL_MAX_DIMENSION || image.height() > THUMBNAIL_MAX_DIMENSION
    {
        image.resize(
            THUMBNAIL_MAX_DIMENSION,
            THUMBNAIL_MAX_DIMENSION,
            FilterType::Triangle,
        )
    } else {
        image
    };
    let rgba = small.to_rgba8();

    let hash = thumbhash::rgba_to_thumb_hash(
        rgba.width() as usize,
        rgba.height() as usize,
        rgba.as_raw(),
    );
    Ok(STANDARD.encode(hash))
}
