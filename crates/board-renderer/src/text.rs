//! Text rasterization for text markers.
//!
//! Glyphs are drawn into a coverage mask with rusttype/imageproc; the
//! assembler tints the mask and composites it onto the board.

use image::{GrayImage, Luma};
use imageproc::drawing::draw_text_mut;
use rusttype::{point, Font, Scale};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// System locations tried when the asset directory ships no font.
const SYSTEM_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
];

/// Font used for text markers. Without a font, text markers are skipped.
pub struct TextRenderer {
    font: Option<Font<'static>>,
}

impl TextRenderer {
    /// Renderer that draws no text.
    pub fn disabled() -> Self {
        Self { font: None }
    }

    pub fn from_bytes(data: Vec<u8>) -> Option<Self> {
        Font::try_from_vec(data).map(|font| Self { font: Some(font) })
    }

    /// Load the first usable font from `<asset_dir>/fonts`, then from well-known
    /// system locations.
    pub fn discover(asset_dir: &Path) -> Self {
        let mut candidates = font_files(&asset_dir.join("fonts"));
        candidates.extend(SYSTEM_FONTS.iter().map(PathBuf::from));

        for path in candidates {
            let Ok(data) = std::fs::read(&path) else {
                continue;
            };
            match Self::from_bytes(data) {
                Some(renderer) => {
                    info!(path = %path.display(), "Loaded font for text markers");
                    return renderer;
                }
                None => warn!(path = %path.display(), "Ignoring unreadable font"),
            }
        }

        warn!(
            asset_dir = %asset_dir.display(),
            "No font found, text markers will not be drawn"
        );
        Self::disabled()
    }

    pub fn is_enabled(&self) -> bool {
        self.font.is_some()
    }

    /// Coverage mask of `text`, top-left aligned and at most `max_width` pixels
    /// wide. Glyphs starting at or past `max_width` are not laid out. `None`
    /// when there is nothing to draw.
    pub fn render_mask(&self, text: &str, font_size: f32, max_width: u32) -> Option<GrayImage> {
        let font = self.font.as_ref()?;
        if text.trim().is_empty() || max_width == 0 {
            return None;
        }

        let scale = Scale::uniform(font_size);
        let v_metrics = font.v_metrics(scale);
        let visible_glyphs = font
            .layout(text, scale, point(0.0, v_metrics.ascent))
            .take_while(|glyph| glyph.position().x < max_width as f32)
            .count();
        let text = match text.char_indices().nth(visible_glyphs) {
            Some((end, _)) => &text[..end],
            None => text,
        };

        let width = font
            .layout(text, scale, point(0.0, v_metrics.ascent))
            .filter_map(|glyph| glyph.pixel_bounding_box())
            .map(|bb| bb.max.x)
            .max()
            .unwrap_or(0)
            .min(max_width as i32);
        let height = (v_metrics.ascent - v_metrics.descent).ceil() as i32;
        if width <= 0 || height <= 0 {
            return None;
        }

        let mut mask = GrayImage::new(width as u32, height as u32 + 1);
        draw_text_mut(&mut mask, Luma([255u8]), 0, 0, scale, font, text);
        Some(mask)
    }
}

fn font_files(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| matches!(ext.to_ascii_lowercase().as_str(), "ttf" | "otf"))
                .unwrap_or(false)
        })
        .collect();
    files.sort();
    files
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_renderer_draws_nothing() {
        let renderer = TextRenderer::disabled();
        assert!(!renderer.is_enabled());
        assert!(renderer.render_mask("Stack", 28.0, 1024).is_none());
    }

    #[test]
    fn test_long_text_mask_is_bounded() {
        let renderer = TextRenderer::discover(Path::new("/nonexistent"));
        if !renderer.is_enabled() {
            // no system font on this machine
            return;
        }
        let text = "A".repeat(20_000);
        let mask = renderer.render_mask(&text, 28.0, 1024).unwrap();
        assert!(mask.width() <= 1024, "mask width {}", mask.width());

        let short = renderer.render_mask("AA", 28.0, 1024).unwrap();
        assert!(short.width() < 100);
    }

    #[test]
    fn test_zero_width_budget_draws_nothing() {
        let renderer = TextRenderer::discover(Path::new("/nonexistent"));
        assert!(renderer.render_mask("Stack", 28.0, 0).is_none());
    }

    #[test]
    fn test_garbage_font_rejected() {
        assert!(TextRenderer::from_bytes(vec![0u8; 64]).is_none());
    }

    #[test]
    fn test_font_files_filters_extensions() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.ttf"), b"").unwrap();
        std::fs::write(dir.path().join("a.OTF"), b"").unwrap();
        std::fs::write(dir.path().join("readme.txt"), b"").unwrap();

        let files = font_files(dir.path());
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.OTF", "b.ttf"]);
    }
}
