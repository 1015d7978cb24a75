//! Board assembler: paints a composition onto a fixed-size raster surface.
//!
//! The background is stretched full-bleed, then every primitive is painted in
//! composition order. Missing artwork never fails a board: backgrounds fall
//! back to a procedural pattern, disc textures to a flat fill, and icons are
//! left out.

use image::RgbaImage;
use std::borrow::Cow;
use tiny_skia::{
    Color as SkiaColor, FillRule, FilterQuality, Mask, Paint, PathBuilder, Pixmap, PixmapPaint,
    PremultipliedColorU8, Rect, Stroke, Transform,
};
use tracing::{debug, warn};

use board_common::{
    Background, BoardError, BoardResult, Color, LAYOUT_HEIGHT, LAYOUT_WIDTH, RASTER_SCALE,
};

use crate::assets::LoadedAssets;
use crate::compose::{Composition, DrawablePrimitive, PrimitiveKind, StrokeStyle, TextShadow};
use crate::geometry::Polyline;
use crate::text::TextRenderer;

/// Board width in raster pixels.
pub const BOARD_WIDTH: u32 = (LAYOUT_WIDTH * RASTER_SCALE) as u32;

/// Board height in raster pixels.
pub const BOARD_HEIGHT: u32 = (LAYOUT_HEIGHT * RASTER_SCALE) as u32;

/// Paint `composition` onto a new `BOARD_WIDTH × BOARD_HEIGHT` surface.
pub fn assemble(
    composition: &Composition,
    assets: &LoadedAssets,
    text: &TextRenderer,
) -> BoardResult<Pixmap> {
    let mut pixmap = Pixmap::new(BOARD_WIDTH, BOARD_HEIGHT)
        .ok_or_else(|| BoardError::Render("failed to allocate board surface".to_string()))?;

    match &assets.background {
        Some(image) => draw_background_image(&mut pixmap, image)?,
        None => draw_procedural_background(&mut pixmap, composition.background),
    }

    let mut painter = Painter {
        pixmap: &mut pixmap,
        assets,
        text,
    };
    for primitive in &composition.primitives {
        painter.draw(primitive, Transform::identity(), 1.0);
    }

    debug!(
        primitives = composition.primitives.len(),
        "Board assembled"
    );
    Ok(pixmap)
}

struct Painter<'a> {
    pixmap: &'a mut Pixmap,
    assets: &'a LoadedAssets,
    text: &'a TextRenderer,
}

impl Painter<'_> {
    fn draw(&mut self, primitive: &DrawablePrimitive, parent: Transform, parent_opacity: f32) {
        let opacity = (parent_opacity * primitive.opacity).clamp(0.0, 1.0);
        if opacity <= 0.0 {
            return;
        }
        let transform = parent.pre_concat(primitive.placement.to_transform());

        match &primitive.kind {
            PrimitiveKind::Vector {
                contours,
                fill,
                stroke,
                even_odd,
            } => self.draw_vector(contours, *fill, *stroke, *even_odd, transform, opacity),
            PrimitiveKind::Image {
                asset,
                width,
                height,
                crop,
                clip,
                fallback_fill,
            } => {
                let mask = clip.as_ref().and_then(|clip| self.clip_mask(clip, transform));
                if clip.is_some() && mask.is_none() {
                    return;
                }
                let assets = self.assets;
                match assets.object(asset) {
                    Some(image) => {
                        let image: Cow<'_, RgbaImage> = match crop {
                            Some(c) => Cow::Owned(
                                image::imageops::crop_imm(image, c.x, c.y, c.width, c.height)
                                    .to_image(),
                            ),
                            None => Cow::Borrowed(image),
                        };
                        self.draw_image(&image, *width, *height, transform, opacity, mask.as_ref());
                    }
                    None => match fallback_fill {
                        Some(color) => {
                            let outline = clip.clone().unwrap_or_else(|| {
                                crate::geometry::circle(
                                    board_common::Point::new(width / 2.0, height / 2.0),
                                    width.min(*height) / 2.0,
                                )
                            });
                            self.draw_vector(
                                &[outline],
                                Some(*color),
                                None,
                                false,
                                transform,
                                opacity,
                            );
                        }
                        None => debug!(
                            marker_type = %primitive.marker_type,
                            asset = %asset,
                            "Skipping marker without image"
                        ),
                    },
                }
            }
            PrimitiveKind::Text {
                text,
                font_size,
                color,
                shadow,
            } => self.draw_text(text, *font_size, *color, *shadow, transform, opacity),
            PrimitiveKind::Group(children) => {
                for child in children {
                    self.draw(child, transform, opacity);
                }
            }
            PrimitiveKind::Placeholder => {}
        }
    }

    fn draw_vector(
        &mut self,
        contours: &[Polyline],
        fill: Option<Color>,
        stroke: Option<StrokeStyle>,
        even_odd: bool,
        transform: Transform,
        opacity: f32,
    ) {
        let Some(path) = build_path(contours) else {
            return;
        };

        if let Some(color) = fill {
            let paint = solid_paint(color, opacity);
            let rule = if even_odd {
                FillRule::EvenOdd
            } else {
                FillRule::Winding
            };
            self.pixmap.fill_path(&path, &paint, rule, transform, None);
        }

        if let Some(style) = stroke {
            let paint = solid_paint(style.color, opacity);
            let stroke = Stroke {
                width: style.width as f32,
                ..Stroke::default()
            };
            self.pixmap.stroke_path(&path, &paint, &stroke, transform, None);
        }
    }

    fn draw_image(
        &mut self,
        image: &RgbaImage,
        width: f64,
        height: f64,
        transform: Transform,
        opacity: f32,
        mask: Option<&Mask>,
    ) {
        let Some(source) = pixmap_from_rgba(image) else {
            return;
        };
        let transform = transform.pre_scale(
            (width / source.width() as f64) as f32,
            (height / source.height() as f64) as f32,
        );
        let paint = PixmapPaint {
            opacity,
            quality: FilterQuality::Bilinear,
            ..PixmapPaint::default()
        };
        self.pixmap
            .draw_pixmap(0, 0, source.as_ref(), &paint, transform, mask);
    }

    fn draw_text(
        &mut self,
        text: &str,
        font_size: f64,
        color: Color,
        shadow: Option<TextShadow>,
        transform: Transform,
        opacity: f32,
    ) {
        let max_width = visible_text_width(transform);
        let Some(coverage) = self.text.render_mask(text, font_size as f32, max_width) else {
            return;
        };
        let paint = PixmapPaint {
            opacity,
            quality: FilterQuality::Bilinear,
            ..PixmapPaint::default()
        };

        if let Some(shadow) = shadow {
            if let Some(layer) = tint_mask(&coverage, shadow.color) {
                let shifted =
                    transform.pre_translate(shadow.offset.x as f32, shadow.offset.y as f32);
                self.pixmap
                    .draw_pixmap(0, 0, layer.as_ref(), &paint, shifted, None);
            }
        }
        if let Some(layer) = tint_mask(&coverage, color) {
            self.pixmap
                .draw_pixmap(0, 0, layer.as_ref(), &paint, transform, None);
        }
    }

    fn clip_mask(&self, clip: &Polyline, transform: Transform) -> Option<Mask> {
        let path = build_path(std::slice::from_ref(clip))?;
        let mut mask = Mask::new(self.pixmap.width(), self.pixmap.height())?;
        mask.fill_path(&path, FillRule::Winding, true, transform);
        Some(mask)
    }
}

fn solid_paint(color: Color, opacity: f32) -> Paint<'static> {
    let color = color.with_opacity(opacity);
    let mut paint = Paint::default();
    paint.set_color(SkiaColor::from_rgba8(color.r, color.g, color.b, color.a));
    paint.anti_alias = true;
    paint
}

/// Convert flattened contours into a single path.
fn build_path(contours: &[Polyline]) -> Option<tiny_skia::Path> {
    let mut builder = PathBuilder::new();
    for contour in contours {
        let Some((first, rest)) = contour.points.split_first() else {
            continue;
        };
        builder.move_to(first.x as f32, first.y as f32);
        for p in rest {
            builder.line_to(p.x as f32, p.y as f32);
        }
        if contour.closed {
            builder.close();
        }
    }
    builder.finish()
}

/// Straight-alpha RGBA image to a premultiplied pixmap.
pub fn pixmap_from_rgba(image: &RgbaImage) -> Option<Pixmap> {
    let mut pixmap = Pixmap::new(image.width(), image.height())?;
    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(image.pixels()) {
        let [r, g, b, a] = src.0;
        *dst = tiny_skia::ColorU8::from_rgba(r, g, b, a).premultiply();
    }
    Some(pixmap)
}

/// Upper bound on text-mask pixels rendered per text marker.
const MAX_TEXT_MASK_WIDTH: u32 = 4 * BOARD_WIDTH;

/// Width in mask pixels past which text drawn with `transform` can no longer
/// land on the board.
fn visible_text_width(transform: Transform) -> u32 {
    let unit = (transform.sx as f64).hypot(transform.ky as f64);
    if !unit.is_finite() || unit <= f64::EPSILON {
        return 0;
    }
    let (ox, oy) = (transform.tx as f64, transform.ty as f64);
    let reach = [
        (0.0, 0.0),
        (BOARD_WIDTH as f64, 0.0),
        (0.0, BOARD_HEIGHT as f64),
        (BOARD_WIDTH as f64, BOARD_HEIGHT as f64),
    ]
    .iter()
    .map(|(cx, cy)| (cx - ox).hypot(cy - oy))
    .fold(0.0, f64::max);

    ((reach / unit).ceil() as u32)
        .saturating_add(1)
        .min(MAX_TEXT_MASK_WIDTH)
}

/// Coverage mask filled with `color`.
fn tint_mask(coverage: &image::GrayImage, color: Color) -> Option<Pixmap> {
    let mut pixmap = Pixmap::new(coverage.width(), coverage.height())?;
    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(coverage.pixels()) {
        let alpha = ((src.0[0] as u16 * color.a as u16) / 255) as u8;
        *dst = tiny_skia::ColorU8::from_rgba(color.r, color.g, color.b, alpha).premultiply();
    }
    Some(pixmap)
}

fn draw_background_image(pixmap: &mut Pixmap, image: &RgbaImage) -> BoardResult<()> {
    let source = pixmap_from_rgba(image)
        .ok_or_else(|| BoardError::Render("empty background image".to_string()))?;
    let transform = Transform::from_scale(
        pixmap.width() as f32 / source.width() as f32,
        pixmap.height() as f32 / source.height() as f32,
    );
    let paint = PixmapPaint {
        quality: FilterQuality::Bilinear,
        ..PixmapPaint::default()
    };
    pixmap.draw_pixmap(0, 0, source.as_ref(), &paint, transform, None);
    Ok(())
}

/// Side of one checkerboard square.
const CHECKER_CELL: u32 = 64;

/// Stand-in for a background image that could not be loaded.
fn draw_procedural_background(pixmap: &mut Pixmap, background: Background) {
    warn!(background = ?background, "Drawing procedural background");

    let (base, alternate) = match background {
        Background::None => (Color::rgb(30, 30, 30), None),
        Background::Checkered | Background::CheckeredCircle | Background::CheckeredSquare => {
            (Color::rgb(58, 58, 64), Some(Color::rgb(72, 72, 80)))
        }
        Background::Grey | Background::GreyCircle | Background::GreySquare => {
            (Color::rgb(96, 96, 96), None)
        }
    };
    pixmap.fill(SkiaColor::from_rgba8(base.r, base.g, base.b, base.a));

    if let Some(alternate) = alternate {
        let paint = solid_paint(alternate, 1.0);
        for row in 0..pixmap.height().div_ceil(CHECKER_CELL) {
            for col in 0..pixmap.width().div_ceil(CHECKER_CELL) {
                if (row + col) % 2 == 1 {
                    continue;
                }
                if let Some(rect) = Rect::from_xywh(
                    (col * CHECKER_CELL) as f32,
                    (row * CHECKER_CELL) as f32,
                    CHECKER_CELL as f32,
                    CHECKER_CELL as f32,
                ) {
                    pixmap.fill_rect(rect, &paint, Transform::identity(), None);
                }
            }
        }
    }

    let center = board_common::Point::new(pixmap.width() as f64 / 2.0, pixmap.height() as f64 / 2.0);
    let arena = pixmap.height() as f64 * 0.45;
    let outline = match background {
        Background::CheckeredCircle | Background::GreyCircle => {
            Some(crate::geometry::circle(center, arena))
        }
        Background::CheckeredSquare | Background::GreySquare => Some(crate::geometry::rectangle(
            board_common::Point::new(center.x - arena, center.y - arena),
            arena * 2.0,
            arena * 2.0,
        )),
        _ => None,
    };
    if let Some(path) = outline.and_then(|o| build_path(&[o])) {
        let paint = solid_paint(Color::rgba(255, 255, 255, 160), 1.0);
        let stroke = Stroke {
            width: 4.0,
            ..Stroke::default()
        };
        pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
    }
}

/// Read back one pixel as straight RGBA. Used by tests and diagnostics.
pub fn pixel_at(pixmap: &Pixmap, x: u32, y: u32) -> Option<[u8; 4]> {
    let pixel: PremultipliedColorU8 = pixmap.pixel(x, y)?;
    let c = pixel.demultiply();
    Some([c.red(), c.green(), c.blue(), c.alpha()])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixmap_from_rgba_premultiplies() {
        let image = RgbaImage::from_pixel(2, 2, image::Rgba([200, 100, 50, 128]));
        let pixmap = pixmap_from_rgba(&image).unwrap();
        let p = pixmap.pixels()[0];
        assert_eq!(p.alpha(), 128);
        assert!(p.red() <= 128);
    }

    #[test]
    fn test_build_path_skips_empty_contours() {
        assert!(build_path(&[]).is_none());
        let path = build_path(&[
            Polyline::open(vec![]),
            crate::geometry::rectangle(board_common::Point::ORIGIN, 10.0, 10.0),
        ]);
        assert!(path.is_some());
    }

    #[test]
    fn test_board_is_twice_layout_space() {
        assert_eq!((BOARD_WIDTH, BOARD_HEIGHT), (1024, 768));
    }

    #[test]
    fn test_visible_text_width_is_bounded() {
        // Text at the board origin can reach at most the far corner.
        let width = visible_text_width(Transform::identity());
        assert_eq!(width, 1281);

        // Shrunk text reaches further in mask space, up to the cap.
        let width = visible_text_width(Transform::from_scale(0.01, 0.01));
        assert_eq!(width, MAX_TEXT_MASK_WIDTH);

        // Degenerate scale draws nothing.
        assert_eq!(visible_text_width(Transform::from_scale(0.0, 1.0)), 0);
    }

    #[test]
    fn test_tint_mask_scales_alpha() {
        let coverage = image::GrayImage::from_pixel(1, 1, image::Luma([255]));
        let layer = tint_mask(&coverage, Color::rgba(255, 0, 0, 128)).unwrap();
        assert_eq!(layer.pixels()[0].alpha(), 128);
    }
}
