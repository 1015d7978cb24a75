//! Shape compositor: decoded layouts to drawable primitives.
//!
//! Each marker maps to exactly one [`DrawablePrimitive`] with its placement
//! fully resolved. Primitives come out in paint order: the decoded marker list
//! reversed, so the first marker of a board ends up on top.

use std::collections::BTreeSet;

use board_common::{Background, Color, DecodedLayout, Marker, MarkerShape, Point};
use tracing::warn;

use crate::geometry::{self, ArcSpan, Placement, Polyline, TEXT_FONT_SIZE};
use crate::icons::{icon_spec, CropRect};

/// Object image used for disc and fan AOEs.
pub const DISC_TEXTURE: &str = "circle_aoe";

/// Drawn edge length of the disc texture.
pub const DISC_TEXTURE_SIZE: f64 = 1024.0;

/// Outer radius of ring sectors before scaling.
pub const RING_OUTER_RADIUS: f64 = 512.0;

/// Ring sectors sit this many pixels above their marker position.
pub const RING_Y_SHIFT: f64 = 10.0;

pub const DEFAULT_LINE_THICKNESS: f64 = 6.0;
pub const LINE_HANDLE_RADIUS: f64 = 8.0;
pub const LINE_HANDLE_STROKE: f64 = 2.0;

/// Default half width and half height of rectangular AOEs.
pub const DEFAULT_AREA_EXTENT: f64 = 128.0;

pub const DEFAULT_FAN_DEGREES: f64 = 90.0;

pub const TEXT_SHADOW_OFFSET: Point = Point::new(2.0, 2.0);

/// Outline pen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeStyle {
    pub color: Color,
    pub width: f64,
}

/// Offset copy of a text run drawn beneath it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextShadow {
    pub color: Color,
    pub offset: Point,
}

/// What a primitive draws, in its local coordinate space.
#[derive(Debug, Clone, PartialEq)]
pub enum PrimitiveKind {
    /// Filled and/or stroked outline.
    Vector {
        contours: Vec<Polyline>,
        fill: Option<Color>,
        stroke: Option<StrokeStyle>,
        /// Fill with the even-odd rule (rings with a hole).
        even_odd: bool,
    },
    /// Object image stretched to `width × height` at the local origin.
    Image {
        asset: String,
        width: f64,
        height: f64,
        crop: Option<CropRect>,
        /// Only the part of the image inside this outline is drawn.
        clip: Option<Polyline>,
        /// Fill for the clip (or a full disc) when the image is unavailable.
        fallback_fill: Option<Color>,
    },
    /// Single line of text with its top-left corner at the local origin.
    Text {
        text: String,
        font_size: f64,
        color: Color,
        shadow: Option<TextShadow>,
    },
    /// Children drawn in order, each with its own placement and opacity.
    Group(Vec<DrawablePrimitive>),
    /// Draws nothing. Stands in for markers that cannot be drawn.
    Placeholder,
}

/// A resolved, ready-to-paint unit.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawablePrimitive {
    /// Marker type it came from, for logs.
    pub marker_type: String,
    pub placement: Placement,
    pub opacity: f32,
    pub kind: PrimitiveKind,
}

impl DrawablePrimitive {
    pub fn is_visible(&self) -> bool {
        self.opacity > 0.0 && !matches!(self.kind, PrimitiveKind::Placeholder)
    }

    fn collect_assets(&self, out: &mut BTreeSet<String>) {
        if self.opacity <= 0.0 {
            return;
        }
        match &self.kind {
            PrimitiveKind::Image { asset, .. } => {
                out.insert(asset.clone());
            }
            PrimitiveKind::Group(children) => {
                for child in children {
                    child.collect_assets(out);
                }
            }
            _ => {}
        }
    }
}

/// Everything the assembler needs to paint a board.
#[derive(Debug, Clone, PartialEq)]
pub struct Composition {
    pub background: Background,
    /// In paint order (first is bottom-most).
    pub primitives: Vec<DrawablePrimitive>,
}

impl Composition {
    /// Object images referenced by visible primitives.
    pub fn required_assets(&self) -> BTreeSet<String> {
        let mut assets = BTreeSet::new();
        for primitive in &self.primitives {
            primitive.collect_assets(&mut assets);
        }
        assets
    }
}

/// Turn a decoded layout into paint-ordered primitives.
pub fn compose(layout: &DecodedLayout) -> Composition {
    Composition {
        background: layout.background,
        primitives: layout.paint_order().map(compose_marker).collect(),
    }
}

/// Resolve a single marker.
pub fn compose_marker(marker: &Marker) -> DrawablePrimitive {
    let position = marker.position.to_raster();
    let opacity = marker.opacity();

    let (placement, kind) = match &marker.shape {
        MarkerShape::Text { text, color } => text_block(position, text, *color),
        MarkerShape::Line {
            end,
            color,
            thickness,
        } => line(
            position,
            end.map(Point::to_raster).unwrap_or(position),
            color.unwrap_or(Color::AOE_ORANGE),
            thickness.unwrap_or(DEFAULT_LINE_THICKNESS) * 2.0,
            opacity,
        ),
        MarkerShape::LineArea {
            width,
            height,
            color,
        } => line_area(marker, position, *width, *height, *color),
        MarkerShape::RingSector { inner_radius, arc } => {
            ring_sector(marker, position, inner_radius.unwrap_or(0.0), *arc)
        }
        MarkerShape::DiscArea => disc_area(marker, position, ArcSpan::full()),
        MarkerShape::FanArea { arc } => {
            disc_area(marker, position, ArcSpan::from_marker(*arc, DEFAULT_FAN_DEGREES))
        }
        MarkerShape::Icon { name } => icon(marker, position, name),
    };

    DrawablePrimitive {
        marker_type: marker.type_name().to_string(),
        placement,
        // Line groups carry opacity on their children.
        opacity: if matches!(kind, PrimitiveKind::Group(_)) {
            1.0
        } else {
            opacity
        },
        kind,
    }
}

fn text_block(position: Point, text: &str, color: Option<Color>) -> (Placement, PrimitiveKind) {
    let placement = Placement::at(position).with_offset(geometry::text_offset(text, TEXT_FONT_SIZE));
    let kind = PrimitiveKind::Text {
        text: text.to_string(),
        font_size: TEXT_FONT_SIZE,
        color: color.unwrap_or(Color::WHITE),
        shadow: Some(TextShadow {
            color: Color::BLACK,
            offset: TEXT_SHADOW_OFFSET,
        }),
    };
    (placement, kind)
}

fn line(
    start: Point,
    end: Point,
    color: Color,
    width: f64,
    opacity: f32,
) -> (Placement, PrimitiveKind) {
    let child = |kind| DrawablePrimitive {
        marker_type: "line".to_string(),
        placement: Placement::IDENTITY,
        opacity,
        kind,
    };
    let handle = |at: Point| {
        child(PrimitiveKind::Vector {
            contours: vec![geometry::circle(at, LINE_HANDLE_RADIUS)],
            fill: Some(Color::WHITE),
            stroke: Some(StrokeStyle {
                color: Color::HANDLE_BLUE,
                width: LINE_HANDLE_STROKE,
            }),
            even_odd: false,
        })
    };

    let children = vec![
        child(PrimitiveKind::Vector {
            contours: vec![Polyline::open(vec![start, end])],
            fill: None,
            stroke: Some(StrokeStyle { color, width }),
            even_odd: false,
        }),
        handle(start),
        handle(end),
    ];
    (Placement::IDENTITY, PrimitiveKind::Group(children))
}

fn line_area(
    marker: &Marker,
    position: Point,
    width: Option<f64>,
    height: Option<f64>,
    color: Option<Color>,
) -> (Placement, PrimitiveKind) {
    let w = width.unwrap_or(DEFAULT_AREA_EXTENT);
    let h = height.unwrap_or(DEFAULT_AREA_EXTENT);
    let scale = marker.scale();

    // Rectangular AOEs rotate and scale but ignore flips.
    let placement = Placement::at(position)
        .rotated(marker.rotation())
        .scaled(scale, scale)
        .with_offset(Point::new(w, h));
    let kind = PrimitiveKind::Vector {
        contours: vec![geometry::rectangle(Point::ORIGIN, w * 2.0, h * 2.0)],
        fill: Some(color.unwrap_or(Color::AOE_ORANGE)),
        stroke: None,
        even_odd: false,
    };
    (placement, kind)
}

fn ring_sector(
    marker: &Marker,
    position: Point,
    inner_radius: f64,
    arc: Option<f64>,
) -> (Placement, PrimitiveKind) {
    let span = ArcSpan::from_marker(arc, geometry::FULL_CIRCLE_DEGREES);
    let inner = (inner_radius * 2.0).max(0.0);
    let (sx, sy) = marker.flipped_scale();

    let placement = Placement::at(Point::new(position.x, position.y - RING_Y_SHIFT))
        .rotated(marker.rotation())
        .scaled(sx, sy)
        .with_offset(geometry::ring_sector_offset(span, RING_OUTER_RADIUS, inner));

    let contours = geometry::ring_sector(span, RING_OUTER_RADIUS, inner);
    if contours.is_empty() {
        return (placement, PrimitiveKind::Placeholder);
    }
    let kind = PrimitiveKind::Vector {
        contours,
        fill: Some(Color::ORANGE),
        stroke: None,
        even_odd: span.is_full(),
    };
    (placement, kind)
}

fn disc_area(marker: &Marker, position: Point, span: ArcSpan) -> (Placement, PrimitiveKind) {
    let radius = DISC_TEXTURE_SIZE / 2.0;
    let (sx, sy) = marker.flipped_scale();

    let placement = Placement::at(position)
        .rotated(marker.rotation())
        .scaled(sx, sy)
        .with_offset(geometry::disc_sector_offset(span, radius));

    if span.is_empty() {
        return (placement, PrimitiveKind::Placeholder);
    }
    let clip = (!span.is_full()).then(|| geometry::pie(Point::new(radius, radius), radius, span));
    let kind = PrimitiveKind::Image {
        asset: DISC_TEXTURE.to_string(),
        width: DISC_TEXTURE_SIZE,
        height: DISC_TEXTURE_SIZE,
        crop: None,
        clip,
        fallback_fill: Some(Color::AOE_ORANGE.with_opacity(0.6)),
    };
    (placement, kind)
}

fn icon(marker: &Marker, position: Point, name: &str) -> (Placement, PrimitiveKind) {
    let Some(spec) = icon_spec(name) else {
        warn!(marker_type = %name, "No icon config for marker type, skipping");
        return (Placement::at(position), PrimitiveKind::Placeholder);
    };

    let (sx, sy) = marker.flipped_scale();
    let placement = Placement::at(position)
        .rotated(marker.rotation())
        .scaled(sx, sy)
        .with_offset(Point::new(spec.size, spec.size));
    let kind = PrimitiveKind::Image {
        asset: spec.src.to_string(),
        width: spec.size * 2.0,
        height: spec.size * 2.0,
        crop: spec.crop,
        clip: None,
        fallback_fill: None,
    };
    (placement, kind)
}
