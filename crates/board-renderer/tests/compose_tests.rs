//! Tests for the shape compositor.

use board_common::{Background, Color, DecodedLayout, Marker, MarkerShape, Point};
use board_renderer::compose::{
    compose, compose_marker, PrimitiveKind, DISC_TEXTURE, RING_OUTER_RADIUS, TEXT_SHADOW_OFFSET,
};
use board_renderer::geometry::Polyline;
use test_utils::{assert_coords_approx_eq, every_shape_layout, icon, text};

fn rect_size(contour: &Polyline) -> (f64, f64) {
    let b = contour.bounds().unwrap();
    (b.width(), b.height())
}

// ============================================================================
// Ordering and opacity
// ============================================================================

#[test]
fn test_paint_order_is_reversed() {
    let layout = DecodedLayout::new(
        Background::Grey,
        vec![icon("tank", 0.0, 0.0), icon("healer", 0.0, 0.0), icon("dps", 0.0, 0.0)],
    );
    let types: Vec<String> = compose(&layout)
        .primitives
        .into_iter()
        .map(|p| p.marker_type)
        .collect();
    assert_eq!(types, vec!["dps", "healer", "tank"]);
}

#[test]
fn test_opacity() {
    let hidden = icon("tank", 0.0, 0.0).with_transparency(25.0).with_hidden(true);
    assert_eq!(compose_marker(&hidden).opacity, 0.0);
    assert!(!compose_marker(&hidden).is_visible());

    let faded = icon("tank", 0.0, 0.0).with_transparency(25.0);
    assert_eq!(compose_marker(&faded).opacity, 0.75);
}

#[test]
fn test_every_marker_yields_a_primitive() {
    let layout = every_shape_layout();
    let composition = compose(&layout);
    assert_eq!(composition.primitives.len(), layout.markers.len());
    assert_eq!(composition.background, Background::GreySquare);
}

#[test]
fn test_required_assets() {
    let assets = compose(&every_shape_layout()).required_assets();
    assert!(assets.contains(DISC_TEXTURE));
    assert!(assets.contains("tank"));
    assert!(!assets.contains("no_such_icon"));
}

// ============================================================================
// Per-shape resolution
// ============================================================================

#[test]
fn test_unknown_icon_is_placeholder() {
    let primitive = compose_marker(&icon("no_such_icon", 10.0, 10.0));
    assert_eq!(primitive.kind, PrimitiveKind::Placeholder);
    assert!(!primitive.is_visible());
}

#[test]
fn test_icon_placement() {
    let marker = icon("tank", 100.0, 50.0)
        .with_size(200.0)
        .with_angle(45.0)
        .with_flip(true, false);
    let primitive = compose_marker(&marker);

    assert_eq!(primitive.placement.position, Point::new(200.0, 100.0));
    assert_eq!(primitive.placement.rotation, 45.0);
    assert_eq!(primitive.placement.scale, (-2.0, 2.0));
    assert_eq!(primitive.placement.offset, Point::new(24.0, 24.0));
    match primitive.kind {
        PrimitiveKind::Image {
            asset,
            width,
            height,
            clip,
            ..
        } => {
            assert_eq!(asset, "tank");
            assert_eq!((width, height), (48.0, 48.0));
            assert!(clip.is_none());
        }
        other => panic!("expected image, got {:?}", other),
    }
}

#[test]
fn test_text_is_centered_with_shadow() {
    let primitive = compose_marker(&text("Stack", 256.0, 40.0));
    assert_eq!(primitive.placement.position, Point::new(512.0, 80.0));
    assert_coords_approx_eq!(
        (primitive.placement.offset.x, primitive.placement.offset.y),
        (42.0, 14.0),
        1e-9
    );
    match primitive.kind {
        PrimitiveKind::Text {
            text,
            font_size,
            color,
            shadow,
        } => {
            assert_eq!(text, "Stack");
            assert_eq!(font_size, 28.0);
            assert_eq!(color, Color::WHITE);
            let shadow = shadow.unwrap();
            assert_eq!(shadow.color, Color::BLACK);
            assert_eq!(shadow.offset, TEXT_SHADOW_OFFSET);
        }
        other => panic!("expected text, got {:?}", other),
    }
}

#[test]
fn test_line_area_ignores_flip() {
    let marker = Marker::new(
        MarkerShape::LineArea {
            width: Some(40.0),
            height: None,
            color: None,
        },
        10.0,
        10.0,
    )
    .with_size(50.0)
    .with_angle(30.0)
    .with_flip(true, true);
    let primitive = compose_marker(&marker);

    assert_eq!(primitive.placement.scale, (0.5, 0.5));
    assert_eq!(primitive.placement.offset, Point::new(40.0, 128.0));
    match primitive.kind {
        PrimitiveKind::Vector { contours, fill, .. } => {
            assert_eq!(rect_size(&contours[0]), (80.0, 256.0));
            assert_eq!(fill, Some(Color::AOE_ORANGE));
        }
        other => panic!("expected vector, got {:?}", other),
    }
}

#[test]
fn test_full_ring_sector() {
    let marker = Marker::new(
        MarkerShape::RingSector {
            inner_radius: Some(50.0),
            arc: None,
        },
        256.0,
        192.0,
    );
    let primitive = compose_marker(&marker);

    assert_eq!(primitive.placement.position, Point::new(512.0, 374.0));
    assert_eq!(primitive.placement.offset, Point::ORIGIN);
    match primitive.kind {
        PrimitiveKind::Vector {
            contours,
            fill,
            even_odd,
            ..
        } => {
            assert_eq!(contours.len(), 2);
            assert!(even_odd);
            assert_eq!(fill, Some(Color::ORANGE));
            let (outer_w, _) = rect_size(&contours[0]);
            let (inner_w, _) = rect_size(&contours[1]);
            assert!((outer_w - 2.0 * RING_OUTER_RADIUS).abs() < 1e-6);
            assert!((inner_w - 200.0).abs() < 1e-6);
        }
        other => panic!("expected vector, got {:?}", other),
    }
}

#[test]
fn test_partial_ring_sector_pivot() {
    let marker = Marker::new(
        MarkerShape::RingSector {
            inner_radius: None,
            arc: Some(90.0),
        },
        0.0,
        0.0,
    );
    let primitive = compose_marker(&marker);
    let offset = primitive.placement.offset;
    assert_coords_approx_eq!((offset.x, offset.y), (256.0, -256.0), 1e-9);
}

#[test]
fn test_disc_area_has_no_clip() {
    let primitive = compose_marker(&Marker::new(MarkerShape::DiscArea, 100.0, 100.0));
    assert_eq!(primitive.placement.offset, Point::new(512.0, 512.0));
    match primitive.kind {
        PrimitiveKind::Image {
            asset,
            width,
            clip,
            fallback_fill,
            ..
        } => {
            assert_eq!(asset, DISC_TEXTURE);
            assert_eq!(width, 1024.0);
            assert!(clip.is_none());
            assert!(fallback_fill.is_some());
        }
        other => panic!("expected image, got {:?}", other),
    }
}

#[test]
fn test_fan_area_defaults_to_quarter() {
    let primitive = compose_marker(&Marker::new(MarkerShape::FanArea { arc: None }, 0.0, 0.0));
    let offset = primitive.placement.offset;
    assert_coords_approx_eq!((offset.x, offset.y), (768.0, 256.0), 1e-9);
    match primitive.kind {
        PrimitiveKind::Image { clip, .. } => {
            let clip = clip.expect("partial fan must be clipped");
            assert_eq!(clip.points[0], Point::new(512.0, 512.0));
        }
        other => panic!("expected image, got {:?}", other),
    }
}

#[test]
fn test_full_fan_is_unclipped() {
    let primitive = compose_marker(&Marker::new(
        MarkerShape::FanArea { arc: Some(360.0) },
        0.0,
        0.0,
    ));
    match primitive.kind {
        PrimitiveKind::Image { clip, .. } => assert!(clip.is_none()),
        other => panic!("expected image, got {:?}", other),
    }
}

#[test]
fn test_line_group_carries_marker_opacity() {
    let marker = Marker::new(
        MarkerShape::Line {
            end: Some(Point::new(20.0, 0.0)),
            color: None,
            thickness: Some(3.0),
        },
        0.0,
        0.0,
    )
    .with_transparency(50.0);
    let primitive = compose_marker(&marker);

    match primitive.kind {
        PrimitiveKind::Group(children) => {
            assert_eq!(children.len(), 3);
            assert!(children.iter().all(|c| c.opacity == 0.5));
            match &children[0].kind {
                PrimitiveKind::Vector { contours, stroke, .. } => {
                    assert_eq!(
                        contours[0].points,
                        vec![Point::new(0.0, 0.0), Point::new(40.0, 0.0)]
                    );
                    assert_eq!(stroke.unwrap().width, 6.0);
                }
                other => panic!("expected vector, got {:?}", other),
            }
        }
        other => panic!("expected group, got {:?}", other),
    }
}
