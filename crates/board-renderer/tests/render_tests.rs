//! End-to-end rendering tests against synthetic artwork.

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use board_common::{Background, Color, DecodedLayout, Marker, MarkerShape};
use board_renderer::assemble::pixel_at;
use board_renderer::{BoardRenderer, DirectoryAssets, TextRenderer, BOARD_HEIGHT, BOARD_WIDTH};
use test_utils::{
    every_shape_layout, hidden_markers_layout, icon, temp_test_dir, write_synthetic_assets,
    BACKGROUND_RGBA, ICON_RGBA,
};

fn renderer_for(root: &std::path::Path) -> BoardRenderer {
    BoardRenderer::new(Arc::new(DirectoryAssets::new(root)), TextRenderer::disabled())
}

fn assert_rgb_near(actual: [u8; 4], expected: [u8; 4], tolerance: i32) {
    for channel in 0..3 {
        let diff = (actual[channel] as i32 - expected[channel] as i32).abs();
        assert!(
            diff <= tolerance,
            "channel {} differs: got {:?}, expected {:?}",
            channel,
            actual,
            expected
        );
    }
}

fn area(color: Color) -> Marker {
    Marker::new(
        MarkerShape::LineArea {
            width: Some(64.0),
            height: Some(64.0),
            color: Some(color),
        },
        256.0,
        192.0,
    )
}

// ============================================================================
// Encoding
// ============================================================================

#[tokio::test]
async fn test_render_webp_container() {
    let dir = temp_test_dir();
    write_synthetic_assets(dir.path(), &["tank"]).unwrap();

    let bytes = renderer_for(dir.path())
        .render_webp(&every_shape_layout())
        .await
        .unwrap();

    assert!(bytes.len() > 12);
    assert_eq!(&bytes[0..4], b"RIFF");
    assert_eq!(&bytes[8..12], b"WEBP");

    let decoded = image::load_from_memory(&bytes).unwrap();
    assert_eq!(decoded.width(), BOARD_WIDTH);
    assert_eq!(decoded.height(), BOARD_HEIGHT);
}

#[tokio::test]
async fn test_thumbnail_is_base64_thumbhash() {
    let dir = temp_test_dir();
    write_synthetic_assets(dir.path(), &[]).unwrap();
    let renderer = renderer_for(dir.path());

    let bytes = renderer
        .render_webp(&DecodedLayout::default_board())
        .await
        .unwrap();
    let thumbnail = renderer.thumbnail(bytes).await.unwrap();

    let raw = STANDARD.decode(&thumbnail).unwrap();
    assert!(raw.len() >= 5, "thumbhash too short: {} bytes", raw.len());
}

// ============================================================================
// Assembly
// ============================================================================

#[tokio::test]
async fn test_missing_assets_still_render() {
    let renderer = renderer_for(std::path::Path::new("/nonexistent/board-assets"));
    let pixmap = renderer
        .render_pixmap(&DecodedLayout::default_board())
        .await
        .unwrap();
    assert_eq!(pixmap.width(), BOARD_WIDTH);
    assert_eq!(pixmap.height(), BOARD_HEIGHT);
}

#[tokio::test]
async fn test_hidden_markers_leave_background() {
    let dir = temp_test_dir();
    write_synthetic_assets(dir.path(), &["tank"]).unwrap();

    let pixmap = renderer_for(dir.path())
        .render_pixmap(&hidden_markers_layout())
        .await
        .unwrap();

    for (x, y) in [(512, 384), (200, 200), (10, 10)] {
        assert_rgb_near(pixel_at(&pixmap, x, y).unwrap(), BACKGROUND_RGBA, 2);
    }
}

#[tokio::test]
async fn test_icon_is_centered_on_position() {
    let dir = temp_test_dir();
    write_synthetic_assets(dir.path(), &["tank"]).unwrap();
    let layout = DecodedLayout::new(Background::Grey, vec![icon("tank", 256.0, 192.0)]);

    let pixmap = renderer_for(dir.path()).render_pixmap(&layout).await.unwrap();

    assert_rgb_near(pixel_at(&pixmap, 512, 384).unwrap(), ICON_RGBA, 2);
    // Role icons are 48 pixels across.
    assert_rgb_near(pixel_at(&pixmap, 512, 440).unwrap(), BACKGROUND_RGBA, 2);
}

#[tokio::test]
async fn test_disc_without_texture_uses_flat_fill() {
    let dir = temp_test_dir();
    let layout = DecodedLayout::new(
        Background::Grey,
        vec![Marker::new(MarkerShape::DiscArea, 256.0, 192.0).with_size(25.0)],
    );

    let pixmap = renderer_for(dir.path()).render_pixmap(&layout).await.unwrap();

    let [r, _, b, _] = pixel_at(&pixmap, 512, 384).unwrap();
    assert!(r > 150, "expected orange, got r={}", r);
    assert!(b < 100, "expected orange, got b={}", b);
}

#[tokio::test]
async fn test_first_marker_paints_on_top() {
    let dir = temp_test_dir();
    write_synthetic_assets(dir.path(), &[]).unwrap();
    let layout = DecodedLayout::new(
        Background::Grey,
        vec![area(Color::rgb(255, 0, 0)), area(Color::rgb(0, 0, 255))],
    );

    let pixmap = renderer_for(dir.path()).render_pixmap(&layout).await.unwrap();

    assert_rgb_near(pixel_at(&pixmap, 512, 384).unwrap(), [255, 0, 0, 255], 1);
}

#[tokio::test]
async fn test_fan_is_clipped_to_its_sector() {
    let dir = temp_test_dir();
    write_synthetic_assets(dir.path(), &[]).unwrap();
    let layout = DecodedLayout::new(
        Background::Grey,
        vec![Marker::new(MarkerShape::FanArea { arc: None }, 256.0, 192.0)],
    );

    let pixmap = renderer_for(dir.path()).render_pixmap(&layout).await.unwrap();

    // Sector center sits on the marker position.
    let [r, _, _, _] = pixel_at(&pixmap, 512, 384).unwrap();
    assert!(r > 150, "expected texture inside the sector, got r={}", r);
    // Same texture square, opposite quadrant.
    assert_rgb_near(pixel_at(&pixmap, 344, 728).unwrap(), BACKGROUND_RGBA, 2);
}
