//! Tests for the decoded layout model and its JSON form.

use board_common::{Background, BoardError, Color, DecodedLayout, Marker, MarkerShape, Point};

// ============================================================================
// Background tests
// ============================================================================

#[test]
fn test_background_asset_names_are_distinct() {
    let names: std::collections::HashSet<&str> =
        Background::ALL.iter().map(|b| b.asset_name()).collect();
    assert_eq!(names.len(), Background::ALL.len());
}

#[test]
fn test_background_json_names() {
    let json = serde_json::to_string(&Background::CheckeredCircle).unwrap();
    assert_eq!(json, "\"checkered_circle\"");
    let parsed: Background = serde_json::from_str("\"grey_square\"").unwrap();
    assert_eq!(parsed, Background::GreySquare);
}

#[test]
fn test_missing_background_defaults() {
    let layout: DecodedLayout = serde_json::from_str(r#"{"objects": []}"#).unwrap();
    assert_eq!(layout.background, Background::Checkered);
    assert!(layout.markers.is_empty());
}

// ============================================================================
// Marker JSON tests
// ============================================================================

#[test]
fn test_unknown_type_becomes_icon() {
    let marker: Marker =
        serde_json::from_str(r#"{"type": "waymark_1", "x": 1, "y": 2}"#).unwrap();
    assert_eq!(marker.shape, MarkerShape::icon("waymark_1"));
    assert_eq!(marker.position, Point::new(1.0, 2.0));
    assert!(!marker.hidden);
}

#[test]
fn test_line_end_defaults_to_start_axis() {
    let marker: Marker =
        serde_json::from_str(r#"{"type": "line", "x": 10, "y": 20, "endY": 50}"#).unwrap();
    assert_eq!(
        marker.shape,
        MarkerShape::Line {
            end: Some(Point::new(10.0, 50.0)),
            color: None,
            thickness: None,
        }
    );
}

#[test]
fn test_marker_serializes_flat_record() {
    let marker = Marker::new(
        MarkerShape::Text {
            text: "Stack".to_string(),
            color: Some(Color::rgb(255, 0, 0)),
        },
        5.0,
        6.0,
    )
    .with_hidden(true);
    let value = serde_json::to_value(&marker).unwrap();

    assert_eq!(value["type"], "text");
    assert_eq!(value["text"], "Stack");
    assert_eq!(value["color"], "#ff0000");
    assert_eq!(value["hidden"], true);
    assert!(value.get("horizontalFlip").is_none());
    assert!(value.get("angle").is_none());
}

#[test]
fn test_invalid_color_falls_back_to_default() {
    let marker: Marker = serde_json::from_str(
        r#"{"type": "line_aoe", "x": 0, "y": 0, "color": "not-a-color"}"#,
    )
    .unwrap();
    assert_eq!(
        marker.shape,
        MarkerShape::LineArea {
            width: None,
            height: None,
            color: None,
        }
    );

    let marker: Marker =
        serde_json::from_str(r#"{"type": "line", "x": 0, "y": 0, "color": 12}"#).unwrap();
    assert!(matches!(marker.shape, MarkerShape::Line { color: None, .. }));
}

#[test]
fn test_bad_color_keeps_other_markers() {
    let layout: DecodedLayout = serde_json::from_str(
        r#"{
            "objects": [
                {"type": "tank", "x": 100, "y": 100},
                {"type": "text", "x": 200, "y": 50, "text": "Go", "color": "hsl(0, 100%, 50%)"}
            ]
        }"#,
    )
    .unwrap();

    assert_eq!(layout.markers.len(), 2);
    assert_eq!(layout.markers[0].shape, MarkerShape::icon("tank"));
    assert_eq!(
        layout.markers[1].shape,
        MarkerShape::Text {
            text: "Go".to_string(),
            color: None,
        }
    );
}

#[test]
fn test_valid_color_is_kept() {
    let marker: Marker =
        serde_json::from_str(r##"{"type": "line", "x": 0, "y": 0, "color": "#ff0000"}"##).unwrap();
    assert!(matches!(
        marker.shape,
        MarkerShape::Line {
            color: Some(c),
            ..
        } if c == Color::rgb(255, 0, 0)
    ));
}

#[test]
fn test_json_error_converts_to_decode() {
    let err: BoardError = serde_json::from_str::<DecodedLayout>("{")
        .unwrap_err()
        .into();
    assert!(matches!(err, BoardError::Decode(_)));
    assert_eq!(err.http_status_code(), 400);
}

// ============================================================================
// Default board tests
// ============================================================================

#[test]
fn test_default_board_is_visible() {
    let layout = DecodedLayout::default_board();
    assert!(!layout.markers.is_empty());
    assert!(layout.markers.iter().all(|m| m.opacity() > 0.0));
}
