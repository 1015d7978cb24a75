//! Common test fixtures for board tests.
//!
//! Layouts here cover every marker shape so codec, compositor and pipeline
//! tests can share one source of representative boards.

use board_common::{Background, Color, DecodedLayout, Marker, MarkerShape, Point};

/// Builds an icon marker at a layout position.
pub fn icon(name: &str, x: f64, y: f64) -> Marker {
    Marker::new(MarkerShape::icon(name), x, y)
}

/// Builds a text marker at a layout position.
pub fn text(content: &str, x: f64, y: f64) -> Marker {
    Marker::new(
        MarkerShape::Text {
            text: content.to_string(),
            color: Some(Color::WHITE),
        },
        x,
        y,
    )
}

/// Builds a ring sector marker with the given inner radius and arc span.
pub fn donut(x: f64, y: f64, inner_radius: f64, arc: f64) -> Marker {
    Marker::new(
        MarkerShape::RingSector {
            inner_radius: Some(inner_radius),
            arc: Some(arc),
        },
        x,
        y,
    )
}

/// A layout with one marker of every shape, plus an unknown icon.
pub fn every_shape_layout() -> DecodedLayout {
    DecodedLayout::new(
        Background::GreySquare,
        vec![
            text("Spread", 256.0, 32.0),
            Marker::new(
                MarkerShape::Line {
                    end: Some(Point::new(400.0, 300.0)),
                    color: Some(Color::rgb(255, 0, 0)),
                    thickness: Some(4.0),
                },
                100.0,
                100.0,
            ),
            Marker::new(
                MarkerShape::LineArea {
                    width: Some(40.0),
                    height: Some(120.0),
                    color: None,
                },
                256.0,
                192.0,
            )
            .with_angle(30.0),
            donut(256.0, 192.0, 60.0, 270.0).with_size(50.0),
            Marker::new(MarkerShape::DiscArea, 128.0, 128.0).with_size(25.0),
            Marker::new(MarkerShape::FanArea { arc: Some(120.0) }, 384.0, 128.0)
                .with_size(30.0)
                .with_angle(90.0)
                .with_flip(true, false),
            icon("tank", 200.0, 300.0).with_transparency(20.0),
            icon("no_such_icon", 10.0, 10.0),
        ],
    )
}

/// A layout with only hidden markers: renders as the bare background.
pub fn hidden_markers_layout() -> DecodedLayout {
    DecodedLayout::new(
        Background::Checkered,
        vec![
            icon("tank", 100.0, 100.0).with_hidden(true),
            Marker::new(MarkerShape::DiscArea, 256.0, 192.0).with_hidden(true),
        ],
    )
}

/// Strings that are not valid board codes.
pub const MALFORMED_CODES: &[&str] = &[
    "",
    "hello",
    "[stgy:",
    "[stgy:]",
    "[stgy:A!!!!]",
    "[stgy:Aabc]",
];
