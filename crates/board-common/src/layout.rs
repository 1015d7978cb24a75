//! Decoded strategy-board layouts.
//!
//! A layout is a background choice plus an ordered list of markers in layout
//! space (512x384). The renderer works in raster space, which is exactly twice
//! layout space.

use serde::{Deserialize, Serialize};

use crate::color::Color;

/// Width of the layout coordinate space.
pub const LAYOUT_WIDTH: f64 = 512.0;

/// Height of the layout coordinate space.
pub const LAYOUT_HEIGHT: f64 = 384.0;

/// Raster pixels per layout unit.
pub const RASTER_SCALE: f64 = 2.0;

/// A 2D point. Used for both layout and raster coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Convert a layout-space point to raster space.
    pub fn to_raster(self) -> Self {
        Self::new(self.x * RASTER_SCALE, self.y * RASTER_SCALE)
    }
}

/// Board background choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Background {
    None,
    #[default]
    Checkered,
    CheckeredCircle,
    CheckeredSquare,
    Grey,
    GreyCircle,
    GreySquare,
}

impl Background {
    pub const ALL: [Background; 7] = [
        Background::None,
        Background::Checkered,
        Background::CheckeredCircle,
        Background::CheckeredSquare,
        Background::Grey,
        Background::GreyCircle,
        Background::GreySquare,
    ];

    /// Name of the background image in the asset store.
    pub fn asset_name(&self) -> &'static str {
        match self {
            Background::None => "1",
            Background::Checkered => "2",
            Background::CheckeredCircle => "3",
            Background::CheckeredSquare => "4",
            Background::Grey => "5",
            Background::GreyCircle => "6",
            Background::GreySquare => "7",
        }
    }
}

/// A fully decoded board: what the codec produces and the compositor consumes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DecodedLayout {
    #[serde(rename = "boardBackground", default)]
    pub background: Background,

    /// Markers in decoded order. The first marker is painted on top.
    #[serde(rename = "objects", default)]
    pub markers: Vec<Marker>,
}

impl DecodedLayout {
    pub fn new(background: Background, markers: Vec<Marker>) -> Self {
        Self {
            background,
            markers,
        }
    }

    /// Markers in paint order: last decoded paints first (bottom), first
    /// decoded paints last (top).
    pub fn paint_order(&self) -> impl Iterator<Item = &Marker> {
        self.markers.iter().rev()
    }

    /// Built-in layout rendered when no (or an unusable) code is supplied.
    pub fn default_board() -> Self {
        Self::new(
            Background::CheckeredCircle,
            vec![
                Marker::new(
                    MarkerShape::Text {
                        text: "Stack".to_string(),
                        color: Some(Color::WHITE),
                    },
                    256.0,
                    40.0,
                ),
                Marker::new(MarkerShape::icon("waymark_a"), 256.0, 96.0),
                Marker::new(MarkerShape::icon("waymark_b"), 416.0, 192.0),
                Marker::new(MarkerShape::icon("waymark_c"), 256.0, 288.0),
                Marker::new(MarkerShape::icon("waymark_d"), 96.0, 192.0),
                Marker::new(MarkerShape::icon("tank"), 256.0, 160.0),
                Marker::new(MarkerShape::icon("healer"), 256.0, 224.0),
                Marker::new(
                    MarkerShape::FanArea { arc: Some(90.0) },
                    256.0,
                    192.0,
                )
                .with_size(40.0)
                .with_angle(45.0)
                .with_transparency(30.0),
                Marker::new(
                    MarkerShape::RingSector {
                        inner_radius: Some(80.0),
                        arc: None,
                    },
                    256.0,
                    192.0,
                )
                .with_size(30.0)
                .with_transparency(50.0),
            ],
        )
    }
}

/// Variant-specific marker data.
///
/// Board codes name marker kinds with a `type` string; everything that is not
/// one of the dedicated shapes is an icon looked up by that name.
#[derive(Debug, Clone, PartialEq)]
pub enum MarkerShape {
    Text {
        text: String,
        color: Option<Color>,
    },
    Line {
        end: Option<Point>,
        color: Option<Color>,
        thickness: Option<f64>,
    },
    LineArea {
        width: Option<f64>,
        height: Option<f64>,
        color: Option<Color>,
    },
    RingSector {
        inner_radius: Option<f64>,
        arc: Option<f64>,
    },
    DiscArea,
    FanArea {
        arc: Option<f64>,
    },
    Icon {
        name: String,
    },
}

impl MarkerShape {
    pub fn icon(name: impl Into<String>) -> Self {
        MarkerShape::Icon { name: name.into() }
    }

    /// The board-code `type` string for this shape.
    pub fn type_name(&self) -> &str {
        match self {
            MarkerShape::Text { .. } => "text",
            MarkerShape::Line { .. } => "line",
            MarkerShape::LineArea { .. } => "line_aoe",
            MarkerShape::RingSector { .. } => "donut",
            MarkerShape::DiscArea => "circle_aoe",
            MarkerShape::FanArea { .. } => "fan_aoe",
            MarkerShape::Icon { name } => name,
        }
    }
}

/// One positioned element of a board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "MarkerRecord", into = "MarkerRecord")]
pub struct Marker {
    /// Position in layout space.
    pub position: Point,
    /// Rotation in degrees, clockwise.
    pub angle: Option<f64>,
    /// Uniform scale in percent.
    pub size: Option<f64>,
    pub horizontal_flip: bool,
    pub vertical_flip: bool,
    pub hidden: bool,
    /// Transparency in percent (0 = opaque).
    pub transparency: Option<f64>,
    pub shape: MarkerShape,
}

impl Marker {
    pub fn new(shape: MarkerShape, x: f64, y: f64) -> Self {
        Self {
            position: Point::new(x, y),
            angle: None,
            size: None,
            horizontal_flip: false,
            vertical_flip: false,
            hidden: false,
            transparency: None,
            shape,
        }
    }

    pub fn with_angle(mut self, angle: f64) -> Self {
        self.angle = Some(angle);
        self
    }

    pub fn with_size(mut self, size: f64) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_transparency(mut self, transparency: f64) -> Self {
        self.transparency = Some(transparency);
        self
    }

    pub fn with_flip(mut self, horizontal: bool, vertical: bool) -> Self {
        self.horizontal_flip = horizontal;
        self.vertical_flip = vertical;
        self
    }

    pub fn with_hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    /// Rendered opacity: 0 when hidden, otherwise `(100 - transparency) / 100`.
    pub fn opacity(&self) -> f32 {
        if self.hidden {
            return 0.0;
        }
        let transparency = self.transparency.unwrap_or(0.0).clamp(0.0, 100.0);
        ((100.0 - transparency) / 100.0) as f32
    }

    /// Uniform scale factor (size percent / 100).
    pub fn scale(&self) -> f64 {
        self.size.unwrap_or(100.0) / 100.0
    }

    /// Scale factors with flips folded into the sign.
    pub fn flipped_scale(&self) -> (f64, f64) {
        let scale = self.scale();
        let sx = if self.horizontal_flip { -scale } else { scale };
        let sy = if self.vertical_flip { -scale } else { scale };
        (sx, sy)
    }

    pub fn rotation(&self) -> f64 {
        self.angle.unwrap_or(0.0)
    }

    pub fn type_name(&self) -> &str {
        self.shape.type_name()
    }
}

/// Flat JSON form of a marker as carried inside board codes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MarkerRecord {
    #[serde(rename = "type")]
    kind: String,
    x: f64,
    y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    angle: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    horizontal_flip: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    vertical_flip: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    hidden: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    transparency: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(
        default,
        deserialize_with = "crate::color::deserialize_lenient",
        skip_serializing_if = "Option::is_none"
    )]
    color: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    end_x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    end_y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    donut_radius: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    arc_angle: Option<f64>,
}

impl TryFrom<MarkerRecord> for Marker {
    type Error = String;

    fn try_from(record: MarkerRecord) -> Result<Self, Self::Error> {
        let shape = match record.kind.as_str() {
            "" => return Err("marker is missing its type".to_string()),
            "text" => MarkerShape::Text {
                text: record.text.unwrap_or_default(),
                color: record.color,
            },
            "line" => MarkerShape::Line {
                // A lone endX/endY keeps the start coordinate for the other axis.
                end: match (record.end_x, record.end_y) {
                    (None, None) => None,
                    (ex, ey) => Some(Point::new(ex.unwrap_or(record.x), ey.unwrap_or(record.y))),
                },
                color: record.color,
                thickness: record.height,
            },
            "line_aoe" => MarkerShape::LineArea {
                width: record.width,
                height: record.height,
                color: record.color,
            },
            "donut" => MarkerShape::RingSector {
                inner_radius: record.donut_radius,
                arc: record.arc_angle,
            },
            "circle_aoe" => MarkerShape::DiscArea,
            "fan_aoe" => MarkerShape::FanArea {
                arc: record.arc_angle,
            },
            other => MarkerShape::icon(other),
        };

        Ok(Marker {
            position: Point::new(record.x, record.y),
            angle: record.angle,
            size: record.size,
            horizontal_flip: record.horizontal_flip.unwrap_or(false),
            vertical_flip: record.vertical_flip.unwrap_or(false),
            hidden: record.hidden.unwrap_or(false),
            transparency: record.transparency,
            shape,
        })
    }
}

impl From<Marker> for MarkerRecord {
    fn from(marker: Marker) -> Self {
        let mut record = MarkerRecord {
            kind: marker.type_name().to_string(),
            x: marker.position.x,
            y: marker.position.y,
            angle: marker.angle,
            size: marker.size,
            horizontal_flip: marker.horizontal_flip.then_some(true),
            vertical_flip: marker.vertical_flip.then_some(true),
            hidden: marker.hidden.then_some(true),
            transparency: marker.transparency,
            ..Default::default()
        };

        match marker.shape {
            MarkerShape::Text { text, color } => {
                record.text = Some(text);
                record.color = color;
            }
            MarkerShape::Line {
                end,
                color,
                thickness,
            } => {
                record.end_x = end.map(|p| p.x);
                record.end_y = end.map(|p| p.y);
                record.color = color;
                record.height = thickness;
            }
            MarkerShape::LineArea {
                width,
                height,
                color,
            } => {
                record.width = width;
                record.height = height;
                record.color = color;
            }
            MarkerShape::RingSector { inner_radius, arc } => {
                record.donut_radius = inner_radius;
                record.arc_angle = arc;
            }
            MarkerShape::FanArea { arc } => record.arc_angle = arc,
            MarkerShape::DiscArea | MarkerShape::Icon { .. } => {}
        }

        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opacity_hidden_wins() {
        let marker = Marker::new(MarkerShape::DiscArea, 0.0, 0.0)
            .with_transparency(25.0)
            .with_hidden(true);
        assert_eq!(marker.opacity(), 0.0);
    }

    #[test]
    fn test_opacity_from_transparency() {
        let marker = Marker::new(MarkerShape::DiscArea, 0.0, 0.0).with_transparency(25.0);
        assert!((marker.opacity() - 0.75).abs() < 1e-6);

        let opaque = Marker::new(MarkerShape::DiscArea, 0.0, 0.0);
        assert_eq!(opaque.opacity(), 1.0);

        let clamped = Marker::new(MarkerShape::DiscArea, 0.0, 0.0).with_transparency(150.0);
        assert_eq!(clamped.opacity(), 0.0);
    }

    #[test]
    fn test_flipped_scale() {
        let marker = Marker::new(MarkerShape::icon("tank"), 0.0, 0.0)
            .with_size(50.0)
            .with_flip(true, false);
        assert_eq!(marker.flipped_scale(), (-0.5, 0.5));
    }

    #[test]
    fn test_raster_position_is_doubled() {
        assert_eq!(Point::new(12.5, 40.0).to_raster(), Point::new(25.0, 80.0));
    }

    #[test]
    fn test_paint_order_is_reversed() {
        let layout = DecodedLayout::new(
            Background::Grey,
            vec![
                Marker::new(MarkerShape::icon("a"), 0.0, 0.0),
                Marker::new(MarkerShape::icon("b"), 0.0, 0.0),
                Marker::new(MarkerShape::icon("c"), 0.0, 0.0),
            ],
        );
        let order: Vec<&str> = layout.paint_order().map(|m| m.type_name()).collect();
        assert_eq!(order, vec!["c", "b", "a"]);
    }

    #[test]
    fn test_json_shape_mapping() {
        let json = r##"{
            "boardBackground": "grey_circle",
            "objects": [
                {"type": "donut", "x": 10, "y": 20, "donutRadius": 30, "arcAngle": 120},
                {"type": "line", "x": 1, "y": 2, "endX": 5, "height": 4, "color": "#00ff00"},
                {"type": "tank", "x": 3, "y": 4, "horizontalFlip": true}
            ]
        }"##;
        let layout: DecodedLayout = serde_json::from_str(json).unwrap();
        assert_eq!(layout.background, Background::GreyCircle);
        assert_eq!(
            layout.markers[0].shape,
            MarkerShape::RingSector {
                inner_radius: Some(30.0),
                arc: Some(120.0)
            }
        );
        assert_eq!(
            layout.markers[1].shape,
            MarkerShape::Line {
                end: Some(Point::new(5.0, 2.0)),
                color: Some(Color::rgb(0, 255, 0)),
                thickness: Some(4.0)
            }
        );
        assert_eq!(layout.markers[2].shape, MarkerShape::icon("tank"));
        assert!(layout.markers[2].horizontal_flip);
    }

    #[test]
    fn test_missing_type_is_rejected() {
        let json = r#"{"objects": [{"type": "", "x": 0, "y": 0}]}"#;
        assert!(serde_json::from_str::<DecodedLayout>(json).is_err());
    }

    #[test]
    fn test_json_roundtrip_default_board() {
        let layout = DecodedLayout::default_board();
        let json = serde_json::to_string(&layout).unwrap();
        let back: DecodedLayout = serde_json::from_str(&json).unwrap();
        assert_eq!(back, layout);
    }
}
