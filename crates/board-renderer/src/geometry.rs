//! Geometry kernel: pivots, bounds and outlines for board markers.
//!
//! Everything here is pure and works in raster space (y down). Angles are
//! radians unless a name says otherwise. Arcs start at the top of the circle
//! (-90 degrees) and sweep clockwise on screen.
//!
//! Arc outlines are flattened into polylines, so the assembler only ever
//! fills and strokes straight segments.

use std::f64::consts::{FRAC_PI_2, PI, TAU};

use board_common::Point;
use tiny_skia::Transform;

/// Where every arc begins: straight up.
pub const ARC_START: f64 = -FRAC_PI_2;

/// A span of this many degrees (or more) is a full circle.
pub const FULL_CIRCLE_DEGREES: f64 = 360.0;

/// Upper bound on the angle covered by one polyline segment.
pub const MAX_SEGMENT_DEGREES: f64 = 1.0;

/// Font size of text markers, in raster pixels.
pub const TEXT_FONT_SIZE: f64 = 28.0;

/// Estimated advance of one ASCII character relative to the font size.
const CHAR_WIDTH_RATIO: f64 = 0.6;

/// The four axis-aligned directions an arc can sweep past: right, down, left, up.
const CARDINALS: [f64; 4] = [0.0, FRAC_PI_2, PI, 3.0 * FRAC_PI_2];

/// Map an angle into `[0, 2π)`.
pub fn normalize_angle(angle: f64) -> f64 {
    ((angle % TAU) + TAU) % TAU
}

/// Point on a circle.
pub fn polar(center: Point, radius: f64, angle: f64) -> Point {
    Point::new(
        center.x + radius * angle.cos(),
        center.y + radius * angle.sin(),
    )
}

/// Angular extent of an arc, always starting at the top.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcSpan {
    degrees: f64,
}

impl ArcSpan {
    /// Span of `degrees`, clamped to `0..=360`. NaN is treated as empty.
    pub fn from_degrees(degrees: f64) -> Self {
        let degrees = if degrees.is_nan() {
            0.0
        } else {
            degrees.clamp(0.0, FULL_CIRCLE_DEGREES)
        };
        Self { degrees }
    }

    /// Span from an optional marker field, falling back to `default_degrees`.
    pub fn from_marker(arc: Option<f64>, default_degrees: f64) -> Self {
        match arc {
            Some(degrees) if degrees.is_finite() => Self::from_degrees(degrees),
            _ => Self::from_degrees(default_degrees),
        }
    }

    pub fn full() -> Self {
        Self::from_degrees(FULL_CIRCLE_DEGREES)
    }

    pub fn degrees(&self) -> f64 {
        self.degrees
    }

    pub fn is_full(&self) -> bool {
        self.degrees >= FULL_CIRCLE_DEGREES
    }

    pub fn is_empty(&self) -> bool {
        self.degrees <= 0.0
    }

    pub fn start(&self) -> f64 {
        ARC_START
    }

    pub fn end(&self) -> f64 {
        ARC_START + self.degrees.to_radians()
    }

    /// Whether the arc sweeps past `angle`.
    ///
    /// The test interval is `(start, end]`: an angle equal to the start is
    /// already covered by the start endpoint, so it never counts as crossed.
    pub fn contains(&self, angle: f64) -> bool {
        let angle = normalize_angle(angle);
        let start = normalize_angle(self.start());
        let mut end = normalize_angle(self.end());

        if end < start {
            end += TAU;
        }
        let check = if angle < start { angle + TAU } else { angle };

        check > start && check <= end
    }

    /// Cardinal directions the arc sweeps past.
    pub fn crossed_cardinals(&self) -> impl Iterator<Item = f64> + '_ {
        CARDINALS.into_iter().filter(move |&c| self.contains(c))
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn around(p: Point) -> Self {
        Self {
            min_x: p.x,
            min_y: p.y,
            max_x: p.x,
            max_y: p.y,
        }
    }

    pub fn include(&mut self, p: Point) {
        self.min_x = self.min_x.min(p.x);
        self.min_y = self.min_y.min(p.y);
        self.max_x = self.max_x.max(p.x);
        self.max_y = self.max_y.max(p.y);
    }

    pub fn center(&self) -> Point {
        Point::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

/// What closes a sector on the inside.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SectorInner {
    /// An inner arc of this radius (a ring sector; 0 degenerates to a pie).
    Radius(f64),
    /// The circle's center (a pie slice).
    Center,
}

/// Bounding box of a sector of the circle around `center`.
///
/// Candidates are both outer arc endpoints, the inner arc endpoints or the
/// center, and the outer extreme of every cardinal direction the arc sweeps
/// past.
pub fn sector_bounds(center: Point, outer_radius: f64, inner: SectorInner, span: ArcSpan) -> Bounds {
    let (start, end) = (span.start(), span.end());

    let mut bounds = Bounds::around(polar(center, outer_radius, start));
    bounds.include(polar(center, outer_radius, end));

    match inner {
        SectorInner::Radius(r) => {
            bounds.include(polar(center, r, start));
            bounds.include(polar(center, r, end));
        }
        SectorInner::Center => bounds.include(center),
    }

    for cardinal in span.crossed_cardinals() {
        bounds.include(polar(center, outer_radius, cardinal));
    }

    bounds
}

/// Pivot of a ring drawn around the origin.
///
/// A full ring pivots on its center; a partial one on the center of its
/// visible bounding box, so the drawn shape stays centered on the marker.
pub fn ring_sector_offset(span: ArcSpan, outer_radius: f64, inner_radius: f64) -> Point {
    if span.is_full() {
        return Point::ORIGIN;
    }
    sector_bounds(Point::ORIGIN, outer_radius, SectorInner::Radius(inner_radius), span).center()
}

/// Pivot of a disc image of the given radius whose top-left corner is the origin.
pub fn disc_sector_offset(span: ArcSpan, radius: f64) -> Point {
    let center = Point::new(radius, radius);
    if span.is_full() {
        return center;
    }
    sector_bounds(center, radius, SectorInner::Center, span).center()
}

/// Estimated rendered width of a text run, used only for centering.
///
/// Every ASCII character counts as `0.6 × font_size`, anything else double.
pub fn text_width(text: &str, font_size: f64) -> f64 {
    let average = font_size * CHAR_WIDTH_RATIO;
    text.chars()
        .map(|c| if c.is_ascii() { average } else { average * 2.0 })
        .sum()
}

/// Pivot of a text marker: horizontally by estimated width, vertically by half
/// the font size.
pub fn text_offset(text: &str, font_size: f64) -> Point {
    Point::new(text_width(text, font_size) / 2.0, font_size / 2.0)
}

/// One contour of a vector outline.
#[derive(Debug, Clone, PartialEq)]
pub struct Polyline {
    pub points: Vec<Point>,
    pub closed: bool,
}

impl Polyline {
    pub fn open(points: Vec<Point>) -> Self {
        Self {
            points,
            closed: false,
        }
    }

    pub fn closed(points: Vec<Point>) -> Self {
        Self {
            points,
            closed: true,
        }
    }

    pub fn bounds(&self) -> Option<Bounds> {
        let (first, rest) = self.points.split_first()?;
        let mut bounds = Bounds::around(*first);
        for p in rest {
            bounds.include(*p);
        }
        Some(bounds)
    }
}

/// Points along an arc from `from` to `to` (either direction), endpoints included.
pub fn arc_points(center: Point, radius: f64, from: f64, to: f64) -> Vec<Point> {
    let sweep = to - from;
    // Tolerance keeps float noise in to_degrees from adding a segment.
    let segments = (sweep.abs().to_degrees() / MAX_SEGMENT_DEGREES - 1e-9)
        .ceil()
        .max(1.0) as usize;
    (0..=segments)
        .map(|i| polar(center, radius, from + sweep * (i as f64 / segments as f64)))
        .collect()
}

/// Closed circle outline.
pub fn circle(center: Point, radius: f64) -> Polyline {
    let mut points = arc_points(center, radius, 0.0, TAU);
    points.pop();
    Polyline::closed(points)
}

/// Closed axis-aligned rectangle with its top-left corner at `origin`.
pub fn rectangle(origin: Point, width: f64, height: f64) -> Polyline {
    Polyline::closed(vec![
        origin,
        Point::new(origin.x + width, origin.y),
        Point::new(origin.x + width, origin.y + height),
        Point::new(origin.x, origin.y + height),
    ])
}

/// Outline of a ring sector around the origin.
///
/// A full ring is two circles (fill with even-odd to cut the hole). A partial
/// ring is one closed contour: outer arc clockwise, inner arc back.
pub fn ring_sector(span: ArcSpan, outer_radius: f64, inner_radius: f64) -> Vec<Polyline> {
    if span.is_empty() {
        return Vec::new();
    }

    if span.is_full() {
        let mut contours = vec![circle(Point::ORIGIN, outer_radius)];
        if inner_radius > 0.0 {
            contours.push(circle(Point::ORIGIN, inner_radius));
        }
        return contours;
    }

    let (start, end) = (span.start(), span.end());
    let mut points = arc_points(Point::ORIGIN, outer_radius, start, end);
    if inner_radius > 0.0 {
        points.extend(arc_points(Point::ORIGIN, inner_radius, end, start));
    } else {
        points.push(Point::ORIGIN);
    }
    vec![Polyline::closed(points)]
}

/// Pie slice: center, then the arc, closed back to the center.
pub fn pie(center: Point, radius: f64, span: ArcSpan) -> Polyline {
    let mut points = vec![center];
    points.extend(arc_points(center, radius, span.start(), span.end()));
    Polyline::closed(points)
}

/// Placement of a marker on the board.
///
/// Maps local shape coordinates to raster coordinates as
/// `translate(position) · rotate(rotation) · scale(sx, sy) · translate(-offset)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub position: Point,
    /// Degrees, clockwise on screen.
    pub rotation: f64,
    /// Scale factors; negative values flip.
    pub scale: (f64, f64),
    /// Local point that lands on `position`.
    pub offset: Point,
}

impl Default for Placement {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Placement {
    pub const IDENTITY: Placement = Placement {
        position: Point::ORIGIN,
        rotation: 0.0,
        scale: (1.0, 1.0),
        offset: Point::ORIGIN,
    };

    pub fn at(position: Point) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    pub fn rotated(mut self, degrees: f64) -> Self {
        self.rotation = degrees;
        self
    }

    pub fn scaled(mut self, sx: f64, sy: f64) -> Self {
        self.scale = (sx, sy);
        self
    }

    pub fn with_offset(mut self, offset: Point) -> Self {
        self.offset = offset;
        self
    }

    /// Map a local point to raster space.
    pub fn apply(&self, p: Point) -> Point {
        let x = (p.x - self.offset.x) * self.scale.0;
        let y = (p.y - self.offset.y) * self.scale.1;
        let (sin, cos) = self.rotation.to_radians().sin_cos();
        Point::new(
            self.position.x + x * cos - y * sin,
            self.position.y + x * sin + y * cos,
        )
    }

    pub fn to_transform(&self) -> Transform {
        Transform::from_translate(self.position.x as f32, self.position.y as f32)
            .pre_concat(Transform::from_rotate(self.rotation as f32))
            .pre_scale(self.scale.0 as f32, self.scale.1 as f32)
            .pre_translate(-self.offset.x as f32, -self.offset.y as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_angle() {
        assert!((normalize_angle(-FRAC_PI_2) - 3.0 * FRAC_PI_2).abs() < 1e-12);
        assert!((normalize_angle(TAU + 1.0) - 1.0).abs() < 1e-12);
        assert_eq!(normalize_angle(0.0), 0.0);
    }

    #[test]
    fn test_span_clamps() {
        assert_eq!(ArcSpan::from_degrees(400.0).degrees(), 360.0);
        assert_eq!(ArcSpan::from_degrees(-5.0).degrees(), 0.0);
        assert_eq!(ArcSpan::from_degrees(f64::NAN).degrees(), 0.0);
        assert_eq!(ArcSpan::from_marker(None, 90.0).degrees(), 90.0);
        assert_eq!(ArcSpan::from_marker(Some(f64::INFINITY), 90.0).degrees(), 90.0);
    }

    #[test]
    fn test_arc_points_respect_segment_limit() {
        let points = arc_points(Point::ORIGIN, 10.0, 0.0, FRAC_PI_2);
        assert_eq!(points.len(), 91);
        let last = points[points.len() - 1];
        assert!((last.x).abs() < 1e-9);
        assert!((last.y - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_placement_matches_transform() {
        let placement = Placement::at(Point::new(100.0, 50.0))
            .rotated(30.0)
            .scaled(-0.5, 2.0)
            .with_offset(Point::new(10.0, 20.0));
        let transform = placement.to_transform();

        for local in [Point::new(0.0, 0.0), Point::new(10.0, 20.0), Point::new(-7.0, 3.0)] {
            let expected = placement.apply(local);
            let mut pts = [tiny_skia::Point::from_xy(local.x as f32, local.y as f32)];
            transform.map_points(&mut pts);
            assert!((pts[0].x as f64 - expected.x).abs() < 1e-3);
            assert!((pts[0].y as f64 - expected.y).abs() < 1e-3);
        }
    }
}
