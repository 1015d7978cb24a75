//! Marker colors.
//!
//! Colors travel through board codes as CSS-like strings (`#RRGGBB`,
//! `#RRGGBBAA`, `rgba(r,g,b,a)` or a handful of names) and are normalized to
//! straight RGBA on parse.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// Straight (non-premultiplied) RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    /// Default stroke/fill for lines and rectangular AOEs.
    pub const AOE_ORANGE: Color = Color::rgb(0xff, 0x80, 0x00);
    /// CSS `orange`, used to fill ring sectors.
    pub const ORANGE: Color = Color::rgb(255, 165, 0);
    /// Outline of line end handles.
    pub const HANDLE_BLUE: Color = Color::rgb(0x43, 0xa8, 0xd8);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Same color with its alpha multiplied by `opacity` (0.0 - 1.0).
    pub fn with_opacity(self, opacity: f32) -> Self {
        let a = (self.a as f32 * opacity.clamp(0.0, 1.0)).round() as u8;
        Self { a, ..self }
    }
}

/// Error returned when a color string cannot be understood.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Invalid color: {0}")]
pub struct ColorParseError(pub String);

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Some(hex) = trimmed.strip_prefix('#') {
            return parse_hex_color(hex).ok_or_else(|| ColorParseError(s.to_string()));
        }
        if let Some(args) = trimmed
            .strip_prefix("rgba(")
            .or_else(|| trimmed.strip_prefix("rgb("))
            .and_then(|rest| rest.strip_suffix(')'))
        {
            return parse_rgb_function(args).ok_or_else(|| ColorParseError(s.to_string()));
        }
        named_color(trimmed).ok_or_else(|| ColorParseError(s.to_string()))
    }
}

fn parse_hex_color(s: &str) -> Option<Color> {
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(s.get(range)?, 16).ok();

    match s.len() {
        3 => {
            // #rgb shorthand
            let expand = |i: usize| channel(i..i + 1).map(|v| v * 17);
            Some(Color::rgb(expand(0)?, expand(1)?, expand(2)?))
        }
        6 => Some(Color::rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?)),
        8 => Some(Color::rgba(
            channel(0..2)?,
            channel(2..4)?,
            channel(4..6)?,
            channel(6..8)?,
        )),
        _ => None,
    }
}

fn parse_rgb_function(args: &str) -> Option<Color> {
    let parts: Vec<&str> = args.split(',').map(str::trim).collect();
    if parts.len() != 3 && parts.len() != 4 {
        return None;
    }
    let r = parts[0].parse::<u8>().ok()?;
    let g = parts[1].parse::<u8>().ok()?;
    let b = parts[2].parse::<u8>().ok()?;
    let a = match parts.get(3) {
        // CSS alpha is 0.0 - 1.0
        Some(alpha) => (alpha.parse::<f32>().ok()?.clamp(0.0, 1.0) * 255.0).round() as u8,
        None => 255,
    };
    Some(Color::rgba(r, g, b, a))
}

fn named_color(name: &str) -> Option<Color> {
    let color = match name.to_lowercase().as_str() {
        "transparent" => Color::rgba(0, 0, 0, 0),
        "black" => Color::BLACK,
        "white" => Color::WHITE,
        "red" => Color::rgb(255, 0, 0),
        "green" => Color::rgb(0, 128, 0),
        "blue" => Color::rgb(0, 0, 255),
        "yellow" => Color::rgb(255, 255, 0),
        "cyan" => Color::rgb(0, 255, 255),
        "magenta" => Color::rgb(255, 0, 255),
        "orange" => Color::ORANGE,
        "purple" => Color::rgb(128, 0, 128),
        "gray" | "grey" => Color::rgb(128, 128, 128),
        _ => return None,
    };
    Some(color)
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 255 {
            write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            write!(f, "#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Optional marker color. A value that is not a color we understand is
/// dropped with a warning, so the marker keeps its default color.
pub(crate) fn deserialize_lenient<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Color>, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    let color = match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => match s.parse() {
            Ok(color) => Some(color),
            Err(e) => {
                warn!(error = %e, "Ignoring marker color");
                None
            }
        },
        Some(other) => {
            warn!(value = %other, "Ignoring non-string marker color");
            None
        }
    };
    Ok(color)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex() {
        assert_eq!("#ff8000".parse::<Color>().unwrap(), Color::AOE_ORANGE);
        assert_eq!("#FF800080".parse::<Color>().unwrap(), Color::rgba(255, 128, 0, 128));
        assert_eq!("#fff".parse::<Color>().unwrap(), Color::WHITE);
    }

    #[test]
    fn test_parse_rgba_function() {
        let c: Color = "rgba(10, 20, 30, 0.5)".parse().unwrap();
        assert_eq!(c, Color::rgba(10, 20, 30, 128));
        let c: Color = "rgb(1,2,3)".parse().unwrap();
        assert_eq!(c, Color::rgb(1, 2, 3));
    }

    #[test]
    fn test_parse_named_and_invalid() {
        assert_eq!("orange".parse::<Color>().unwrap(), Color::ORANGE);
        assert!("#12345".parse::<Color>().is_err());
        assert!("chartreuse-ish".parse::<Color>().is_err());
    }

    #[test]
    fn test_display_roundtrip() {
        for c in [Color::AOE_ORANGE, Color::rgba(1, 2, 3, 4)] {
            assert_eq!(c.to_string().parse::<Color>().unwrap(), c);
        }
    }

    #[test]
    fn test_with_opacity() {
        assert_eq!(Color::WHITE.with_opacity(0.0).a, 0);
        assert_eq!(Color::WHITE.with_opacity(0.5).a, 128);
        assert_eq!(Color::WHITE.with_opacity(2.0).a, 255);
    }
}
