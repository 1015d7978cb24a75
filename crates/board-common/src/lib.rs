//! Common types shared across all strategy-board crates and services.

pub mod color;
pub mod error;
pub mod layout;

pub use color::{Color, ColorParseError};
pub use error::{BoardError, BoardResult};
pub use layout::{
    Background, DecodedLayout, Marker, MarkerShape, Point, LAYOUT_HEIGHT, LAYOUT_WIDTH,
    RASTER_SCALE,
};
