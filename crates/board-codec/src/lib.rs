//! Board code codec.
//!
//! A board code is the shareable text form of a [`DecodedLayout`]. The
//! [`BoardCodec`] trait is the seam the render service decodes through; the
//! [`StgyCodec`] implementation handles the `[stgy:...]` envelope.

pub mod stgy;

use board_common::{BoardResult, DecodedLayout};

pub use stgy::{StgyCodec, CODE_PREFIX, DEFAULT_KEY, MAX_KEY};

/// Converts board codes to layouts and back.
pub trait BoardCodec: Send + Sync {
    /// Decode a board code. Malformed input is a `BoardError::Decode`.
    fn decode(&self, code: &str) -> BoardResult<DecodedLayout>;

    /// Encode a layout with the given key (0..=63).
    fn encode(&self, layout: &DecodedLayout, key: u8) -> BoardResult<String>;

    /// Cheap envelope check without decoding the payload.
    fn looks_like_code(&self, code: &str) -> bool;
}
