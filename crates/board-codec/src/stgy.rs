//! `[stgy:...]` board codes.
//!
//! Layout of a code:
//!
//! ```text
//! [stgy:<key><payload>]
//! ```
//!
//! - `key` is one character of the URL-safe base64 alphabet, its index (0-63)
//!   being the encoding key.
//! - `payload` is the zlib-compressed JSON layout, base64 encoded with the
//!   URL-safe alphabet (no padding), every character rotated forward by `key`
//!   positions within that alphabet.
//!
//! The alphabet avoids `/`, so codes can be used as a single URL path segment.

use std::io::{Read, Write};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;

use board_common::{BoardError, BoardResult, DecodedLayout};

use crate::BoardCodec;

/// Every board code starts with this envelope.
pub const CODE_PREFIX: &str = "[stgy:";

const CODE_SUFFIX: char = ']';

/// Key used when the caller does not pick one.
pub const DEFAULT_KEY: u8 = 14;

/// Largest valid key.
pub const MAX_KEY: u8 = 63;

const ALPHABET: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";

/// Upper bound on the inflated JSON size, so a tiny code cannot expand into
/// an arbitrarily large allocation.
const MAX_DECODED_BYTES: u64 = 4 * 1024 * 1024;

/// Codec for `[stgy:...]` board codes.
#[derive(Debug, Clone, Copy, Default)]
pub struct StgyCodec;

impl StgyCodec {
    pub fn new() -> Self {
        Self
    }
}

fn alphabet_index(c: u8) -> Option<u8> {
    ALPHABET.iter().position(|&a| a == c).map(|i| i as u8)
}

fn rotate(text: &[u8], shift: u8) -> BoardResult<Vec<u8>> {
    text.iter()
        .map(|&c| {
            let idx = alphabet_index(c).ok_or_else(|| {
                BoardError::Decode(format!("unexpected character '{}' in payload", c as char))
            })?;
            Ok(ALPHABET[(idx as usize + shift as usize) % 64])
        })
        .collect()
}

impl BoardCodec for StgyCodec {
    fn decode(&self, code: &str) -> BoardResult<DecodedLayout> {
        let body = code
            .trim()
            .strip_prefix(CODE_PREFIX)
            .and_then(|rest| rest.strip_suffix(CODE_SUFFIX))
            .ok_or_else(|| BoardError::Decode("missing [stgy:...] envelope".to_string()))?;

        let (&key_char, payload) = body
            .as_bytes()
            .split_first()
            .ok_or_else(|| BoardError::Decode("empty board code".to_string()))?;
        let key = alphabet_index(key_char)
            .ok_or_else(|| BoardError::Decode(format!("invalid key '{}'", key_char as char)))?;

        // Rotating forward by (64 - key) undoes the encoder's rotation by key.
        let unrotated = rotate(payload, (64 - key) % 64)?;
        let compressed = URL_SAFE_NO_PAD
            .decode(&unrotated)
            .map_err(|e| BoardError::Decode(format!("invalid base64 payload: {}", e)))?;

        let mut json = Vec::new();
        ZlibDecoder::new(compressed.as_slice())
            .take(MAX_DECODED_BYTES + 1)
            .read_to_end(&mut json)
            .map_err(|e| BoardError::Decode(format!("invalid compressed payload: {}", e)))?;
        if json.len() as u64 > MAX_DECODED_BYTES {
            return Err(BoardError::Decode("decoded board is too large".to_string()));
        }

        let layout: DecodedLayout = serde_json::from_slice(&json)?;
        tracing::debug!(
            key = key,
            markers = layout.markers.len(),
            "Decoded board code"
        );
        Ok(layout)
    }

    fn encode(&self, layout: &DecodedLayout, key: u8) -> BoardResult<String> {
        if key > MAX_KEY {
            return Err(BoardError::InvalidParameter {
                param: "key".to_string(),
                message: format!("must be between 0 and {}, got {}", MAX_KEY, key),
            });
        }

        let json = serde_json::to_vec(layout)
            .map_err(|e| BoardError::Encode(format!("JSON error: {}", e)))?;

        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::best());
        encoder
            .write_all(&json)
            .map_err(|e| BoardError::Encode(e.to_string()))?;
        let compressed = encoder
            .finish()
            .map_err(|e| BoardError::Encode(e.to_string()))?;

        let payload = URL_SAFE_NO_PAD.encode(compressed);
        let rotated = rotate(payload.as_bytes(), key)?;

        let mut code = String::with_capacity(CODE_PREFIX.len() + rotated.len() + 2);
        code.push_str(CODE_PREFIX);
        code.push(ALPHABET[key as usize] as char);
        // Rotation only ever yields alphabet bytes, which are ASCII.
        code.extend(rotated.iter().map(|&b| b as char));
        code.push(CODE_SUFFIX);
        Ok(code)
    }

    fn looks_like_code(&self, code: &str) -> bool {
        code.trim_start().starts_with(CODE_PREFIX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotate_wraps_alphabet() {
        assert_eq!(rotate(b"_", 1).unwrap(), b"A");
        assert_eq!(rotate(b"A", 63).unwrap(), b"_");
        assert!(rotate(b"+", 1).is_err());
    }

    #[test]
    fn test_key_character_leads_payload() {
        let code = StgyCodec.encode(&DecodedLayout::default(), 0).unwrap();
        assert!(code.starts_with("[stgy:A"));
        assert!(code.ends_with(']'));
        assert!(!code.contains('/'));
    }

    #[test]
    fn test_looks_like_code() {
        assert!(StgyCodec.looks_like_code("[stgy:abc]"));
        assert!(StgyCodec.looks_like_code("  [stgy:abc]\n"));
        assert!(!StgyCodec.looks_like_code("stgy:abc"));
        assert!(!StgyCodec.looks_like_code("hello"));
    }
}
