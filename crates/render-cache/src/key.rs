//! Cache keys: SHA-256 of the raw board code.

use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

use board_common::{BoardError, BoardResult};

/// Length of a hex-encoded SHA-256 digest.
pub const KEY_LEN: usize = 64;

/// Identity of a rendered board.
///
/// The hash covers the code exactly as received, so two codes that decode to
/// the same layout but differ byte-wise are cached separately.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    /// Hash a board code.
    pub fn from_code(code: &str) -> Self {
        Self(hex::encode(Sha256::digest(code.as_bytes())))
    }

    /// Accept a hash supplied by a client. Must be 64 lowercase hex characters.
    pub fn parse(hash: &str) -> BoardResult<Self> {
        let valid = hash.len() == KEY_LEN
            && hash
                .bytes()
                .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
        if !valid {
            return Err(BoardError::InvalidParameter {
                param: "hash".to_string(),
                message: format!("expected {} lowercase hex characters", KEY_LEN),
            });
        }
        Ok(Self(hash.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File name of the rendered board in the store.
    pub fn file_name(&self) -> String {
        format!("{}.webp", self.0)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CacheKey {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
