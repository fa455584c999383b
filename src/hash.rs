// hash.rs
use std::fmt;

use serde::{Serialize, Serializer};
use sha1::{Digest, Sha1};
use thiserror::Error;

/// Length in bytes of a SHA-1 digest.
pub const SHA1_LEN: usize = 20;

/// A 20-byte SHA-1 digest, used for piece hashes and info hashes.
#[derive(Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Sha1Hash(pub [u8; SHA1_LEN]);

/// Identifies a torrent swarm: the digest of the canonical `info` dictionary.
pub type InfoHash = Sha1Hash;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HexError {
    #[error("expected 40 hex characters, got {0}")]
    InvalidLength(usize),

    #[error("invalid hex character {c:?} at index {index}")]
    InvalidCharacter { c: char, index: usize },
}

/// Digests `data` with SHA-1.
pub fn sha1(data: &[u8]) -> Sha1Hash {
    let mut hasher = Sha1::new();
    hasher.update(data);
    Sha1Hash(hasher.finalize().into())
}

impl Sha1Hash {
    /// Copies a digest out of a slice that must be exactly 20 bytes long.
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        <[u8; SHA1_LEN]>::try_from(bytes).ok().map(Sha1Hash)
    }

    pub fn as_bytes(&self) -> &[u8; SHA1_LEN] {
        &self.0
    }

    /// Lowercase, 40 characters.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn from_hex(s: &str) -> Result<Self, HexError> {
        if s.len() != SHA1_LEN * 2 {
            return Err(HexError::InvalidLength(s.len()));
        }
        let mut out = [0u8; SHA1_LEN];
        hex::decode_to_slice(s, &mut out).map_err(|e| match e {
            hex::FromHexError::InvalidHexCharacter { c, index } => {
                HexError::InvalidCharacter { c, index }
            }
            _ => HexError::InvalidLength(s.len()),
        })?;
        Ok(Sha1Hash(out))
    }
}

impl From<[u8; SHA1_LEN]> for Sha1Hash {
    fn from(bytes: [u8; SHA1_LEN]) -> Self {
        Sha1Hash(bytes)
    }
}

impl std::str::FromStr for Sha1Hash {
    type Err = HexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Sha1Hash::from_hex(s)
    }
}

impl fmt::Debug for Sha1Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sha1Hash({})", self.to_hex())
    }
}

impl fmt::Display for Sha1Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Sha1Hash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counting() -> Sha1Hash {
        let mut bytes = [0u8; SHA1_LEN];
        for (i, b) in bytes.iter_mut().enumerate() {
            *b = i as u8;
        }
        Sha1Hash(bytes)
    }

    #[test]
    fn test_hex_roundtrip() {
        let hash = counting();
        let hex = hash.to_hex();
        assert_eq!(hex.len(), 40);
        assert_eq!(hex, "000102030405060708090a0b0c0d0e0f10111213");
        assert_eq!(Sha1Hash::from_hex(&hex).unwrap(), hash);
    }

    #[test]
    fn test_from_hex_accepts_uppercase() {
        let hash = Sha1Hash::from_hex("000102030405060708090A0B0C0D0E0F10111213").unwrap();
        assert_eq!(hash, counting());
    }

    #[test]
    fn test_from_hex_invalid() {
        assert_eq!(
            Sha1Hash::from_hex("invalid"),
            Err(HexError::InvalidLength(7))
        );
        assert_eq!(
            Sha1Hash::from_hex("zz0102030405060708090a0b0c0d0e0f10111213"),
            Err(HexError::InvalidCharacter { c: 'z', index: 0 })
        );
        assert!(Sha1Hash::from_hex("000102030405060708090a0b0c0d0e0f1011121g").is_err());
    }

    #[test]
    fn test_sha1_known_vector() {
        assert_eq!(
            sha1(b"abc").to_hex(),
            "a9993e364706816aba3e25717850c26c9cd0d89d"
        );
    }

    #[test]
    fn test_from_slice() {
        assert_eq!(Sha1Hash::from_slice(&[7u8; 20]), Some(Sha1Hash([7u8; 20])));
        assert_eq!(Sha1Hash::from_slice(&[7u8; 19]), None);
    }

    #[test]
    fn test_display_and_serialize() {
        let hash = counting();
        assert_eq!(hash.to_string(), hash.to_hex());
        assert_eq!(
            serde_json::to_string(&hash).unwrap(),
            "\"000102030405060708090a0b0c0d0e0f10111213\""
        );
    }
}
