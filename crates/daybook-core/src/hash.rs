//! SHA-256 fingerprinting with strong types.
//!
//! Digests here are integrity fingerprints, not MACs: no keys, no salt.
//! Photo digests are taken over the exact raw bytes of the file at
//! ingestion, never a base64 transport form.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

use crate::error::CoreError;

/// The fixed algorithm tag stored alongside every record hash.
///
/// Stored per record so a future migration to a different algorithm could
/// tell old fingerprints apart; nothing exercises that today.
pub const RECORD_HASH_ALGO: &str = "sha256";

/// A 32-byte SHA-256 digest.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Sha256Digest(pub [u8; 32]);

impl Sha256Digest {
    /// Compute the SHA-256 digest of the given bytes.
    pub fn digest(data: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(data);
        Self(hasher.finalize().into())
    }

    /// Compute the digest of a string's UTF-8 bytes.
    pub fn digest_str(s: &str) -> Self {
        Self::digest(s.as_bytes())
    }

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to lowercase hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from a hex string (either case).
    pub fn from_hex(s: &str) -> Result<Self, CoreError> {
        let bytes = hex::decode(s).map_err(|e| CoreError::InvalidDigest(e.to_string()))?;
        if bytes.len() != 32 {
            return Err(CoreError::InvalidDigest(format!(
                "expected 32 bytes, got {}",
                bytes.len()
            )));
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }

    /// The zero digest (sentinel value).
    pub const ZERO: Self = Self([0u8; 32]);
}

impl fmt::Debug for Sha256Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sha256({})", &self.to_hex()[..16])
    }
}

impl fmt::Display for Sha256Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl AsRef<[u8]> for Sha256Digest {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 32]> for Sha256Digest {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

/// Convenience: lowercase hex SHA-256 of the given bytes.
pub fn sha256_hex(data: &[u8]) -> String {
    Sha256Digest::digest(data).to_hex()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_deterministic() {
        let d1 = Sha256Digest::digest(b"test data");
        let d2 = Sha256Digest::digest(b"test data");
        assert_eq!(d1, d2);

        let d3 = Sha256Digest::digest(b"different data");
        assert_ne!(d1, d3);
    }

    #[test]
    fn test_known_vector() {
        // sha256("hello")
        assert_eq!(
            sha256_hex(b"hello"),
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }

    #[test]
    fn test_hex_roundtrip() {
        let d = Sha256Digest::digest(b"roundtrip");
        let hex = d.to_hex();
        let recovered = Sha256Digest::from_hex(&hex).unwrap();
        assert_eq!(d, recovered);
    }

    #[test]
    fn test_from_hex_accepts_uppercase() {
        let d = Sha256Digest::digest(b"case");
        let upper = d.to_hex().to_ascii_uppercase();
        assert_eq!(Sha256Digest::from_hex(&upper).unwrap(), d);
    }

    #[test]
    fn test_from_hex_rejects_wrong_length() {
        assert!(Sha256Digest::from_hex("abcd").is_err());
        assert!(Sha256Digest::from_hex("zz").is_err());
    }

    #[test]
    fn test_digest_str_matches_bytes() {
        assert_eq!(
            Sha256Digest::digest_str("hello"),
            Sha256Digest::digest(b"hello")
        );
    }
}
