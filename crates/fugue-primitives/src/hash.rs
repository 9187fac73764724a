//! Hash types (H256)

use std::fmt;
use thiserror::Error;

/// Hash parsing error
#[derive(Debug, Error)]
pub enum HashError {
    /// Invalid hex string
    #[error("invalid hex string: {0}")]
    InvalidHex(String),
    /// Invalid length
    #[error("invalid hash length: expected {expected} bytes, got {got}")]
    InvalidLength {
        /// Expected byte length
        expected: usize,
        /// Actual byte length
        got: usize,
    },
}

/// 256-bit hash (32 bytes)
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct H256([u8; 32]);

/// Alias for H256
pub type Hash = H256;

impl H256 {
    /// Size in bytes
    pub const LEN: usize = 32;

    /// Zero hash
    pub const ZERO: H256 = H256([0u8; 32]);

    /// Create from bytes
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        H256(bytes)
    }

    /// Create from slice
    pub fn from_slice(slice: &[u8]) -> Result<Self, HashError> {
        if slice.len() != 32 {
            return Err(HashError::InvalidLength {
                expected: 32,
                got: slice.len(),
            });
        }
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(slice);
        Ok(H256(bytes))
    }

    /// Parse from hex string
    pub fn from_hex(s: &str) -> Result<Self, HashError> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(s).map_err(|e| HashError::InvalidHex(e.to_string()))?;
        Self::from_slice(&bytes)
    }

    /// Get as bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Check if zero
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    /// Convert to hex string
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for H256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "H256({})", self.to_hex())
    }
}

impl fmt::Display for H256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl From<[u8; 32]> for H256 {
    fn from(bytes: [u8; 32]) -> Self {
        H256(bytes)
    }
}

impl AsRef<[u8]> for H256 {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Basic tests ====================

    #[test]
    fn test_h256_from_hex() {
        let hash = H256::from_hex(
            "0x0000000000000000000000000000000000000000000000000000000000000001",
        )
        .unwrap();
        assert!(!hash.is_zero());
        assert_eq!(hash.as_bytes()[31], 1);
    }

    #[test]
    fn test_h256_zero() {
        let zero = H256::ZERO;
        assert!(zero.is_zero());
    }

    #[test]
    fn test_h256_from_hex_without_prefix() {
        let hash = H256::from_hex(
            "0000000000000000000000000000000000000000000000000000000000000001",
        )
        .unwrap();
        assert!(!hash.is_zero());
    }

    // ==================== Hex parsing edge cases ====================

    #[test]
    fn test_h256_from_hex_invalid_chars() {
        let result = H256::from_hex(
            "0xgggggggggggggggggggggggggggggggggggggggggggggggggggggggggggggggg",
        );
        assert!(result.is_err());
        match result {
            Err(HashError::InvalidHex(_)) => {}
            _ => panic!("Expected InvalidHex error"),
        }
    }

    #[test]
    fn test_h256_from_hex_empty() {
        let result = H256::from_hex("");
        assert!(result.is_err());
        match result {
            Err(HashError::InvalidLength { expected: 32, got: 0 }) => {}
            _ => panic!("Expected InvalidLength error"),
        }
    }

    // ==================== Length boundary tests ====================

    #[test]
    fn test_h256_from_slice_too_short() {
        let short = vec![0u8; 31];
        let result = H256::from_slice(&short);
        assert!(result.is_err());
        match result {
            Err(HashError::InvalidLength { expected: 32, got: 31 }) => {}
            _ => panic!("Expected InvalidLength error"),
        }
    }

    #[test]
    fn test_h256_from_slice_exact() {
        let bytes = [0xab; 32];
        let hash = H256::from_slice(&bytes).unwrap();
        assert_eq!(hash.as_bytes(), &bytes);
    }

    // ==================== Conversion tests ====================

    #[test]
    fn test_h256_from_bytes() {
        let bytes = [0x12; 32];
        let hash = H256::from_bytes(bytes);
        assert_eq!(hash.as_bytes(), &bytes);
    }

    #[test]
    fn test_h256_hex_roundtrip() {
        let original = "0xabcdef0123456789abcdef0123456789abcdef0123456789abcdef0123456789";
        let hash = H256::from_hex(original).unwrap();
        assert_eq!(hash.to_hex(), original);
    }

    // ==================== Display and Debug ====================

    #[test]
    fn test_h256_debug() {
        let hash = H256::from_bytes([0x42; 32]);
        let debug = format!("{:?}", hash);
        assert!(debug.starts_with("H256(0x"));
    }

    #[test]
    fn test_h256_ordering_is_bytewise() {
        let low = H256::from_bytes([0x01; 32]);
        let high = H256::from_bytes([0x02; 32]);
        assert!(low < high);
    }
}
