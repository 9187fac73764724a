//! Account record and its binary codec

use fugue_primitives::H256;

/// Account data
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Account {
    /// Account nonce
    pub nonce: u64,
    /// Account balance
    pub balance: u128,
    /// Code hash (hash of code, or EMPTY_CODE_HASH if no code)
    pub code_hash: H256,
    /// Storage root
    pub storage_root: H256,
}

/// Code hash of an account with no code (keccak256 of empty bytes)
pub const EMPTY_CODE_HASH: H256 = H256::from_bytes([
    0xc5, 0xd2, 0x46, 0x01, 0x86, 0xf7, 0x23, 0x3c,
    0x92, 0x7e, 0x7d, 0xb2, 0xdc, 0xc7, 0x03, 0xc0,
    0xe5, 0x00, 0xb6, 0x53, 0xca, 0x82, 0x27, 0x3b,
    0x7b, 0xfa, 0xd8, 0x04, 0x5d, 0x85, 0xa4, 0x70,
]);

/// Storage root of an account with no storage
pub const EMPTY_STORAGE_ROOT: H256 = H256::from_bytes([
    0x56, 0xe8, 0x1f, 0x17, 0x1b, 0xcc, 0x55, 0xa6,
    0xff, 0x83, 0x45, 0xe6, 0x92, 0xc0, 0xf8, 0x6e,
    0x5b, 0x48, 0xe0, 0x1b, 0x99, 0x6c, 0xad, 0xc0,
    0x01, 0x62, 0x2f, 0xb5, 0xe3, 0x63, 0xb4, 0x21,
]);

impl Account {
    /// Encoded length: nonce + balance + code hash + storage root
    pub const ENCODED_LEN: usize = 8 + 16 + 32 + 32;

    /// Create a new empty account
    pub fn new() -> Self {
        Self {
            nonce: 0,
            balance: 0,
            code_hash: EMPTY_CODE_HASH,
            storage_root: EMPTY_STORAGE_ROOT,
        }
    }

    /// Check if account is empty (zero nonce, zero balance, no code)
    pub fn is_empty(&self) -> bool {
        self.nonce == 0 && self.balance == 0 && self.code_hash == EMPTY_CODE_HASH
    }

    /// Check if account has code
    pub fn has_code(&self) -> bool {
        self.code_hash != EMPTY_CODE_HASH
    }

    /// Serialize account to bytes
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(Self::ENCODED_LEN);
        bytes.extend_from_slice(&self.nonce.to_le_bytes());
        bytes.extend_from_slice(&self.balance.to_le_bytes());
        bytes.extend_from_slice(self.code_hash.as_bytes());
        bytes.extend_from_slice(self.storage_root.as_bytes());
        bytes
    }

    /// Deserialize account from bytes
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != Self::ENCODED_LEN {
            return None;
        }
        let nonce = u64::from_le_bytes(bytes[0..8].try_into().ok()?);
        let balance = u128::from_le_bytes(bytes[8..24].try_into().ok()?);
        let code_hash = H256::from_slice(&bytes[24..56]).ok()?;
        let storage_root = H256::from_slice(&bytes[56..88]).ok()?;
        Some(Self {
            nonce,
            balance,
            code_hash,
            storage_root,
        })
    }
}
