//! Common error types for primitives

use crate::address::AddressError;
use crate::hash::HashError;
use thiserror::Error;

/// Primitive operation error
#[derive(Debug, Error)]
pub enum PrimitiveError {
    /// Address error
    #[error("address error: {0}")]
    Address(#[from] AddressError),

    /// Hash error
    #[error("hash error: {0}")]
    Hash(#[from] HashError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Address, H256};

    #[test]
    fn test_address_error_converts() {
        let err: PrimitiveError = Address::from_slice(&[0u8; 3]).unwrap_err().into();
        assert!(err.to_string().contains("address error"));
    }

    #[test]
    fn test_hash_error_converts() {
        let err: PrimitiveError = H256::from_slice(&[0u8; 3]).unwrap_err().into();
        assert!(err.to_string().contains("hash error"));
    }
}
