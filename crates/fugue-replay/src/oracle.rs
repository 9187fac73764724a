//! Last-writer oracle
//!
//! Replay knows the full window up front, so a pre-built history index can
//! answer which transaction writes any given key last. The mutation gate
//! consults that index to keep exactly one write per key.

use fugue_primitives::{Address, H256};

/// Resolves the last transaction number writing each key within the window.
///
/// `None` means the key is never written inside the window.
pub trait VersionOracle: Send + Sync {
    /// Last transaction writing the account record of `address`
    fn max_account_tx(&self, address: &Address) -> Option<u64>;

    /// Last transaction writing the code of `address`
    fn max_code_tx(&self, address: &Address) -> Option<u64>;

    /// Last transaction writing storage `slot` of `address`
    fn max_storage_tx(&self, address: &Address, slot: &H256) -> Option<u64>;
}
