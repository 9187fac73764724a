//! Storage traits for state mutation

use crate::account::Account;
use crate::error::StorageResult;
use fugue_primitives::{Address, H256, U256};

/// Write access to state.
///
/// Transaction execution drives every state mutation through this trait; an
/// implementation decides what actually happens to each write. During replay
/// the implementation buffers only the mutations that survive into the final
/// window output.
pub trait StateWriter {
    /// Update the account record of `address`
    fn update_account(&mut self, address: Address, account: &Account) -> StorageResult<()>;

    /// Update the code of `address`
    fn update_code(&mut self, address: Address, code_hash: H256, code: &[u8]) -> StorageResult<()>;

    /// Write one storage slot of `address`
    fn write_storage(&mut self, address: Address, slot: H256, value: U256) -> StorageResult<()>;

    /// Delete the account at `address`
    fn delete_account(&mut self, address: Address) -> StorageResult<()>;

    /// Mark `address` as a freshly created contract
    fn create_contract(&mut self, address: Address) -> StorageResult<()>;
}
