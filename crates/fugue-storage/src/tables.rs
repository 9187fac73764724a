//! Logical table names for replay output
//!
//! The replay buffer keys every buffered mutation by table name; the RocksDB
//! backend maps each table to a column family of the same name.

use fugue_primitives::Address;

/// Flat account and storage state. Accounts are keyed by address, storage
/// slots by address plus slot hash.
pub const PLAIN_STATE: &str = "plain_state";

/// Contract bytecode, keyed by code hash
pub const CODE: &str = "code";

/// Address to code hash index for deployed contracts
pub const CONTRACT_INDEX: &str = "contract_index";

/// All replay output tables
pub const ALL: &[&str] = &[PLAIN_STATE, CODE, CONTRACT_INDEX];

/// Incarnation assigned to a contract on first deployment
pub const FIRST_INCARNATION: u64 = 1;

/// Storage prefix combining address and incarnation
pub fn storage_prefix(address: &Address, incarnation: u64) -> Vec<u8> {
    let mut prefix = Vec::with_capacity(Address::LEN + 8);
    prefix.extend_from_slice(address.as_bytes());
    prefix.extend_from_slice(&incarnation.to_be_bytes());
    prefix
}
