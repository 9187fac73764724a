//! Mutation gate
//!
//! [`ReplayWriter`] sits between transaction execution and the shared buffer.
//! Historical transactions rewrite the same keys over and over; only the
//! mutation made by the last writer of a key belongs in the window output.
//! Every other write is silently discarded.

use crate::oracle::VersionOracle;
use crate::state::ReplayState;
use fugue_primitives::{Address, H256, U256};
use fugue_storage::{tables, Account, StateWriter, StorageResult};
use std::sync::Arc;

/// Minimal big-endian encoding of a storage value, empty for zero
fn trimmed_be(value: &U256) -> Vec<u8> {
    let mut buf = [0u8; 32];
    value.to_big_endian(&mut buf);
    match buf.iter().position(|byte| *byte != 0) {
        Some(start) => buf[start..].to_vec(),
        None => Vec::new(),
    }
}

/// State writer that keeps only last-writer mutations.
///
/// One writer is held per worker; [`set_tx_num`](Self::set_tx_num) switches
/// it to the transaction currently executing.
pub struct ReplayWriter {
    state: Arc<ReplayState>,
    oracle: Arc<dyn VersionOracle>,
    tx_num: u64,
}

impl ReplayWriter {
    /// Create a writer over the shared state
    pub fn new(state: Arc<ReplayState>, oracle: Arc<dyn VersionOracle>) -> Self {
        Self {
            state,
            oracle,
            tx_num: 0,
        }
    }

    /// Set the transaction number the next writes belong to
    pub fn set_tx_num(&mut self, tx_num: u64) {
        self.tx_num = tx_num;
    }

    /// Check whether this writer's transaction is the last writer for the
    /// looked-up key
    fn is_last_writer(&self, last_tx: Option<u64>) -> bool {
        last_tx == Some(self.tx_num)
    }
}

impl StateWriter for ReplayWriter {
    fn update_account(&mut self, address: Address, account: &Account) -> StorageResult<()> {
        if !self.is_last_writer(self.oracle.max_account_tx(&address)) {
            tracing::trace!("no change for account {} at txNum {}", address, self.tx_num);
            return Ok(());
        }
        self.state.put(
            tables::PLAIN_STATE,
            address.as_bytes().to_vec(),
            None,
            account.to_bytes(),
            self.tx_num,
        );
        Ok(())
    }

    fn update_code(&mut self, address: Address, code_hash: H256, code: &[u8]) -> StorageResult<()> {
        if !self.is_last_writer(self.oracle.max_code_tx(&address)) {
            tracing::trace!("no change for code of {} at txNum {}", address, self.tx_num);
            return Ok(());
        }
        self.state.put(
            tables::CODE,
            code_hash.as_bytes().to_vec(),
            None,
            code.to_vec(),
            self.tx_num,
        );
        if !code.is_empty() {
            self.state.put(
                tables::CONTRACT_INDEX,
                tables::storage_prefix(&address, tables::FIRST_INCARNATION),
                None,
                code_hash.as_bytes().to_vec(),
                self.tx_num,
            );
        }
        Ok(())
    }

    fn write_storage(&mut self, address: Address, slot: H256, value: U256) -> StorageResult<()> {
        if !self.is_last_writer(self.oracle.max_storage_tx(&address, &slot)) {
            tracing::trace!(
                "no change for storage {} {} at txNum {}",
                address,
                slot,
                self.tx_num
            );
            return Ok(());
        }
        let encoded = trimmed_be(&value);
        if !encoded.is_empty() {
            self.state.put(
                tables::PLAIN_STATE,
                address.as_bytes().to_vec(),
                Some(slot.as_bytes().to_vec()),
                encoded,
                self.tx_num,
            );
        }
        Ok(())
    }

    fn delete_account(&mut self, _address: Address) -> StorageResult<()> {
        // Absence from the window output already encodes the deletion
        Ok(())
    }

    fn create_contract(&mut self, _address: Address) -> StorageResult<()> {
        Ok(())
    }
}
