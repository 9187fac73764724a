//! Replay driver
//!
//! Runs a pool of workers over a shared [`ReplayState`]: each worker pulls a
//! transaction number, executes it through its own [`ReplayWriter`], and
//! reports back commit or conflict. The pool drains when the ready queue and
//! the work source are exhausted and no worker is mid-transaction; since a
//! dependency is always an earlier number, nothing can become ready after
//! that point.

use crate::oracle::VersionOracle;
use crate::state::ReplayState;
use crate::writer::ReplayWriter;
use fugue_storage::{StorageError, StorageResult};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

/// Default number of worker threads
pub const DEFAULT_WORKER_THREADS: usize = 4;

/// Outcome of executing one transaction
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TxOutcome {
    /// Every read was available and all writes went through the gate
    Committed,
    /// A read needed the result of a transaction that has not committed yet
    Blocked {
        /// Transaction number that must commit first
        dependency: u64,
    },
}

/// Executes one transaction of the window.
///
/// A blocked transaction is re-executed after its dependency commits; writes
/// it already made are keyed by transaction number, so the re-execution
/// overwrites them in place.
pub trait TxExecutor: Send + Sync {
    /// Execute `tx_num`, driving every state mutation through `writer`
    fn execute(&self, tx_num: u64, writer: &mut ReplayWriter) -> StorageResult<TxOutcome>;
}

/// Driver configuration
#[derive(Clone, Debug)]
pub struct DriverConfig {
    /// Number of worker threads
    pub worker_threads: usize,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            worker_threads: DEFAULT_WORKER_THREADS,
        }
    }
}

/// Totals for a completed run
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DriverReport {
    /// Transactions committed
    pub committed: u64,
    /// Rollbacks taken; one transaction can roll back more than once
    pub rollbacks: u64,
}

/// Worker pool draining one replay window.
///
/// The driver never flushes the buffered writes; flushing while workers might
/// still execute is unsafe, so it is left to the caller after
/// [`run`](Self::run) returns.
pub struct ReplayDriver {
    state: Arc<ReplayState>,
    oracle: Arc<dyn VersionOracle>,
    config: DriverConfig,
}

impl ReplayDriver {
    /// Create a driver with the default configuration
    pub fn new(state: Arc<ReplayState>, oracle: Arc<dyn VersionOracle>) -> Self {
        Self::with_config(state, oracle, DriverConfig::default())
    }

    /// Create a driver with a custom configuration
    pub fn with_config(
        state: Arc<ReplayState>,
        oracle: Arc<dyn VersionOracle>,
        config: DriverConfig,
    ) -> Self {
        Self {
            state,
            oracle,
            config,
        }
    }

    /// Drain the window.
    ///
    /// Returns once every scheduled transaction has committed, or with the
    /// first executor error; on error the remaining workers stop at their
    /// next iteration and the state should be discarded.
    pub fn run(&self, executor: &dyn TxExecutor) -> StorageResult<DriverReport> {
        let workers = self.config.worker_threads.max(1);
        let committed = AtomicU64::new(0);
        let in_flight = AtomicUsize::new(0);
        let abort = AtomicBool::new(false);
        let failed: Mutex<Option<StorageError>> = Mutex::new(None);

        tracing::info!("Replay starting with {} workers", workers);

        std::thread::scope(|scope| {
            for _ in 0..workers {
                scope.spawn(|| {
                    let mut writer =
                        ReplayWriter::new(Arc::clone(&self.state), Arc::clone(&self.oracle));
                    self.worker_loop(
                        executor,
                        &mut writer,
                        &committed,
                        &in_flight,
                        &abort,
                        &failed,
                    );
                });
            }
        });

        if let Some(err) = failed.into_inner() {
            return Err(err);
        }

        let report = DriverReport {
            committed: committed.load(Ordering::Relaxed),
            rollbacks: self.state.rollback_count(),
        };
        tracing::info!(
            "Replay finished: {} committed, {} rollbacks",
            report.committed,
            report.rollbacks
        );
        Ok(report)
    }

    fn worker_loop(
        &self,
        executor: &dyn TxExecutor,
        writer: &mut ReplayWriter,
        committed: &AtomicU64,
        in_flight: &AtomicUsize,
        abort: &AtomicBool,
        failed: &Mutex<Option<StorageError>>,
    ) {
        loop {
            if abort.load(Ordering::Relaxed) {
                return;
            }
            let tx_num = match self.state.schedule() {
                Some(tx_num) => tx_num,
                None => {
                    // A transaction still executing may release more work;
                    // an empty queue is only final once nothing is in
                    // flight. The worker holding the last transaction never
                    // exits here, so it drains whatever its commit frees.
                    if in_flight.load(Ordering::SeqCst) == 0 {
                        return;
                    }
                    std::thread::yield_now();
                    continue;
                }
            };

            in_flight.fetch_add(1, Ordering::SeqCst);
            writer.set_tx_num(tx_num);
            match executor.execute(tx_num, writer) {
                Ok(TxOutcome::Committed) => {
                    self.state.commit_tx_num(tx_num);
                    committed.fetch_add(1, Ordering::Relaxed);
                }
                Ok(TxOutcome::Blocked { dependency }) => {
                    self.state.rollback_tx_num(tx_num, dependency);
                }
                Err(err) => {
                    let mut slot = failed.lock();
                    if slot.is_none() {
                        *slot = Some(err);
                    }
                    abort.store(true, Ordering::Relaxed);
                    in_flight.fetch_sub(1, Ordering::SeqCst);
                    return;
                }
            }
            in_flight.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fugue_primitives::{Address, H256};
    use std::collections::HashMap;

    struct NullOracle;

    impl VersionOracle for NullOracle {
        fn max_account_tx(&self, _address: &Address) -> Option<u64> {
            None
        }

        fn max_code_tx(&self, _address: &Address) -> Option<u64> {
            None
        }

        fn max_storage_tx(&self, _address: &Address, _slot: &H256) -> Option<u64> {
            None
        }
    }

    /// Commits everything, counting how often each transaction executes
    struct CountingExecutor {
        executions: Mutex<HashMap<u64, u32>>,
    }

    impl CountingExecutor {
        fn new() -> Self {
            Self {
                executions: Mutex::new(HashMap::new()),
            }
        }
    }

    impl TxExecutor for CountingExecutor {
        fn execute(&self, tx_num: u64, _writer: &mut ReplayWriter) -> StorageResult<TxOutcome> {
            *self.executions.lock().entry(tx_num).or_insert(0) += 1;
            Ok(TxOutcome::Committed)
        }
    }

    /// Blocks configured transactions until their dependency commits
    struct ConflictingExecutor {
        state: Arc<ReplayState>,
        dependencies: HashMap<u64, u64>,
        executions: Mutex<HashMap<u64, u32>>,
    }

    impl TxExecutor for ConflictingExecutor {
        fn execute(&self, tx_num: u64, _writer: &mut ReplayWriter) -> StorageResult<TxOutcome> {
            *self.executions.lock().entry(tx_num).or_insert(0) += 1;
            if let Some(dependency) = self.dependencies.get(&tx_num) {
                if !self.state.done(*dependency) {
                    return Ok(TxOutcome::Blocked {
                        dependency: *dependency,
                    });
                }
            }
            Ok(TxOutcome::Committed)
        }
    }

    fn driver_for(
        window: std::ops::Range<u64>,
        threads: usize,
    ) -> (Arc<ReplayState>, ReplayDriver) {
        let state = Arc::new(ReplayState::new());
        state.set_work_source(window);
        let driver = ReplayDriver::with_config(
            Arc::clone(&state),
            Arc::new(NullOracle),
            DriverConfig {
                worker_threads: threads,
            },
        );
        (state, driver)
    }

    // ==================== Basic run tests ====================

    #[test]
    fn test_run_commits_whole_window() {
        let (state, driver) = driver_for(0..50, 4);
        let executor = CountingExecutor::new();

        let report = driver.run(&executor).unwrap();

        assert_eq!(report.committed, 50);
        assert_eq!(report.rollbacks, 0);
        assert_eq!(state.done_count(), 50);

        let executions = executor.executions.lock();
        assert_eq!(executions.len(), 50);
        assert!(executions.values().all(|count| *count == 1));
    }

    #[test]
    fn test_run_empty_window() {
        let (state, driver) = driver_for(0..0, 2);
        let report = driver.run(&CountingExecutor::new()).unwrap();

        assert_eq!(report.committed, 0);
        assert_eq!(state.done_count(), 0);
    }

    #[test]
    fn test_single_worker_drains_window() {
        let (state, driver) = driver_for(0..20, 1);
        let report = driver.run(&CountingExecutor::new()).unwrap();

        assert_eq!(report.committed, 20);
        assert_eq!(state.done_count(), 20);
    }

    #[test]
    fn test_zero_workers_clamped_to_one() {
        let (state, driver) = driver_for(0..10, 0);
        let report = driver.run(&CountingExecutor::new()).unwrap();

        assert_eq!(report.committed, 10);
        assert_eq!(state.done_count(), 10);
    }

    // ==================== Conflict tests ====================

    #[test]
    fn test_run_with_conflicts_converges() {
        let state = Arc::new(ReplayState::new());
        state.set_work_source(0..30u64);

        let mut dependencies = HashMap::new();
        dependencies.insert(5u64, 2u64);
        dependencies.insert(17u64, 5u64);
        dependencies.insert(29u64, 28u64);

        let executor = ConflictingExecutor {
            state: Arc::clone(&state),
            dependencies,
            executions: Mutex::new(HashMap::new()),
        };
        let driver = ReplayDriver::new(Arc::clone(&state), Arc::new(NullOracle));

        let report = driver.run(&executor).unwrap();

        assert_eq!(report.committed, 30);
        assert_eq!(state.done_count(), 30);
        assert_eq!(report.rollbacks, state.rollback_count());

        // A blocked transaction ran at least twice
        let executions = executor.executions.lock();
        if report.rollbacks > 0 {
            assert!(executions.iter().any(|(_, count)| *count > 1));
        }
        // And every transaction committed exactly once in the end
        assert_eq!(executions.len(), 30);
    }

    #[test]
    fn test_chained_dependencies_commit_in_order() {
        let state = Arc::new(ReplayState::new());
        state.set_work_source(0..5u64);

        // 4 needs 3 needs 2 needs 1 needs 0
        let dependencies: HashMap<u64, u64> = (1..5u64).map(|tx| (tx, tx - 1)).collect();
        let executor = ConflictingExecutor {
            state: Arc::clone(&state),
            dependencies,
            executions: Mutex::new(HashMap::new()),
        };
        let driver = ReplayDriver::new(Arc::clone(&state), Arc::new(NullOracle));

        let report = driver.run(&executor).unwrap();
        assert_eq!(report.committed, 5);
        assert_eq!(state.done_count(), 5);
    }

    // ==================== Error tests ====================

    struct PoisonExecutor {
        poison: u64,
    }

    impl TxExecutor for PoisonExecutor {
        fn execute(&self, tx_num: u64, _writer: &mut ReplayWriter) -> StorageResult<TxOutcome> {
            if tx_num == self.poison {
                return Err(StorageError::Io(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    "executor failure",
                )));
            }
            Ok(TxOutcome::Committed)
        }
    }

    #[test]
    fn test_executor_error_aborts_run() {
        let (state, driver) = driver_for(0..40, 4);
        let result = driver.run(&PoisonExecutor { poison: 13 });

        assert!(matches!(result, Err(StorageError::Io(_))));
        assert!(state.done_count() < 40);
    }

    // ==================== Config tests ====================

    #[test]
    fn test_default_config() {
        let config = DriverConfig::default();
        assert_eq!(config.worker_threads, DEFAULT_WORKER_THREADS);
        assert_eq!(DEFAULT_WORKER_THREADS, 4);
    }

    #[test]
    fn test_outcome_equality() {
        assert_eq!(TxOutcome::Committed, TxOutcome::Committed);
        assert_eq!(
            TxOutcome::Blocked { dependency: 3 },
            TxOutcome::Blocked { dependency: 3 }
        );
        assert_ne!(
            TxOutcome::Blocked { dependency: 3 },
            TxOutcome::Blocked { dependency: 4 }
        );
    }
}
