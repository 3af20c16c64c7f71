//! Bee search worker
//!
//! A worker scans the bees of one bin in order and hashes each against the deterministic random
//! string. The shared cancellation flag is only read every [`CHECK_INTERVAL`] bees; the solution
//! slot is the only lock, taken once when a bee meets the target.

use crate::range::BeeRange;
use consensus_core::{Hash, U256};
use hive_hashes::BeeHashBuilder;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

/// Bees hashed between two reads of the cancellation flag.
pub const CHECK_INTERVAL: u64 = 1000;

/// The bee that met the target.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BeeSolution {
    pub range: BeeRange,
    pub nonce: u32,
    pub bee_hash: Hash,
    pub worker_id: usize,
}

/// Shared state of one search.
#[derive(Clone, Debug)]
pub struct SearchContext {
    pub deterministic_rand: Arc<str>,
    pub target: U256,
    pub cancel: Arc<AtomicBool>,
    pub solution: Arc<Mutex<Option<BeeSolution>>>,
}

impl SearchContext {
    pub fn new(deterministic_rand: &str, target: U256) -> Self {
        Self {
            deterministic_rand: Arc::from(deterministic_rand),
            target,
            cancel: Arc::new(AtomicBool::new(false)),
            solution: Arc::new(Mutex::new(None)),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }

    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    /// Records `solution` unless another worker got there first. Returns true if it was recorded.
    pub fn offer(&self, solution: BeeSolution) -> bool {
        let mut slot = self.solution.lock().unwrap_or_else(|e| e.into_inner());
        let recorded = slot.is_none();
        if recorded {
            *slot = Some(solution);
        }
        self.cancel();
        recorded
    }

    pub fn take_solution(&self) -> Option<BeeSolution> {
        self.solution.lock().unwrap_or_else(|e| e.into_inner()).take()
    }
}

/// Scans one bin of bees
#[derive(Debug)]
pub struct BeeWorker {
    /// Unique identifier for this worker
    pub id: usize,
    pub bin: Vec<BeeRange>,
    context: SearchContext,
}

impl BeeWorker {
    pub fn new(id: usize, bin: Vec<BeeRange>, context: SearchContext) -> Self {
        Self { id, bin, context }
    }

    /// Runs the scan (blocking, should be run in a thread)
    pub fn run(&self) -> WorkerStats {
        let start_time = Instant::now();
        let mut checked: u64 = 0;
        let mut found = false;

        'bins: for range in &self.bin {
            let builder = BeeHashBuilder::new(&self.context.deterministic_rand, &range.txid);
            for nonce in range.nonces() {
                if checked % CHECK_INTERVAL == 0 && self.context.is_cancelled() {
                    log::debug!("Worker {} stopping after {} bees", self.id, checked);
                    break 'bins;
                }
                checked += 1;

                let bee_hash = builder.finalize_with_nonce(nonce);
                if U256::from_little_endian(bee_hash.as_bytes()) < self.context.target {
                    log::info!("Worker {} found bee {} of {} after {} bees", self.id, nonce, range.txid, checked);
                    found = self.context.offer(BeeSolution { range: range.clone(), nonce, bee_hash, worker_id: self.id });
                    break 'bins;
                }
            }
        }

        WorkerStats { bees_checked: checked, time_ms: start_time.elapsed().as_millis() as u64, found }
    }
}

/// Statistics for one worker run
#[derive(Debug, Clone, Default)]
pub struct WorkerStats {
    /// Bees hashed
    pub bees_checked: u64,
    /// Scan time in milliseconds
    pub time_ms: u64,
    /// This worker's solution was recorded
    pub found: bool,
}

impl WorkerStats {
    /// Bees hashed per second
    pub fn hash_rate(&self) -> f64 {
        if self.time_ms == 0 {
            return 0.0;
        }
        (self.bees_checked as f64) / (self.time_ms as f64 / 1000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use consensus_core::script::Script;

    fn range(count: u32) -> BeeRange {
        BeeRange {
            txid: Hash::from_bytes([3; 32]).to_hex(),
            bct_height: 5,
            honey_script: Script::default(),
            community_contrib: false,
            offset: 0,
            count,
        }
    }

    #[test]
    fn test_worker_finds_first_bee_under_target() {
        let context = SearchContext::new("ab", U256::MAX);
        let worker = BeeWorker::new(0, vec![range(10)], context.clone());
        let stats = worker.run();
        assert!(stats.found);
        assert_eq!(stats.bees_checked, 1);
        let solution = context.take_solution().unwrap();
        assert_eq!(solution.nonce, 0);
        assert_eq!(solution.bee_hash, BeeHashBuilder::new("ab", &range(1).txid).finalize_with_nonce(0));
        assert!(context.is_cancelled());
    }

    #[test]
    fn test_worker_exhausts_bin() {
        let context = SearchContext::new("ab", U256::zero());
        let stats = BeeWorker::new(1, vec![range(50), range(25)], context.clone()).run();
        assert!(!stats.found);
        assert_eq!(stats.bees_checked, 75);
        assert!(context.take_solution().is_none());
    }

    #[test]
    fn test_cancelled_worker_stops_at_check() {
        let context = SearchContext::new("ab", U256::zero());
        context.cancel();
        let stats = BeeWorker::new(2, vec![range(5000)], context).run();
        assert_eq!(stats.bees_checked, 0);
    }

    #[test]
    fn test_first_offer_wins() {
        let context = SearchContext::new("ab", U256::MAX);
        let first = BeeSolution { range: range(1), nonce: 1, bee_hash: Hash::zeroed(), worker_id: 0 };
        let second = BeeSolution { nonce: 2, worker_id: 1, ..first.clone() };
        assert!(context.offer(first.clone()));
        assert!(!context.offer(second));
        assert_eq!(context.take_solution(), Some(first));
    }

    #[test]
    fn test_worker_stats_rate() {
        let stats = WorkerStats { bees_checked: 1_000_000, time_ms: 1000, found: false };
        assert!(stats.hash_rate() > 900_000.0);
        assert_eq!(WorkerStats::default().hash_rate(), 0.0);
    }
}
