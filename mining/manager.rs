//! Bee miner that runs one search across a pool of worker threads
//!
//! Each search bins the mature bees, spawns one worker per bin and, when early abort is enabled,
//! a watcher that cancels the search as soon as the chain tip moves: a proof built on a stale tip
//! is worthless.

use crate::range::{bin_bees, thread_count, total_bees, BeeCreation};
use crate::worker::{BeeSolution, BeeWorker, SearchContext, WorkerStats};
use consensus::ChainState;
use consensus_core::U256;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Height of the current chain tip, as seen by the abort watcher.
pub trait TipSource: Send + Sync {
    fn tip_height(&self) -> u32;
}

impl TipSource for RwLock<ChainState> {
    fn tip_height(&self) -> u32 {
        self.read().height()
    }
}

/// Configuration for the bee miner
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BeeMiningConfig {
    /// Worker threads: -2 for all cores but one, other negatives for all cores, 0 for one
    pub threads: i32,
    /// Cancel a running search when the tip changes
    pub early_abort: bool,
    /// Milliseconds between two tip checks of the abort watcher, at least 1
    pub check_delay_ms: u64,
}

impl Default for BeeMiningConfig {
    fn default() -> Self {
        Self { threads: -2, early_abort: true, check_delay_ms: 1 }
    }
}

/// Everything a search needs, taken from the tip it builds on.
#[derive(Clone, Debug)]
pub struct BeeSearch {
    /// Mature bee creation transactions to search
    pub bcts: Vec<BeeCreation>,
    /// Deterministic random string of the tip
    pub deterministic_rand: String,
    /// Bee hash target for the next block
    pub target: U256,
    /// Height of the tip the search builds on
    pub tip_height: u32,
}

/// Statistics for a bee mining session
#[derive(Clone, Debug, Default)]
pub struct SessionStats {
    pub searches: u64,
    pub solutions: u64,
    pub aborted: u64,
    pub bees_checked: u64,
    pub total_time_ms: u64,
}

impl SessionStats {
    /// Formats session stats as a readable string
    pub fn format_summary(&self) -> String {
        format!(
            "Bee Mining Session Stats:\n  Searches: {}\n  Solutions: {}\n  Aborted: {}\n  Bees Checked: {}\n  Time: {}ms",
            self.searches, self.solutions, self.aborted, self.bees_checked, self.total_time_ms
        )
    }
}

/// Runs bee searches
pub struct BeeMiner {
    config: BeeMiningConfig,
    cores: usize,
    stats: Mutex<SessionStats>,
}

impl BeeMiner {
    /// Creates a bee miner sized for this machine
    pub fn new(config: BeeMiningConfig) -> Self {
        Self::with_cores(config, num_cpus::get())
    }

    pub fn with_cores(config: BeeMiningConfig, cores: usize) -> Self {
        Self { config, cores, stats: Mutex::new(SessionStats::default()) }
    }

    pub fn config(&self) -> &BeeMiningConfig {
        &self.config
    }

    /// Number of worker threads a search will use
    pub fn thread_count(&self) -> usize {
        thread_count(self.config.threads, self.cores)
    }

    /// Interval at which the abort watcher polls the tip
    pub fn check_delay(&self) -> Duration {
        Duration::from_millis(self.config.check_delay_ms.max(1))
    }

    /// Searches every bee of `search` for one meeting the target.
    ///
    /// Returns `None` when no bee qualifies or when `tip` moved away from `search.tip_height`
    /// before the search ended.
    pub fn search(&self, search: &BeeSearch, tip: Option<Arc<dyn TipSource>>) -> Option<BeeSolution> {
        let start = Instant::now();
        let threads = self.thread_count();
        let bins = bin_bees(&search.bcts, threads);
        if bins.is_empty() {
            log::debug!("No mature bees to search");
            return None;
        }
        log::debug!(
            "Binning {} bees in {} bins for {} threads",
            total_bees(&search.bcts),
            bins.len(),
            threads
        );

        let context = SearchContext::new(&search.deterministic_rand, search.target);
        let aborted = Arc::new(AtomicBool::new(false));

        let workers: Vec<JoinHandle<WorkerStats>> = bins
            .into_iter()
            .enumerate()
            .map(|(id, bin)| {
                let worker = BeeWorker::new(id, bin, context.clone());
                thread::spawn(move || worker.run())
            })
            .collect();

        let watcher = match tip {
            Some(tip) if self.config.early_abort => {
                Some(spawn_abort_watcher(tip, search.tip_height, self.check_delay(), context.clone(), Arc::clone(&aborted)))
            }
            _ => None,
        };

        let mut bees_checked = 0;
        for handle in workers {
            match handle.join() {
                Ok(stats) => bees_checked += stats.bees_checked,
                Err(e) => log::error!("Bee worker thread panicked: {:?}", e),
            }
        }
        // Releases the watcher.
        context.cancel();
        if let Some(handle) = watcher {
            if let Err(e) = handle.join() {
                log::error!("Abort watcher thread panicked: {:?}", e);
            }
        }

        let time_ms = start.elapsed().as_millis() as u64;
        let was_aborted = aborted.load(Ordering::Relaxed);
        let solution = if was_aborted { None } else { context.take_solution() };

        let mut stats = self.stats.lock().unwrap_or_else(|e| e.into_inner());
        stats.searches += 1;
        stats.bees_checked += bees_checked;
        stats.total_time_ms += time_ms;
        if was_aborted {
            stats.aborted += 1;
            log::info!("Chain tip changed, bee search aborted after {}ms", time_ms);
        } else if let Some(solution) = &solution {
            stats.solutions += 1;
            log::info!(
                "Bee {} of {} meets the target ({} bees checked with {} threads in {}ms)",
                solution.nonce,
                solution.range.txid,
                bees_checked,
                threads,
                time_ms
            );
        } else {
            log::info!("No bee meets the target ({} bees checked with {} threads in {}ms)", bees_checked, threads, time_ms);
        }
        solution
    }

    /// Gets overall mining session statistics
    pub fn session_stats(&self) -> SessionStats {
        self.stats.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

fn spawn_abort_watcher(
    tip: Arc<dyn TipSource>,
    height: u32,
    delay: Duration,
    context: SearchContext,
    aborted: Arc<AtomicBool>,
) -> JoinHandle<()> {
    thread::spawn(move || loop {
        thread::sleep(delay);
        if context.is_cancelled() {
            return;
        }
        if tip.tip_height() != height {
            log::debug!("Tip moved from height {}, aborting bee search", height);
            aborted.store(true, Ordering::Relaxed);
            context.cancel();
            return;
        }
    })
}
