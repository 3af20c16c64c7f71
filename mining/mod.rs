//! Bee mining
//!
//! Searches the bees a wallet owns for one whose hash meets the bee target of the next block, and
//! turns a hit into the coinbase of a bee-mined block.
//!
//! ## Module Organization
//!
//! - [`range`]: bee ranges, binning and the thread count rule
//! - [`worker`]: the per-bin scan and the shared search state
//! - [`manager`]: the worker pool, abort watcher and session statistics
//! - [`proof`]: bee proof script and coinbase assembly

pub mod range;
pub mod worker;
pub mod manager;
pub mod proof;


// Re-export main types for easier access
pub use range::{bin_bees, thread_count, BeeCreation, BeeRange};
pub use worker::{BeeSolution, BeeWorker, SearchContext, WorkerStats};
pub use manager::{BeeMiner, BeeMiningConfig, BeeSearch, SessionStats, TipSource};
pub use proof::{bee_coinbase, build_bee_proof_script};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::range::{BeeCreation, BeeRange};
    pub use crate::worker::{BeeSolution, WorkerStats};
    pub use crate::manager::{BeeMiner, BeeMiningConfig, BeeSearch, SessionStats, TipSource};
    pub use crate::proof::{bee_coinbase, build_bee_proof_script};
}
