//! Consensus module for the hive chain
//!
//! Block index and active chain, chain work accounting, difficulty retargeting, proof-of-work
//! checks and the bee proof engine.

pub mod chain;
pub mod difficulty;
pub mod hive;
pub mod state;
pub mod storage;
pub mod types;
pub mod validation;
pub mod work;

#[cfg(test)]
pub(crate) mod testing;

pub use chain::{ActiveChain, BlockIndex, BlockIndexNode, IndexError, NodeId};
pub use difficulty::{DifficultyManager, ProofPath};
pub use hive::{BeeProof, BeeProofSummary, HiveProofError, HiveProofValidator, NetworkHiveInfo};
pub use state::{ChainState, SharedChainState};
pub use storage::{BlockSource, BlockStore, Coin, CoinView, MemoryBlockStore, MemoryUtxoSet, StorageError};
pub use types::{BlockProcessingResult, BlockStatus};
pub use validation::{check_proof_of_work, validate_proof_of_work, BlockProofError, PowError};
