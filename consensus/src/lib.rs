//! Consensus library for the hive chain
//!
//! Proof-of-work chain selection with a second, bee-mined block path. This crate decides how much
//! work a chain carries, which target the next block must meet and whether a bee-mined block's
//! proof holds.

pub mod consensus;
pub mod pipeline;

// Re-export key types for easier access
pub use consensus::chain::{ActiveChain, BlockIndex, BlockIndexNode, NodeId};
pub use consensus::difficulty::{DifficultyManager, ProofPath};
pub use consensus::hive::{
    deterministic_rand_string, network_hive_info, BeePopGraphPoint, BeeProof, BeeProofSummary, HiveInfoError,
    HiveProofError, HiveProofValidator, NetworkHiveInfo,
};
pub use consensus::state::{ChainState, SharedChainState};
pub use consensus::storage::{BlockSource, BlockStore, Coin, CoinView, MemoryBlockStore, MemoryUtxoSet, StorageError};
pub use consensus::types::{BlockProcessingResult, BlockStatus};
pub use consensus::validation::{
    check_header_target, check_proof_of_work, validate_block_proof, validate_proof_of_work, BlockProofError, PowError,
};
pub use consensus::work::{block_proof, block_proof_equivalent_time, block_work_from_bits};
pub use consensus_core::Hash;

// Re-export pipeline types
pub use pipeline::{BlockProcessError, BlockProcessor};
