//! Storage module for consensus
//!
//! Block bodies and the unspent output set live outside the consensus core. This module defines
//! the interfaces the validators read through, plus in-memory implementations.

pub mod block_store;
pub mod utxo_set;

use consensus_core::Hash;
use thiserror::Error;

pub use block_store::{BlockSource, BlockStore, MemoryBlockStore};
pub use utxo_set::{Coin, CoinView, MemoryUtxoSet};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("block {0} has been pruned")]
    Pruned(Hash),

    #[error("block {0} not found")]
    NotFound(Hash),

    #[error("storage backend error: {0}")]
    Backend(String),
}

pub type StorageResult<T> = std::result::Result<T, StorageError>;
