//! Proof dispatch for full blocks.

use consensus_core::block::Block;
use consensus_core::Hash;
use consensus_pow::PowEngine;
use thiserror::Error;

use super::pow::{validate_proof_of_work, PowError};
use crate::consensus::chain::BlockIndex;
use crate::consensus::hive::{BeeProofSummary, HiveProofError, HiveProofValidator};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BlockProofError {
    #[error("parent block {0} is not in the block index")]
    UnknownParent(Hash),

    #[error(transparent)]
    Pow(#[from] PowError),

    #[error(transparent)]
    Hive(#[from] HiveProofError),
}

impl BlockProofError {
    pub fn reject_reason(&self) -> &'static str {
        match self {
            BlockProofError::UnknownParent(_) => "prev-blk-not-found",
            BlockProofError::Pow(err) => err.reject_reason(),
            BlockProofError::Hive(err) => err.reject_reason(),
        }
    }

    pub fn is_unavailable(&self) -> bool {
        match self {
            BlockProofError::UnknownParent(_) => true,
            BlockProofError::Pow(_) => false,
            BlockProofError::Hive(err) => err.is_unavailable(),
        }
    }
}

/// Checks the proof of `block`: the bee proof when its nonce carries the hive marker, the proof
/// of work otherwise. Returns the bee proof summary for bee-mined blocks.
pub fn validate_block_proof(
    index: &BlockIndex,
    block: &Block,
    engine: &PowEngine,
    hive: &HiveProofValidator,
) -> Result<Option<BeeProofSummary>, BlockProofError> {
    let params = hive.params();
    if block.is_hive_mined(params) {
        return Ok(Some(hive.check_hive_proof(index, block)?));
    }
    let prev_hash = block.header.prev_block_hash;
    let parent = index.get(&prev_hash).ok_or(BlockProofError::UnknownParent(prev_hash))?;
    let height = index.node(parent).height + 1;
    validate_proof_of_work(&block.header, height, engine, params)?;
    Ok(None)
}
