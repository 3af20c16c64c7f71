//! Contextual header checks.

use consensus_core::header::BlockHeader;
use consensus_core::ConsensusParams;

use super::pow::PowError;
use crate::consensus::chain::{BlockIndex, NodeId};
use crate::consensus::difficulty::{DifficultyManager, ProofPath};

/// Checks that the bits claimed by `header`, extending `parent`, equal the retarget for its path.
pub fn check_header_target(
    index: &BlockIndex,
    parent: NodeId,
    header: &BlockHeader,
    params: &ConsensusParams,
) -> Result<(), PowError> {
    let path = if header.is_hive_mined(params) { ProofPath::Hive } else { ProofPath::Pow };
    let expected = DifficultyManager::new(params).next_required_target(index, parent, path, i64::from(header.time));
    if header.bits != expected {
        return Err(PowError::BadDifficultyBits { expected, found: header.bits });
    }
    Ok(())
}
