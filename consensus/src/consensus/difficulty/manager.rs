//! Difficulty manager for consensus
//!
//! Selects the retarget algorithm for the block after a given tip.

use std::fmt;

use consensus_core::ConsensusParams;

use super::{dgw, hive, legacy};
use crate::consensus::chain::{BlockIndex, NodeId};
use crate::consensus::work::hive_1_1_after;

/// The two ways a block can be proven.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProofPath {
    /// Hash-based proof of work
    Pow,
    /// Bee proof, tagged by the hive nonce marker
    Hive,
}

impl fmt::Display for ProofPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProofPath::Pow => f.write_str("pow"),
            ProofPath::Hive => f.write_str("hive"),
        }
    }
}

/// Difficulty manager for consensus
pub struct DifficultyManager<'a> {
    params: &'a ConsensusParams,
}

impl<'a> DifficultyManager<'a> {
    pub fn new(params: &'a ConsensusParams) -> Self {
        Self { params }
    }

    /// Required bits of a PoW block extending `last` with timestamp `candidate_time`.
    pub fn next_work_required(&self, index: &BlockIndex, last: NodeId, candidate_time: i64) -> u32 {
        if index.node(last).height >= self.params.last_scrypt_block {
            dgw::dark_gravity_wave(index, last, candidate_time, self.params)
        } else {
            legacy::next_work_required(index, last, candidate_time, self.params)
        }
    }

    /// Required bee hash target of a bee-mined block extending `last`.
    pub fn next_hive_work_required(&self, index: &BlockIndex, last: NodeId) -> u32 {
        if hive_1_1_after(index.node(last), self.params) {
            hive::hive_target_sma(index, last, self.params)
        } else {
            hive::hive_target_ema(index, last, self.params)
        }
    }

    /// Required bits of the next block on `path`. `candidate_time` only matters for PoW blocks.
    pub fn next_required_target(&self, index: &BlockIndex, tip: NodeId, path: ProofPath, candidate_time: i64) -> u32 {
        match path {
            ProofPath::Pow => self.next_work_required(index, tip, candidate_time),
            ProofPath::Hive => self.next_hive_work_required(index, tip),
        }
    }
}
