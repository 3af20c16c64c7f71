//! Block processor for consensus
//!
//! Runs the checks a full block must pass before it can extend the chain:
//! 1. parent known, merkle root matches the transactions
//! 2. claimed bits equal the retarget for the block's path
//! 3. bee proof or proof of work
//!
//! Accepted blocks are stored, indexed and offered to chain selection.

use std::sync::Arc;

use consensus_core::block::Block;
use consensus_core::{ConsensusParams, Hash};
use consensus_pow::PowEngine;
use thiserror::Error;

use crate::consensus::hive::{network_hive_info, HiveInfoError, HiveProofValidator, NetworkHiveInfo};
use crate::consensus::state::{ChainState, SharedChainState};
use crate::consensus::storage::{BlockSource, BlockStore, CoinView, StorageError};
use crate::consensus::types::BlockProcessingResult;
use crate::consensus::validation::{check_header_target, validate_block_proof};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BlockProcessError {
    #[error("failed to store block {hash}: {source}")]
    Storage { hash: Hash, source: StorageError },
}

/// Block processor for consensus
pub struct BlockProcessor {
    params: Arc<ConsensusParams>,
    state: SharedChainState,
    store: Arc<dyn BlockStore>,
    blocks: Arc<dyn BlockSource>,
    engine: PowEngine,
    hive: HiveProofValidator,
}

impl BlockProcessor {
    /// Create a block processor over a chain holding only `genesis`.
    pub fn new<S: BlockStore + 'static>(
        params: Arc<ConsensusParams>,
        genesis: Block,
        store: Arc<S>,
        engine: PowEngine,
    ) -> Result<Self, BlockProcessError> {
        let hash = genesis.hash();
        let mut state = ChainState::new(genesis.header, params.clone());
        store.store_block(genesis).map_err(|source| BlockProcessError::Storage { hash, source })?;
        let tip = state.tip();
        state.set_has_data(tip);

        let blocks: Arc<dyn BlockSource> = store.clone();
        let hive = HiveProofValidator::new(params.clone(), blocks.clone());
        Ok(Self { params, state: state.into_shared(), store, blocks, engine, hive })
    }

    /// Look bee creation transactions up in `coins` before falling back to stored blocks.
    pub fn with_coin_view(mut self, coins: Arc<dyn CoinView>) -> Self {
        self.hive = self.hive.with_coin_view(coins);
        self
    }

    pub fn state(&self) -> SharedChainState {
        self.state.clone()
    }

    pub fn params(&self) -> &ConsensusParams {
        &self.params
    }

    /// Process a complete block
    pub fn process_block(&self, block: Block) -> Result<BlockProcessingResult, BlockProcessError> {
        let hash = block.hash();

        {
            let state = self.state.read();
            let index = state.index();

            if state.node_by_hash(&hash).map_or(false, |node| node.has_data) {
                return Ok(BlockProcessingResult::already_known(hash));
            }
            let Some(parent) = index.get(&block.header.prev_block_hash) else {
                tracing::debug!("block {} has unknown parent {}", hash, block.header.prev_block_hash);
                return Ok(BlockProcessingResult::orphan(hash));
            };

            if block.header.merkle_root != block.calculate_merkle_root() {
                return Ok(BlockProcessingResult::invalid(hash, "bad-txnmrklroot", "merkle root mismatch".to_string()));
            }
            if let Err(err) = check_header_target(index, parent, &block.header, &self.params) {
                tracing::debug!("block {} rejected: {}", hash, err);
                return Ok(BlockProcessingResult::invalid(hash, err.reject_reason(), err.to_string()));
            }
            if let Err(err) = validate_block_proof(index, &block, &self.engine, &self.hive) {
                tracing::debug!("block {} rejected: {}", hash, err);
                return Ok(BlockProcessingResult::invalid(hash, err.reject_reason(), err.to_string()));
            }
        }

        let header = block.header;
        self.store.store_block(block).map_err(|source| BlockProcessError::Storage { hash, source })?;

        let mut state = self.state.write();
        let id = match state.accept_header(header) {
            Ok(id) => id,
            // The parent was seen under the read guard and the index never forgets nodes.
            Err(err) => return Ok(BlockProcessingResult::invalid(hash, "bad-index", err.to_string())),
        };
        state.set_has_data(id);
        let tip_changed = state.select_best_tip(id);
        let height = state.index().node(id).height;
        Ok(BlockProcessingResult::valid(hash, height, tip_changed))
    }

    /// Bee population report over the active chain.
    pub fn network_hive_info(&self, with_graph: bool) -> Result<NetworkHiveInfo, HiveInfoError> {
        let state = self.state.read();
        network_hive_info(state.index(), state.active(), self.blocks.as_ref(), &self.params, with_graph)
    }
}
