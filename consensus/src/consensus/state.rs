//! The chain state: block index plus active chain, behind one lock.
//!
//! Validators read through a shared guard. Only chain selection takes the write guard, so a
//! reader never sees a half-updated tip.

use std::sync::Arc;

use consensus_core::header::BlockHeader;
use consensus_core::{ConsensusParams, Hash, U256};
use parking_lot::RwLock;

use super::chain::{ActiveChain, BlockIndex, BlockIndexNode, IndexError, NodeId};
use super::difficulty::{DifficultyManager, ProofPath};

pub type SharedChainState = Arc<RwLock<ChainState>>;

pub struct ChainState {
    index: BlockIndex,
    active: ActiveChain,
    params: Arc<ConsensusParams>,
}

impl ChainState {
    /// A chain holding only `genesis`, which becomes the tip.
    pub fn new(genesis: BlockHeader, params: Arc<ConsensusParams>) -> Self {
        let mut index = BlockIndex::new();
        let id = index
            .insert_header(genesis, &params)
            .unwrap_or_else(|e| panic!("genesis header rejected by an empty index: {}", e));
        let mut active = ActiveChain::new();
        active.set_tip(&index, Some(id));
        Self { index, active, params }
    }

    pub fn into_shared(self) -> SharedChainState {
        Arc::new(RwLock::new(self))
    }

    pub fn index(&self) -> &BlockIndex {
        &self.index
    }

    pub fn active(&self) -> &ActiveChain {
        &self.active
    }

    pub fn params(&self) -> &ConsensusParams {
        &self.params
    }

    pub fn tip(&self) -> NodeId {
        self.active.tip().unwrap_or_else(|| panic!("active chain lost its genesis"))
    }

    pub fn tip_node(&self) -> &BlockIndexNode {
        self.index.node(self.tip())
    }

    pub fn height(&self) -> u32 {
        self.tip_node().height
    }

    pub fn node_by_hash(&self, hash: &Hash) -> Option<&BlockIndexNode> {
        self.index.get(hash).map(|id| self.index.node(id))
    }

    /// Cumulative work of the chain ending at `hash`.
    pub fn chain_work(&self, hash: &Hash) -> Option<U256> {
        self.node_by_hash(hash).map(|node| node.chain_work)
    }

    pub fn last_common_ancestor(&self, a: &Hash, b: &Hash) -> Option<Hash> {
        let a = self.index.get(a)?;
        let b = self.index.get(b)?;
        Some(self.index.node(self.index.last_common_ancestor(a, b)).hash)
    }

    /// Locator starting at `from`, or at the tip when `from` is `None`.
    pub fn build_locator(&self, from: Option<&Hash>) -> Vec<Hash> {
        let start = match from {
            Some(hash) => match self.index.get(hash) {
                Some(id) => Some(id),
                None => return Vec::new(),
            },
            None => self.active.tip(),
        };
        self.active.locator(&self.index, start)
    }

    /// Compact target the next block on `path` must carry.
    pub fn next_required_target(&self, path: ProofPath, candidate_time: i64) -> u32 {
        DifficultyManager::new(&self.params).next_required_target(&self.index, self.tip(), path, candidate_time)
    }

    pub fn accept_header(&mut self, header: BlockHeader) -> Result<NodeId, IndexError> {
        self.index.insert_header(header, &self.params)
    }

    pub fn set_has_data(&mut self, id: NodeId) {
        self.index.set_has_data(id, true);
    }

    /// Makes `candidate` the tip if its chain has more work. Returns true when the tip changed.
    pub fn select_best_tip(&mut self, candidate: NodeId) -> bool {
        let node = self.index.node(candidate);
        if !node.has_data || node.chain_work <= self.tip_node().chain_work {
            return false;
        }
        let fork = self.active.find_fork(&self.index, candidate);
        tracing::debug!(
            height = node.height,
            reorg_depth = fork.map(|f| self.height() - self.index.node(f).height).unwrap_or(0),
            "new tip {}",
            node.hash
        );
        self.active.set_tip(&self.index, Some(candidate));
        true
    }
}
