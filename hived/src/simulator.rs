//! Regtest chain simulator
//!
//! Grows a chain from a fresh genesis through [`BlockProcessor`], buying bees with a bee creation
//! transaction and mining a bee block with [`BeeMiner`] whenever a mature bee is available and the
//! consecutive bee block limit allows it. PoW blocks are ground on the spot, so runs are limited to
//! the legacy retarget era where the regtest target is trivial.

use std::sync::Arc;

use consensus::consensus::hive::signature::key_id;
use consensus::{
    check_proof_of_work, deterministic_rand_string, BlockProcessError, BlockProcessingResult, BlockProcessor,
    HiveInfoError, MemoryBlockStore, NetworkHiveInfo, ProofPath,
};
use consensus_core::block::Block;
use consensus_core::header::BlockHeader;
use consensus_core::script::{KeyId, Script};
use consensus_core::subsidy::{bee_cost, block_subsidy};
use consensus_core::tx::{Transaction, TransactionInput, TransactionOutpoint, TransactionOutput};
use consensus_core::{ConsensusParams, Hash};
use consensus_pow::PowEngine;
use hive_math::target_from_bits;
use mining::{bee_coinbase, build_bee_proof_script, BeeCreation, BeeMiner, BeeMiningConfig, BeeSearch, TipSource};
use secp256k1::{All, PublicKey, Secp256k1, SecretKey};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

pub const GENESIS_TIME: u32 = 1_600_000_000;
const PRIMARY_POW_VERSION: i32 = 0x2000_0000;
const HONEY_SEED: [u8; 32] = [0x42; 32];

#[derive(Error, Debug)]
pub enum SimulationError {
    #[error("simulation of {requested} blocks runs past the last legacy retarget block {limit}")]
    TooManyBlocks { requested: u32, limit: u32 },

    #[error("no nonce below the target for block on {0}")]
    NonceSpaceExhausted(Hash),

    #[error("block {hash} rejected: {reason}")]
    Rejected { hash: Hash, reason: String },

    #[error(transparent)]
    Process(#[from] BlockProcessError),

    #[error(transparent)]
    HiveInfo(#[from] HiveInfoError),

    #[error(transparent)]
    Key(#[from] secp256k1::Error),
}

/// What a simulation run should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationPlan {
    pub blocks: u32,
    pub bees: u32,
    pub graph: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationReport {
    pub height: u32,
    pub tip: String,
    pub pow_blocks: u32,
    pub bee_blocks: u32,
    pub missed_bee_searches: u32,
    pub hive: NetworkHiveInfo,
}

pub struct Simulator {
    params: Arc<ConsensusParams>,
    processor: BlockProcessor,
    secp: Secp256k1<All>,
    honey_key: SecretKey,
    honey: Script,
    miner: BeeMiner,
    bcts: Vec<BeeCreation>,
    funding: u32,
}

impl Simulator {
    /// Creates a simulator over a regtest chain holding only genesis.
    pub fn new(bee_mining: BeeMiningConfig) -> Result<Self, SimulationError> {
        let params = Arc::new(ConsensusParams::regtest());
        let mut genesis = Block::new(
            BlockHeader { version: 1, time: GENESIS_TIME, bits: 0x207f_ffff, ..Default::default() },
            vec![coinbase(0, vec![TransactionOutput::new(0, Script::new(vec![0x51]))])],
        );
        genesis.header.merkle_root = genesis.calculate_merkle_root();
        let processor =
            BlockProcessor::new(params.clone(), genesis, Arc::new(MemoryBlockStore::new()), PowEngine::new())?;

        let secp = Secp256k1::new();
        let honey_key = SecretKey::from_slice(&HONEY_SEED)?;
        let honey = Script::p2pkh(&key_id(&PublicKey::from_secret_key(&secp, &honey_key), true));
        Ok(Self {
            params,
            processor,
            secp,
            honey_key,
            honey,
            miner: BeeMiner::new(bee_mining),
            bcts: Vec::new(),
            funding: 0,
        })
    }

    pub fn params(&self) -> &ConsensusParams {
        &self.params
    }

    pub fn miner(&self) -> &BeeMiner {
        &self.miner
    }

    pub fn height(&self) -> u32 {
        self.processor.state().read().height()
    }

    /// Runs `plan` and reports the resulting chain.
    pub fn run(&mut self, plan: &SimulationPlan) -> Result<SimulationReport, SimulationError> {
        let limit = self.params.last_scrypt_block;
        let target_height = self.height().saturating_add(plan.blocks);
        if target_height >= limit {
            return Err(SimulationError::TooManyBlocks { requested: plan.blocks, limit });
        }

        let (mut pow_blocks, mut bee_blocks, mut missed) = (0, 0, 0);
        while self.height() < target_height {
            let next = self.height() + 1;
            if next == 2 && plan.bees > 0 {
                self.mine_pow(Some(plan.bees))?;
                pow_blocks += 1;
                continue;
            }
            if self.can_mine_bee_block() {
                if self.mine_bee()?.is_some() {
                    bee_blocks += 1;
                    continue;
                }
                missed += 1;
            }
            self.mine_pow(None)?;
            pow_blocks += 1;
        }

        let state = self.processor.state();
        let (height, tip) = {
            let guard = state.read();
            (guard.height(), guard.tip_node().hash.to_hex())
        };
        let hive = self.processor.network_hive_info(plan.graph)?;
        info!("Simulated {} PoW and {} bee blocks up to height {}", pow_blocks, bee_blocks, height);
        Ok(SimulationReport { height, tip, pow_blocks, bee_blocks, missed_bee_searches: missed, hive })
    }

    /// Grinds and submits a PoW block, optionally buying `bees` bees in it.
    pub fn mine_pow(&mut self, bees: Option<u32>) -> Result<BlockProcessingResult, SimulationError> {
        let (prev, height, time, bits) = {
            let state = self.processor.state();
            let state = state.read();
            let tip = state.tip_node();
            let time = tip.time() + self.params.pow_target_spacing as u32;
            (tip.hash, tip.height + 1, time, state.next_required_target(ProofPath::Pow, i64::from(time)))
        };

        let reward = TransactionOutput::new(block_subsidy(height, &self.params), Script::p2pkh(&KeyId([0x11; 20])));
        let mut transactions = vec![coinbase(height, vec![reward])];
        if let Some(bees) = bees {
            let tx = self.bee_creation(i64::from(bees) * bee_cost(height, &self.params));
            self.bcts.push(BeeCreation {
                txid: tx.id(),
                height,
                honey_script: self.honey.clone(),
                community_contrib: false,
                bee_count: bees,
            });
            transactions.push(tx);
        }

        let mut block = Block::new(
            BlockHeader { version: PRIMARY_POW_VERSION, prev_block_hash: prev, time, bits, ..Default::default() },
            transactions,
        );
        block.header.merkle_root = block.calculate_merkle_root();
        block.header.nonce = self.grind(&block.header)?;
        self.submit(block)
    }

    /// Searches the mature bees and submits a bee block on success. `None` when no bee qualified
    /// or the search was aborted.
    pub fn mine_bee(&mut self) -> Result<Option<BlockProcessingResult>, SimulationError> {
        let state = self.processor.state();
        let (search, prev, time, bits) = {
            let guard = state.read();
            let tip = guard.tip_node();
            let bits = guard.next_required_target(ProofPath::Hive, 0);
            let search = BeeSearch {
                bcts: self.mature_bees(tip.height + 1),
                deterministic_rand: deterministic_rand_string(guard.index(), guard.tip()),
                target: target_from_bits(bits),
                tip_height: tip.height,
            };
            (search, tip.hash, tip.time() + self.params.pow_target_spacing as u32, bits)
        };

        let tip: Arc<dyn TipSource> = state;
        let Some(solution) = self.miner.search(&search, Some(tip)) else {
            return Ok(None);
        };
        debug!("Bee {} of {} qualifies at height {}", solution.nonce, solution.range.txid, search.tip_height + 1);

        let height = search.tip_height + 1;
        let script = build_bee_proof_script(&self.secp, &solution, &search.deterministic_rand, &self.honey_key);
        let coinbase = bee_coinbase(script, &solution, height, block_subsidy(height, &self.params));
        let mut block = Block::new(
            BlockHeader {
                version: PRIMARY_POW_VERSION,
                prev_block_hash: prev,
                time,
                bits,
                nonce: self.params.hive_nonce_marker,
                ..Default::default()
            },
            vec![coinbase],
        );
        block.header.merkle_root = block.calculate_merkle_root();
        self.submit(block).map(Some)
    }

    /// Bee creation transactions whose bees may mine the block at `height`.
    pub fn mature_bees(&self, height: u32) -> Vec<BeeCreation> {
        self.bcts
            .iter()
            .filter(|bct| {
                let depth = height.saturating_sub(bct.height);
                depth >= self.params.bee_gestation_blocks && depth <= self.params.total_bee_lifespan()
            })
            .cloned()
            .collect()
    }

    /// A bee block on the tip would have mature bees and not exceed the consecutive limit.
    pub fn can_mine_bee_block(&self) -> bool {
        let state = self.processor.state();
        let state = state.read();
        let next = state.height() + 1;
        if !self.params.is_hive_active(next) || self.mature_bees(next).is_empty() {
            return false;
        }
        let limit = self.params.max_consecutive_hive_blocks;
        let mut consecutive = 0;
        let mut cursor = Some(state.tip());
        while let Some(id) = cursor {
            let node = state.index().node(id);
            if !node.is_hive_mined(&self.params) {
                break;
            }
            consecutive += 1;
            cursor = node.parent;
        }
        consecutive < limit
    }

    fn bee_creation(&mut self, value: i64) -> Transaction {
        self.funding += 1;
        let mut funding = [0u8; 32];
        funding[..4].copy_from_slice(&self.funding.to_le_bytes());
        Transaction::new(
            1,
            vec![TransactionInput::new(TransactionOutpoint::new(Hash::from_bytes(funding), 0), Script::default(), u32::MAX)],
            vec![TransactionOutput::new(value, Script::bee_creation(&self.params.bee_creation_script, &self.honey))],
            0,
        )
    }

    fn grind(&self, header: &BlockHeader) -> Result<u32, SimulationError> {
        (0..=u32::MAX)
            .filter(|nonce| *nonce != self.params.hive_nonce_marker)
            .find(|nonce| {
                let candidate = BlockHeader { nonce: *nonce, ..*header };
                check_proof_of_work(&candidate.hash(), header.bits, &self.params).is_ok()
            })
            .ok_or(SimulationError::NonceSpaceExhausted(header.prev_block_hash))
    }

    fn submit(&self, block: Block) -> Result<BlockProcessingResult, SimulationError> {
        let result = self.processor.process_block(block)?;
        if !result.is_valid() {
            let reason = result.error.clone().or(result.reject_reason.map(str::to_string)).unwrap_or_default();
            return Err(SimulationError::Rejected { hash: result.hash, reason });
        }
        Ok(result)
    }
}

fn coinbase(height: u32, outputs: Vec<TransactionOutput>) -> Transaction {
    Transaction::new(
        1,
        vec![TransactionInput::new(TransactionOutpoint::null(), Script::new(height.to_le_bytes().to_vec()), u32::MAX)],
        outputs,
        0,
    )
}
