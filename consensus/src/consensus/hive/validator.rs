//! Bee proof validation.
//!
//! A bee-mined block carries no proof of work. Its coinbase proves that the holder of a honey
//! address owned a bee, bought by a bee creation transaction, whose hash meets the bee target at
//! the parent block. The checks run in a fixed order and the first failure rejects the block.

use std::sync::Arc;

use consensus_core::block::Block;
use consensus_core::script::{KeyId, Script};
use consensus_core::subsidy::bee_cost;
use consensus_core::tx::{Transaction, TransactionOutpoint};
use consensus_core::{ConsensusParams, Hash};
use hive_hashes::{bee_signature_message, BeeHashBuilder};
use hive_math::target_from_bits;
use secp256k1::{Secp256k1, VerifyOnly};

use super::errors::HiveProofError;
use super::proof::BeeProof;
use super::rand::deterministic_rand_string;
use super::signature::recover_key_id;
use crate::consensus::chain::{BlockIndex, NodeId};
use crate::consensus::difficulty::DifficultyManager;
use crate::consensus::storage::{BlockSource, Coin, CoinView, StorageError};
use crate::consensus::validation::hash_to_u256;
use crate::consensus::work::hive_1_1_after;

/// What a valid bee proof established.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BeeProofSummary {
    pub height: u32,
    pub nonce: u32,
    pub txid: Hash,
    pub bct_height: u32,
    pub bee_count: i64,
    pub honey_key_id: KeyId,
    /// The bee creation transaction was read from a block body instead of the coin view.
    pub deep_drill: bool,
}

struct Funding {
    value: i64,
    script: Script,
    height: u32,
    deep_drill: bool,
}

pub struct HiveProofValidator {
    params: Arc<ConsensusParams>,
    blocks: Arc<dyn BlockSource>,
    coins: Option<Arc<dyn CoinView>>,
    secp: Secp256k1<VerifyOnly>,
}

impl HiveProofValidator {
    pub fn new(params: Arc<ConsensusParams>, blocks: Arc<dyn BlockSource>) -> Self {
        Self { params, blocks, coins: None, secp: Secp256k1::verification_only() }
    }

    /// Looks bee creation transactions up in `coins` first, falling back to block bodies.
    pub fn with_coin_view(mut self, coins: Arc<dyn CoinView>) -> Self {
        self.coins = Some(coins);
        self
    }

    pub fn params(&self) -> &ConsensusParams {
        &self.params
    }

    /// Validates the bee proof of `block`, whose parent must be in `index`.
    pub fn check_hive_proof(&self, index: &BlockIndex, block: &Block) -> Result<BeeProofSummary, HiveProofError> {
        let result = self.check(index, block);
        match &result {
            Ok(summary) => tracing::debug!(
                height = summary.height,
                deep_drill = summary.deep_drill,
                "bee proof of {} passed",
                block.hash()
            ),
            Err(err) => tracing::debug!(reason = err.reject_reason(), "bee proof of {} rejected: {}", block.hash(), err),
        }
        result
    }

    fn check(&self, index: &BlockIndex, block: &Block) -> Result<BeeProofSummary, HiveProofError> {
        let params = &*self.params;
        let prev_hash = block.header.prev_block_hash;
        let parent_id = index.get(&prev_hash).ok_or(HiveProofError::UnknownParent(prev_hash))?;
        let parent = index.node(parent_id);
        let height = parent.height + 1;

        if !params.is_hive_active(height) {
            return Err(HiveProofError::HiveNotActive(height));
        }

        if hive_1_1_after(parent, params) {
            let count = bee_blocks_at_tip(index, parent_id, params);
            if count >= params.max_consecutive_hive_blocks {
                return Err(HiveProofError::TooManyConsecutiveBeeBlocks {
                    count,
                    max: params.max_consecutive_hive_blocks,
                });
            }
        } else if parent.is_hive_mined(params) {
            return Err(HiveProofError::ConsecutiveBeeBlock);
        }

        if block.transactions.iter().skip(1).any(|tx| tx.is_bee_creation(&params.bee_creation_script)) {
            return Err(HiveProofError::ContainsBeeCreation);
        }

        let coinbase = block.coinbase().filter(|tx| tx.is_coinbase()).ok_or(HiveProofError::BadCoinbase)?;
        let outputs = coinbase.outputs.len();
        if !(2..=3).contains(&outputs) {
            return Err(HiveProofError::CoinbaseOutputCount(outputs));
        }

        let proof = BeeProof::decode(&coinbase.outputs[0].script_public_key)?;
        let txid = proof.txid();

        let det_rand = deterministic_rand_string(index, parent_id);
        let target = target_from_bits(DifficultyManager::new(params).next_hive_work_required(index, parent_id));
        let bee_hash = BeeHashBuilder::new(&det_rand, &proof.txid_hex).finalize_with_nonce(proof.nonce);
        if hash_to_u256(&bee_hash) >= target {
            return Err(HiveProofError::BeeHashAboveTarget(bee_hash));
        }

        let honey_key_id =
            coinbase.outputs[1].script_public_key.p2pkh_key_id().ok_or(HiveProofError::BadHoneyAddress)?;
        let message = bee_signature_message(&det_rand);
        let signer = recover_key_id(&self.secp, &message, &proof.signature).ok_or(HiveProofError::BadSignature)?;
        if signer != honey_key_id {
            return Err(HiveProofError::SignatureMismatch);
        }

        let funding = self.locate_bee_creation(index, parent_id, &proof, txid)?;

        if funding.height != proof.claimed_height {
            return Err(HiveProofError::HeightMismatch { claimed: proof.claimed_height, found: funding.height });
        }

        let depth = i64::from(height) - i64::from(funding.height);
        if depth < i64::from(params.bee_gestation_blocks) {
            return Err(HiveProofError::Immature(depth));
        }
        if depth > i64::from(params.total_bee_lifespan()) {
            return Err(HiveProofError::Expired(depth));
        }

        let honey_script =
            funding.script.bee_creation_honey_script(&params.bee_creation_script).ok_or(HiveProofError::NotBeeCreation)?;
        if honey_script.p2pkh_key_id() != Some(honey_key_id) {
            return Err(HiveProofError::HoneyAddressMismatch);
        }

        let cost = bee_cost(funding.height, params);
        if funding.value < params.min_bee_cost {
            return Err(HiveProofError::BelowMinBeeCost(funding.value));
        }
        if funding.value < cost {
            return Err(HiveProofError::BelowBeeCost { value: funding.value, bee_cost: cost });
        }
        let bee_count = funding.value / cost;
        if i64::from(proof.nonce) >= bee_count {
            return Err(HiveProofError::NonceOutOfRange { nonce: proof.nonce, bee_count });
        }

        Ok(BeeProofSummary {
            height,
            nonce: proof.nonce,
            txid,
            bct_height: funding.height,
            bee_count,
            honey_key_id,
            deep_drill: funding.deep_drill,
        })
    }

    /// Finds output 0 of the bee creation transaction and adds a valid community contribution to its value.
    fn locate_bee_creation(
        &self,
        index: &BlockIndex,
        parent: NodeId,
        proof: &BeeProof,
        txid: Hash,
    ) -> Result<Funding, HiveProofError> {
        let params = &*self.params;
        let mut bct: Option<Transaction> = None;

        let mut funding = match self.coin(TransactionOutpoint::new(txid, 0)) {
            Some(coin) => Funding {
                value: coin.output.value,
                script: coin.output.script_public_key,
                height: coin.height,
                deep_drill: false,
            },
            None => {
                tracing::debug!("using deep drill for bee creation transaction {}", txid);
                let (tx, height) = self.deep_drill(index, parent, txid, proof.claimed_height)?;
                let output = tx.outputs.first().ok_or(HiveProofError::NotBeeCreation)?;
                let funding =
                    Funding { value: output.value, script: output.script_public_key.clone(), height, deep_drill: true };
                bct = Some(tx);
                funding
            }
        };

        if proof.community_contrib {
            let mut donation = 0;
            if bct.is_none() {
                match self.coin(TransactionOutpoint::new(txid, 1)) {
                    Some(coin) => {
                        if coin.output.script_public_key != params.community_script {
                            return Err(HiveProofError::MissingCommunityContribution);
                        }
                        donation = coin.output.value;
                    }
                    None => {
                        tracing::debug!("using deep drill for community contribution of {}", txid);
                        let (tx, _) = self.deep_drill(index, parent, txid, proof.claimed_height)?;
                        funding.deep_drill = true;
                        bct = Some(tx);
                    }
                }
            }
            if let Some(tx) = &bct {
                let output = tx
                    .outputs
                    .get(1)
                    .filter(|output| output.script_public_key == params.community_script)
                    .ok_or(HiveProofError::MissingCommunityContribution)?;
                donation = output.value;
            }

            let expected = (funding.value + donation) / params.community_contrib_factor;
            if donation != expected {
                return Err(HiveProofError::BadCommunityContribution { expected, found: donation });
            }
            funding.value += donation;
        }

        Ok(funding)
    }

    /// Coin view lookup. Lookup errors are treated as misses so that block bodies are tried next.
    fn coin(&self, outpoint: TransactionOutpoint) -> Option<Coin> {
        let coins = self.coins.as_ref()?;
        match coins.coin(&outpoint) {
            Ok(coin) => coin,
            Err(err) => {
                tracing::debug!("coin view lookup of {:?} failed: {}", outpoint, err);
                None
            }
        }
    }

    /// Reads the block at `height` on the branch of `parent` and finds `txid` in it.
    fn deep_drill(
        &self,
        index: &BlockIndex,
        parent: NodeId,
        txid: Hash,
        height: u32,
    ) -> Result<(Transaction, u32), HiveProofError> {
        let at = index.ancestor(parent, height).ok_or(HiveProofError::BeeCreationNotFound(txid))?;
        let node = index.node(at);
        let block = match self.blocks.read_block(&node.hash) {
            Ok(Some(block)) => block,
            Ok(None) => {
                return Err(HiveProofError::BeeCreationUnavailable { txid, source: StorageError::NotFound(node.hash) })
            }
            Err(source) => return Err(HiveProofError::BeeCreationUnavailable { txid, source }),
        };
        let tx = block.transaction(&txid).cloned().ok_or(HiveProofError::BeeCreationNotFound(txid))?;
        Ok((tx, node.height))
    }
}

/// Number of consecutive bee-mined blocks ending at `tip`.
pub fn bee_blocks_at_tip(index: &BlockIndex, tip: NodeId, params: &ConsensusParams) -> u32 {
    let mut count = 0;
    let mut cursor = Some(tip);
    while let Some(id) = cursor {
        let node = index.node(id);
        if !node.is_hive_mined(params) {
            break;
        }
        count += 1;
        cursor = node.parent;
    }
    count
}
