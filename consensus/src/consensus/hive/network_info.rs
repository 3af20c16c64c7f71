//! Network bee population report.
//!
//! Walks one bee lifetime back from the tip and totals the bees bought by every bee creation
//! transaction found. For display only; nothing here is consensus critical.

use consensus_core::block::Block;
use consensus_core::subsidy::{bee_cost, block_subsidy};
use consensus_core::{ConsensusParams, Hash};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consensus::chain::{ActiveChain, BlockIndex};
use crate::consensus::storage::{BlockSource, StorageError};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HiveInfoError {
    #[error("active chain is empty")]
    NoTip,

    #[error("block {0} data is not available")]
    BlockUnavailable(Hash),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Expected bee population at one future height.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeePopGraphPoint {
    pub height: u32,
    pub immature: i64,
    pub mature: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkHiveInfo {
    pub immature_bees: i64,
    pub immature_bcts: u32,
    pub mature_bees: i64,
    pub mature_bcts: u32,
    /// Rewards a bee could earn over its lifespan at the current subsidy and bee block rate.
    pub potential_lifespan_rewards: i64,
    /// Population per height from the tip, one bee lifetime ahead.
    pub graph: Option<Vec<BeePopGraphPoint>>,
}

/// Bee fee paid by `tx` including a valid community contribution, or `None` for anything that
/// is not a bee creation transaction with a well-formed contribution.
fn bee_fee_paid(tx: &consensus_core::tx::Transaction, params: &ConsensusParams) -> Option<i64> {
    let (mut fee, _) = tx.bee_creation(&params.bee_creation_script)?;
    if let Some(donation) = tx.outputs.get(1).filter(|out| out.script_public_key == params.community_script) {
        let expected = (fee + donation.value) / params.community_contrib_factor;
        if donation.value != expected {
            return None;
        }
        fee += donation.value;
    }
    Some(fee)
}

fn read_block(blocks: &dyn BlockSource, hash: &Hash) -> Result<Block, HiveInfoError> {
    blocks.read_block(hash)?.ok_or(HiveInfoError::BlockUnavailable(*hash))
}

/// Builds the bee population report for the active chain.
pub fn network_hive_info(
    index: &BlockIndex,
    active: &ActiveChain,
    blocks: &dyn BlockSource,
    params: &ConsensusParams,
    with_graph: bool,
) -> Result<NetworkHiveInfo, HiveInfoError> {
    let tip_id = active.tip().ok_or(HiveInfoError::NoTip)?;
    let tip = index.node(tip_id);
    let tip_height = tip.height;
    let total_lifespan = params.total_bee_lifespan();

    let spacing = if params.is_hive_1_1_active(tip_height + 1) {
        params.hive_block_spacing_target_typical_1_1
    } else {
        params.hive_block_spacing_target_typical
    };
    let mut info = NetworkHiveInfo {
        potential_lifespan_rewards: i64::from(params.bee_lifespan_blocks) * block_subsidy(tip_height, params) / spacing,
        ..Default::default()
    };
    let mut graph: Vec<BeePopGraphPoint> = if with_graph {
        (0..total_lifespan).map(|i| BeePopGraphPoint { height: tip_height + i, ..Default::default() }).collect()
    } else {
        Vec::new()
    };

    let mut cursor = tip;
    for i in 0..total_lifespan {
        if !cursor.has_data {
            tracing::debug!("block {} not available, can't count network bees", cursor.hash);
            return Err(HiveInfoError::BlockUnavailable(cursor.hash));
        }

        // Bee-mined blocks never contain bee creation transactions.
        if !cursor.is_hive_mined(params) {
            let block = read_block(blocks, &cursor.hash)?;
            let born = cursor.height;
            let cost = bee_cost(born, params);
            for fee in block.transactions.iter().filter_map(|tx| bee_fee_paid(tx, params)) {
                let count = fee / cost;
                if i < params.bee_gestation_blocks {
                    info.immature_bees += count;
                    info.immature_bcts += 1;
                } else {
                    info.mature_bees += count;
                    info.mature_bcts += 1;
                }

                if with_graph {
                    let matures = born + params.bee_gestation_blocks;
                    let dies = matures + params.bee_lifespan_blocks;
                    for j in born..dies {
                        let pos = i64::from(j) - i64::from(tip_height);
                        if pos > 0 && pos < i64::from(total_lifespan) {
                            let point = &mut graph[pos as usize];
                            if j < matures {
                                point.immature += count;
                            } else {
                                point.mature += count;
                            }
                        }
                    }
                }
            }
        }

        match cursor.parent {
            Some(parent) => cursor = index.node(parent),
            None => break,
        }
    }

    if with_graph {
        info.graph = Some(graph);
    }
    Ok(info)
}
