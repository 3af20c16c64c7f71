//! Dark Gravity Wave retarget for PoW blocks after the last scrypt block.
//!
//! Averages the targets of the last 24 PoW blocks and rescales by how long they took. Bee-mined
//! blocks are skipped; they never carry a PoW target.

use consensus_core::ConsensusParams;
use consensus_core::U256;
use hive_math::{bits_from_target, target_from_bits, wrapping_add, wrapping_mul};

use crate::consensus::chain::{BlockIndex, BlockIndexNode, NodeId};
use crate::consensus::work::hive_1_1_after;

/// PoW blocks averaged by each retarget.
pub const PAST_BLOCKS: u32 = 24;

/// Multiple of the spacing after which a testnet block may use the minimum difficulty.
const MIN_DIFFICULTY_GAP_SPACINGS: i64 = 10;

fn parent<'a>(index: &'a BlockIndex, node: &BlockIndexNode) -> &'a BlockIndexNode {
    let parent = node.parent.unwrap_or_else(|| panic!("block {} at height {} has no parent", node.hash, node.height));
    index.node(parent)
}

fn skip_hive_blocks<'a>(index: &'a BlockIndex, mut node: &'a BlockIndexNode, params: &ConsensusParams) -> &'a BlockIndexNode {
    while node.is_hive_mined(params) {
        node = parent(index, node);
    }
    node
}

/// Required bits for the PoW block after `last`, which will be timestamped `candidate_time`.
pub fn dark_gravity_wave(index: &BlockIndex, last: NodeId, candidate_time: i64, params: &ConsensusParams) -> u32 {
    let pow_limit = params.pow_limit_sha;
    let pow_limit_bits = bits_from_target(&pow_limit);
    let mut last_node = index.node(last);

    if params.pow_allow_min_difficulty_blocks
        && candidate_time > i64::from(last_node.time()) + params.pow_target_spacing * MIN_DIFFICULTY_GAP_SPACINGS
    {
        return pow_limit_bits;
    }

    if hive_1_1_after(last_node, params) {
        last_node = skip_hive_blocks(index, last_node, params);
    }

    // Need PAST_BLOCKS blocks since the fork before averaging.
    if i64::from(last_node.height) - i64::from(params.last_scrypt_block) < i64::from(PAST_BLOCKS) {
        return pow_limit_bits;
    }

    let mut cursor = last_node;
    let mut past_target_avg = U256::zero();
    for count in 1..=PAST_BLOCKS {
        cursor = skip_hive_blocks(index, cursor, params);
        let target = target_from_bits(cursor.bits());
        past_target_avg = if count == 1 {
            target
        } else {
            // Weighted towards the older average; kept bit-exact.
            wrapping_add(wrapping_mul(past_target_avg, U256::from(count)), target) / U256::from(count + 1)
        };
        if count != PAST_BLOCKS {
            cursor = parent(index, cursor);
        }
    }

    let target_timespan = i64::from(PAST_BLOCKS) * params.pow_target_spacing;
    let actual_timespan =
        (i64::from(last_node.time()) - i64::from(cursor.time())).clamp(target_timespan / 3, target_timespan * 3);

    let mut target = wrapping_mul(past_target_avg, U256::from(actual_timespan as u64));
    target /= U256::from(target_timespan as u64);
    if target > pow_limit {
        target = pow_limit;
    }
    tracing::debug!(height = last_node.height, actual_timespan, "dgw retarget to {:x}", target);
    bits_from_target(&target)
}
