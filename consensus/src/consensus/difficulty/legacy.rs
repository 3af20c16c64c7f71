//! Fixed-window retarget used up to the last scrypt block.

use consensus_core::ConsensusParams;
use consensus_core::U256;
use hive_math::{bits_from_target, target_from_bits, wrapping_mul};

use crate::consensus::chain::{BlockIndex, BlockIndexNode, NodeId};

/// Required bits for the PoW block after `last`, which will be timestamped `candidate_time`.
pub fn next_work_required(index: &BlockIndex, last: NodeId, candidate_time: i64, params: &ConsensusParams) -> u32 {
    let last_node = index.node(last);
    let pow_limit_bits = bits_from_target(&params.pow_limit);
    let interval = params.difficulty_adjustment_interval();
    let height = i64::from(last_node.height);

    // Only change once per difficulty adjustment interval
    if (height + 1) % interval != 0 {
        if params.pow_allow_min_difficulty_blocks {
            // A block arriving more than two spacings late may use the minimum difficulty.
            if candidate_time > i64::from(last_node.time()) + params.pow_target_spacing * 2 {
                return pow_limit_bits;
            }
            // Otherwise return the last block that did not use the minimum difficulty rule.
            let mut cursor = last_node;
            while let Some(parent) = cursor.parent {
                if i64::from(cursor.height) % interval == 0 || cursor.bits() != pow_limit_bits {
                    break;
                }
                cursor = index.node(parent);
            }
            return cursor.bits();
        }
        return last_node.bits();
    }

    // Go back the full period unless this is the first retarget after genesis.
    let blocks_to_go_back = if height + 1 != interval { interval } else { interval - 1 };
    let first = u32::try_from(height - blocks_to_go_back)
        .ok()
        .and_then(|first_height| index.ancestor(last, first_height))
        .unwrap_or_else(|| panic!("retarget window of block {} reaches below genesis", last_node.hash));

    calculate_next_work_required(last_node, i64::from(index.node(first).time()), params)
}

/// Rescales the target of `last` by the time the window took, within a factor of four.
pub fn calculate_next_work_required(last: &BlockIndexNode, first_block_time: i64, params: &ConsensusParams) -> u32 {
    if params.pow_no_retargeting {
        return last.bits();
    }

    let timespan = params.pow_target_timespan;
    let actual_timespan = (i64::from(last.time()) - first_block_time).clamp(timespan / 4, timespan * 4);

    let pow_limit = params.pow_limit;
    let mut target = target_from_bits(last.bits());
    // The intermediate product can overflow by one bit.
    let shift = target.bits() > pow_limit.bits().saturating_sub(1);
    if shift {
        target >>= 1;
    }
    target = wrapping_mul(target, U256::from(actual_timespan as u64));
    target /= U256::from(timespan as u64);
    if shift {
        target <<= 1;
    }

    if target > pow_limit {
        target = pow_limit;
    }
    tracing::debug!(height = last.height, actual_timespan, "legacy retarget to {:x}", target);
    bits_from_target(&target)
}
