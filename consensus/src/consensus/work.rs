//! Chain work accounting
//!
//! A block's proof is the expected number of hashes needed to meet its target. Bee-mined blocks
//! also carry the proof of the PoW block they follow, and once Hive 1.1 is active both kinds of
//! block are weighted by an integer multiplier `k`.

use consensus_core::ConsensusParams;
use consensus_core::U256;
use hive_math::{difficulty_from_bits, wrapping_add, wrapping_mul, CompactTarget};

use super::chain::{BlockIndex, BlockIndexNode, NodeId};

/// Work represented by a compact target: `2^256 / (target + 1)`.
///
/// Negative, overflowing and zero targets carry no work.
pub fn block_work_from_bits(bits: u32) -> U256 {
    let target = CompactTarget::from_bits(bits);
    if !target.is_valid() {
        return U256::zero();
    }
    // 2^256 does not fit; (2^256 - target - 1) / (target + 1) + 1 is the same value.
    (!target.value / (target.value + U256::one())) + U256::one()
}

/// True when the Hive 1.1 rules apply to blocks following `node`.
pub(crate) fn hive_1_1_after(node: &BlockIndexNode, params: &ConsensusParams) -> bool {
    params.is_hive_1_1_active(node.height.saturating_add(1))
}

/// Work multiplier of a bee-mined block with bee target `bits`.
pub fn hive_block_multiplier(bits: u32, params: &ConsensusParams) -> u32 {
    let hive_difficulty = difficulty_from_bits(bits);
    let span = f64::from(params.max_k.saturating_sub(params.min_k));
    ((hive_difficulty / params.max_hive_diff).min(1.0) * span + f64::from(params.min_k)).floor() as u32
}

/// Work multiplier of a PoW block whose last bee-mined ancestor is `blocks_since_hive` blocks back
/// and had bee difficulty `last_hive_difficulty` (zero when none was found).
pub fn pow_block_multiplier(blocks_since_hive: u32, last_hive_difficulty: f64, params: &ConsensusParams) -> u32 {
    let mut k = params.max_k_pow.saturating_sub(blocks_since_hive);
    if last_hive_difficulty < params.pow_split_1 {
        k >>= 1;
    }
    if last_hive_difficulty < params.pow_split_2 {
        k >>= 1;
    }
    k.max(1)
}

/// Proof contributed to the chain by the block at `id`.
///
/// # Panics
///
/// Panics if a bee-mined block has no PoW ancestor.
pub fn block_proof(index: &BlockIndex, id: NodeId, params: &ConsensusParams) -> U256 {
    let node = index.node(id);
    let mut proof = block_work_from_bits(node.bits());
    if proof.is_zero() {
        return proof;
    }

    if node.is_hive_mined(params) {
        // Bee blocks also count the work of the most recent PoW block.
        let mut pow_ancestor = node;
        loop {
            let parent = pow_ancestor
                .parent
                .unwrap_or_else(|| panic!("bee-mined block {} has no PoW ancestor", node.hash));
            pow_ancestor = index.node(parent);
            if !pow_ancestor.is_hive_mined(params) {
                break;
            }
        }
        let previous_work = block_work_from_bits(pow_ancestor.bits());
        if previous_work.is_zero() {
            return U256::zero();
        }
        proof = wrapping_add(proof, previous_work);

        if hive_1_1_after(node, params) {
            let k = hive_block_multiplier(node.bits(), params);
            proof = wrapping_mul(proof, U256::from(k));
        }
    } else if hive_1_1_after(node, params) {
        let mut blocks_since_hive = 0;
        let mut last_hive_difficulty = 0.0;
        let mut cursor = node.parent;
        while blocks_since_hive < params.max_k_pow {
            // A walk reaching genesis counts as finding no bee block.
            let Some(current) = cursor else { break };
            let current = index.node(current);
            if current.is_hive_mined(params) {
                last_hive_difficulty = difficulty_from_bits(current.bits());
                break;
            }
            cursor = current.parent;
            blocks_since_hive += 1;
        }
        let k = pow_block_multiplier(blocks_since_hive, last_hive_difficulty, params);
        proof = wrapping_mul(proof, U256::from(k));
    }
    proof
}

/// Time in seconds the chain would need at the work rate of `tip` to produce the work between
/// `from` and `to`. Negative when `from` has more work; saturates at the `i64` range.
pub fn block_proof_equivalent_time(
    index: &BlockIndex,
    to: NodeId,
    from: NodeId,
    tip: NodeId,
    params: &ConsensusParams,
) -> i64 {
    let (to_work, from_work) = (index.node(to).chain_work, index.node(from).chain_work);
    let (difference, sign) = if to_work > from_work { (to_work - from_work, 1) } else { (from_work - to_work, -1) };

    let spacing = U256::from(params.pow_target_spacing.max(0) as u64);
    let tip_proof = block_proof(index, tip, params);
    let Some(r) = wrapping_mul(difference, spacing).checked_div(tip_proof) else {
        return sign * i64::MAX;
    };
    if r.bits() > 63 {
        return sign * i64::MAX;
    }
    sign * r.low_u64() as i64
}
