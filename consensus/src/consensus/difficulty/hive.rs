//! Bee hash target retargeting.
//!
//! Before Hive 1.1 the target follows an exponential moving average keyed on the number of PoW
//! blocks since the last bee-mined block. From Hive 1.1 on it is a simple moving average over a
//! window of bee-mined blocks.

use consensus_core::ConsensusParams;
use consensus_core::U256;
use hive_math::{bits_from_target, target_from_bits, wrapping_add, wrapping_mul};

use crate::consensus::chain::{BlockIndex, NodeId};

/// Exponential moving average bee target for the block after `last`.
pub fn hive_target_ema(index: &BlockIndex, last: NodeId, params: &ConsensusParams) -> u32 {
    let pow_limit = params.pow_limit_hive;
    let mut cursor = index.node(last);
    let mut num_pow_blocks: i64 = 0;

    let mut target = loop {
        let parent = match cursor.parent {
            Some(parent) if cursor.height >= params.min_hive_check_block => parent,
            _ => {
                tracing::debug!("no bee-mined blocks found in history");
                return bits_from_target(&pow_limit);
            }
        };
        if cursor.is_hive_mined(params) {
            break target_from_bits(cursor.bits());
        }
        cursor = index.node(parent);
        num_pow_blocks += 1;
    };

    // Two bee blocks in a row are impossible before Hive 1.1.
    if num_pow_blocks == 0 {
        return bits_from_target(&U256::zero());
    }

    let interval = params.hive_target_adjust_aggression / params.hive_block_spacing_target;
    let multiplier = (interval - 1) * params.hive_block_spacing_target + num_pow_blocks + num_pow_blocks;
    target = wrapping_mul(target, U256::from(multiplier as u64));
    target /= U256::from(((interval + 1) * params.hive_block_spacing_target) as u64);

    if target > pow_limit {
        target = pow_limit;
    }
    bits_from_target(&target)
}

/// Simple moving average bee target for the block after `last`.
pub fn hive_target_sma(index: &BlockIndex, last: NodeId, params: &ConsensusParams) -> u32 {
    let pow_limit = params.pow_limit_hive;
    let mut cursor = index.node(last);
    let mut target_sum = U256::zero();
    let mut hive_block_count: u32 = 0;
    let mut total_block_count: u32 = 0;

    while hive_block_count < params.hive_difficulty_window && cursor.height >= params.min_hive_check_block {
        let Some(parent) = cursor.parent else { break };
        if cursor.is_hive_mined(params) {
            target_sum = wrapping_add(target_sum, target_from_bits(cursor.bits()));
            hive_block_count += 1;
        }
        total_block_count += 1;
        cursor = index.node(parent);
    }

    if hive_block_count == 0 {
        tracing::debug!("no bee-mined blocks found in window");
        return bits_from_target(&pow_limit);
    }

    let mut target = target_sum / U256::from(hive_block_count);
    // Scale by how many blocks the window actually spanned.
    let target_total_block_count = i64::from(hive_block_count) * params.hive_block_spacing_target;
    target = wrapping_mul(target, U256::from(total_block_count));
    target /= U256::from(target_total_block_count as u64);

    if target > pow_limit {
        target = pow_limit;
    }
    bits_from_target(&target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use consensus_core::config::NEVER;
    use crate::consensus::testing::TestChain;

    const HIVE_BITS: u32 = 0x1f00_ffff;

    fn ema_params() -> ConsensusParams {
        let mut params = ConsensusParams::regtest();
        params.hive_1_1_height = NEVER;
        params
    }

    #[test]
    fn test_ema_limit_without_bee_blocks() {
        let mut chain = TestChain::new(ema_params(), 0x207f_ffff);
        chain.pow_to(20, 0x207f_ffff, 150);
        let limit = bits_from_target(&chain.params.pow_limit_hive);
        assert_eq!(hive_target_ema(&chain.index, chain.tip, &chain.params), limit);
    }

    #[test]
    fn test_ema_zero_after_bee_block() {
        let mut chain = TestChain::new(ema_params(), 0x207f_ffff);
        chain.pow_to(5, 0x207f_ffff, 150);
        chain.hive(HIVE_BITS, 150);
        assert_eq!(hive_target_ema(&chain.index, chain.tip, &chain.params), 0);
    }

    #[test]
    fn test_ema_eases_with_pow_blocks() {
        let mut chain = TestChain::new(ema_params(), 0x207f_ffff);
        chain.pow_to(5, 0x207f_ffff, 150);
        chain.hive(HIVE_BITS, 150);
        let mut previous = U256::zero();
        for num_pow in 1..=20u64 {
            chain.pow(0x207f_ffff, 150);
            // interval 15, spacing 2: target * (28 + 2n) / 32
            let expected = target_from_bits(HIVE_BITS) * U256::from(28 + 2 * num_pow) / U256::from(32u64);
            let bits = hive_target_ema(&chain.index, chain.tip, &chain.params);
            assert_eq!(bits, bits_from_target(&expected));
            assert!(target_from_bits(bits) >= previous);
            previous = target_from_bits(bits);
        }
    }

    #[test]
    fn test_ema_respects_min_check_height() {
        let mut params = ema_params();
        params.min_hive_check_block = 100;
        let mut chain = TestChain::new(params, 0x207f_ffff);
        chain.pow_to(5, 0x207f_ffff, 150);
        chain.hive(HIVE_BITS, 150);
        chain.pow(0x207f_ffff, 150);
        let limit = bits_from_target(&chain.params.pow_limit_hive);
        assert_eq!(hive_target_ema(&chain.index, chain.tip, &chain.params), limit);
    }

    #[test]
    fn test_sma_limit_without_bee_blocks() {
        let mut chain = TestChain::new(ConsensusParams::regtest(), 0x207f_ffff);
        chain.pow_to(50, 0x207f_ffff, 150);
        let limit = bits_from_target(&chain.params.pow_limit_hive);
        assert_eq!(hive_target_sma(&chain.index, chain.tip, &chain.params), limit);
    }

    #[test]
    fn test_sma_on_schedule_holds_target() {
        let mut chain = TestChain::new(ConsensusParams::regtest(), 0x207f_ffff);
        for _ in 0..10 {
            chain.pow(0x207f_ffff, 150);
            chain.hive(HIVE_BITS, 150);
        }
        assert_eq!(hive_target_sma(&chain.index, chain.tip, &chain.params), HIVE_BITS);
    }

    #[test]
    fn test_sma_eases_when_bee_blocks_are_rare() {
        let mut chain = TestChain::new(ConsensusParams::regtest(), 0x207f_ffff);
        for _ in 0..5 {
            chain.pow(0x207f_ffff, 150);
            chain.pow(0x207f_ffff, 150);
            chain.pow(0x207f_ffff, 150);
            chain.hive(HIVE_BITS, 150);
        }
        let expected = target_from_bits(HIVE_BITS) * U256::from(2u64);
        assert_eq!(hive_target_sma(&chain.index, chain.tip, &chain.params), bits_from_target(&expected));
    }

    #[test]
    fn test_sma_window_is_bounded() {
        let mut chain = TestChain::new(ConsensusParams::regtest(), 0x207f_ffff);
        // Old, easy bee blocks fall out of the window.
        for _ in 0..10 {
            chain.pow(0x207f_ffff, 150);
            chain.hive(0x2000_ffff, 150);
        }
        for _ in 0..chain.params.hive_difficulty_window {
            chain.pow(0x207f_ffff, 150);
            chain.hive(HIVE_BITS, 150);
        }
        // The window closes on its 36th bee block after counting 71 blocks.
        let expected = target_from_bits(HIVE_BITS) * U256::from(71u64) / U256::from(72u64);
        assert_eq!(hive_target_sma(&chain.index, chain.tip, &chain.params), bits_from_target(&expected));
    }
}
