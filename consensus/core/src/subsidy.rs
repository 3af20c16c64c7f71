//! Block reward schedule and the bee price derived from it.

use crate::config::params::ConsensusParams;
use crate::constants::{COIN, COIN_SCALE};

/// Reward of the first block of each halving era.
pub const INITIAL_SUBSIDY: i64 = 50 * COIN * COIN_SCALE;

/// Block subsidy at `height`, in base units.
pub fn block_subsidy(height: u32, params: &ConsensusParams) -> i64 {
    if height == params.last_scrypt_block.saturating_add(1) {
        return params.premine_amount * COIN;
    }
    if height >= params.total_money_supply_height {
        return 0;
    }
    let halvings = height / params.subsidy_halving_interval;
    if halvings >= 64 {
        return 0;
    }
    INITIAL_SUBSIDY >> halvings
}

/// Price of one bee for a bee creation transaction confirmed at `height`.
pub fn bee_cost(height: u32, params: &ConsensusParams) -> i64 {
    let cost = block_subsidy(height, params) / params.bee_cost_factor;
    cost.max(params.min_bee_cost)
}
