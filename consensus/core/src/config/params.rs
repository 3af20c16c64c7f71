use hive_math::U256;
use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::network::NetworkType;
use crate::script::{KeyId, Script};

/// Activation height used for rules that are not scheduled on a network.
pub const NEVER: u32 = u32::MAX;

/// Consensus parameters of one network.
///
/// Built once at startup with [`ConsensusParams::for_network`] and shared read-only afterwards.
/// Feature deployments are expressed as activation heights: a rule is in force for a block whose
/// height is at or above the corresponding `*_height` field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsensusParams {
    pub network: NetworkType,

    /// Blocks between subsidy halvings
    pub subsidy_halving_interval: u32,

    /// Easiest target of the legacy scrypt PoW; also the ceiling enforced by `check_proof_of_work`
    pub pow_limit: U256,
    /// Easiest target of the primary PoW once the retarget switches to Dark Gravity Wave
    pub pow_limit_sha: U256,
    /// Easiest bee hash target
    pub pow_limit_hive: U256,
    /// Easiest target per PoW type, indexed by PoW type id
    pub pow_type_limits: Vec<U256>,

    /// Legacy retarget timespan in seconds
    pub pow_target_timespan: i64,
    /// Nominal seconds between blocks
    pub pow_target_spacing: i64,
    /// Allow a minimum difficulty block when the chain stalls
    pub pow_allow_min_difficulty_blocks: bool,
    /// Never retarget the legacy algorithm
    pub pow_no_retargeting: bool,

    /// Headers timestamped after this switch from scrypt to the version-selected PoW hash
    pub pow_fork_time: u32,
    /// Height of the last block whose difficulty follows the legacy retarget
    pub last_scrypt_block: u32,
    /// Premine paid at `last_scrypt_block + 1`, in coins
    pub premine_amount: i64,
    /// No subsidy is paid at or after this height
    pub total_money_supply_height: u32,

    /// Minimum cost of a bee, in base units
    pub min_bee_cost: i64,
    /// Bee cost is the block subsidy divided by this factor
    pub bee_cost_factor: i64,
    /// Script of the unspendable bee creation address
    pub bee_creation_script: Script,
    /// Script of the community fund address
    pub community_script: Script,
    /// An optional donation must be exactly (bee value + donation) / this factor
    pub community_contrib_factor: i64,
    /// Blocks before a new bee matures
    pub bee_gestation_blocks: u32,
    /// Blocks a bee lives after maturing
    pub bee_lifespan_blocks: u32,
    /// Bee target walks stop below this height
    pub min_hive_check_block: u32,
    /// Snap speed of the bee target EMA
    pub hive_target_adjust_aggression: i64,
    /// Target ratio of blocks to bee-mined blocks
    pub hive_block_spacing_target: i64,
    /// Observed ratio of blocks to bee-mined blocks before the consecutive bee block rules
    pub hive_block_spacing_target_typical: i64,
    /// Observed ratio of blocks to bee-mined blocks under the consecutive bee block rules
    pub hive_block_spacing_target_typical_1_1: i64,
    /// Header nonce that tags a block as bee-mined
    pub hive_nonce_marker: u32,

    /// Minimum chainwork multiplier of a bee-mined block
    pub min_k: u32,
    /// Maximum chainwork multiplier of a bee-mined block
    pub max_k: u32,
    /// Bee difficulty at which `max_k` is reached
    pub max_hive_diff: f64,
    /// Maximum chainwork multiplier of a PoW block
    pub max_k_pow: u32,
    /// Below this bee difficulty the PoW multiplier is halved
    pub pow_split_1: f64,
    /// Below this bee difficulty the PoW multiplier is halved again
    pub pow_split_2: f64,
    /// Bee-mined blocks allowed in a row
    pub max_consecutive_hive_blocks: u32,
    /// Bee-mined blocks averaged by the bee target SMA
    pub hive_difficulty_window: u32,

    /// First height at which bee-mined blocks are accepted
    pub hive_height: u32,
    /// First height of the consecutive bee block, bonus chainwork and SMA rules
    pub hive_1_1_height: u32,
    /// First height at which the PoW type in the header version is honoured
    pub minotaurx_height: u32,
}

impl ConsensusParams {
    pub fn for_network(network: NetworkType) -> Self {
        match network {
            NetworkType::Mainnet => Self::mainnet(),
            NetworkType::Testnet => Self::testnet(),
            NetworkType::Regtest => Self::regtest(),
        }
    }

    pub fn mainnet() -> Self {
        Self {
            network: NetworkType::Mainnet,
            subsidy_halving_interval: 840_000,
            pow_limit: U256::MAX >> 20,
            pow_limit_sha: U256::MAX >> 32,
            pow_limit_hive: U256::MAX >> 4,
            pow_type_limits: vec![U256::MAX >> 32, U256::MAX >> 12],
            pow_target_timespan: 3 * 24 * 60 * 60 + 12 * 60 * 60,
            pow_target_spacing: 150,
            pow_allow_min_difficulty_blocks: false,
            pow_no_retargeting: false,
            pow_fork_time: 1_518_982_404,
            last_scrypt_block: 1_371_111,
            premine_amount: 550_000,
            total_money_supply_height: 6_215_968,
            min_bee_cost: 10_000,
            bee_cost_factor: 2_500,
            bee_creation_script: published_address_script("CReateLitecoinCashWorkerBeeXYs19YQ", 28),
            community_script: published_address_script("CashCFfv8CmdWo6wyMGQWtmQnaToyhgsWr", 28),
            community_contrib_factor: 10,
            bee_gestation_blocks: 48 * 24,
            bee_lifespan_blocks: 48 * 24 * 14,
            min_hive_check_block: 1_537_566,
            hive_target_adjust_aggression: 30,
            hive_block_spacing_target: 2,
            hive_block_spacing_target_typical: 3,
            hive_block_spacing_target_typical_1_1: 2,
            hive_nonce_marker: 192,
            min_k: 2,
            max_k: 16,
            max_hive_diff: 0.006,
            max_k_pow: 5,
            pow_split_1: 0.005,
            pow_split_2: 0.0025,
            max_consecutive_hive_blocks: 2,
            hive_difficulty_window: 36,
            hive_height: 1_537_566,
            hive_1_1_height: NEVER,
            minotaurx_height: NEVER,
        }
    }

    pub fn testnet() -> Self {
        Self {
            network: NetworkType::Testnet,
            pow_limit_sha: U256::MAX >> 24,
            pow_type_limits: vec![U256::MAX >> 24, U256::MAX >> 12],
            pow_allow_min_difficulty_blocks: true,
            pow_fork_time: 1_629_204_885,
            last_scrypt_block: 50,
            bee_creation_script: published_address_script("tEstNetCreateLCCWorkerBeeXXXYq6T3r", 127),
            community_script: published_address_script("tCY5JWV4LYe64ivrAE2rD6P3bYxYtcoTsz", 127),
            bee_gestation_blocks: 40,
            min_hive_check_block: 50,
            max_k: 10,
            max_hive_diff: 0.002,
            pow_split_1: 0.001,
            pow_split_2: 0.0005,
            hive_height: 50,
            hive_1_1_height: 50,
            minotaurx_height: 50,
            ..Self::mainnet()
        }
    }

    /// Regression test network: trivial targets, short bee lifecycle and every rule active from height 1.
    pub fn regtest() -> Self {
        Self {
            network: NetworkType::Regtest,
            subsidy_halving_interval: 150,
            pow_limit: U256::MAX >> 1,
            pow_limit_sha: U256::MAX >> 24,
            pow_limit_hive: U256::MAX >> 1,
            pow_no_retargeting: true,
            pow_fork_time: 1_543_765_622,
            last_scrypt_block: 200,
            bee_creation_script: Script::p2pkh(&KeyId([0xbe; 20])),
            community_script: Script::p2pkh(&KeyId([0xc0; 20])),
            bee_gestation_blocks: 10,
            bee_lifespan_blocks: 100,
            min_hive_check_block: 0,
            hive_height: 1,
            hive_1_1_height: 1,
            minotaurx_height: 1,
            ..Self::testnet()
        }
    }

    /// Blocks per legacy retarget window.
    pub fn difficulty_adjustment_interval(&self) -> i64 {
        self.pow_target_timespan / self.pow_target_spacing
    }

    pub fn is_hive_active(&self, height: u32) -> bool {
        height >= self.hive_height
    }

    pub fn is_hive_1_1_active(&self, height: u32) -> bool {
        height >= self.hive_1_1_height
    }

    pub fn is_minotaurx_active(&self, height: u32) -> bool {
        height >= self.minotaurx_height
    }

    /// Total blocks a bee exists for, gestation included.
    pub fn total_bee_lifespan(&self) -> u32 {
        self.bee_gestation_blocks + self.bee_lifespan_blocks
    }
}

impl Default for ConsensusParams {
    fn default() -> Self {
        Self::mainnet()
    }
}

// The published addresses are fixed strings with valid checksums.
fn published_address_script(address: &str, version: u8) -> Script {
    Address::decode_for(address, version)
        .map(|a| a.script())
        .unwrap_or_else(|e| panic!("hard-coded address {} is invalid: {}", address, e))
}
