use serde::{Deserialize, Serialize};

use crate::config::params::ConsensusParams;
use crate::constants::{POW_TYPE_BIT, POW_TYPE_MASK};
use crate::errors::ConsensusResult;
use crate::{hashing, Hash};

/// The 80-byte block header.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockHeader {
    pub version: i32,
    pub prev_block_hash: Hash,
    pub merkle_root: Hash,
    /// Seconds since the unix epoch.
    pub time: u32,
    /// Compact target.
    pub bits: u32,
    pub nonce: u32,
}

impl BlockHeader {
    /// sha256d of the serialized header; the block id.
    pub fn hash(&self) -> Hash {
        hashing::header::hash(self)
    }

    pub fn to_bytes(&self) -> [u8; crate::constants::HEADER_SIZE] {
        hashing::header::serialize(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> ConsensusResult<Self> {
        hashing::header::deserialize(bytes)
    }

    /// A bee-mined header carries the network's nonce marker instead of proof-of-work.
    pub fn is_hive_mined(&self, params: &ConsensusParams) -> bool {
        self.nonce == params.hive_nonce_marker
    }

    /// Raw PoW type selector from the version field.
    pub fn pow_type_id(&self) -> i32 {
        (self.version >> POW_TYPE_BIT) & POW_TYPE_MASK
    }
}
