//! Proof-of-work hash selection.
//!
//! Headers timestamped before the network's fork time are hashed with scrypt. Afterwards the PoW
//! type carried in bits 16..24 of the version selects the algorithm; headers still signalling with
//! the plain version-bits prefix always use sha256d.

use std::fmt;
use std::sync::Arc;

use consensus_core::constants::VERSIONBITS_TOP_BITS;
use consensus_core::header::BlockHeader;
use consensus_core::ConsensusParams;
use hive_hashes::{scrypt_1024_1_1_256, Hash};
use hive_math::{CompactTarget, U256};

/// Hash returned for headers naming an unknown or unavailable algorithm; it exceeds every target.
pub const HIGH_HASH: Hash = {
    let mut bytes = [0xffu8; 32];
    bytes[31] = 0x0f;
    Hash::from_bytes(bytes)
};

/// Hash algorithms selectable through the header version.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PowType {
    Sha256d = 0,
    MinotaurX = 1,
}

impl PowType {
    pub fn from_id(id: i32) -> Option<Self> {
        match id {
            0 => Some(PowType::Sha256d),
            1 => Some(PowType::MinotaurX),
            _ => None,
        }
    }

    /// The PoW type a header claims, if it names a known algorithm.
    pub fn of_header(header: &BlockHeader) -> Option<Self> {
        Self::from_id(header.pow_type_id())
    }

    pub fn name(&self) -> &'static str {
        match self {
            PowType::Sha256d => "sha256d",
            PowType::MinotaurX => "minotaurx",
        }
    }

    /// Easiest target of this algorithm.
    pub fn limit(&self, params: &ConsensusParams) -> U256 {
        params.pow_type_limits.get(*self as usize).copied().unwrap_or(params.pow_limit_sha)
    }
}

impl fmt::Display for PowType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Implementation of an additional PoW algorithm over the 80-byte header.
pub trait PowHasher: Send + Sync {
    fn hash_header(&self, header_bytes: &[u8]) -> Hash;
}

/// Computes PoW hashes. Algorithms other than sha256d and scrypt are registered at construction;
/// a header naming an unregistered algorithm hashes to [`HIGH_HASH`].
#[derive(Clone, Default)]
pub struct PowEngine {
    minotaurx: Option<Arc<dyn PowHasher>>,
}

impl PowEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_minotaurx(hasher: Arc<dyn PowHasher>) -> Self {
        Self { minotaurx: Some(hasher) }
    }

    /// The algorithm used for `header` at `height`, or `None` when the header names none that applies.
    pub fn hash_type(&self, header: &BlockHeader, height: u32, params: &ConsensusParams) -> Option<PowType> {
        if header.version >= VERSIONBITS_TOP_BITS || !params.is_minotaurx_active(height) {
            return Some(PowType::Sha256d);
        }
        PowType::of_header(header)
    }

    /// The PoW hash of `header`, a block at `height`.
    pub fn pow_hash(&self, header: &BlockHeader, height: u32, params: &ConsensusParams) -> Hash {
        if header.time <= params.pow_fork_time {
            return scrypt_1024_1_1_256(&header.to_bytes());
        }
        match self.hash_type(header, height, params) {
            Some(PowType::Sha256d) => header.hash(),
            Some(PowType::MinotaurX) => match &self.minotaurx {
                Some(hasher) => hasher.hash_header(&header.to_bytes()),
                None => HIGH_HASH,
            },
            None => HIGH_HASH,
        }
    }
}

impl fmt::Debug for PowEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PowEngine").field("minotaurx", &self.minotaurx.is_some()).finish()
    }
}

/// State is an intermediate data structure with pre-computed values to speed up mining.
pub struct State<'a> {
    header: BlockHeader,
    height: u32,
    target: U256,
    engine: &'a PowEngine,
    params: &'a ConsensusParams,
}

impl<'a> State<'a> {
    pub fn new(header: &BlockHeader, height: u32, engine: &'a PowEngine, params: &'a ConsensusParams) -> Self {
        let target = CompactTarget::from_bits(header.bits).value;
        Self { header: *header, height, target, engine, params }
    }

    /// The PoW hash of the header with `nonce`, as a number.
    #[must_use]
    pub fn calculate_pow(&self, nonce: u32) -> U256 {
        let header = BlockHeader { nonce, ..self.header };
        let hash = self.engine.pow_hash(&header, self.height, self.params);
        U256::from_little_endian(hash.as_bytes())
    }

    #[must_use]
    pub fn check_pow(&self, nonce: u32) -> (bool, U256) {
        let pow = self.calculate_pow(nonce);
        // The pow hash must be less or equal than the claimed target.
        (pow <= self.target, pow)
    }
}
