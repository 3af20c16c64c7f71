//! Proof-of-work checks.

use consensus_core::header::BlockHeader;
use consensus_core::{ConsensusParams, Hash, U256};
use consensus_pow::PowEngine;
use hive_math::CompactTarget;
use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowError {
    #[error("compact target {0:#010x} is negative")]
    NegativeTarget(u32),

    #[error("compact target {0:#010x} is zero")]
    ZeroTarget(u32),

    #[error("compact target {0:#010x} overflows 256 bits")]
    TargetOverflow(u32),

    #[error("compact target {0:#010x} is easier than the network limit")]
    TargetAboveLimit(u32),

    #[error("hash {hash} does not meet target {bits:#010x}")]
    HashAboveTarget { hash: Hash, bits: u32 },

    #[error("incorrect difficulty bits: expected {expected:#010x}, found {found:#010x}")]
    BadDifficultyBits { expected: u32, found: u32 },
}

impl PowError {
    /// Stable reject reason.
    pub fn reject_reason(&self) -> &'static str {
        match self {
            PowError::NegativeTarget(_) | PowError::ZeroTarget(_) | PowError::TargetOverflow(_) => "bad-target",
            PowError::TargetAboveLimit(_) => "target-above-limit",
            PowError::HashAboveTarget { .. } => "high-hash",
            PowError::BadDifficultyBits { .. } => "bad-diffbits",
        }
    }
}

/// Numeric value of a hash.
pub fn hash_to_u256(hash: &Hash) -> U256 {
    U256::from_little_endian(hash.as_bytes())
}

/// Checks that `hash` meets the compact target `bits` and that the target is a valid one for
/// the network. A hash equal to the target passes.
pub fn check_proof_of_work(hash: &Hash, bits: u32, params: &ConsensusParams) -> Result<(), PowError> {
    let target = CompactTarget::from_bits(bits);
    if target.negative {
        return Err(PowError::NegativeTarget(bits));
    }
    if target.overflow {
        return Err(PowError::TargetOverflow(bits));
    }
    if target.value.is_zero() {
        return Err(PowError::ZeroTarget(bits));
    }
    if target.value > params.pow_limit {
        return Err(PowError::TargetAboveLimit(bits));
    }
    if hash_to_u256(hash) > target.value {
        return Err(PowError::HashAboveTarget { hash: *hash, bits });
    }
    Ok(())
}

/// Checks the proof of work of `header`, a block at `height`, using the hash algorithm its
/// timestamp and version select.
pub fn validate_proof_of_work(
    header: &BlockHeader,
    height: u32,
    engine: &PowEngine,
    params: &ConsensusParams,
) -> Result<(), PowError> {
    let hash = engine.pow_hash(header, height, params);
    check_proof_of_work(&hash, header.bits, params)
}
