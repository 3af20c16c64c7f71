use consensus_core::Hash;
use thiserror::Error;

use super::proof::BeeProofDecodeError;
use crate::consensus::storage::StorageError;

/// Reasons a bee-mined block is rejected, one per check, in the order the checks run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HiveProofError {
    #[error("parent block {0} is not in the block index")]
    UnknownParent(Hash),

    #[error("hive is not enabled at height {0}")]
    HiveNotActive(u32),

    #[error("hive block must follow a pow block")]
    ConsecutiveBeeBlock,

    #[error("{count} bee-mined blocks at the tip, at most {max} allowed in a row")]
    TooManyConsecutiveBeeBlocks { count: u32, max: u32 },

    #[error("bee-mined block contains bee creation transactions")]
    ContainsBeeCreation,

    #[error("coinbase transaction is missing or invalid")]
    BadCoinbase,

    #[error("coinbase has {0} outputs, expected 2 or 3")]
    CoinbaseOutputCount(usize),

    #[error("malformed bee proof: {0}")]
    MalformedProof(#[from] BeeProofDecodeError),

    #[error("bee hash {0} does not meet the bee target")]
    BeeHashAboveTarget(Hash),

    #[error("honey output is not pay-to-pubkey-hash")]
    BadHoneyAddress,

    #[error("could not recover a public key from the bee proof signature")]
    BadSignature,

    #[error("bee proof signature does not match the honey address")]
    SignatureMismatch,

    #[error("bee creation transaction {0} not found")]
    BeeCreationNotFound(Hash),

    #[error("bee creation transaction {txid} unavailable: {source}")]
    BeeCreationUnavailable { txid: Hash, source: StorageError },

    #[error("community contribution indicated but not found")]
    MissingCommunityContribution,

    #[error("community contribution of {found} should be {expected}")]
    BadCommunityContribution { expected: i64, found: i64 },

    #[error("claimed bee creation height {claimed} conflicts with found height {found}")]
    HeightMismatch { claimed: u32, found: u32 },

    #[error("bee creation transaction is immature at depth {0}")]
    Immature(i64),

    #[error("bee creation transaction expired at depth {0}")]
    Expired(i64),

    #[error("funding output is not a bee creation script")]
    NotBeeCreation,

    #[error("bee creation honey address does not match the claimed honey address")]
    HoneyAddressMismatch,

    #[error("bee creation fee {0} is less than the minimum bee cost")]
    BelowMinBeeCost(i64),

    #[error("bee creation fee {value} is less than the cost of a single bee ({bee_cost})")]
    BelowBeeCost { value: i64, bee_cost: i64 },

    #[error("bee nonce {nonce} is out of range for {bee_count} bees")]
    NonceOutOfRange { nonce: u32, bee_count: i64 },
}

impl HiveProofError {
    /// Stable reject reason for the failed check.
    pub fn reject_reason(&self) -> &'static str {
        match self {
            HiveProofError::UnknownParent(_) => "hive-prev-missing",
            HiveProofError::HiveNotActive(_) => "hive-not-enabled",
            HiveProofError::ConsecutiveBeeBlock => "hive-consecutive",
            HiveProofError::TooManyConsecutiveBeeBlocks { .. } => "hive-too-many-consecutive",
            HiveProofError::ContainsBeeCreation => "hive-contains-bct",
            HiveProofError::BadCoinbase => "hive-bad-coinbase",
            HiveProofError::CoinbaseOutputCount(_) => "hive-bad-coinbase-outputs",
            HiveProofError::MalformedProof(_) => "hive-bad-proof-script",
            HiveProofError::BeeHashAboveTarget(_) => "hive-high-hash",
            HiveProofError::BadHoneyAddress => "hive-bad-honey-address",
            HiveProofError::BadSignature => "hive-bad-signature",
            HiveProofError::SignatureMismatch => "hive-signature-mismatch",
            HiveProofError::BeeCreationNotFound(_) => "hive-bct-not-found",
            HiveProofError::BeeCreationUnavailable { .. } => "hive-bct-unavailable",
            HiveProofError::MissingCommunityContribution => "hive-missing-community-contrib",
            HiveProofError::BadCommunityContribution { .. } => "hive-bad-community-contrib",
            HiveProofError::HeightMismatch { .. } => "hive-bct-height-mismatch",
            HiveProofError::Immature(_) => "hive-bct-immature",
            HiveProofError::Expired(_) => "hive-bct-expired",
            HiveProofError::NotBeeCreation => "hive-not-bct",
            HiveProofError::HoneyAddressMismatch => "hive-honey-mismatch",
            HiveProofError::BelowMinBeeCost(_) => "hive-bct-below-min-cost",
            HiveProofError::BelowBeeCost { .. } => "hive-bct-below-bee-cost",
            HiveProofError::NonceOutOfRange { .. } => "hive-nonce-out-of-range",
        }
    }

    /// True when the check failed for lack of data rather than a rule violation; the block may
    /// validate once the data is available.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, HiveProofError::UnknownParent(_) | HiveProofError::BeeCreationUnavailable { .. })
    }
}
