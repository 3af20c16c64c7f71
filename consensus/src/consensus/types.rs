//! Consensus-specific types
//!
//! This module defines types used throughout the consensus module.

use consensus_core::Hash;

/// Block status in the consensus pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockStatus {
    /// Block is valid and accepted
    Valid,
    /// Block is invalid
    Invalid,
    /// Block's parent is not known yet
    Orphan,
    /// Block was accepted before
    AlreadyKnown,
}

/// Block processing result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockProcessingResult {
    /// Block status
    pub status: BlockStatus,
    /// Block hash
    pub hash: Hash,
    /// Height of an accepted block
    pub height: Option<u32>,
    /// The block became the new tip
    pub tip_changed: bool,
    /// Short reject code of an invalid block
    pub reject_reason: Option<&'static str>,
    /// Error message if processing failed
    pub error: Option<String>,
}

impl BlockProcessingResult {
    /// Create a successful result
    pub fn valid(hash: Hash, height: u32, tip_changed: bool) -> Self {
        Self { status: BlockStatus::Valid, hash, height: Some(height), tip_changed, reject_reason: None, error: None }
    }

    /// Create a failed result
    pub fn invalid(hash: Hash, reject_reason: &'static str, error: String) -> Self {
        Self {
            status: BlockStatus::Invalid,
            hash,
            height: None,
            tip_changed: false,
            reject_reason: Some(reject_reason),
            error: Some(error),
        }
    }

    /// Create an orphan result
    pub fn orphan(hash: Hash) -> Self {
        Self { status: BlockStatus::Orphan, hash, height: None, tip_changed: false, reject_reason: None, error: None }
    }

    pub fn already_known(hash: Hash) -> Self {
        Self {
            status: BlockStatus::AlreadyKnown,
            hash,
            height: None,
            tip_changed: false,
            reject_reason: None,
            error: None,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.status == BlockStatus::Valid
    }
}
