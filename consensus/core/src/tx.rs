//!
//! # Transaction
//!
//! The transaction structure as far as the consensus core needs it: enough to compute ids,
//! recognise coinbases and bee creation transactions, and read output values and scripts.
//!

use serde::{Deserialize, Serialize};

use crate::hashing;
use crate::script::Script;
use crate::Hash;

/// COINBASE_TRANSACTION_INDEX is the index of the coinbase transaction in every block
pub const COINBASE_TRANSACTION_INDEX: usize = 0;

/// A 32-byte transaction identifier.
pub type TransactionId = crate::Hash;

/// Represents a reference to an output of a previous transaction.
#[derive(Eq, Hash, PartialEq, Debug, Copy, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionOutpoint {
    pub transaction_id: TransactionId,
    pub index: u32,
}

impl TransactionOutpoint {
    pub fn new(transaction_id: TransactionId, index: u32) -> Self {
        Self { transaction_id, index }
    }

    /// The outpoint spent by a coinbase input.
    pub fn null() -> Self {
        Self { transaction_id: Hash::zeroed(), index: u32::MAX }
    }

    pub fn is_null(&self) -> bool {
        self.transaction_id.is_zero() && self.index == u32::MAX
    }
}

/// Represents a transaction input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionInput {
    pub previous_outpoint: TransactionOutpoint,
    pub signature_script: Script,
    pub sequence: u32,
}

impl TransactionInput {
    pub fn new(previous_outpoint: TransactionOutpoint, signature_script: Script, sequence: u32) -> Self {
        Self { previous_outpoint, signature_script, sequence }
    }
}

/// Represents a transaction output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionOutput {
    /// Value in base units.
    pub value: i64,
    pub script_public_key: Script,
}

impl TransactionOutput {
    pub fn new(value: i64, script_public_key: Script) -> Self {
        Self { value, script_public_key }
    }
}

/// Represents a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub version: i32,
    pub inputs: Vec<TransactionInput>,
    pub outputs: Vec<TransactionOutput>,
    pub lock_time: u32,
}

impl Transaction {
    pub fn new(version: i32, inputs: Vec<TransactionInput>, outputs: Vec<TransactionOutput>, lock_time: u32) -> Self {
        Self { version, inputs, outputs, lock_time }
    }

    /// sha256d of the serialized transaction.
    pub fn id(&self) -> TransactionId {
        hashing::tx::id(self)
    }

    /// A coinbase has exactly one input, spending the null outpoint.
    pub fn is_coinbase(&self) -> bool {
        self.inputs.len() == 1 && self.inputs[0].previous_outpoint.is_null()
    }

    /// If output 0 matches the bee creation template for `bee_creation_script`, returns the
    /// amount paid for bees and the honey script.
    pub fn bee_creation(&self, bee_creation_script: &Script) -> Option<(i64, Script)> {
        let first = self.outputs.first()?;
        let honey = first.script_public_key.bee_creation_honey_script(bee_creation_script)?;
        Some((first.value, honey))
    }

    pub fn is_bee_creation(&self, bee_creation_script: &Script) -> bool {
        self.bee_creation(bee_creation_script).is_some()
    }
}
