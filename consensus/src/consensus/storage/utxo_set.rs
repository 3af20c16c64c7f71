//! UTXO set management for consensus
//!
//! Point lookups of unspent outputs, as needed to locate bee creation transactions.

use std::collections::HashMap;

use consensus_core::block::Block;
use consensus_core::script::Opcode;
use consensus_core::tx::{TransactionOutpoint, TransactionOutput};
use parking_lot::RwLock;

use super::StorageResult;

/// An unspent output and the height of the block that created it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coin {
    pub output: TransactionOutput,
    pub height: u32,
    pub is_coinbase: bool,
}

/// Read access to the unspent output set.
pub trait CoinView: Send + Sync {
    /// `Ok(None)` when the output is unknown or spent.
    fn coin(&self, outpoint: &TransactionOutpoint) -> StorageResult<Option<Coin>>;
}

/// In-memory UTXO set.
#[derive(Default)]
pub struct MemoryUtxoSet {
    coins: RwLock<HashMap<TransactionOutpoint, Coin>>,
}

impl MemoryUtxoSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.coins.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn add_coin(&self, outpoint: TransactionOutpoint, coin: Coin) {
        self.coins.write().insert(outpoint, coin);
    }

    pub fn spend(&self, outpoint: &TransactionOutpoint) -> Option<Coin> {
        self.coins.write().remove(outpoint)
    }

    /// Applies `block`, at `height`: spends its inputs and adds its spendable outputs.
    pub fn connect_block(&self, block: &Block, height: u32) {
        let mut coins = self.coins.write();
        for tx in &block.transactions {
            let is_coinbase = tx.is_coinbase();
            if !is_coinbase {
                for input in &tx.inputs {
                    coins.remove(&input.previous_outpoint);
                }
            }
            let id = tx.id();
            for (index, output) in tx.outputs.iter().enumerate() {
                if output.script_public_key.as_bytes().first() == Some(&(Opcode::OP_RETURN as u8)) {
                    continue;
                }
                coins.insert(
                    TransactionOutpoint::new(id, index as u32),
                    Coin { output: output.clone(), height, is_coinbase },
                );
            }
        }
    }
}

impl CoinView for MemoryUtxoSet {
    fn coin(&self, outpoint: &TransactionOutpoint) -> StorageResult<Option<Coin>> {
        Ok(self.coins.read().get(outpoint).cloned())
    }
}
