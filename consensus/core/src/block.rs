use serde::{Deserialize, Serialize};

use crate::config::params::ConsensusParams;
use crate::header::BlockHeader;
use crate::tx::{Transaction, COINBASE_TRANSACTION_INDEX};
use crate::Hash;

/// Complete block structure including header and transactions
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub header: BlockHeader,
    pub transactions: Vec<Transaction>,
}

impl Block {
    /// Creates a new block with the given header and transactions
    pub fn new(header: BlockHeader, transactions: Vec<Transaction>) -> Self {
        Self { header, transactions }
    }

    pub fn hash(&self) -> Hash {
        self.header.hash()
    }

    /// The first transaction, if the block has any.
    pub fn coinbase(&self) -> Option<&Transaction> {
        self.transactions.get(COINBASE_TRANSACTION_INDEX)
    }

    /// Merkle root over the transaction ids.
    pub fn calculate_merkle_root(&self) -> Hash {
        let ids: Vec<Hash> = self.transactions.iter().map(Transaction::id).collect();
        hive_hashes::merkle_root(&ids)
    }

    pub fn is_hive_mined(&self, params: &ConsensusParams) -> bool {
        self.header.is_hive_mined(params)
    }

    /// Finds a transaction by id.
    pub fn transaction(&self, id: &Hash) -> Option<&Transaction> {
        self.transactions.iter().find(|tx| tx.id() == *id)
    }
}
