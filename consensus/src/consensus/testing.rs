//! Chain building helpers for unit tests.

use consensus_core::header::BlockHeader;
use consensus_core::{ConsensusParams, Hash};

use super::chain::{BlockIndex, NodeId};

pub(crate) const GENESIS_TIME: u32 = 1_600_000_000;

/// A block index grown one header at a time, without proof-of-work checks.
pub(crate) struct TestChain {
    pub index: BlockIndex,
    pub params: ConsensusParams,
    pub tip: NodeId,
    salt: u32,
}

impl TestChain {
    pub fn new(params: ConsensusParams, genesis_bits: u32) -> Self {
        let mut index = BlockIndex::new();
        let genesis = BlockHeader { version: 1, time: GENESIS_TIME, bits: genesis_bits, ..Default::default() };
        let tip = index.insert_header(genesis, &params).unwrap();
        Self { index, params, tip, salt: 0 }
    }

    pub fn height(&self) -> u32 {
        self.index.node(self.tip).height
    }

    pub fn time(&self) -> u32 {
        self.index.node(self.tip).time()
    }

    pub fn push_on(&mut self, parent: NodeId, bits: u32, time: u32, hive: bool) -> NodeId {
        self.salt += 1;
        let header = BlockHeader {
            version: 4,
            prev_block_hash: self.index.node(parent).hash,
            merkle_root: Hash::from_bytes(hash_salt(self.salt)),
            time,
            bits,
            nonce: if hive { self.params.hive_nonce_marker } else { 0 },
        };
        let id = self.index.insert_header(header, &self.params).unwrap();
        self.tip = id;
        id
    }

    /// Extends the tip with a PoW block `spacing` seconds after it.
    pub fn pow(&mut self, bits: u32, spacing: u32) -> NodeId {
        let time = self.time() + spacing;
        self.push_on(self.tip, bits, time, false)
    }

    /// Extends the tip with a bee-mined block `spacing` seconds after it.
    pub fn hive(&mut self, bits: u32, spacing: u32) -> NodeId {
        let time = self.time() + spacing;
        self.push_on(self.tip, bits, time, true)
    }

    /// Extends the tip with PoW blocks until it reaches `height`.
    pub fn pow_to(&mut self, height: u32, bits: u32, spacing: u32) -> NodeId {
        while self.height() < height {
            self.pow(bits, spacing);
        }
        self.tip
    }
}

fn hash_salt(salt: u32) -> [u8; 32] {
    let mut bytes = [0u8; 32];
    bytes[..4].copy_from_slice(&salt.to_le_bytes());
    bytes
}
