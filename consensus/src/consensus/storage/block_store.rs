//! Block store for consensus
//!
//! Full block bodies keyed by hash.

use std::collections::{HashMap, HashSet};

use consensus_core::block::Block;
use consensus_core::Hash;
use parking_lot::RwLock;

use super::{StorageError, StorageResult};

/// Read access to stored block bodies.
pub trait BlockSource: Send + Sync {
    /// `Ok(None)` when the block was never stored; `Err(StorageError::Pruned)` when its data is gone.
    fn read_block(&self, hash: &Hash) -> StorageResult<Option<Block>>;
}

/// A block source that also accepts new blocks.
pub trait BlockStore: BlockSource {
    fn store_block(&self, block: Block) -> StorageResult<()>;
}

#[derive(Default)]
struct Inner {
    blocks: HashMap<Hash, Block>,
    pruned: HashSet<Hash>,
}

/// In-memory block store with pruning.
#[derive(Default)]
pub struct MemoryBlockStore {
    inner: RwLock<Inner>,
}

impl MemoryBlockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.read().blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn has_block(&self, hash: &Hash) -> bool {
        self.inner.read().blocks.contains_key(hash)
    }

    /// Drops the body of a stored block. Later reads report it as pruned.
    pub fn prune(&self, hash: &Hash) -> StorageResult<()> {
        let mut inner = self.inner.write();
        if inner.blocks.remove(hash).is_none() {
            return Err(StorageError::NotFound(*hash));
        }
        inner.pruned.insert(*hash);
        Ok(())
    }
}

impl BlockSource for MemoryBlockStore {
    fn read_block(&self, hash: &Hash) -> StorageResult<Option<Block>> {
        let inner = self.inner.read();
        if inner.pruned.contains(hash) {
            return Err(StorageError::Pruned(*hash));
        }
        Ok(inner.blocks.get(hash).cloned())
    }
}

impl BlockStore for MemoryBlockStore {
    fn store_block(&self, block: Block) -> StorageResult<()> {
        let hash = block.hash();
        let mut inner = self.inner.write();
        inner.pruned.remove(&hash);
        inner.blocks.insert(hash, block);
        Ok(())
    }
}
