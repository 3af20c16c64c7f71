//! Block index arena
//!
//! Every accepted header gets one node. Nodes are appended to a vector and never removed, so a
//! [`NodeId`] stays valid for the lifetime of the index. Parent and skip links are ids, never
//! references.

use std::collections::HashMap;

use consensus_core::header::BlockHeader;
use consensus_core::{ConsensusParams, Hash, U256};
use hive_math::wrapping_add;
use thiserror::Error;

use crate::consensus::work::block_proof;

/// Position of a node in the [`BlockIndex`] arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IndexError {
    #[error("Parent {0} of header is not in the block index")]
    UnknownParent(Hash),

    #[error("Block index is full")]
    Full,
}

/// Metadata of one block header.
#[derive(Clone, Debug)]
pub struct BlockIndexNode {
    pub hash: Hash,
    pub header: BlockHeader,
    pub height: u32,
    /// Total work of the chain up to and including this block
    pub chain_work: U256,
    /// Largest timestamp of this block and all of its ancestors
    pub time_max: u32,
    pub parent: Option<NodeId>,
    /// Pointer to an ancestor used for logarithmic ancestor lookups
    pub skip: Option<NodeId>,
    /// Full block data is available from block storage
    pub has_data: bool,
}

impl BlockIndexNode {
    pub fn bits(&self) -> u32 {
        self.header.bits
    }

    pub fn time(&self) -> u32 {
        self.header.time
    }

    pub fn is_hive_mined(&self, params: &ConsensusParams) -> bool {
        self.header.is_hive_mined(params)
    }
}

/// Clears the lowest set bit.
fn invert_lowest_one(n: u32) -> u32 {
    n & n.wrapping_sub(1)
}

/// Height of the ancestor a node at `height` keeps its skip pointer to.
///
/// Any number would work as long as it is lower than `height`; this choice gives O(log n) lookups.
pub fn skip_height(height: u32) -> u32 {
    if height < 2 {
        return 0;
    }
    if height & 1 == 1 {
        invert_lowest_one(invert_lowest_one(height - 1)) + 1
    } else {
        invert_lowest_one(height)
    }
}

/// Append-only arena of block index nodes.
#[derive(Debug, Default)]
pub struct BlockIndex {
    nodes: Vec<BlockIndexNode>,
    by_hash: HashMap<Hash, NodeId>,
}

impl BlockIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, hash: &Hash) -> Option<NodeId> {
        self.by_hash.get(hash).copied()
    }

    pub fn contains(&self, hash: &Hash) -> bool {
        self.by_hash.contains_key(hash)
    }

    /// The node with id `id`. Ids are only handed out by this index, so a miss is a bug.
    pub fn node(&self, id: NodeId) -> &BlockIndexNode {
        &self.nodes[id.index()]
    }

    pub fn genesis(&self) -> Option<NodeId> {
        if self.nodes.is_empty() {
            None
        } else {
            Some(NodeId(0))
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &BlockIndexNode)> {
        self.nodes.iter().enumerate().map(|(i, node)| (NodeId(i as u32), node))
    }

    pub fn set_has_data(&mut self, id: NodeId, has_data: bool) {
        self.nodes[id.index()].has_data = has_data;
    }

    /// Adds a header to the index.
    ///
    /// The first header inserted becomes the genesis node. Every later header must extend a
    /// known node. Inserting a header that is already indexed returns the existing id.
    pub fn insert_header(&mut self, header: BlockHeader, params: &ConsensusParams) -> Result<NodeId, IndexError> {
        let hash = header.hash();
        if let Some(id) = self.get(&hash) {
            return Ok(id);
        }

        let parent = if self.nodes.is_empty() {
            None
        } else {
            Some(self.get(&header.prev_block_hash).ok_or(IndexError::UnknownParent(header.prev_block_hash))?)
        };

        let id = NodeId(u32::try_from(self.nodes.len()).map_err(|_| IndexError::Full)?);
        let (height, time_max, parent_work) = match parent {
            Some(parent) => {
                let p = self.node(parent);
                (p.height + 1, p.time_max.max(header.time), p.chain_work)
            }
            None => (0, header.time, U256::zero()),
        };
        let skip = parent.and_then(|parent| self.ancestor(parent, skip_height(height)));

        self.nodes.push(BlockIndexNode {
            hash,
            header,
            height,
            chain_work: U256::zero(),
            time_max,
            parent,
            skip,
            has_data: false,
        });
        self.by_hash.insert(hash, id);

        // The proof of a block depends on its ancestors, so it is computed once the node is linked.
        let proof = block_proof(self, id, params);
        self.nodes[id.index()].chain_work = wrapping_add(parent_work, proof);
        Ok(id)
    }

    fn parent_of(&self, id: NodeId) -> NodeId {
        let node = self.node(id);
        node.parent.unwrap_or_else(|| panic!("block index node {} at height {} has no parent", node.hash, node.height))
    }

    /// The ancestor of `id` at `height`, or `None` when `height` is above the node.
    pub fn ancestor(&self, id: NodeId, height: u32) -> Option<NodeId> {
        let mut walk = id;
        let mut height_walk = self.node(id).height;
        if height > height_walk {
            return None;
        }

        while height_walk > height {
            let height_skip = skip_height(height_walk);
            let height_skip_prev = skip_height(height_walk - 1);
            let skip = self.node(walk).skip;
            let take_skip = height_skip == height
                || (height_skip > height && !(height_skip_prev + 2 < height_skip && height_skip_prev >= height));
            match skip {
                Some(skip) if take_skip => {
                    // Only follow the skip pointer if the parent's pointer would not be better.
                    walk = skip;
                    height_walk = height_skip;
                }
                _ => {
                    walk = self.parent_of(walk);
                    height_walk -= 1;
                }
            }
        }
        Some(walk)
    }

    /// The deepest node that is an ancestor of both `a` and `b` (or one of them).
    ///
    /// # Panics
    ///
    /// Panics if the two nodes do not share a genesis.
    pub fn last_common_ancestor(&self, a: NodeId, b: NodeId) -> NodeId {
        let (height_a, height_b) = (self.node(a).height, self.node(b).height);
        let (mut a, mut b) = (a, b);
        if height_a > height_b {
            a = self.ancestor(a, height_b).unwrap_or(a);
        } else if height_b > height_a {
            b = self.ancestor(b, height_a).unwrap_or(b);
        }

        while a != b {
            match (self.node(a).parent, self.node(b).parent) {
                (Some(pa), Some(pb)) => {
                    a = pa;
                    b = pb;
                }
                _ => panic!("blocks {} and {} have no common ancestor", self.node(a).hash, self.node(b).hash),
            }
        }
        a
    }
}
