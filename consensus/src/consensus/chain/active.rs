//! Height-indexed view of the best chain
//!
//! The view stores node ids only; the nodes themselves live in the [`BlockIndex`] passed to each
//! call.

use consensus_core::Hash;

use super::index::{BlockIndex, NodeId};

/// Locator entries collected before the step starts doubling.
const LOCATOR_DENSE_ENTRIES: usize = 10;

/// The currently selected chain, entry `i` being the node at height `i`.
#[derive(Clone, Debug, Default)]
pub struct ActiveChain {
    chain: Vec<NodeId>,
}

impl ActiveChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn genesis(&self) -> Option<NodeId> {
        self.chain.first().copied()
    }

    pub fn tip(&self) -> Option<NodeId> {
        self.chain.last().copied()
    }

    /// Height of the tip, `None` for an empty chain.
    pub fn height(&self) -> Option<u32> {
        self.chain.len().checked_sub(1).map(|h| h as u32)
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    /// The node at `height`, if the chain is that long.
    pub fn at(&self, height: u32) -> Option<NodeId> {
        self.chain.get(height as usize).copied()
    }

    pub fn contains(&self, index: &BlockIndex, id: NodeId) -> bool {
        self.at(index.node(id).height) == Some(id)
    }

    /// The successor of `id` on this chain, if `id` is on it and is not the tip.
    pub fn next(&self, index: &BlockIndex, id: NodeId) -> Option<NodeId> {
        if self.contains(index, id) {
            self.at(index.node(id).height + 1)
        } else {
            None
        }
    }

    /// Makes `tip` the tip of the view, or clears the view with `None`.
    ///
    /// Only the suffix that differs from the current view is rewritten.
    pub fn set_tip(&mut self, index: &BlockIndex, tip: Option<NodeId>) {
        let Some(tip) = tip else {
            self.chain.clear();
            return;
        };

        let new_len = index.node(tip).height as usize + 1;
        self.chain.truncate(new_len);

        let mut suffix = Vec::new();
        let mut cursor = Some(tip);
        while let Some(id) = cursor {
            let node = index.node(id);
            if self.chain.get(node.height as usize) == Some(&id) {
                break;
            }
            suffix.push(id);
            cursor = node.parent;
        }

        self.chain.truncate(new_len - suffix.len());
        self.chain.extend(suffix.into_iter().rev());
        debug_assert_eq!(self.chain.len(), new_len);
    }

    /// Block locator for `start`, or for the tip when `start` is `None`.
    ///
    /// Dense for the first entries, then exponentially sparser; always ends with the genesis hash.
    pub fn locator(&self, index: &BlockIndex, start: Option<NodeId>) -> Vec<Hash> {
        let mut step = 1u32;
        let mut have = Vec::with_capacity(32);
        let mut cursor = start.or_else(|| self.tip());

        while let Some(id) = cursor {
            let node = index.node(id);
            have.push(node.hash);
            if node.height == 0 {
                break;
            }
            let height = node.height.saturating_sub(step);
            cursor = if self.contains(index, id) {
                // Constant time lookup on the active chain
                self.at(height)
            } else {
                index.ancestor(id, height)
            };
            if have.len() > LOCATOR_DENSE_ENTRIES {
                step = step.saturating_mul(2);
            }
        }
        have
    }

    /// The highest node that is both an ancestor of `id` and on this chain.
    pub fn find_fork(&self, index: &BlockIndex, id: NodeId) -> Option<NodeId> {
        let height = self.height()?;
        let mut cursor = if index.node(id).height > height { index.ancestor(id, height)? } else { id };
        while !self.contains(index, cursor) {
            cursor = index.node(cursor).parent?;
        }
        Some(cursor)
    }

    /// The lowest node whose `time_max` is at least `time`.
    pub fn find_earliest_at_least(&self, index: &BlockIndex, time: u32) -> Option<NodeId> {
        let pos = self.chain.partition_point(|id| index.node(*id).time_max < time);
        self.chain.get(pos).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use consensus_core::header::BlockHeader;
    use consensus_core::ConsensusParams;

    fn extend(index: &mut BlockIndex, params: &ConsensusParams, from: Option<NodeId>, count: u32, salt: u32) -> Vec<NodeId> {
        let mut prev = from.map(|id| index.node(id).hash).unwrap_or_default();
        let mut ids = Vec::new();
        for i in 0..count {
            let header = BlockHeader {
                version: 4,
                prev_block_hash: prev,
                time: 1_600_000_000 + i * 150,
                bits: 0x207f_ffff,
                nonce: salt + i,
                ..Default::default()
            };
            let id = index.insert_header(header, params).unwrap();
            prev = index.node(id).hash;
            ids.push(id);
        }
        ids
    }

    #[test]
    fn test_set_tip_and_reorg() {
        let params = ConsensusParams::regtest();
        let mut index = BlockIndex::new();
        let main = extend(&mut index, &params, None, 30, 0);
        let side = extend(&mut index, &params, Some(main[19]), 15, 1000);

        let mut chain = ActiveChain::new();
        assert_eq!(chain.height(), None);
        chain.set_tip(&index, main.last().copied());
        assert_eq!(chain.height(), Some(29));
        for (h, id) in main.iter().enumerate() {
            assert_eq!(chain.at(h as u32), Some(*id));
        }

        chain.set_tip(&index, side.last().copied());
        assert_eq!(chain.height(), Some(34));
        assert_eq!(chain.at(19), Some(main[19]));
        assert_eq!(chain.at(20), Some(side[0]));
        assert!(!chain.contains(&index, main[25]));
        assert_eq!(chain.next(&index, main[19]), Some(side[0]));
        assert_eq!(chain.next(&index, *side.last().unwrap()), None);

        chain.set_tip(&index, Some(main[5]));
        assert_eq!(chain.tip(), Some(main[5]));
        chain.set_tip(&index, None);
        assert!(chain.is_empty());
    }

    #[test]
    fn test_locator() {
        let params = ConsensusParams::regtest();
        let mut index = BlockIndex::new();
        let main = extend(&mut index, &params, None, 1000, 0);
        let mut chain = ActiveChain::new();
        chain.set_tip(&index, main.last().copied());

        let locator = chain.locator(&index, None);
        assert_eq!(locator.first(), Some(&index.node(main[999]).hash));
        assert_eq!(locator.last(), Some(&index.node(main[0]).hash));

        let heights: Vec<u32> = locator.iter().map(|h| index.node(index.get(h).unwrap()).height).collect();
        // Dense at the tip, then the gaps double.
        assert_eq!(&heights[..11], &[999, 998, 997, 996, 995, 994, 993, 992, 991, 990, 989]);
        assert_eq!(heights[11], 988);
        assert_eq!(heights[12], 986);
        assert_eq!(heights[13], 982);
        assert!(heights.windows(2).all(|w| w[0] > w[1]));

        // A locator from a side branch walks through the skip list and still ends at genesis.
        let side = extend(&mut index, &params, Some(main[400]), 50, 5000);
        let side_locator = chain.locator(&index, side.last().copied());
        assert_eq!(side_locator.first(), Some(&index.node(*side.last().unwrap()).hash));
        assert_eq!(side_locator.last(), Some(&index.node(main[0]).hash));
    }

    #[test]
    fn test_find_fork() {
        let params = ConsensusParams::regtest();
        let mut index = BlockIndex::new();
        let main = extend(&mut index, &params, None, 40, 0);
        let side = extend(&mut index, &params, Some(main[10]), 60, 1000);
        let mut chain = ActiveChain::new();
        assert_eq!(chain.find_fork(&index, main[3]), None);

        chain.set_tip(&index, main.last().copied());
        assert_eq!(chain.find_fork(&index, *side.last().unwrap()), Some(main[10]));
        assert_eq!(chain.find_fork(&index, main[7]), Some(main[7]));
    }

    #[test]
    fn test_find_earliest_at_least() {
        let params = ConsensusParams::regtest();
        let mut index = BlockIndex::new();
        let main = extend(&mut index, &params, None, 20, 0);
        let mut chain = ActiveChain::new();
        chain.set_tip(&index, main.last().copied());

        assert_eq!(chain.find_earliest_at_least(&index, 0), Some(main[0]));
        assert_eq!(chain.find_earliest_at_least(&index, 1_600_000_000 + 150 * 7), Some(main[7]));
        assert_eq!(chain.find_earliest_at_least(&index, 1_600_000_000 + 150 * 7 + 1), Some(main[8]));
        assert_eq!(chain.find_earliest_at_least(&index, u32::MAX), None);
    }
}
