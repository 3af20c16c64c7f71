//! Bee ranges and binning
//!
//! The bees of every mature bee creation transaction are laid out end to end and cut into one bin
//! per worker thread. A transaction whose bees do not fit in the current bin is split, the rest
//! starting the next bin.

use consensus_core::script::Script;
use consensus_core::Hash;

/// A mature bee creation transaction owned by the miner.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BeeCreation {
    pub txid: Hash,
    /// Height the transaction was mined at, written into the proof.
    pub height: u32,
    pub honey_script: Script,
    pub community_contrib: bool,
    pub bee_count: u32,
}

/// A contiguous run of bees from one bee creation transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BeeRange {
    /// Transaction id as reversed hex, the form the bee hash commits to.
    pub txid: String,
    pub bct_height: u32,
    pub honey_script: Script,
    pub community_contrib: bool,
    /// First bee nonce of the range.
    pub offset: u32,
    pub count: u32,
}

impl BeeRange {
    fn of(bct: &BeeCreation, offset: u32, count: u32) -> Self {
        Self {
            txid: bct.txid.to_hex(),
            bct_height: bct.height,
            honey_script: bct.honey_script.clone(),
            community_contrib: bct.community_contrib,
            offset,
            count,
        }
    }

    /// Bee nonces covered by the range.
    pub fn nonces(&self) -> std::ops::Range<u32> {
        self.offset..self.offset.saturating_add(self.count)
    }
}

/// Worker threads to use for a configured count on a machine with `cores` cores.
///
/// `-2` leaves one core free, any other negative count or one above `cores` uses every core and
/// `0` means a single thread.
pub fn thread_count(configured: i32, cores: usize) -> usize {
    let cores = cores.max(1);
    match configured {
        -2 => cores.saturating_sub(1).max(1),
        0 => 1,
        n if n < 0 || n as usize > cores => cores,
        n => n as usize,
    }
}

/// Total bees across `bcts`.
pub fn total_bees(bcts: &[BeeCreation]) -> u64 {
    bcts.iter().map(|bct| u64::from(bct.bee_count)).sum()
}

/// Splits the bees of `bcts` into at most `threads` bins of `ceil(total / threads)` bees each.
pub fn bin_bees(bcts: &[BeeCreation], threads: usize) -> Vec<Vec<BeeRange>> {
    let total = total_bees(bcts);
    if total == 0 || threads == 0 {
        return Vec::new();
    }
    let per_bin = total.div_ceil(threads as u64);

    let mut bins = Vec::with_capacity(threads);
    let mut current = Vec::new();
    let mut in_bin: u64 = 0;
    for bct in bcts.iter().filter(|bct| bct.bee_count > 0) {
        let mut offset = 0u32;
        while offset < bct.bee_count {
            let remaining = bct.bee_count - offset;
            let space = per_bin - in_bin;
            // Never more than `remaining`, which is a u32.
            let take = u64::from(remaining).min(space) as u32;
            current.push(BeeRange::of(bct, offset, take));
            offset += take;
            in_bin += u64::from(take);
            if in_bin == per_bin {
                bins.push(std::mem::take(&mut current));
                in_bin = 0;
            }
        }
    }
    if !current.is_empty() {
        bins.push(current);
    }
    bins
}
