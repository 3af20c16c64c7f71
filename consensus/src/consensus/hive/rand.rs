use consensus_core::constants::DETERMINISTIC_RAND_DEPTH;
use hive_hashes::{ConsensusWrite, HashWriter};

use crate::consensus::chain::{BlockIndex, NodeId};

/// The deterministic random string every prover searches against when building on `parent`.
///
/// Hex of sha256d over the hex ids of `parent` and of its ancestor `DETERMINISTIC_RAND_DEPTH`
/// blocks deeper, clamped at genesis.
pub fn deterministic_rand_string(index: &BlockIndex, parent: NodeId) -> String {
    let node = index.node(parent);
    let depth_height = node.height.saturating_sub(DETERMINISTIC_RAND_DEPTH);
    let ancestor = index
        .ancestor(parent, depth_height)
        .unwrap_or_else(|| panic!("block {} has no ancestor at height {}", node.hash, depth_height));

    let mut writer = HashWriter::new();
    writer.put_var_str(&node.hash.to_hex());
    writer.put_var_str(&index.node(ancestor).hash.to_hex());
    writer.finalize().to_hex()
}
