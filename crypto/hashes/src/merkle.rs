use crate::hasher::{ConsensusWrite, HashWriter};
use crate::Hash;

/// Merkle root over transaction ids, duplicating the last node of odd levels.
///
/// The root of an empty list is the zero hash.
pub fn merkle_root(leaves: &[Hash]) -> Hash {
    if leaves.is_empty() {
        return Hash::zeroed();
    }
    let mut level = leaves.to_vec();
    while level.len() > 1 {
        let mut next_level = Vec::with_capacity((level.len() + 1) / 2);
        for chunk in level.chunks(2) {
            let mut writer = HashWriter::new();
            match chunk {
                [left, right] => {
                    writer.put_hash(left);
                    writer.put_hash(right);
                }
                [single] => {
                    writer.put_hash(single);
                    writer.put_hash(single);
                }
                _ => unreachable!(),
            }
            next_level.push(writer.finalize());
        }
        level = next_level;
    }
    level[0]
}
