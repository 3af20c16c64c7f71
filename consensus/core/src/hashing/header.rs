use crate::constants::HEADER_SIZE;
use crate::errors::{ConsensusError, ConsensusResult};
use crate::header::BlockHeader;
use crate::Hash;
use hive_hashes::{double_sha256, ConsensusWrite};

/// Serializes a header into its 80-byte consensus encoding.
pub fn serialize(header: &BlockHeader) -> [u8; HEADER_SIZE] {
    let mut bytes = Vec::with_capacity(HEADER_SIZE);
    bytes.put_i32_le(header.version);
    bytes.put_hash(&header.prev_block_hash);
    bytes.put_hash(&header.merkle_root);
    bytes.put_u32_le(header.time);
    bytes.put_u32_le(header.bits);
    bytes.put_u32_le(header.nonce);

    let mut out = [0u8; HEADER_SIZE];
    out.copy_from_slice(&bytes);
    out
}

/// Parses an 80-byte header.
pub fn deserialize(bytes: &[u8]) -> ConsensusResult<BlockHeader> {
    if bytes.len() < HEADER_SIZE {
        return Err(ConsensusError::UnexpectedEof("block header"));
    }
    if bytes.len() > HEADER_SIZE {
        return Err(ConsensusError::TrailingBytes("block header"));
    }
    let word = |at: usize| [bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]];
    let hash_at = |at: usize| {
        let mut h = [0u8; 32];
        h.copy_from_slice(&bytes[at..at + 32]);
        Hash::from_bytes(h)
    };
    Ok(BlockHeader {
        version: i32::from_le_bytes(word(0)),
        prev_block_hash: hash_at(4),
        merkle_root: hash_at(36),
        time: u32::from_le_bytes(word(68)),
        bits: u32::from_le_bytes(word(72)),
        nonce: u32::from_le_bytes(word(76)),
    })
}

/// Computes the hash of a block header
pub fn hash(header: &BlockHeader) -> Hash {
    double_sha256(&serialize(header))
}
