use crate::hasher::{ConsensusWrite, HashWriter};
use crate::Hash;

/// Incremental builder for bee hashes.
///
/// A bee hash commits to the deterministic random string of the parent block, the hex id of the
/// bee creation transaction and the bee nonce. The prefix is absorbed once so that scanning many
/// nonces of the same transaction only hashes the trailing four bytes.
#[derive(Clone)]
pub struct BeeHashBuilder {
    prefix: HashWriter,
}

impl BeeHashBuilder {
    pub fn new(deterministic_rand: &str, txid_hex: &str) -> Self {
        let mut prefix = HashWriter::new();
        prefix.put_var_str(deterministic_rand);
        prefix.put_var_str(txid_hex);
        Self { prefix }
    }

    pub fn finalize_with_nonce(&self, nonce: u32) -> Hash {
        let mut writer = self.prefix.clone();
        writer.put_u32_le(nonce);
        writer.finalize()
    }
}

/// Hash of the message a bee proof signs: the deterministic random string of the parent block.
pub fn bee_signature_message(deterministic_rand: &str) -> Hash {
    let mut writer = HashWriter::new();
    writer.put_var_str(deterministic_rand);
    writer.finalize()
}
