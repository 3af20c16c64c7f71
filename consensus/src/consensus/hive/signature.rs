//! Compact recoverable signatures over bee proof messages.
//!
//! The first byte is `27 + recovery id`, plus 4 when the signing key is serialized compressed.
//! The remaining 64 bytes are `r || s`.

use consensus_core::constants::COMPACT_SIGNATURE_SIZE;
use consensus_core::script::KeyId;
use consensus_core::Hash;
use hive_hashes::hash160;
use secp256k1::ecdsa::{RecoverableSignature, RecoveryId};
use secp256k1::{Message, PublicKey, Secp256k1, SecretKey, Signing, Verification};

const HEADER_BASE: u8 = 27;
const COMPRESSED_FLAG: u8 = 4;

/// Recovers the signing key from a compact signature and returns its hash160.
pub fn recover_key_id<C: Verification>(
    secp: &Secp256k1<C>,
    message: &Hash,
    signature: &[u8; COMPACT_SIGNATURE_SIZE],
) -> Option<KeyId> {
    let header = signature[0].checked_sub(HEADER_BASE)?;
    if header > 7 {
        return None;
    }
    let compressed = header & COMPRESSED_FLAG != 0;
    let recovery_id = RecoveryId::from_i32(i32::from(header & 3)).ok()?;
    let sig = RecoverableSignature::from_compact(&signature[1..], recovery_id).ok()?;
    let msg = Message::from_slice(message.as_bytes()).ok()?;
    let pubkey = secp.recover_ecdsa(&msg, &sig).ok()?;
    Some(key_id(&pubkey, compressed))
}

/// Signs `message` with `secret_key` in compact recoverable form.
pub fn sign_compact<C: Signing>(
    secp: &Secp256k1<C>,
    message: &Hash,
    secret_key: &SecretKey,
    compressed: bool,
) -> [u8; COMPACT_SIGNATURE_SIZE] {
    // A 32-byte hash is always a valid message.
    let msg = Message::from_slice(message.as_bytes()).unwrap_or_else(|e| panic!("32-byte message rejected: {}", e));
    let (recovery_id, sig) = secp.sign_ecdsa_recoverable(&msg, secret_key).serialize_compact();
    let mut out = [0u8; COMPACT_SIGNATURE_SIZE];
    out[0] = HEADER_BASE + recovery_id.to_i32() as u8 + if compressed { COMPRESSED_FLAG } else { 0 };
    out[1..].copy_from_slice(&sig);
    out
}

/// hash160 of the public key in the chosen serialization.
pub fn key_id(pubkey: &PublicKey, compressed: bool) -> KeyId {
    if compressed {
        KeyId(hash160(&pubkey.serialize()))
    } else {
        KeyId(hash160(&pubkey.serialize_uncompressed()))
    }
}
