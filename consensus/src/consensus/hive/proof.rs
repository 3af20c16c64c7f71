//! The bee proof carried in output 0 of a bee-mined block's coinbase.
//!
//! Layout, offsets in bytes:
//!
//! | offset | field |
//! |---|---|
//! | 0 | `OP_RETURN` |
//! | 1 | `OP_BEE` |
//! | 2 | push length, 4 |
//! | 3..7 | bee nonce, little endian |
//! | 7 | push length, 4 |
//! | 8..12 | claimed height of the bee creation transaction, little endian |
//! | 12 | community contribution flag, `OP_TRUE` when set |
//! | 13 | push length, 64 |
//! | 14..78 | bee creation txid as ascii hex |
//! | 78 | push length, 65 |
//! | 79..144 | compact recoverable signature |

use consensus_core::constants::{BEE_PROOF_SCRIPT_MIN_SIZE, BEE_PROOF_TXID_HEX_LEN, COMPACT_SIGNATURE_SIZE};
use consensus_core::script::{Opcode, Script};
use consensus_core::Hash;
use thiserror::Error;

const NONCE_OFFSET: usize = 3;
const HEIGHT_OFFSET: usize = 8;
const FLAG_OFFSET: usize = 12;
const TXID_OFFSET: usize = 14;
const SIGNATURE_OFFSET: usize = 79;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BeeProofDecodeError {
    #[error("script of {0} bytes is too short for a bee proof")]
    TooShort(usize),

    #[error("script does not start with OP_RETURN OP_BEE")]
    BadPrefix,

    #[error("bee creation txid is not hex")]
    BadTxid,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BeeProof {
    pub nonce: u32,
    /// Height at which the prover says the bee creation transaction was mined.
    pub claimed_height: u32,
    pub community_contrib: bool,
    /// The txid exactly as written in the script; the bee hash commits to this text.
    pub txid_hex: String,
    pub signature: [u8; COMPACT_SIGNATURE_SIZE],
}

impl BeeProof {
    pub fn decode(script: &Script) -> Result<Self, BeeProofDecodeError> {
        let bytes = script.as_bytes();
        if bytes.len() < BEE_PROOF_SCRIPT_MIN_SIZE {
            return Err(BeeProofDecodeError::TooShort(bytes.len()));
        }
        if !script.has_bee_proof_prefix() {
            return Err(BeeProofDecodeError::BadPrefix);
        }

        let txid_bytes = &bytes[TXID_OFFSET..TXID_OFFSET + BEE_PROOF_TXID_HEX_LEN];
        if !txid_bytes.iter().all(u8::is_ascii_hexdigit) {
            return Err(BeeProofDecodeError::BadTxid);
        }
        let txid_hex = String::from_utf8(txid_bytes.to_vec()).map_err(|_| BeeProofDecodeError::BadTxid)?;

        let mut signature = [0u8; COMPACT_SIGNATURE_SIZE];
        signature.copy_from_slice(&bytes[SIGNATURE_OFFSET..SIGNATURE_OFFSET + COMPACT_SIGNATURE_SIZE]);

        Ok(Self {
            nonce: read_le32(bytes, NONCE_OFFSET),
            claimed_height: read_le32(bytes, HEIGHT_OFFSET),
            community_contrib: bytes[FLAG_OFFSET] == Opcode::OP_TRUE as u8,
            txid_hex,
            signature,
        })
    }

    /// The bee creation txid.
    pub fn txid(&self) -> Hash {
        // Decoding only accepts 64 hex digits.
        Hash::from_hex(&self.txid_hex).unwrap_or_default()
    }

    pub fn encode(&self) -> Script {
        let mut bytes = Vec::with_capacity(BEE_PROOF_SCRIPT_MIN_SIZE);
        bytes.push(Opcode::OP_RETURN.into());
        bytes.push(Opcode::OP_BEE.into());
        bytes.push(4);
        bytes.extend_from_slice(&self.nonce.to_le_bytes());
        bytes.push(4);
        bytes.extend_from_slice(&self.claimed_height.to_le_bytes());
        bytes.push(if self.community_contrib { Opcode::OP_TRUE.into() } else { Opcode::OP_FALSE.into() });
        bytes.push(BEE_PROOF_TXID_HEX_LEN as u8);
        bytes.extend_from_slice(self.txid_hex.as_bytes());
        bytes.push(COMPACT_SIGNATURE_SIZE as u8);
        bytes.extend_from_slice(&self.signature);
        Script::new(bytes)
    }
}

fn read_le32(bytes: &[u8], offset: usize) -> u32 {
    let mut word = [0u8; 4];
    word.copy_from_slice(&bytes[offset..offset + 4]);
    u32::from_le_bytes(word)
}
