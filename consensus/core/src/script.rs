use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::P2PKH_SCRIPT_SIZE;

/// Script opcodes used by the consensus templates.
#[allow(non_camel_case_types)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Opcode {
    OP_0 = 0x00,
    OP_TRUE = 0x51,
    OP_RETURN = 0x6a,
    OP_DUP = 0x76,
    OP_EQUALVERIFY = 0x88,
    OP_HASH160 = 0xa9,
    OP_CHECKSIG = 0xac,
    /// Marks bee creation outputs and bee proofs (the former OP_NOP10).
    OP_BEE = 0xb9,
}

impl Opcode {
    pub const OP_FALSE: Opcode = Opcode::OP_0;
}

impl From<Opcode> for u8 {
    fn from(op: Opcode) -> u8 {
        op as u8
    }
}

/// hash160 of a serialized public key.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct KeyId(pub [u8; 20]);

impl fmt::Debug for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyId({})", hex::encode(self.0))
    }
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

/// A serialized output script.
#[derive(Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Script(Vec<u8>);

impl Script {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `OP_DUP OP_HASH160 <20 bytes> OP_EQUALVERIFY OP_CHECKSIG`
    pub fn p2pkh(key_id: &KeyId) -> Self {
        let mut bytes = Vec::with_capacity(P2PKH_SCRIPT_SIZE);
        bytes.push(Opcode::OP_DUP.into());
        bytes.push(Opcode::OP_HASH160.into());
        bytes.push(20);
        bytes.extend_from_slice(&key_id.0);
        bytes.push(Opcode::OP_EQUALVERIFY.into());
        bytes.push(Opcode::OP_CHECKSIG.into());
        Self(bytes)
    }

    /// Returns the key hash when this is a pay-to-pubkey-hash script.
    pub fn p2pkh_key_id(&self) -> Option<KeyId> {
        let b = &self.0;
        if b.len() == P2PKH_SCRIPT_SIZE
            && b[0] == Opcode::OP_DUP as u8
            && b[1] == Opcode::OP_HASH160 as u8
            && b[2] == 20
            && b[23] == Opcode::OP_EQUALVERIFY as u8
            && b[24] == Opcode::OP_CHECKSIG as u8
        {
            let mut id = [0u8; 20];
            id.copy_from_slice(&b[3..23]);
            Some(KeyId(id))
        } else {
            None
        }
    }

    /// True when the script starts with `OP_RETURN OP_BEE`, the bee proof prefix.
    pub fn has_bee_proof_prefix(&self) -> bool {
        self.0.len() >= 2 && self.0[0] == Opcode::OP_RETURN as u8 && self.0[1] == Opcode::OP_BEE as u8
    }

    /// Builds a bee creation script: the bee creation address script, `OP_RETURN OP_BEE`, then the honey script.
    pub fn bee_creation(bee_creation_script: &Script, honey_script: &Script) -> Self {
        let mut bytes = Vec::with_capacity(bee_creation_script.len() + 2 + honey_script.len());
        bytes.extend_from_slice(bee_creation_script.as_bytes());
        bytes.push(Opcode::OP_RETURN.into());
        bytes.push(Opcode::OP_BEE.into());
        bytes.extend_from_slice(honey_script.as_bytes());
        Self(bytes)
    }

    /// Matches the bee creation template against `bee_creation_script` and returns the honey script.
    pub fn bee_creation_honey_script(&self, bee_creation_script: &Script) -> Option<Script> {
        let prefix = bee_creation_script.as_bytes();
        let b = &self.0;
        if b.len() <= prefix.len() + 2 || !b.starts_with(prefix) {
            return None;
        }
        if b[prefix.len()] != Opcode::OP_RETURN as u8 || b[prefix.len() + 1] != Opcode::OP_BEE as u8 {
            return None;
        }
        Some(Script(b[prefix.len() + 2..].to_vec()))
    }

    pub fn is_bee_creation(&self, bee_creation_script: &Script) -> bool {
        self.bee_creation_honey_script(bee_creation_script).is_some()
    }
}

impl From<Vec<u8>> for Script {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for Script {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Script({})", hex::encode(&self.0))
    }
}
