use crate::Hash;
use ripemd::Ripemd160;
use sha2::{Digest, Sha256};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HashError {
    InvalidLength(usize),
    InvalidHex(String),
}

impl fmt::Display for HashError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HashError::InvalidLength(len) => write!(f, "invalid hash length: {} bytes", len),
            HashError::InvalidHex(msg) => write!(f, "invalid hash hex: {}", msg),
        }
    }
}

impl std::error::Error for HashError {}

/// Compute SHA256(SHA256(data))
pub fn double_sha256(data: &[u8]) -> Hash {
    let first = Sha256::digest(data);
    let second = Sha256::digest(first);
    Hash::from_bytes(second.into())
}

/// Compute SHA256(data)
pub fn sha256(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

/// Compute RIPEMD160(SHA256(data)), the key and script id hash.
pub fn hash160(data: &[u8]) -> [u8; 20] {
    Ripemd160::digest(Sha256::digest(data)).into()
}

/// Sink for the consensus byte encoding: little-endian integers and compact-size prefixed byte strings.
pub trait ConsensusWrite {
    fn put(&mut self, bytes: &[u8]);

    fn put_u8(&mut self, v: u8) {
        self.put(&[v]);
    }

    fn put_u32_le(&mut self, v: u32) {
        self.put(&v.to_le_bytes());
    }

    fn put_i32_le(&mut self, v: i32) {
        self.put(&v.to_le_bytes());
    }

    fn put_i64_le(&mut self, v: i64) {
        self.put(&v.to_le_bytes());
    }

    fn put_compact_size(&mut self, n: u64) {
        if n < 0xfd {
            self.put_u8(n as u8);
        } else if n <= 0xffff {
            self.put_u8(0xfd);
            self.put(&(n as u16).to_le_bytes());
        } else if n <= 0xffff_ffff {
            self.put_u8(0xfe);
            self.put(&(n as u32).to_le_bytes());
        } else {
            self.put_u8(0xff);
            self.put(&n.to_le_bytes());
        }
    }

    fn put_var_bytes(&mut self, bytes: &[u8]) {
        self.put_compact_size(bytes.len() as u64);
        self.put(bytes);
    }

    fn put_var_str(&mut self, s: &str) {
        self.put_var_bytes(s.as_bytes());
    }

    fn put_hash(&mut self, hash: &Hash) {
        self.put(hash.as_bytes());
    }
}

impl ConsensusWrite for Vec<u8> {
    fn put(&mut self, bytes: &[u8]) {
        self.extend_from_slice(bytes);
    }
}

/// Incremental double SHA-256 over the consensus encoding.
#[derive(Clone)]
pub struct HashWriter(Sha256);

impl HashWriter {
    pub fn new() -> Self {
        Self(Sha256::new())
    }

    /// Single SHA-256 of everything written so far.
    pub fn finalize_single(self) -> [u8; 32] {
        self.0.finalize().into()
    }

    /// Double SHA-256 of everything written so far.
    pub fn finalize(self) -> Hash {
        let first = self.0.finalize();
        Hash::from_bytes(Sha256::digest(first).into())
    }
}

impl ConsensusWrite for HashWriter {
    fn put(&mut self, bytes: &[u8]) {
        self.0.update(bytes);
    }
}

impl Default for HashWriter {
    fn default() -> Self {
        Self::new()
    }
}
