//! Consensus encodings and the ids derived from them.

pub mod header;
pub mod tx;
