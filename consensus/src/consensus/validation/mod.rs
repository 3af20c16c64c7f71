//! Validation module for consensus
//!
//! Proof checks for candidate blocks:
//! - the proof-of-work hash against the claimed compact target
//! - the claimed target against the retarget for the block's path
//! - dispatch to the bee proof engine for bee-mined blocks

pub mod block;
pub mod header;
pub mod pow;

pub use block::{validate_block_proof, BlockProofError};
pub use header::check_header_target;
pub use pow::{check_proof_of_work, hash_to_u256, validate_proof_of_work, PowError};
