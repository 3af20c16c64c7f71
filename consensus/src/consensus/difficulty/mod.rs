//! Difficulty adjustment module for consensus
//!
//! Four retarget algorithms coexist: the legacy fixed window and Dark Gravity Wave for PoW
//! blocks, and two moving averages for the bee hash target. [`DifficultyManager`] picks the one
//! in force for the next block.

pub mod dgw;
pub mod hive;
pub mod legacy;
pub mod manager;

pub use manager::{DifficultyManager, ProofPath};
