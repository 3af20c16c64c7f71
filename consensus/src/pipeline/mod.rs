//! Block processing pipeline for consensus
//!
//! Validates candidate blocks against the chain state and hands accepted ones to chain selection.

pub mod block_processor;

pub use block_processor::{BlockProcessError, BlockProcessor};
