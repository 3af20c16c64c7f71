//! Block index and best chain view.

pub mod active;
pub mod index;

pub use active::ActiveChain;
pub use index::{skip_height, BlockIndex, BlockIndexNode, IndexError, NodeId};
