//! Consensus data types shared by the validation, mining and node crates.
//!
//! Headers, blocks and transactions carry just what the consensus core hashes and inspects.
//! [`ConsensusParams`] holds the per-network constants.

pub mod address;
pub mod block;
pub mod config;
pub mod constants;
pub mod errors;
pub mod hashing;
pub mod header;
pub mod network;
pub mod script;
pub mod subsidy;
pub mod tx;

pub use config::params::ConsensusParams;
pub use errors::{ConsensusError, ConsensusResult};
pub use hive_hashes::Hash;
pub use hive_math::U256;
pub use network::NetworkType;
