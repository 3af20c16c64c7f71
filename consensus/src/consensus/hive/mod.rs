//! The Hive: blocks mined by bees instead of hashing.
//!
//! Bees are bought on chain with bee creation transactions. Once mature, each bee is a lottery
//! ticket: its hash over the deterministic random string of the tip either meets the bee target
//! or it does not.

pub mod errors;
pub mod network_info;
pub mod proof;
pub mod rand;
pub mod signature;
pub mod validator;

pub use errors::HiveProofError;
pub use network_info::{network_hive_info, BeePopGraphPoint, HiveInfoError, NetworkHiveInfo};
pub use proof::{BeeProof, BeeProofDecodeError};
pub use rand::deterministic_rand_string;
pub use validator::{bee_blocks_at_tip, BeeProofSummary, HiveProofValidator};
