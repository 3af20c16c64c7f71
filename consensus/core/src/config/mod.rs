pub mod params;

pub use params::{ConsensusParams, NEVER};
