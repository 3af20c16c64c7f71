//! hived - Hive chain operator tool
//!
//! Dumps network parameters, decodes compact targets and grows regtest chains that mix PoW and
//! bee-mined blocks, driving the consensus and mining crates the way a node would.

pub mod cli;
pub mod commands;
pub mod config;
pub mod simulator;
pub mod ui;

pub use cli::Args;
pub use config::Config;
pub use simulator::{SimulationPlan, SimulationReport, Simulator};
