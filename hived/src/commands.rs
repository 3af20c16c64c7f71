//! Subcommand implementations. Each returns its output so the binary only prints.

use consensus::check_proof_of_work;
use consensus_core::{ConsensusParams, Hash, NetworkType};
use hive_math::{difficulty_from_bits, CompactTarget};
use serde::Serialize;

use crate::config::Config;
use crate::simulator::{SimulationError, SimulationPlan, SimulationReport, Simulator};

/// Consensus parameters of `network` as pretty JSON.
pub fn params_json(network: NetworkType) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&ConsensusParams::for_network(network))
}

/// A compact target taken apart.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BitsReport {
    pub bits: String,
    pub target: String,
    pub negative: bool,
    pub overflow: bool,
    pub difficulty: f64,
    /// Why a header carrying these bits would fail the PoW range check, if it would.
    pub range_error: Option<String>,
}

pub fn decode_bits(bits: u32, params: &ConsensusParams) -> BitsReport {
    let compact = CompactTarget::from_bits(bits);
    BitsReport {
        bits: format!("{:08x}", bits),
        target: format!("{:064x}", compact.value),
        negative: compact.negative,
        overflow: compact.overflow,
        difficulty: difficulty_from_bits(bits),
        // The zero hash meets every target, so only range failures remain.
        range_error: check_proof_of_work(&Hash::zeroed(), bits, params).err().map(|e| e.to_string()),
    }
}

/// Runs a regtest simulation with the configured bee miner.
pub fn simulate(config: &Config, plan: &SimulationPlan) -> Result<SimulationReport, SimulationError> {
    let mut simulator = Simulator::new(config.bee_mining.clone())?;
    let report = simulator.run(plan)?;
    tracing::debug!("{}", simulator.miner().session_stats().format_summary());
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_json_names_network() {
        let json = params_json(NetworkType::Regtest).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["bee_gestation_blocks"], 10);
        assert_eq!(value["hive_nonce_marker"], 192);
    }

    #[test]
    fn test_decode_bits() {
        let params = ConsensusParams::regtest();
        let report = decode_bits(0x207f_ffff, &params);
        assert_eq!(report.target, format!("7fffff{}", "0".repeat(58)));
        assert!(!report.negative && !report.overflow);
        assert_eq!(report.range_error, None);

        let report = decode_bits(0x0492_3456, &params);
        assert!(report.negative);
        assert!(report.range_error.is_some());
    }
}
