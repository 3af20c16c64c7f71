use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "hived")]
#[command(about = "Hive chain operator tool", long_about = None)]
pub struct Args {
    /// Path to configuration file (optional, uses defaults if not provided)
    #[arg(short, long)]
    pub config_path: Option<PathBuf>,

    /// Network (mainnet, testnet, regtest)
    #[arg(short, long)]
    pub network: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    pub log_level: String,

    /// Bee mining threads (-2 for all cores but one, 0 for one)
    #[arg(long, allow_hyphen_values = true)]
    pub bee_threads: Option<i32>,

    /// Keep searching after the tip changes
    #[arg(long)]
    pub no_early_abort: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print the consensus parameters of the configured network as JSON
    Params,

    /// Decode a compact target
    DecodeBits {
        /// Compact bits as hex, with or without a 0x prefix
        bits: String,
    },

    /// Grow a regtest chain with PoW and bee-mined blocks and report the bee population
    Simulate {
        /// Blocks to add on top of genesis
        #[arg(long, default_value_t = 60)]
        blocks: u32,

        /// Bees bought at height 2
        #[arg(long, default_value_t = 200)]
        bees: u32,

        /// Include the bee population graph in the report
        #[arg(long)]
        graph: bool,
    },

    /// Print the effective configuration as TOML
    ShowConfig,
}

pub fn parse_args() -> Args {
    Args::parse()
}

/// Parses a compact target given as hex.
pub fn parse_bits(input: &str) -> Result<u32, String> {
    let digits = input.trim().trim_start_matches("0x").trim_start_matches("0X");
    u32::from_str_radix(digits, 16).map_err(|e| format!("Invalid compact bits '{}': {}", input, e))
}
