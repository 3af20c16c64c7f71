use consensus_core::network::NetworkType;
use consensus_core::ConsensusError;
use mining::BeeMiningConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read { path: PathBuf, source: std::io::Error },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error(transparent)]
    Network(#[from] ConsensusError),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub network: NetworkConfig,
    pub logging: LoggingConfig,
    pub bee_mining: BeeMiningConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub network_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self { network_id: NetworkType::Mainnet.to_string() }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string() }
    }
}

impl Config {
    /// Load configuration from file if it exists, otherwise use defaults
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let content =
            fs::read_to_string(path).map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        let config: Config = toml::from_str(&content)?;
        config.network_type()?;
        Ok(config)
    }

    /// Load default configuration for network
    pub fn for_network(network: &str) -> Result<Self, ConfigError> {
        let network: NetworkType = network.parse()?;
        let mut config = Config::default();
        config.network.network_id = network.to_string();
        Ok(config)
    }

    pub fn network_type(&self) -> Result<NetworkType, ConfigError> {
        Ok(self.network.network_id.parse()?)
    }

    /// Override config with CLI arguments
    pub fn apply_cli_overrides(&mut self, args: &crate::cli::Args) -> Result<(), ConfigError> {
        if let Some(network) = &args.network {
            let network: NetworkType = network.parse()?;
            self.network.network_id = network.to_string();
        }
        if let Some(threads) = args.bee_threads {
            self.bee_mining.threads = threads;
        }
        if args.no_early_abort {
            self.bee_mining.early_abort = false;
        }
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}
