use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Base name of the optional configuration file (`ctn-inspector.toml`, `.json`, ...)
pub const CONFIG_FILE_NAME: &str = "ctn-inspector";

/// Prefix of environment variables overriding configuration values,
/// e.g. `CTN_INSPECTOR_NETWORK` or `CTN_INSPECTOR_IPFS_GATEWAY__URL`
pub const ENV_PREFIX: &str = "CTN_INSPECTOR";

pub const DEFAULT_RAW_TX_HEX_ENDPOINT: &str = "tx/:txid/hex";
pub const DEFAULT_IPFS_GATEWAY_URL: &str = "https://ipfs.catenis.io";
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Bitcoin network the inspected transactions belong to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BitcoinNetwork {
    #[default]
    Main,
    Testnet,
}

impl BitcoinNetwork {
    pub fn to_bitcoin(self) -> bitcoin::Network {
        match self {
            BitcoinNetwork::Main => bitcoin::Network::Bitcoin,
            BitcoinNetwork::Testnet => bitcoin::Network::Testnet,
        }
    }

    /// Public block explorer used when no root URL is configured
    pub fn default_explorer_root(self) -> &'static str {
        match self {
            BitcoinNetwork::Main => "https://blockstream.info/api/",
            BitcoinNetwork::Testnet => "https://blockstream.info/testnet/api/",
        }
    }
}

/// Inspector configuration loaded from defaults, an optional file and environment variables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InspectorConfig {
    pub network: BitcoinNetwork,
    pub block_explorer: BlockExplorerConfig,
    pub ipfs_gateway: IpfsGatewayConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockExplorerConfig {
    /// Overrides the network's default explorer root
    #[serde(default)]
    pub root_url: Option<String>,
    /// Path template relative to the root; `:txid` is replaced by the TXID
    pub raw_tx_hex_endpoint: String,
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IpfsGatewayConfig {
    pub url: String,
    pub timeout_ms: u64,
}

impl Default for InspectorConfig {
    fn default() -> Self {
        Self {
            network: BitcoinNetwork::default(),
            block_explorer: BlockExplorerConfig {
                root_url: None,
                raw_tx_hex_endpoint: DEFAULT_RAW_TX_HEX_ENDPOINT.to_string(),
                timeout_ms: DEFAULT_TIMEOUT_MS,
            },
            ipfs_gateway: IpfsGatewayConfig {
                url: DEFAULT_IPFS_GATEWAY_URL.to_string(),
                timeout_ms: DEFAULT_TIMEOUT_MS,
            },
        }
    }
}

impl InspectorConfig {
    /// Load configuration from `ctn-inspector.*` in the working directory and
    /// `CTN_INSPECTOR_*` environment variables
    /// Environment variables take precedence over file configuration
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Path::new(CONFIG_FILE_NAME))
    }

    /// Same as [`InspectorConfig::load`] with an explicit (optional) file
    pub fn load_from(file: &Path) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let file_name = file.to_string_lossy();

        let config = Config::builder()
            .set_default("network", "main")?
            .set_default(
                "block_explorer.raw_tx_hex_endpoint",
                defaults.block_explorer.raw_tx_hex_endpoint,
            )?
            .set_default("block_explorer.timeout_ms", defaults.block_explorer.timeout_ms)?
            .set_default("ipfs_gateway.url", defaults.ipfs_gateway.url)?
            .set_default("ipfs_gateway.timeout_ms", defaults.ipfs_gateway.timeout_ms)?
            .add_source(File::with_name(&file_name).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let inspector_config: InspectorConfig = config.try_deserialize()?;
        inspector_config.validate()?;

        Ok(inspector_config)
    }

    /// Effective block explorer root URL
    pub fn explorer_root_url(&self) -> &str {
        self.block_explorer
            .root_url
            .as_deref()
            .unwrap_or_else(|| self.network.default_explorer_root())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.block_explorer.timeout_ms == 0 || self.ipfs_gateway.timeout_ms == 0 {
            return Err(ConfigError::Message(
                "Request timeouts must be greater than zero".to_string(),
            ));
        }

        if !self.block_explorer.raw_tx_hex_endpoint.contains(":txid") {
            return Err(ConfigError::Message(
                "block_explorer.raw_tx_hex_endpoint must contain the ':txid' placeholder"
                    .to_string(),
            ));
        }

        Ok(())
    }
}
