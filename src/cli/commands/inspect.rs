use crate::cli::{print_json, InspectionReport};
use crate::config::{BitcoinNetwork, InspectorConfig};
use crate::errors::{AppError, AppResult};
use crate::inspector::{InspectRequest, MessageInspector};
use clap::Args;
use tracing::{error, info};

/// Resolve a Catenis message
#[derive(Args)]
pub struct InspectCommand {
    /// ID of the transaction that recorded (or settled) the message
    #[arg(long)]
    pub txid: Option<String>,

    /// IPFS CID of the off-chain message envelope
    ///
    /// Off-chain envelopes and batch documents are read in this tool's JSON
    /// form, not the binary encoding published by Catenis.
    #[arg(long)]
    pub off_chain_cid: Option<String>,

    /// Bitcoin network (overrides ctn-inspector config)
    #[arg(long, value_enum)]
    pub network: Option<BitcoinNetwork>,

    /// Block explorer API root URL (overrides ctn-inspector config)
    #[arg(long)]
    pub explorer_url: Option<String>,

    /// Raw transaction hex endpoint, containing ':txid' (overrides ctn-inspector config)
    #[arg(long)]
    pub explorer_endpoint: Option<String>,

    /// IPFS gateway URL (overrides ctn-inspector config)
    #[arg(long)]
    pub ipfs_gateway: Option<String>,

    /// Per-request timeout in milliseconds, for both explorer and gateway
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Report externally stored messages by reference only
    #[arg(long)]
    pub no_fetch_message: bool,
}

impl InspectCommand {
    pub async fn run(&self) -> AppResult<()> {
        let config = self.effective_config()?;

        info!(
            "Using block explorer {} and IPFS gateway {}",
            config.explorer_root_url(),
            config.ipfs_gateway.url
        );

        let inspector = MessageInspector::from_config(&config)?;

        let request = InspectRequest {
            txid: self.txid.clone(),
            off_chain_cid: self.off_chain_cid.clone(),
            resolve_external_message: !self.no_fetch_message,
        };

        let result = inspector.inspect(&request).await.map_err(|e| {
            error!("Inspection failed ({:?}): {}", e.kind(), e);
            AppError::from(e)
        })?;

        print_json(&InspectionReport::from(&result))
    }

    /// Loaded configuration with command line overrides applied
    fn effective_config(&self) -> AppResult<InspectorConfig> {
        let mut config = InspectorConfig::load()?;

        if let Some(network) = self.network {
            config.network = network;
        }
        if let Some(url) = &self.explorer_url {
            config.block_explorer.root_url = Some(url.clone());
        }
        if let Some(endpoint) = &self.explorer_endpoint {
            config.block_explorer.raw_tx_hex_endpoint = endpoint.clone();
        }
        if let Some(url) = &self.ipfs_gateway {
            config.ipfs_gateway.url = url.clone();
        }
        if let Some(timeout_ms) = self.timeout_ms {
            if timeout_ms == 0 {
                return Err(AppError::Config(
                    "--timeout-ms must be greater than zero".to_string(),
                ));
            }
            config.block_explorer.timeout_ms = timeout_ms;
            config.ipfs_gateway.timeout_ms = timeout_ms;
        }

        Ok(config)
    }
}
