use crate::chain::{self, classify, IoFingerprint};
use crate::cli::{print_json, InspectionReport};
use crate::config::BitcoinNetwork;
use crate::errors::AppResult;
use crate::inspector::inspect_transaction_hex;
use crate::types::MessageTxType;
use clap::Args;
use serde::Serialize;

/// Classify a raw transaction offline
#[derive(Args)]
pub struct ClassifyTxCommand {
    /// Hex-encoded raw transaction
    pub hex: String,

    /// Bitcoin network used to encode device addresses
    #[arg(long, value_enum, default_value = "main")]
    pub network: BitcoinNetwork,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ClassificationReport<'a> {
    input_fingerprint: &'a str,
    output_fingerprint: &'a str,
    candidates: Vec<MessageTxType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inspection: Option<InspectionReport<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl ClassifyTxCommand {
    pub fn run(&self) -> AppResult<()> {
        let tx = chain::parse_transaction_hex(&self.hex)?;
        let fingerprint = IoFingerprint::from_transaction(&tx);
        let candidates = classify(&fingerprint).unwrap_or_default();

        let inspection = inspect_transaction_hex(&self.hex, self.network.to_bitcoin());

        let (inspection, error) = match &inspection {
            Ok(result) => (Some(InspectionReport::from(result)), None),
            Err(e) => (None, Some(e.to_string())),
        };

        print_json(&ClassificationReport {
            input_fingerprint: fingerprint.input(),
            output_fingerprint: fingerprint.output(),
            candidates,
            inspection,
            error,
        })
    }
}
