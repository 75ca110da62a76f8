//! Bitcoin transaction handling: parsing, IO fingerprinting and classification

use bitcoin::Transaction;

use crate::errors::{InspectError, InspectResult};

pub mod classifier;
pub mod fingerprint;
pub mod script;

pub use classifier::{classify, confirm, has_read_confirmation};
pub use fingerprint::IoFingerprint;
pub use script::IoToken;

/// Parse a hex-encoded serialised transaction
pub fn parse_transaction_hex(hex_tx: &str) -> InspectResult<Transaction> {
    let bytes = hex::decode(hex_tx.trim())
        .map_err(|e| InspectError::InvalidTransaction(format!("invalid hex: {}", e)))?;

    bitcoin::consensus::deserialize(&bytes)
        .map_err(|e| InspectError::InvalidTransaction(e.to_string()))
}

/// Data carried by the transaction's first null-data output, if any
pub fn embedded_data(tx: &Transaction, fingerprint: &IoFingerprint) -> Option<Vec<u8>> {
    let index = fingerprint.null_data_output_index()?;
    script::null_data_payload(&tx.output.get(index)?.script_pubkey)
}
