//! Device identity derivation
//!
//! A Catenis device is identified by the public key hash it pays from (origin)
//! or to (target). Derivation never fails an inspection: anything unexpected is
//! logged and the identity is left out.

use bitcoin::hashes::Hash;
use bitcoin::{Address, Network, TxIn, TxOut};
use tracing::warn;

use crate::chain::script::{output_pubkey_hash, p2pkh_input_pubkey, p2wpkh_input_pubkey};
use crate::chain::IoToken;
use crate::types::DeviceInfo;

/// Identity of the device that spent `input`, classified as `token`
pub fn origin_device(input: &TxIn, token: IoToken, network: Network) -> Option<DeviceInfo> {
    let device = match token {
        IoToken::WitnessPubKeyHash => p2wpkh_input_pubkey(input).map(|pubkey| DeviceInfo {
            address: Some(Address::p2wpkh(&pubkey, network).to_string()),
            pub_key_hash: pubkey.wpubkey_hash().to_byte_array().to_vec(),
        }),
        IoToken::PubKeyHash => p2pkh_input_pubkey(input).map(|pubkey| DeviceInfo {
            address: Some(Address::p2pkh(pubkey.pubkey_hash(), network).to_string()),
            pub_key_hash: pubkey.pubkey_hash().to_byte_array().to_vec(),
        }),
        IoToken::NullData | IoToken::Unknown => None,
    };

    if device.is_none() {
        warn!(
            "Unable to derive origin device from {} input {}",
            token.description(),
            input.previous_output
        );
    }

    device
}

/// Identity of the device paid by `output`
pub fn target_device(output: &TxOut, network: Network) -> Option<DeviceInfo> {
    let Some(pub_key_hash) = output_pubkey_hash(&output.script_pubkey) else {
        warn!("Unable to derive target device: output is not a public key hash payment");
        return None;
    };

    let address = match Address::from_script(&output.script_pubkey, network) {
        Ok(address) => Some(address.to_string()),
        Err(e) => {
            warn!("Unable to derive target device address: {}", e);
            None
        }
    };

    Some(DeviceInfo {
        address,
        pub_key_hash: pub_key_hash.to_vec(),
    })
}
