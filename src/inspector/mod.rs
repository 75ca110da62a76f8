//! Catenis message resolution
//!
//! [`MessageInspector`] walks from a transaction id and/or an off-chain message
//! envelope CID to the message itself:
//!
//! 1. fetch the transaction, fingerprint its inputs and outputs, and shortlist
//!    the message transaction types whose shape fits
//! 2. decode the envelope in the null-data output and confirm the type with its
//!    function byte
//! 3. for a settlement, fetch the batch document and, when given, the off-chain
//!    envelope, which must be a member of that batch
//! 4. fetch the external message from IPFS when the message is not embedded
//!
//! Every step is fatal on failure, except device identity derivation.

use bitcoin::{Network, Transaction, Txid};
use std::str::FromStr;
use tracing::{debug, info};

use crate::chain::{self, classify, confirm, has_read_confirmation, IoFingerprint};
use crate::config::InspectorConfig;
use crate::envelope::{self, EnvelopeContent};
use crate::errors::{FetchResult, InspectError, InspectResult, Stage};
use crate::fetch::{BlockExplorerClient, ContentSource, IpfsGatewayClient, TransactionSource};
use crate::offchain::{
    BatchDocument, JsonOffChainProtocol, OffChainEnvelope, OffChainMessageKind, OffChainProtocol,
};
use crate::types::{
    ContentId, DeviceInfo, InspectionResult, MessageOptions, MessageTxType, MessageType,
};

pub mod device;

/// What to inspect
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InspectRequest {
    /// Transaction that recorded the message (standard messages) or settled it (off-chain)
    pub txid: Option<String>,
    /// CID of the off-chain message envelope
    pub off_chain_cid: Option<String>,
    /// Fetch externally stored messages; when false only the reference is reported
    pub resolve_external_message: bool,
}

impl Default for InspectRequest {
    fn default() -> Self {
        Self {
            txid: None,
            off_chain_cid: None,
            resolve_external_message: true,
        }
    }
}

impl InspectRequest {
    pub fn for_txid(txid: impl Into<String>) -> Self {
        Self {
            txid: Some(txid.into()),
            ..Default::default()
        }
    }

    pub fn for_off_chain_cid(cid: impl Into<String>) -> Self {
        Self {
            off_chain_cid: Some(cid.into()),
            ..Default::default()
        }
    }

    pub fn with_off_chain_cid(mut self, cid: impl Into<String>) -> Self {
        self.off_chain_cid = Some(cid.into());
        self
    }

    pub fn without_external_message(mut self) -> Self {
        self.resolve_external_message = false;
        self
    }

    /// Check and parse the identifiers before any I/O takes place
    fn parse(&self) -> InspectResult<(Option<Txid>, Option<ContentId>)> {
        let txid = non_empty(self.txid.as_deref());
        let off_chain_cid = non_empty(self.off_chain_cid.as_deref());

        if txid.is_none() && off_chain_cid.is_none() {
            return Err(InspectError::MissingRequiredParameter);
        }

        let txid = txid
            .map(|s| {
                Txid::from_str(s)
                    .map_err(|e| InspectError::InvalidInput(format!("invalid txid '{}': {}", s, e)))
            })
            .transpose()?;

        let off_chain_cid = off_chain_cid
            .map(|s| {
                ContentId::from_str(s).map_err(|e| {
                    InspectError::InvalidInput(format!("invalid off-chain CID '{}': {}", s, e))
                })
            })
            .transpose()?;

        Ok((txid, off_chain_cid))
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

/// Resolves Catenis messages from the blockchain and IPFS
///
/// The inspector holds no per-inspection state; every call returns a new result.
pub struct MessageInspector<T, C, O = JsonOffChainProtocol> {
    tx_source: T,
    content_source: C,
    off_chain: O,
    network: Network,
}

impl MessageInspector<BlockExplorerClient, IpfsGatewayClient, JsonOffChainProtocol> {
    /// Inspector backed by the configured block explorer and IPFS gateway
    pub fn from_config(config: &InspectorConfig) -> FetchResult<Self> {
        Ok(Self::new(
            BlockExplorerClient::from_config(config)?,
            IpfsGatewayClient::from_config(config)?,
            JsonOffChainProtocol,
            config.network.to_bitcoin(),
        ))
    }
}

impl<T, C, O> MessageInspector<T, C, O>
where
    T: TransactionSource,
    C: ContentSource,
    O: OffChainProtocol,
{
    pub fn new(tx_source: T, content_source: C, off_chain: O, network: Network) -> Self {
        Self {
            tx_source,
            content_source,
            off_chain,
            network,
        }
    }

    pub fn network(&self) -> Network {
        self.network
    }

    /// Inspect a Catenis message
    pub async fn inspect(&self, request: &InspectRequest) -> InspectResult<InspectionResult> {
        let (txid, off_chain_cid) = request.parse()?;

        info!(
            "Inspecting Catenis message (txid: {:?}, off-chain CID: {:?})",
            txid.map(|t| t.to_string()),
            off_chain_cid.as_ref().map(|c| c.to_string())
        );

        let mut result = InspectionResult {
            off_chain_cid: off_chain_cid.clone(),
            ..Default::default()
        };

        // Without a transaction the off-chain envelope is the only source
        let mut resolve_off_chain = true;

        if let Some(txid) = txid {
            let hex_tx = self
                .tx_source
                .get_transaction(&txid.to_string())
                .await
                .map_err(InspectError::transport(Stage::FetchTransaction))?;

            let tx = chain::parse_transaction_hex(&hex_tx)?;

            if tx.compute_txid() != txid {
                return Err(InspectError::InvalidTransaction(format!(
                    "retrieved transaction {} does not match requested txid {}",
                    tx.compute_txid(),
                    txid
                )));
            }

            result.txid = Some(txid.to_string());
            result.hex_tx = Some(hex_tx);
            inspect_chain_transaction(&tx, self.network, &mut result)?;

            resolve_off_chain = result.tx_type == Some(MessageTxType::SettleOffChainMessages);
        }

        if resolve_off_chain {
            self.resolve_off_chain_message(off_chain_cid.as_ref(), &mut result)
                .await?;
        }

        if request.resolve_external_message && result.message_ref.is_some() {
            self.resolve_external_message(&mut result).await?;
        }

        info!(
            "Inspection complete: {:?} / {:?}",
            result.tx_type, result.msg_type
        );

        Ok(result)
    }

    async fn resolve_off_chain_message(
        &self,
        off_chain_cid: Option<&ContentId>,
        result: &mut InspectionResult,
    ) -> InspectResult<()> {
        let batch = match &result.batch_doc_cid {
            Some(batch_doc_cid) => {
                debug!("Retrieving batch document {}", batch_doc_cid);

                let data = self
                    .content_source
                    .get_data(batch_doc_cid)
                    .await
                    .map_err(InspectError::transport(Stage::FetchBatchDocument))?;

                let batch = self.off_chain.parse_batch_document(&data).map_err(|e| {
                    InspectError::OffChainData {
                        stage: Stage::FetchBatchDocument,
                        message: e.to_string(),
                    }
                })?;

                Some(batch)
            }
            None => None,
        };

        let Some(off_chain_cid) = off_chain_cid else {
            return Ok(());
        };

        debug!("Retrieving off-chain message envelope {}", off_chain_cid);

        let data = self
            .content_source
            .get_data(off_chain_cid)
            .await
            .map_err(InspectError::transport(Stage::FetchOffChainEnvelope))?;

        let envelope = self
            .off_chain
            .parse_message_envelope(&data)
            .map_err(|e| InspectError::OffChainData {
                stage: Stage::FetchOffChainEnvelope,
                message: e.to_string(),
            })?;

        if let Some(batch) = &batch {
            if !batch.is_message_data_in_batch(off_chain_cid) {
                return Err(InspectError::InconsistentOffChainReference {
                    cid: off_chain_cid.to_string(),
                });
            }
        }

        apply_off_chain_envelope(envelope, result);

        Ok(())
    }

    async fn resolve_external_message(&self, result: &mut InspectionResult) -> InspectResult<()> {
        let Some(message_ref) = result.message_ref.clone() else {
            return Ok(());
        };

        match &result.storage_provider {
            Some(provider) if provider.is_ipfs() => {}
            provider => {
                return Err(InspectError::UnknownStorageProvider {
                    name: provider.as_ref().map(|p| p.name.clone()).unwrap_or_default(),
                    description: provider
                        .as_ref()
                        .map(|p| p.description.clone())
                        .unwrap_or_default(),
                })
            }
        }

        debug!("Retrieving external message {}", message_ref);

        let message = self
            .content_source
            .get_data(&message_ref)
            .await
            .map_err(InspectError::transport(Stage::FetchExternalMessage))?;

        result.message = Some(message);

        Ok(())
    }
}

/// Inspect an already available raw transaction without any network access
///
/// Externally stored messages are reported by reference only, and settlements
/// by their batch document CID.
pub fn inspect_transaction_hex(hex_tx: &str, network: Network) -> InspectResult<InspectionResult> {
    let tx = chain::parse_transaction_hex(hex_tx)?;

    let mut result = InspectionResult {
        txid: Some(tx.compute_txid().to_string()),
        hex_tx: Some(hex_tx.trim().to_string()),
        ..Default::default()
    };

    inspect_chain_transaction(&tx, network, &mut result)?;

    Ok(result)
}

/// Fingerprint, classify and decode a message transaction into `result`
fn inspect_chain_transaction(
    tx: &Transaction,
    network: Network,
    result: &mut InspectionResult,
) -> InspectResult<()> {
    let fingerprint = IoFingerprint::from_transaction(tx);
    let candidates = classify(&fingerprint)?;

    let data = chain::embedded_data(tx, &fingerprint).unwrap_or_default();
    let envelope = envelope::decode(&data)?;

    let tx_type = confirm(&candidates, envelope.func_byte())?;
    result.tx_type = Some(tx_type);

    debug!("Confirmed {} transaction ({})", tx_type, fingerprint);

    let options = envelope.options;

    match envelope.content {
        EnvelopeContent::BatchDocument { batch_doc_cid, .. } => {
            result.batch_doc_cid = Some(batch_doc_cid);
            return Ok(());
        }
        EnvelopeContent::Embedded { padding, message } => {
            result.msg_padding = padding;
            result.message = Some(message);
        }
        EnvelopeContent::External {
            storage_provider,
            message_ref,
        } => {
            result.storage_provider = Some(storage_provider.info());
            result.message_ref = Some(message_ref);
        }
    }

    let is_send = tx_type == MessageTxType::SendMessage;

    result.msg_type = Some(if is_send {
        MessageType::SendStandardMessage
    } else {
        MessageType::LogStandardMessage
    });

    result.msg_options = Some(MessageOptions {
        embedding: Some(options.embedding),
        encryption: options.encryption,
        padding: Some(options.padding),
        read_confirmation: is_send.then(|| has_read_confirmation(tx_type, &fingerprint)),
    });

    result.origin_device = tx.input.first().and_then(|input| {
        fingerprint
            .input_token(0)
            .and_then(|token| device::origin_device(input, token, network))
    });

    if is_send {
        result.target_device = tx
            .output
            .first()
            .and_then(|output| device::target_device(output, network));
    }

    Ok(())
}

fn apply_off_chain_envelope(envelope: OffChainEnvelope, result: &mut InspectionResult) {
    let is_send = envelope.kind == OffChainMessageKind::Send;

    result.msg_type = Some(if is_send {
        MessageType::SendOffChainMessage
    } else {
        MessageType::LogOffChainMessage
    });

    result.msg_options = Some(MessageOptions {
        embedding: None,
        encryption: envelope.encrypted,
        padding: None,
        read_confirmation: is_send.then_some(envelope.read_confirmation),
    });

    result.origin_device = Some(DeviceInfo {
        address: None,
        pub_key_hash: envelope.sender_pub_key_hash,
    });

    result.target_device = if is_send {
        envelope.receiver_pub_key_hash.map(|pub_key_hash| DeviceInfo {
            address: None,
            pub_key_hash,
        })
    } else {
        None
    };

    result.storage_provider = Some(envelope.storage_provider);
    result.message_ref = Some(envelope.message_ref);
}
