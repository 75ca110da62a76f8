//! JSON interchange form of off-chain artifacts
//!
//! ```json
//! {"msgDataCids": ["Qm...", "bafy..."]}
//!
//! {"msgType": "send", "senderPubKeyHash": "<hex>", "receiverPubKeyHash": "<hex>",
//!  "encrypted": false, "readConfirmation": true,
//!  "storageProvider": {"name": "ipfs", "description": "...", "version": 2},
//!  "msgRef": "Qm..."}
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::{BatchDocument, OffChainEnvelope, OffChainError, OffChainMessageKind, OffChainProtocol};
use crate::types::hex_serde;
use crate::types::{ContentId, StorageProviderInfo};

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonOffChainProtocol;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonBatchDocument {
    msg_data_cids: HashSet<ContentId>,
}

impl JsonBatchDocument {
    pub fn len(&self) -> usize {
        self.msg_data_cids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.msg_data_cids.is_empty()
    }
}

impl BatchDocument for JsonBatchDocument {
    fn is_message_data_in_batch(&self, cid: &ContentId) -> bool {
        self.msg_data_cids.contains(cid)
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BatchDocumentRecord {
    msg_data_cids: Vec<ContentId>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum MsgTypeRecord {
    Send,
    Log,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MessageEnvelopeRecord {
    msg_type: MsgTypeRecord,
    #[serde(with = "hex_serde")]
    sender_pub_key_hash: Vec<u8>,
    #[serde(default, with = "hex_serde::option")]
    receiver_pub_key_hash: Option<Vec<u8>>,
    #[serde(default)]
    encrypted: bool,
    #[serde(default)]
    read_confirmation: bool,
    storage_provider: StorageProviderInfo,
    msg_ref: ContentId,
}

impl OffChainProtocol for JsonOffChainProtocol {
    type Batch = JsonBatchDocument;

    fn parse_batch_document(&self, data: &[u8]) -> Result<Self::Batch, OffChainError> {
        let record: BatchDocumentRecord =
            serde_json::from_slice(data).map_err(|e| OffChainError(e.to_string()))?;

        Ok(JsonBatchDocument {
            msg_data_cids: record.msg_data_cids.into_iter().collect(),
        })
    }

    fn parse_message_envelope(&self, data: &[u8]) -> Result<OffChainEnvelope, OffChainError> {
        let record: MessageEnvelopeRecord =
            serde_json::from_slice(data).map_err(|e| OffChainError(e.to_string()))?;

        let kind = match record.msg_type {
            MsgTypeRecord::Send => OffChainMessageKind::Send,
            MsgTypeRecord::Log => OffChainMessageKind::Log,
        };

        match (kind, &record.receiver_pub_key_hash) {
            (OffChainMessageKind::Send, None) => {
                return Err(OffChainError(
                    "send message envelope has no receiver public key hash".to_string(),
                ))
            }
            (OffChainMessageKind::Log, Some(_)) => {
                return Err(OffChainError(
                    "log message envelope has a receiver public key hash".to_string(),
                ))
            }
            _ => {}
        }

        Ok(OffChainEnvelope {
            kind,
            sender_pub_key_hash: record.sender_pub_key_hash,
            receiver_pub_key_hash: record.receiver_pub_key_hash,
            encrypted: record.encrypted,
            read_confirmation: record.read_confirmation && kind == OffChainMessageKind::Send,
            storage_provider: record.storage_provider,
            message_ref: record.msg_ref,
        })
    }
}
