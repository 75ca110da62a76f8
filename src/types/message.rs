//! Catenis message types and the inspection result record

use serde::Serialize;

use super::hex_serde;
use super::storage::{ContentId, StorageProviderInfo};

/// Catenis message transaction types
///
/// Each type is identified on-chain by the function byte of its envelope. The IO
/// shape patterns used to recognise each type live in `chain::classifier`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MessageTxType {
    SendMessage,
    LogMessage,
    SettleOffChainMessages,
}

impl MessageTxType {
    pub const ALL: [MessageTxType; 3] = [
        MessageTxType::SendMessage,
        MessageTxType::LogMessage,
        MessageTxType::SettleOffChainMessages,
    ];

    pub fn func_byte(self) -> u8 {
        match self {
            MessageTxType::SendMessage => 0x01,
            MessageTxType::LogMessage => 0x02,
            MessageTxType::SettleOffChainMessages => 0x03,
        }
    }

    pub fn from_func_byte(byte: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.func_byte() == byte)
    }

    pub fn name(self) -> &'static str {
        match self {
            MessageTxType::SendMessage => "sendMessage",
            MessageTxType::LogMessage => "logMessage",
            MessageTxType::SettleOffChainMessages => "settleOffChainMessages",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            MessageTxType::SendMessage => "Send message",
            MessageTxType::LogMessage => "Log message",
            MessageTxType::SettleOffChainMessages => "Settle off-chain messages",
        }
    }
}

impl std::fmt::Display for MessageTxType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Business classification of the inspected message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MessageType {
    SendStandardMessage,
    LogStandardMessage,
    SendOffChainMessage,
    LogOffChainMessage,
}

impl MessageType {
    pub fn description(self) -> &'static str {
        match self {
            MessageType::SendStandardMessage => "Send standard message",
            MessageType::LogStandardMessage => "Log standard message",
            MessageType::SendOffChainMessage => "Send off-chain message",
            MessageType::LogOffChainMessage => "Log off-chain message",
        }
    }

    pub fn is_off_chain(self) -> bool {
        matches!(
            self,
            MessageType::SendOffChainMessage | MessageType::LogOffChainMessage
        )
    }
}

/// Message options as reported to the caller
///
/// `embedding` and `padding` only exist for standard (on-chain) messages;
/// `read_confirmation` only for send messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding: Option<bool>,
    pub encryption: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub padding: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_confirmation: Option<bool>,
}

/// Identity of a communicating device
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInfo {
    /// Bitcoin address; unavailable for off-chain messages
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(serialize_with = "hex_serde::serialize")]
    pub pub_key_hash: Vec<u8>,
}

/// Outcome of a single inspection
///
/// A fresh record is built for every inspection call and handed over by value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectionResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub txid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hex_tx: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub off_chain_cid: Option<ContentId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_type: Option<MessageTxType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub msg_type: Option<MessageType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub msg_options: Option<MessageOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin_device: Option<DeviceInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_device: Option<DeviceInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_provider: Option<StorageProviderInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_ref: Option<ContentId>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "hex_serde::option::serialize"
    )]
    pub message: Option<Vec<u8>>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "hex_serde::option::serialize"
    )]
    pub msg_padding: Option<Vec<u8>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_doc_cid: Option<ContentId>,
}

impl InspectionResult {
    /// Message contents as text, when they are valid UTF-8
    pub fn message_text(&self) -> Option<&str> {
        self.message
            .as_deref()
            .and_then(|m| std::str::from_utf8(m).ok())
    }

    pub fn is_off_chain(&self) -> bool {
        self.msg_type.is_some_and(MessageType::is_off_chain)
    }
}
