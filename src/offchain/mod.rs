//! Off-chain messages
//!
//! Off-chain messages are not recorded one by one on the blockchain. Each has its
//! own message envelope stored on IPFS, and many of them are anchored at once by
//! a settlement transaction that references a batch document listing the CIDs of
//! the message data it covers.
//!
//! The inspector depends on the [`OffChainProtocol`] trait for decoding both
//! artifacts. [`JsonOffChainProtocol`] is the implementation used by default and
//! by the CLI. It reads a JSON rendition of the batch document and message
//! envelope specific to this crate, not the binary encoding Catenis publishes,
//! so real off-chain messages need an `OffChainProtocol` for that encoding.

use crate::types::{ContentId, StorageProviderInfo};

pub mod json;

pub use json::{JsonBatchDocument, JsonOffChainProtocol};

/// Failure to decode an off-chain artifact
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct OffChainError(pub String);

/// Kind of message an off-chain envelope carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OffChainMessageKind {
    Send,
    Log,
}

/// Decoded off-chain message envelope
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OffChainEnvelope {
    pub kind: OffChainMessageKind,
    pub sender_pub_key_hash: Vec<u8>,
    /// Only present for send messages
    pub receiver_pub_key_hash: Option<Vec<u8>>,
    pub encrypted: bool,
    pub read_confirmation: bool,
    pub storage_provider: StorageProviderInfo,
    pub message_ref: ContentId,
}

/// Membership test over the message data anchored by a settlement
pub trait BatchDocument {
    fn is_message_data_in_batch(&self, cid: &ContentId) -> bool;
}

/// Decoder for off-chain batch documents and message envelopes
pub trait OffChainProtocol {
    type Batch: BatchDocument;

    fn parse_batch_document(&self, data: &[u8]) -> Result<Self::Batch, OffChainError>;

    fn parse_message_envelope(&self, data: &[u8]) -> Result<OffChainEnvelope, OffChainError>;
}
