//! Catenis message envelope
//!
//! The envelope is the application payload carried in a message transaction's
//! null-data output:
//!
//! ```text
//! [ "CTN" ][ version(3 bits) | function(5 bits) ][ options ][ tail... ]
//! ```
//!
//! The tail depends on the function byte and options:
//! - send/log, embedded: `[padding length][padding]` (when padded), then the message
//! - send/log, external: `[storage provider code][message CID]`
//! - settle off-chain messages: `[0x02][batch document CID]`

use serde::Serialize;

use crate::types::hex_serde;
use crate::types::{ContentId, MessageTxType, StorageProvider};

pub mod codec;
pub mod error;

pub use codec::{decode, encode};
pub use error::{EnvelopeError, EnvelopeResult};

/// Literal envelope prefix
pub const PREFIX: &[u8] = b"CTN";

/// Only supported envelope version
pub const VERSION: u8 = 0x00;

pub const VERSION_MASK: u8 = 0xe0;

pub const FUNC_BYTE_MASK: u8 = !VERSION_MASK;

/// Prefix + version/function byte + options byte + at least one payload byte
pub const MIN_LENGTH: usize = PREFIX.len() + 2 + 1;

/// Envelope option flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct EnvelopeOptions {
    /// Message carried inline rather than referenced externally
    pub embedding: bool,
    /// Message contents are ciphertext
    pub encryption: bool,
    /// Inline message is preceded by a length-delimited padding block
    pub padding: bool,
}

impl EnvelopeOptions {
    pub const EMBEDDING: u8 = 0x01;
    pub const ENCRYPTION: u8 = 0x02;
    pub const PADDING: u8 = 0x04;
    pub const VALID_MASK: u8 = Self::EMBEDDING | Self::ENCRYPTION | Self::PADDING;

    /// Build options from the raw options byte; `None` if any unknown bit is set
    pub fn from_bits(bits: u8) -> Option<Self> {
        if bits & !Self::VALID_MASK != 0 {
            return None;
        }

        Some(Self {
            embedding: bits & Self::EMBEDDING != 0,
            encryption: bits & Self::ENCRYPTION != 0,
            padding: bits & Self::PADDING != 0,
        })
    }

    pub fn bits(&self) -> u8 {
        let mut bits = 0;
        if self.embedding {
            bits |= Self::EMBEDDING;
        }
        if self.encryption {
            bits |= Self::ENCRYPTION;
        }
        if self.padding {
            bits |= Self::PADDING;
        }
        bits
    }
}

/// Function-dependent tail of an envelope
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum EnvelopeContent {
    /// Message carried inline (send/log with the embedding option)
    Embedded {
        #[serde(
            skip_serializing_if = "Option::is_none",
            serialize_with = "hex_serde::option::serialize"
        )]
        padding: Option<Vec<u8>>,
        #[serde(serialize_with = "hex_serde::serialize")]
        message: Vec<u8>,
    },
    /// Message stored off the chain (send/log without the embedding option)
    External {
        #[serde(rename = "storageProvider")]
        storage_provider: StorageProvider,
        #[serde(rename = "messageRef")]
        message_ref: ContentId,
    },
    /// Reference to an off-chain messages batch document (settlement)
    BatchDocument {
        #[serde(rename = "storageProvider")]
        storage_provider: StorageProvider,
        #[serde(rename = "batchDocCid")]
        batch_doc_cid: ContentId,
    },
}

/// Decoded envelope
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Envelope {
    pub function: MessageTxType,
    pub options: EnvelopeOptions,
    pub content: EnvelopeContent,
}

impl Envelope {
    pub fn func_byte(&self) -> u8 {
        self.function.func_byte()
    }

    pub fn message(&self) -> Option<&[u8]> {
        match &self.content {
            EnvelopeContent::Embedded { message, .. } => Some(message),
            _ => None,
        }
    }

    pub fn padding(&self) -> Option<&[u8]> {
        match &self.content {
            EnvelopeContent::Embedded { padding, .. } => padding.as_deref(),
            _ => None,
        }
    }

    pub fn message_ref(&self) -> Option<&ContentId> {
        match &self.content {
            EnvelopeContent::External { message_ref, .. } => Some(message_ref),
            _ => None,
        }
    }

    pub fn batch_doc_cid(&self) -> Option<&ContentId> {
        match &self.content {
            EnvelopeContent::BatchDocument { batch_doc_cid, .. } => Some(batch_doc_cid),
            _ => None,
        }
    }

    pub fn storage_provider(&self) -> Option<StorageProvider> {
        match &self.content {
            EnvelopeContent::External {
                storage_provider, ..
            }
            | EnvelopeContent::BatchDocument {
                storage_provider, ..
            } => Some(*storage_provider),
            EnvelopeContent::Embedded { .. } => None,
        }
    }
}
