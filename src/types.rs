//! Catenis Message Inspector - Type System
//!
//! - `storage`: Storage providers and content identifiers (CIDs)
//! - `message`: Message transaction types, message types, options and the inspection result
//! - `hex_serde`: Hex (de)serialisation helpers for byte fields

pub mod hex_serde;
pub mod message;
pub mod storage;

pub use message::{DeviceInfo, InspectionResult, MessageOptions, MessageTxType, MessageType};
pub use storage::{ContentId, StorageProvider, StorageProviderInfo};
