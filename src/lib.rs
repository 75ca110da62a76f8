//! Catenis Message Inspector
//!
//! Resolves Catenis messages recorded in Bitcoin transactions: decodes the
//! message envelope carried in a null-data output, classifies the transaction
//! by the shape of its inputs and outputs, and follows references into IPFS
//! for externally stored and off-chain messages.

pub mod chain;
pub mod cli;
pub mod config;
pub mod envelope;
pub mod errors;
pub mod fetch;
pub mod inspector;
pub mod offchain;
pub mod types;

pub use errors::{AppError, AppResult, ErrorKind, InspectError, InspectResult};
pub use inspector::{inspect_transaction_hex, InspectRequest, MessageInspector};
pub use types::InspectionResult;
