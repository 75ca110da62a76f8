use thiserror::Error;

use crate::envelope::EnvelopeError;

/// Application-wide error type - single point of truth for the CLI
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration issues
    #[error("Configuration error: {0}")]
    Config(String),

    /// Message inspection failures
    #[error("Inspection error: {0}")]
    Inspect(#[from] InspectError),

    /// Offline envelope decoding
    #[error("Envelope error: {0}")]
    Envelope(#[from] EnvelopeError),

    /// Transport setup or fetch failures outside an inspection
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// JSON output
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Data validation/parsing
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// Transport error types shared by the block explorer and IPFS gateway clients
#[derive(Error, Debug)]
pub enum FetchError {
    /// Root URL or endpoint could not be turned into an http(s) URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// TXID string is empty or otherwise unusable in a request path
    #[error("Invalid txid: {txid}")]
    InvalidTxid { txid: String },

    /// Request did not complete within the configured per-call timeout
    #[error("Request timed out: {operation} ({timeout_ms}ms)")]
    Timeout { operation: String, timeout_ms: u64 },

    /// Network-level failure (connection refused, reset, DNS, body read)
    #[error("Request failed: {operation} - {message}")]
    RequestFailed { operation: String, message: String },

    /// Server answered with a non-success status
    #[error("[{status}] {message}")]
    HttpStatus { status: u16, message: String },

    /// Response body could not be interpreted
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl FetchError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, FetchError::Timeout { .. })
    }
}

/// Pipeline stage at which an inspection failed, named after the artifact it retrieves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    FetchTransaction,
    FetchBatchDocument,
    FetchOffChainEnvelope,
    FetchExternalMessage,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::FetchTransaction => "blockchain transaction",
            Stage::FetchBatchDocument => "Catenis off-chain messages batch document",
            Stage::FetchOffChainEnvelope => "Catenis off-chain message envelope",
            Stage::FetchExternalMessage => "external message",
        };
        write!(f, "{}", name)
    }
}

/// Stable discriminant for [`InspectError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    MissingRequiredParameter,
    InvalidInput,
    TransportFailure,
    InvalidTransaction,
    MalformedEnvelope,
    UnrecognizedTransactionShape,
    InconsistentFunctionByte,
    InconsistentOffChainReference,
    UnknownStorageProvider,
    InvalidOffChainData,
}

/// Errors terminating a single inspection
///
/// Every variant is fatal for the inspection that produced it. Device identity
/// derivation never produces one of these.
#[derive(Error, Debug)]
pub enum InspectError {
    #[error("Missing at least one of the parameters: 'txid' or 'offChainCid'")]
    MissingRequiredParameter,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Error retrieving {stage}: {source}")]
    Transport {
        stage: Stage,
        #[source]
        source: FetchError,
    },

    #[error("Invalid blockchain transaction: {0}")]
    InvalidTransaction(String),

    #[error("Invalid Catenis message transaction: {0}")]
    MalformedEnvelope(#[from] EnvelopeError),

    #[error("Invalid Catenis message transaction: unrecognized IO fingerprint {fingerprint}")]
    UnrecognizedTransactionShape { fingerprint: String },

    #[error("Invalid Catenis message transaction: inconsistent function byte 0x{func_byte:02x}")]
    InconsistentFunctionByte { func_byte: u8 },

    #[error("Inconsistent Catenis off-chain message envelope IPFS CID: {cid}")]
    InconsistentOffChainReference { cid: String },

    #[error("Unknown external message storage provider: [{name}] - {description}")]
    UnknownStorageProvider { name: String, description: String },

    #[error("Error parsing {stage}: {message}")]
    OffChainData { stage: Stage, message: String },
}

impl InspectError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            InspectError::MissingRequiredParameter => ErrorKind::MissingRequiredParameter,
            InspectError::InvalidInput(_) => ErrorKind::InvalidInput,
            InspectError::Transport { .. } => ErrorKind::TransportFailure,
            InspectError::InvalidTransaction(_) => ErrorKind::InvalidTransaction,
            InspectError::MalformedEnvelope(_) => ErrorKind::MalformedEnvelope,
            InspectError::UnrecognizedTransactionShape { .. } => {
                ErrorKind::UnrecognizedTransactionShape
            }
            InspectError::InconsistentFunctionByte { .. } => ErrorKind::InconsistentFunctionByte,
            InspectError::InconsistentOffChainReference { .. } => {
                ErrorKind::InconsistentOffChainReference
            }
            InspectError::UnknownStorageProvider { .. } => ErrorKind::UnknownStorageProvider,
            InspectError::OffChainData { .. } => ErrorKind::InvalidOffChainData,
        }
    }

    /// Wrap a transport failure with the stage it occurred in
    pub fn transport(stage: Stage) -> impl FnOnce(FetchError) -> Self {
        move |source| InspectError::Transport { stage, source }
    }
}

/// Application-wide result type - single point of truth
pub type AppResult<T> = Result<T, AppError>;

/// Result type for fetch operations
pub type FetchResult<T> = Result<T, FetchError>;

/// Result type for inspections
pub type InspectResult<T> = Result<T, InspectError>;

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<hex::FromHexError> for AppError {
    fn from(err: hex::FromHexError) -> Self {
        AppError::InvalidData(format!("Hex error: {}", err))
    }
}
