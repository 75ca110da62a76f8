//! Envelope codec error types

/// Result type for envelope codec operations
pub type EnvelopeResult<T> = Result<T, EnvelopeError>;

/// Envelope decode/encode failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EnvelopeError {
    #[error("Data too short")]
    DataTooShort,

    #[error("Invalid prefix")]
    InvalidPrefix,

    #[error("Invalid version")]
    InvalidVersion(u8),

    #[error("Invalid function byte")]
    InvalidFunctionByte(u8),

    #[error("Invalid options")]
    InvalidOptions(u8),

    #[error("Inconsistent padding option")]
    InconsistentPaddingOption,

    #[error("Invalid padding length: {length} (available: {available})")]
    InvalidPaddingLength { length: usize, available: usize },

    #[error("Invalid storage provider code")]
    InvalidStorageProviderCode(u8),

    #[error("Invalid message reference")]
    InvalidMessageReference,

    #[error("Invalid off-chain batch document reference")]
    InvalidBatchReference,

    /// Only produced by encode: options disagree with the envelope content
    #[error("Inconsistent envelope options: {0}")]
    InconsistentOptions(&'static str),
}
