//! Error types for vidtrust core.

use thiserror::Error;

/// Core errors raised by identifier, segment and signing operations.
///
/// Identifier errors (`InvalidLength`, `InvalidRendition`, `InvalidStreamId`)
/// mean the caller supplied bad input. Signer errors are never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("invalid length: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("rendition must not be empty")]
    InvalidRendition,

    #[error("invalid stream id: {0}")]
    InvalidStreamId(String),

    #[error("no signing key configured")]
    NoSigningKey,

    #[error("signing failed: {0}")]
    SigningFailed(String),

    #[error("malformed signature: {0}")]
    MalformedSignature(String),

    #[error("malformed address: {0}")]
    MalformedAddress(String),

    #[error("malformed segment: {0}")]
    MalformedSegment(String),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
