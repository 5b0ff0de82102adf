//! Error types for the discovery module.

use thiserror::Error;

use vidtrust_core::CoreError;

use crate::messages::DiscoveryErrorCode;

/// Errors that can occur while discovering orchestrators.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// Round trip failed or did not finish within the configured timeout.
    #[error("unreachable: {0}")]
    Unreachable(String),

    /// Registry collaborator failed.
    #[error("registry error: {0}")]
    Registry(String),

    /// An advertised record did not validate.
    #[error("invalid record: {0}")]
    InvalidRecord(String),

    /// Message could not be encoded or decoded.
    #[error("codec error: {0}")]
    Codec(String),

    /// Peer answered with an error message.
    #[error("peer error ({code:?}): {message}")]
    Remote {
        code: DiscoveryErrorCode,
        message: String,
    },

    /// Peer answered with a response of the wrong kind.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(&'static str),

    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Result type for discovery operations.
pub type Result<T> = std::result::Result<T, DiscoveryError>;
