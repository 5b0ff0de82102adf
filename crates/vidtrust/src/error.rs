//! Error types for the node roles.

use thiserror::Error;

use vidtrust_core::CoreError;
use vidtrust_creds::CredsError;
use vidtrust_discovery::DiscoveryError;

/// Errors that can occur during broadcaster or orchestrator operations.
#[derive(Debug, Error)]
pub enum NodeError {
    /// Primitive error.
    #[error("core error: {0}")]
    Core(#[from] CoreError),

    /// Credential error.
    #[error("credential error: {0}")]
    Creds(#[from] CredsError),

    /// Discovery error.
    #[error("discovery error: {0}")]
    Discovery(#[from] DiscoveryError),

    /// Job not known to this orchestrator.
    #[error("job not found: {0}")]
    JobNotFound(String),

    /// Job id already in use on this orchestrator.
    #[error("job already exists: {0}")]
    JobExists(String),
}

impl NodeError {
    /// True for rejections that indicate forgery or misattribution.
    pub fn is_security_rejection(&self) -> bool {
        matches!(self, NodeError::Creds(e) if e.is_security_rejection())
    }
}

/// Result type for node operations.
pub type Result<T> = std::result::Result<T, NodeError>;
