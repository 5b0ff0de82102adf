//! Discovery wire messages.
//!
//! A request/response pair per round trip; both are CBOR on the wire.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{DiscoveryError, Result};
use crate::record::RawRecord;

/// Message size limits.
pub mod limits {
    /// Max encoded size of a single message.
    pub const MAX_MESSAGE_BYTES: usize = 64 * 1024;
    /// Max nonce length in a ping.
    pub const MAX_NONCE_BYTES: usize = 64;
}

/// Requests a broadcaster sends to an orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiscoveryRequest {
    /// Ask for the orchestrator's advertised record.
    GetOrchestratorInfo,

    /// Liveness challenge.
    Ping {
        /// Caller-chosen nonce; the orchestrator signs its digest.
        nonce: Vec<u8>,
    },
}

/// Orchestrator replies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiscoveryResponse {
    OrchestratorInfo(RawRecord),

    Pong {
        /// 65-byte recoverable signature over `Keccak256(nonce)`.
        signature: Vec<u8>,
    },

    Error {
        /// Error code for programmatic handling.
        code: DiscoveryErrorCode,
        /// Human-readable description.
        message: String,
    },
}

impl DiscoveryRequest {
    /// Check if this message respects size limits.
    pub fn validate_limits(&self) -> std::result::Result<(), &'static str> {
        match self {
            DiscoveryRequest::GetOrchestratorInfo => Ok(()),
            DiscoveryRequest::Ping { nonce } if nonce.len() > limits::MAX_NONCE_BYTES => {
                Err("nonce too long")
            }
            DiscoveryRequest::Ping { .. } => Ok(()),
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        to_cbor(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        from_cbor(bytes)
    }
}

impl DiscoveryResponse {
    /// Shorthand for an error reply.
    pub fn error(code: DiscoveryErrorCode, message: impl Into<String>) -> Self {
        DiscoveryResponse::Error {
            code,
            message: message.into(),
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        to_cbor(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        from_cbor(bytes)
    }
}

/// Error codes for the discovery protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u16)]
pub enum DiscoveryErrorCode {
    /// Unknown/unspecified error.
    Unknown = 0,
    /// Message too large.
    MessageTooLarge = 1,
    /// Invalid message format.
    InvalidMessage = 2,
    /// Signing key unavailable on the orchestrator.
    NoSigningKey = 3,
    /// Internal error on peer.
    InternalError = 4,
}

fn to_cbor<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    ciborium::into_writer(value, &mut buf).map_err(|e| DiscoveryError::Codec(e.to_string()))?;
    if buf.len() > limits::MAX_MESSAGE_BYTES {
        return Err(DiscoveryError::Codec(format!("message too large: {} bytes", buf.len())));
    }
    Ok(buf)
}

fn from_cbor<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    if bytes.len() > limits::MAX_MESSAGE_BYTES {
        return Err(DiscoveryError::Codec(format!("message too large: {} bytes", bytes.len())));
    }
    ciborium::from_reader(bytes).map_err(|e| DiscoveryError::Codec(e.to_string()))
}
