//! Error types for the credential protocol.

use thiserror::Error;

use vidtrust_core::{Address, CoreError};

use crate::session::JobState;

/// A credential could not be decoded from its transport form.
///
/// Distinct from a signature mismatch: this means bad bytes on the wire,
/// not a forged or misattributed credential.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenDecodeError {
    /// The base64 layer failed; the decoder's error is kept verbatim.
    #[error("{0}")]
    Base64(#[from] base64::DecodeError),

    /// The decoded bytes do not have the expected layout.
    #[error("invalid layout: {0}")]
    Layout(String),
}

impl TokenDecodeError {
    /// Offset of the offending input byte, when the decoder reported one.
    pub fn offset(&self) -> Option<usize> {
        match self {
            TokenDecodeError::Base64(base64::DecodeError::InvalidByte(offset, _))
            | TokenDecodeError::Base64(base64::DecodeError::InvalidLastSymbol(offset, _)) => {
                Some(*offset)
            }
            _ => None,
        }
    }
}

/// Errors that can occur while building or checking credentials.
#[derive(Debug, Error)]
pub enum CredsError {
    /// Core error (signing, malformed signature or address).
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Transport-level decode failure.
    #[error("corrupt token: {0}")]
    CorruptToken(#[from] TokenDecodeError),

    /// Job token was not signed by the expected orchestrator.
    #[error("token signature check failed")]
    SignatureMismatch,

    /// Segment credential was not signed by the expected broadcaster.
    #[error("segment sig check failed")]
    SegmentSignatureMismatch,

    /// Registration request signer differs from the claimed address.
    #[error("registration signer mismatch: claimed {claimed}, recovered {recovered:?}")]
    AddressMismatch {
        claimed: Address,
        recovered: Option<Address>,
    },

    /// Operation not allowed in the session's current state.
    #[error("cannot {action} in state {from:?}")]
    InvalidTransition { from: JobState, action: &'static str },

    /// Session has been closed.
    #[error("session closed")]
    SessionClosed,

    /// Segment sequence number did not advance.
    #[error("sequence regression for manifest {manifest_id}: last {last}, got {got}")]
    SequenceRegression {
        manifest_id: String,
        last: u64,
        got: u64,
    },
}

impl CredsError {
    /// True for rejections that indicate forgery or misattribution rather
    /// than transport damage.
    pub fn is_security_rejection(&self) -> bool {
        matches!(
            self,
            CredsError::SignatureMismatch
                | CredsError::SegmentSignatureMismatch
                | CredsError::AddressMismatch { .. }
        )
    }
}

/// Result type for credential operations.
pub type Result<T> = std::result::Result<T, CredsError>;
