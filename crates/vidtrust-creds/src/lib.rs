//! # vidtrust Creds
//!
//! The credential protocol between broadcasters and orchestrators.
//!
//! ## Flow
//!
//! ```text
//! broadcaster                         orchestrator
//!     | -- RegistrationRequest ----------> |  verify_registration_request
//!     | <--------------------- JobToken -- |  issue_job_token
//!     | -- SegmentCredential (per seg) --> |  verify_segment_credential
//! ```
//!
//! Liveness ping/pong is independent of any job; see [`liveness`].
//!
//! Every credential crosses the wire as base64 of a canonical CBOR array
//! (see [`canonical`]). A decode failure is reported as
//! [`CredsError::CorruptToken`], distinct from signature mismatches.

pub mod canonical;
pub mod error;
pub mod liveness;
pub mod registration;
pub mod roles;
pub mod segment;
pub mod session;
pub mod token;

pub use error::{CredsError, Result, TokenDecodeError};
pub use liveness::{generate_nonce, ping, verify_pong};
pub use registration::{
    generate_registration_request, verify_registration_request, RegistrationRequest,
};
pub use roles::{BroadcasterSession, OrchestratorSession};
pub use segment::{
    generate_segment_credential, segment_signing_payload, verify_segment_credential,
    SegmentCredential,
};
pub use session::{BroadcastSession, JobSession, JobState};
pub use token::{issue_job_token, verify_job_token, JobToken};
