//! Role capability sets.
//!
//! Both roles compose the shared [`SigningIdentity`] base. A type only plays
//! a role it explicitly implements.

use url::Url;

use vidtrust_core::{SegmentDescriptor, SigningIdentity};

use crate::error::Result;
use crate::segment::{generate_segment_credential, SegmentCredential};
use crate::token::{issue_job_token, JobToken};

/// The orchestrator role: accepts work and issues job tokens.
pub trait OrchestratorSession: SigningIdentity {
    /// Where broadcasters reach this orchestrator.
    fn service_uri(&self) -> &Url;

    /// Grant `job_id` under this orchestrator's key.
    fn issue_job_token(&self, job_id: &str) -> Result<JobToken> {
        issue_job_token(self, job_id)
    }

    /// Answer a liveness ping.
    fn answer_ping(&self, nonce: &[u8]) -> Result<Vec<u8>> {
        crate::liveness::ping(self, nonce)
    }
}

/// The broadcaster role: submits segments under an issued job.
pub trait BroadcasterSession: SigningIdentity {
    /// The job this session submits under.
    fn job_id(&self) -> &str;

    /// Sign a segment for this session's job.
    fn segment_credential(&self, descriptor: &SegmentDescriptor) -> Result<SegmentCredential> {
        generate_segment_credential(self, self.job_id(), descriptor)
    }
}
