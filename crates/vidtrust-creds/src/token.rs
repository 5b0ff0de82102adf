//! Job tokens: an orchestrator's signed grant of a job id.

use vidtrust_core::{verify_signature, Address, AddressHolder, RecoverableSignature, SigningIdentity};

use crate::canonical;
use crate::error::{CredsError, Result};

/// A job id bound to the orchestrator that issued it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobToken {
    job_id: String,
    issuer: Address,
    signature: RecoverableSignature,
    encoded: String,
}

impl JobToken {
    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    pub fn issuer(&self) -> Address {
        self.issuer
    }

    pub fn signature(&self) -> &RecoverableSignature {
        &self.signature
    }

    /// Base64 transport form.
    pub fn encoded(&self) -> &str {
        &self.encoded
    }
}

/// Sign `job_id` as `orchestrator` and package it for transport.
pub fn issue_job_token<I>(orchestrator: &I, job_id: &str) -> Result<JobToken>
where
    I: SigningIdentity + ?Sized,
{
    let signature = orchestrator.sign(job_id.as_bytes())?;
    Ok(JobToken {
        job_id: job_id.to_owned(),
        issuer: orchestrator.address(),
        encoded: canonical::encode_job_token(job_id, &signature),
        signature,
    })
}

/// Decode a token and check it was issued by `orchestrator`.
pub fn verify_job_token<A>(orchestrator: &A, encoded: &str) -> Result<JobToken>
where
    A: AddressHolder + ?Sized,
{
    let (job_id, signature) = canonical::decode_job_token(encoded)?;
    let issuer = orchestrator.address();

    if !verify_signature(&issuer, job_id.as_bytes(), signature.as_bytes())? {
        tracing::debug!(%issuer, job_id = %job_id, "job token rejected");
        return Err(CredsError::SignatureMismatch);
    }

    Ok(JobToken {
        job_id,
        issuer,
        signature,
        encoded: encoded.to_owned(),
    })
}
