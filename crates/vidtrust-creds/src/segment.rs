//! Segment credentials: a broadcaster's signature over one described segment
//! under one job.

use vidtrust_core::{
    verify_signature, Address, FlattenedSegment, RecoverableSignature, SegmentDescriptor, Signer,
};

use crate::canonical;
use crate::error::{CredsError, Result, TokenDecodeError};

/// A signed segment descriptor scoped to a job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentCredential {
    job_id: String,
    descriptor_bytes: Vec<u8>,
    signature: RecoverableSignature,
    encoded: String,
}

impl SegmentCredential {
    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    /// The flattened descriptor that was signed.
    pub fn descriptor_bytes(&self) -> &[u8] {
        &self.descriptor_bytes
    }

    pub fn signature(&self) -> &RecoverableSignature {
        &self.signature
    }

    /// Base64 transport form.
    pub fn encoded(&self) -> &str {
        &self.encoded
    }

    /// Parse the signed descriptor back into its fields.
    pub fn segment(&self) -> Result<FlattenedSegment> {
        Ok(FlattenedSegment::parse(&self.descriptor_bytes)?)
    }
}

/// Payload signed for a segment: `job_id || flatten(descriptor)`.
pub fn segment_signing_payload(job_id: &str, descriptor_bytes: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(job_id.len() + descriptor_bytes.len());
    buf.extend_from_slice(job_id.as_bytes());
    buf.extend_from_slice(descriptor_bytes);
    buf
}

/// Sign `descriptor` for `job_id` as `broadcaster`.
pub fn generate_segment_credential<S>(
    broadcaster: &S,
    job_id: &str,
    descriptor: &SegmentDescriptor,
) -> Result<SegmentCredential>
where
    S: Signer + ?Sized,
{
    let descriptor_bytes = descriptor.flatten();
    let signature = broadcaster.sign(&segment_signing_payload(job_id, &descriptor_bytes))?;
    Ok(SegmentCredential {
        job_id: job_id.to_owned(),
        encoded: canonical::encode_segment_credential(job_id, &descriptor_bytes, &signature),
        descriptor_bytes,
        signature,
    })
}

/// Decode a segment credential and check it was signed by `expected` for
/// `job_id`.
///
/// The carried job id must equal `job_id`, and the descriptor must have the
/// full flattened layout. The signed payload has no separator between job id
/// and descriptor, so a descriptor of any other shape could shift bytes
/// across that boundary.
pub fn verify_segment_credential(
    expected: &Address,
    job_id: &str,
    encoded: &str,
) -> Result<SegmentCredential> {
    let (wire_job_id, descriptor_bytes, signature) = canonical::decode_segment_credential(encoded)?;

    if wire_job_id != job_id {
        tracing::debug!(%expected, job_id, wire_job_id = %wire_job_id, "segment credential for another job");
        return Err(CredsError::SegmentSignatureMismatch);
    }

    FlattenedSegment::parse(&descriptor_bytes)
        .map_err(|e| TokenDecodeError::Layout(format!("descriptor: {e}")))?;

    let payload = segment_signing_payload(job_id, &descriptor_bytes);
    if !verify_signature(expected, &payload, signature.as_bytes())? {
        tracing::debug!(%expected, job_id, "segment credential rejected");
        return Err(CredsError::SegmentSignatureMismatch);
    }

    Ok(SegmentCredential {
        job_id: job_id.to_owned(),
        descriptor_bytes,
        signature,
        encoded: encoded.to_owned(),
    })
}
