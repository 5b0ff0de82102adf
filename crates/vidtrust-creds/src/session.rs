//! Per-job session state.
//!
//! ```text
//! Unregistered --register--> Registered --accept_segment--> Active --close--> Closed
//!                                 |                           ^  |
//!                                 +----------close------------|--+
//! ```
//!
//! Sessions live in memory only; storing them is the caller's concern.

use std::collections::HashMap;

use vidtrust_core::{
    Address, AddressHolder, FlattenedSegment, ManifestId, RecoverableSignature, Signer,
};

use crate::error::{CredsError, Result};
use crate::registration::{verify_registration_request, RegistrationRequest};
use crate::roles::{BroadcasterSession, OrchestratorSession};
use crate::segment::verify_segment_credential;
use crate::token::{verify_job_token, JobToken};

/// Lifecycle of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobState {
    Unregistered,
    /// Token issued, no segment accepted yet.
    Registered,
    /// At least one segment accepted.
    Active,
    Closed,
}

/// Orchestrator-side view of one job.
#[derive(Debug)]
pub struct JobSession {
    job_id: String,
    state: JobState,
    broadcaster: Option<Address>,
    token: Option<JobToken>,
    last_seq: HashMap<ManifestId, u64>,
    accepted: u64,
}

impl JobSession {
    pub fn new(job_id: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            state: JobState::Unregistered,
            broadcaster: None,
            token: None,
            last_seq: HashMap::new(),
            accepted: 0,
        }
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    /// The registered broadcaster, once known.
    pub fn broadcaster(&self) -> Option<Address> {
        self.broadcaster
    }

    /// The issued token, once registered.
    pub fn token(&self) -> Option<&JobToken> {
        self.token.as_ref()
    }

    /// Number of segments accepted so far.
    pub fn accepted(&self) -> u64 {
        self.accepted
    }

    /// Verify a broadcaster's registration and issue the job token.
    pub fn register<O>(&mut self, orchestrator: &O, request: &RegistrationRequest) -> Result<JobToken>
    where
        O: OrchestratorSession + ?Sized,
    {
        match self.state {
            JobState::Unregistered => {}
            JobState::Closed => return Err(CredsError::SessionClosed),
            from => return Err(CredsError::InvalidTransition { from, action: "register" }),
        }

        let broadcaster = verify_registration_request(request)?;
        let token = orchestrator.issue_job_token(&self.job_id)?;

        tracing::debug!(job_id = %self.job_id, %broadcaster, "job registered");
        self.broadcaster = Some(broadcaster);
        self.token = Some(token.clone());
        self.state = JobState::Registered;
        Ok(token)
    }

    /// Verify a segment credential from the registered broadcaster.
    ///
    /// Sequence numbers must strictly increase per manifest, so a credential
    /// can be accepted at most once.
    pub fn accept_segment(&mut self, encoded: &str) -> Result<FlattenedSegment> {
        let broadcaster = match (self.state, self.broadcaster) {
            (JobState::Closed, _) => return Err(CredsError::SessionClosed),
            (JobState::Registered | JobState::Active, Some(address)) => address,
            (from, _) => {
                return Err(CredsError::InvalidTransition {
                    from,
                    action: "accept segment",
                })
            }
        };

        let credential = verify_segment_credential(&broadcaster, &self.job_id, encoded)?;
        let segment = credential.segment()?;

        if let Some(&last) = self.last_seq.get(&segment.manifest_id) {
            if segment.seq <= last {
                tracing::warn!(
                    job_id = %self.job_id,
                    manifest_id = %segment.manifest_id,
                    last,
                    got = segment.seq,
                    "segment sequence did not advance"
                );
                return Err(CredsError::SequenceRegression {
                    manifest_id: segment.manifest_id.to_string(),
                    last,
                    got: segment.seq,
                });
            }
        }

        self.last_seq.insert(segment.manifest_id.clone(), segment.seq);
        self.accepted += 1;
        self.state = JobState::Active;
        Ok(segment)
    }

    /// Close the job. Every later call fails with [`CredsError::SessionClosed`].
    pub fn close(&mut self) -> Result<()> {
        if self.state == JobState::Closed {
            return Err(CredsError::SessionClosed);
        }
        tracing::debug!(job_id = %self.job_id, accepted = self.accepted, "job closed");
        self.state = JobState::Closed;
        Ok(())
    }
}

/// Broadcaster-side view of one job: an identity holding a verified token.
#[derive(Debug, Clone)]
pub struct BroadcastSession<S> {
    identity: S,
    token: JobToken,
}

impl<S: AddressHolder> BroadcastSession<S> {
    /// Verify `encoded_token` against `orchestrator` and open a session.
    pub fn open<A>(identity: S, orchestrator: &A, encoded_token: &str) -> Result<Self>
    where
        A: AddressHolder + ?Sized,
    {
        let token = verify_job_token(orchestrator, encoded_token)?;
        Ok(Self { identity, token })
    }

    pub fn token(&self) -> &JobToken {
        &self.token
    }

    /// Address of the orchestrator that issued the token.
    pub fn orchestrator(&self) -> Address {
        self.token.issuer()
    }
}

impl<S: AddressHolder> AddressHolder for BroadcastSession<S> {
    fn address(&self) -> Address {
        self.identity.address()
    }
}

impl<S: Signer> Signer for BroadcastSession<S> {
    fn sign(&self, payload: &[u8]) -> vidtrust_core::Result<RecoverableSignature> {
        self.identity.sign(payload)
    }
}

impl<S> BroadcasterSession for BroadcastSession<S>
where
    S: Signer + AddressHolder + Send + Sync,
{
    fn job_id(&self) -> &str {
        self.token.job_id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registration::generate_registration_request;
    use url::Url;
    use vidtrust_core::{Keccak256Hash, Keypair, SegmentDescriptor, VideoProfile};

    struct TestOrchestrator {
        keypair: Keypair,
        uri: Url,
    }

    impl TestOrchestrator {
        fn new() -> Self {
            Self {
                keypair: Keypair::generate(),
                uri: Url::parse("https://127.0.0.1:8935").unwrap(),
            }
        }
    }

    impl AddressHolder for TestOrchestrator {
        fn address(&self) -> Address {
            self.keypair.address()
        }
    }

    impl Signer for TestOrchestrator {
        fn sign(&self, payload: &[u8]) -> vidtrust_core::Result<RecoverableSignature> {
            self.keypair.sign(payload)
        }
    }

    impl OrchestratorSession for TestOrchestrator {
        fn service_uri(&self) -> &Url {
            &self.uri
        }
    }

    fn descriptor(manifest: &ManifestId, seq: u64) -> SegmentDescriptor {
        SegmentDescriptor::new(
            manifest.clone(),
            seq,
            Keccak256Hash::hash(&seq.to_be_bytes()),
            vec![VideoProfile::P360P30FPS16X9],
        )
    }

    fn registered() -> (TestOrchestrator, JobSession, BroadcastSession<Keypair>) {
        let orchestrator = TestOrchestrator::new();
        let mut job = JobSession::new("job-1");
        let broadcaster = Keypair::generate();

        let request = generate_registration_request(&broadcaster).unwrap();
        let token = job.register(&orchestrator, &request).unwrap();
        let session = BroadcastSession::open(broadcaster, &orchestrator, token.encoded()).unwrap();
        (orchestrator, job, session)
    }

    #[test]
    fn test_full_lifecycle() {
        let (orchestrator, mut job, session) = registered();
        assert_eq!(job.state(), JobState::Registered);
        assert_eq!(job.broadcaster(), Some(session.address()));
        assert_eq!(session.orchestrator(), orchestrator.address());
        assert_eq!(session.job_id(), "job-1");

        let manifest = ManifestId::random();
        for seq in 0..3 {
            let cred = session.segment_credential(&descriptor(&manifest, seq)).unwrap();
            let segment = job.accept_segment(cred.encoded()).unwrap();
            assert_eq!(segment.seq, seq);
        }
        assert_eq!(job.state(), JobState::Active);
        assert_eq!(job.accepted(), 3);

        job.close().unwrap();
        assert_eq!(job.state(), JobState::Closed);
        assert!(matches!(job.close(), Err(CredsError::SessionClosed)));
    }

    #[test]
    fn test_replayed_segment_rejected() {
        let (_, mut job, session) = registered();
        let manifest = ManifestId::random();
        let cred = session.segment_credential(&descriptor(&manifest, 7)).unwrap();

        job.accept_segment(cred.encoded()).unwrap();
        assert!(matches!(
            job.accept_segment(cred.encoded()),
            Err(CredsError::SequenceRegression { last: 7, got: 7, .. })
        ));

        // Independent manifests keep independent counters.
        let other = session.segment_credential(&descriptor(&ManifestId::random(), 0)).unwrap();
        assert!(job.accept_segment(other.encoded()).is_ok());
    }

    #[test]
    fn test_segment_before_registration() {
        let mut job = JobSession::new("job-1");
        assert!(matches!(
            job.accept_segment("AAAA"),
            Err(CredsError::InvalidTransition { from: JobState::Unregistered, .. })
        ));
    }

    #[test]
    fn test_double_registration() {
        let (orchestrator, mut job, _) = registered();
        let request = generate_registration_request(&Keypair::generate()).unwrap();
        assert!(matches!(
            job.register(&orchestrator, &request),
            Err(CredsError::InvalidTransition { from: JobState::Registered, .. })
        ));
    }

    #[test]
    fn test_closed_session_rejects_work() {
        let (orchestrator, mut job, session) = registered();
        job.close().unwrap();

        let cred = session.segment_credential(&descriptor(&ManifestId::random(), 1)).unwrap();
        assert!(matches!(job.accept_segment(cred.encoded()), Err(CredsError::SessionClosed)));

        let request = generate_registration_request(&Keypair::generate()).unwrap();
        assert!(matches!(job.register(&orchestrator, &request), Err(CredsError::SessionClosed)));
    }

    #[test]
    fn test_segment_from_unregistered_broadcaster() {
        let (_, mut job, _) = registered();
        let stranger = BroadcastSession {
            identity: Keypair::generate(),
            token: job.token().unwrap().clone(),
        };
        let cred = stranger.segment_credential(&descriptor(&ManifestId::random(), 1)).unwrap();
        assert!(matches!(
            job.accept_segment(cred.encoded()),
            Err(CredsError::SegmentSignatureMismatch)
        ));
        assert_eq!(job.state(), JobState::Registered);
    }

    #[test]
    fn test_token_from_other_orchestrator() {
        let (_, job, _) = registered();
        let token = job.token().unwrap();
        assert!(matches!(
            BroadcastSession::open(Keypair::generate(), &TestOrchestrator::new(), token.encoded()),
            Err(CredsError::SignatureMismatch)
        ));
    }
}
