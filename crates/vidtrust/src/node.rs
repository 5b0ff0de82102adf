//! The two node roles.
//!
//! An [`Orchestrator`] advertises itself, answers liveness pings and hosts
//! one [`JobSession`] per job. A [`Broadcaster`] discovers orchestrators,
//! filters them by liveness, registers, and submits segment credentials
//! through a [`BroadcastSession`].

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use url::Url;

use vidtrust_core::{
    Address, AddressHolder, CoreError, FlattenedSegment, RecoverableSignature, Signer,
    SigningIdentity,
};
use vidtrust_creds::{
    generate_nonce, generate_registration_request, verify_pong, BroadcastSession, CredsError,
    JobSession, JobState, JobToken, OrchestratorSession, RegistrationRequest,
};
use vidtrust_discovery::{
    round_trip, Capabilities, DiscoveryConfig, DiscoveryError, DiscoveryErrorCode,
    DiscoveryRequest, DiscoveryResponse, OrchestratorDiscovery, OrchestratorRecord,
    RequestHandler, Transport,
};

use crate::error::{NodeError, Result};

/// Configuration for a node.
#[derive(Debug, Clone)]
pub struct NodeConfig {
    /// Discovery configuration.
    pub discovery: DiscoveryConfig,
    /// Whether discovered candidates must answer a liveness ping.
    pub verify_liveness: bool,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            discovery: DiscoveryConfig::default(),
            verify_liveness: true,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Orchestrator
// ─────────────────────────────────────────────────────────────────────────────

/// The orchestrator role.
pub struct Orchestrator<I> {
    identity: I,
    service_uri: Url,
    capabilities: Capabilities,
    jobs: Mutex<HashMap<String, JobSession>>,
}

impl<I: SigningIdentity> Orchestrator<I> {
    pub fn new(identity: I, service_uri: Url, capabilities: Capabilities) -> Self {
        Self {
            identity,
            service_uri,
            capabilities,
            jobs: Mutex::new(HashMap::new()),
        }
    }

    pub fn identity(&self) -> &I {
        &self.identity
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    /// The record this orchestrator advertises.
    pub fn record(&self) -> OrchestratorRecord {
        OrchestratorRecord::new(
            self.identity.address(),
            self.service_uri.clone(),
            self.capabilities.clone(),
        )
    }

    /// Verify a registration and open `job_id` for the registering broadcaster.
    pub async fn open_job(&self, job_id: &str, request: &RegistrationRequest) -> Result<JobToken> {
        let mut jobs = self.jobs.lock().await;
        if jobs.contains_key(job_id) {
            return Err(NodeError::JobExists(job_id.to_owned()));
        }

        let mut session = JobSession::new(job_id);
        let token = session.register(self, request)?;
        jobs.insert(job_id.to_owned(), session);
        Ok(token)
    }

    /// Verify and accept a segment credential under `job_id`.
    pub async fn accept_segment(&self, job_id: &str, encoded: &str) -> Result<FlattenedSegment> {
        let mut jobs = self.jobs.lock().await;
        let session = jobs
            .get_mut(job_id)
            .ok_or_else(|| NodeError::JobNotFound(job_id.to_owned()))?;
        Ok(session.accept_segment(encoded)?)
    }

    /// Close `job_id`. The session is kept so late segments are refused.
    pub async fn close_job(&self, job_id: &str) -> Result<()> {
        let mut jobs = self.jobs.lock().await;
        let session = jobs
            .get_mut(job_id)
            .ok_or_else(|| NodeError::JobNotFound(job_id.to_owned()))?;
        Ok(session.close()?)
    }

    pub async fn job_state(&self, job_id: &str) -> Option<JobState> {
        self.jobs.lock().await.get(job_id).map(JobSession::state)
    }
}

impl<I: AddressHolder> AddressHolder for Orchestrator<I> {
    fn address(&self) -> Address {
        self.identity.address()
    }
}

impl<I: Signer> Signer for Orchestrator<I> {
    fn sign(&self, payload: &[u8]) -> vidtrust_core::Result<RecoverableSignature> {
        self.identity.sign(payload)
    }
}

impl<I: SigningIdentity> OrchestratorSession for Orchestrator<I> {
    fn service_uri(&self) -> &Url {
        &self.service_uri
    }
}

#[async_trait]
impl<I: SigningIdentity + 'static> RequestHandler for Orchestrator<I> {
    async fn handle(&self, request: DiscoveryRequest) -> DiscoveryResponse {
        match request {
            DiscoveryRequest::GetOrchestratorInfo => {
                DiscoveryResponse::OrchestratorInfo(self.record().to_raw())
            }
            DiscoveryRequest::Ping { nonce } => match self.answer_ping(&nonce) {
                Ok(signature) => DiscoveryResponse::Pong { signature },
                Err(CredsError::Core(CoreError::NoSigningKey)) => {
                    DiscoveryResponse::error(DiscoveryErrorCode::NoSigningKey, "no signing key configured")
                }
                Err(e) => {
                    tracing::warn!(error = %e, "failed to answer ping");
                    DiscoveryResponse::error(DiscoveryErrorCode::InternalError, e.to_string())
                }
            },
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Broadcaster
// ─────────────────────────────────────────────────────────────────────────────

/// The broadcaster role.
pub struct Broadcaster<I> {
    identity: I,
    discovery: OrchestratorDiscovery,
    transport: Arc<dyn Transport>,
    config: NodeConfig,
}

impl<I: SigningIdentity> Broadcaster<I> {
    pub fn new(
        identity: I,
        discovery: OrchestratorDiscovery,
        transport: Arc<dyn Transport>,
        config: NodeConfig,
    ) -> Self {
        Self {
            identity,
            discovery,
            transport,
            config,
        }
    }

    pub fn address(&self) -> Address {
        self.identity.address()
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    /// Select up to `count` orchestrators.
    ///
    /// With `verify_liveness` set, candidates whose pong does not recover to
    /// their advertised address, or that cannot be pinged, are dropped.
    pub async fn discover(&self, count: usize) -> Result<Vec<OrchestratorRecord>> {
        let candidates = self.discovery.select(count).await?;
        if !self.config.verify_liveness {
            return Ok(candidates);
        }

        let mut live = Vec::with_capacity(candidates.len());
        for record in candidates {
            match self.check_liveness(&record).await {
                Ok(true) => live.push(record),
                Ok(false) => tracing::warn!(
                    address = %record.address,
                    uri = %record.service_uri,
                    "dropping candidate: pong did not verify"
                ),
                Err(e) => tracing::warn!(
                    address = %record.address,
                    uri = %record.service_uri,
                    error = %e,
                    "dropping candidate: liveness check failed"
                ),
            }
        }
        Ok(live)
    }

    /// Ping `record` and check the pong against its advertised address.
    pub async fn check_liveness(&self, record: &OrchestratorRecord) -> Result<bool> {
        let nonce = generate_nonce();
        let request = DiscoveryRequest::Ping {
            nonce: nonce.to_vec(),
        };
        let response = round_trip(
            self.transport.as_ref(),
            &record.service_uri,
            &request,
            self.config.discovery.timeout,
        )
        .await?;

        match response {
            DiscoveryResponse::Pong { signature } => {
                match verify_pong(&record.address, &nonce, &signature) {
                    Ok(verified) => Ok(verified),
                    Err(CredsError::Core(CoreError::MalformedSignature(reason))) => {
                        tracing::debug!(address = %record.address, %reason, "malformed pong");
                        Ok(false)
                    }
                    Err(e) => Err(e.into()),
                }
            }
            DiscoveryResponse::Error { code, message } => {
                Err(DiscoveryError::Remote { code, message }.into())
            }
            DiscoveryResponse::OrchestratorInfo(_) => {
                Err(DiscoveryError::UnexpectedResponse("info reply to ping").into())
            }
        }
    }

    /// Build the request proving this broadcaster controls its address.
    pub fn registration_request(&self) -> Result<RegistrationRequest> {
        Ok(generate_registration_request(&self.identity)?)
    }

    /// Verify a job token from `orchestrator` and open a submitting session.
    pub fn start_session(&self, encoded_token: &str, orchestrator: &Address) -> Result<BroadcastSession<I>>
    where
        I: Clone,
    {
        let session = BroadcastSession::open(self.identity.clone(), orchestrator, encoded_token)?;
        tracing::debug!(
            job_id = %session.token().job_id(),
            orchestrator = %orchestrator,
            "session started"
        );
        Ok(session)
    }
}
