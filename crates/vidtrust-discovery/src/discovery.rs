//! Orchestrator selection.
//!
//! One [`OrchestratorDiscovery::select`] contract over two strategies:
//!
//! - [`OnChainDiscovery`] asks a [`Registry`] for candidates.
//! - [`OffChainDiscovery`] wraps a single known service URI and fetches its
//!   record over a [`Transport`].
//!
//! Each call performs a fresh query; nothing is cached and nothing is
//! retried.

use std::sync::Arc;
use std::time::Duration;

use url::Url;

use vidtrust_core::Address;

use crate::error::{DiscoveryError, Result};
use crate::messages::{DiscoveryRequest, DiscoveryResponse};
use crate::record::OrchestratorRecord;
use crate::registry::Registry;
use crate::transport::{round_trip, Transport};

/// Configuration for discovery behavior.
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// Bound on each registry query or network round trip.
    pub timeout: Duration,
    /// Upper bound on candidates returned by one selection.
    pub max_candidates: usize,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(3),
            max_candidates: 16,
        }
    }
}

/// Discovery through a registry collaborator.
#[derive(Clone)]
pub struct OnChainDiscovery {
    registry: Arc<dyn Registry>,
    config: DiscoveryConfig,
}

impl OnChainDiscovery {
    pub fn new(registry: Arc<dyn Registry>, config: DiscoveryConfig) -> Self {
        Self { registry, config }
    }

    /// Up to `desired` validated candidates. Malformed registry entries are
    /// skipped.
    pub async fn select(&self, desired: usize) -> Result<Vec<OrchestratorRecord>> {
        let limit = desired.min(self.config.max_candidates);
        if limit == 0 {
            return Ok(Vec::new());
        }

        let timeout = self.config.timeout;
        let entries = tokio::time::timeout(timeout, self.registry.registered_orchestrators(limit))
            .await
            .map_err(|_| {
                tracing::warn!(?timeout, "registry query timed out");
                DiscoveryError::Unreachable(format!("registry query timed out after {timeout:?}"))
            })??;

        let total = entries.len();
        let mut records: Vec<OrchestratorRecord> = entries
            .into_iter()
            .filter_map(|entry| match OrchestratorRecord::validate(entry) {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!(error = %e, "skipping malformed registry entry");
                    None
                }
            })
            .collect();
        records.truncate(limit);

        tracing::debug!(desired, total, selected = records.len(), "on-chain selection");
        Ok(records)
    }

    /// The registered record for `address`, validated.
    pub async fn lookup(&self, address: &Address) -> Result<Option<OrchestratorRecord>> {
        let timeout = self.config.timeout;
        let entry = tokio::time::timeout(timeout, self.registry.get_registered_orchestrator(address))
            .await
            .map_err(|_| {
                DiscoveryError::Unreachable(format!("registry lookup timed out after {timeout:?}"))
            })??;
        entry.map(OrchestratorRecord::validate).transpose()
    }
}

/// Discovery of one fixed orchestrator.
#[derive(Clone)]
pub struct OffChainDiscovery {
    service_uri: Url,
    transport: Arc<dyn Transport>,
    config: DiscoveryConfig,
}

impl OffChainDiscovery {
    pub fn new(service_uri: Url, transport: Arc<dyn Transport>, config: DiscoveryConfig) -> Self {
        Self {
            service_uri,
            transport,
            config,
        }
    }

    pub fn service_uri(&self) -> &Url {
        &self.service_uri
    }

    /// Fetch the record of the wrapped orchestrator.
    ///
    /// Always yields exactly one candidate, or an error.
    pub async fn select(&self) -> Result<Vec<OrchestratorRecord>> {
        let response = round_trip(
            self.transport.as_ref(),
            &self.service_uri,
            &DiscoveryRequest::GetOrchestratorInfo,
            self.config.timeout,
        )
        .await?;

        match response {
            DiscoveryResponse::OrchestratorInfo(raw) => {
                let record = OrchestratorRecord::validate(raw)?;
                tracing::debug!(uri = %self.service_uri, address = %record.address, "off-chain selection");
                Ok(vec![record])
            }
            DiscoveryResponse::Error { code, message } => Err(DiscoveryError::Remote { code, message }),
            DiscoveryResponse::Pong { .. } => Err(DiscoveryError::UnexpectedResponse("pong to info request")),
        }
    }
}

/// Orchestrator discovery strategy.
#[derive(Clone)]
pub enum OrchestratorDiscovery {
    OnChain(OnChainDiscovery),
    OffChain(OffChainDiscovery),
}

impl OrchestratorDiscovery {
    pub fn on_chain(registry: Arc<dyn Registry>, config: DiscoveryConfig) -> Self {
        OrchestratorDiscovery::OnChain(OnChainDiscovery::new(registry, config))
    }

    pub fn off_chain(service_uri: Url, transport: Arc<dyn Transport>, config: DiscoveryConfig) -> Self {
        OrchestratorDiscovery::OffChain(OffChainDiscovery::new(service_uri, transport, config))
    }

    /// Select candidates.
    ///
    /// On-chain returns at most `desired`; off-chain returns its single
    /// orchestrator regardless of `desired`.
    pub async fn select(&self, desired: usize) -> Result<Vec<OrchestratorRecord>> {
        match self {
            OrchestratorDiscovery::OnChain(d) => d.select(desired).await,
            OrchestratorDiscovery::OffChain(d) => d.select().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::DiscoveryErrorCode;
    use crate::record::{Capabilities, RawRecord};
    use crate::registry::memory::MemoryRegistry;
    use crate::transport::memory::MemoryNetwork;
    use crate::transport::RequestHandler;
    use async_trait::async_trait;

    fn raw(address: &str, uri: &str) -> RawRecord {
        RawRecord {
            address: address.into(),
            service_uri: uri.into(),
            capabilities: Capabilities::default(),
        }
    }

    fn addr(byte: u8) -> String {
        Address::from_bytes([byte; 20]).to_hex()
    }

    fn quick() -> DiscoveryConfig {
        DiscoveryConfig {
            timeout: Duration::from_millis(100),
            ..DiscoveryConfig::default()
        }
    }

    struct Info(RawRecord);

    #[async_trait]
    impl RequestHandler for Info {
        async fn handle(&self, request: DiscoveryRequest) -> DiscoveryResponse {
            match request {
                DiscoveryRequest::GetOrchestratorInfo => DiscoveryResponse::OrchestratorInfo(self.0.clone()),
                DiscoveryRequest::Ping { .. } => {
                    DiscoveryResponse::error(DiscoveryErrorCode::NoSigningKey, "no key")
                }
            }
        }
    }

    struct SlowRegistry;

    #[async_trait]
    impl Registry for SlowRegistry {
        async fn registered_orchestrators(&self, _limit: usize) -> Result<Vec<RawRecord>> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(Vec::new())
        }

        async fn get_registered_orchestrator(&self, _address: &Address) -> Result<Option<RawRecord>> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(None)
        }
    }

    struct BrokenRegistry;

    #[async_trait]
    impl Registry for BrokenRegistry {
        async fn registered_orchestrators(&self, _limit: usize) -> Result<Vec<RawRecord>> {
            Err(DiscoveryError::Registry("node not synced".into()))
        }

        async fn get_registered_orchestrator(&self, _address: &Address) -> Result<Option<RawRecord>> {
            Err(DiscoveryError::Registry("node not synced".into()))
        }
    }

    #[test]
    fn test_default_config() {
        let config = DiscoveryConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(3));
        assert_eq!(config.max_candidates, 16);
    }

    #[tokio::test]
    async fn test_on_chain_skips_malformed_entries() {
        let registry = Arc::new(MemoryRegistry::with_entries(vec![
            raw(&addr(1), "https://a.example"),
            raw("0xnothex", "https://b.example"),
            raw(&addr(3), "no host here"),
            raw(&addr(4), "https://d.example"),
        ]));
        let discovery = OrchestratorDiscovery::on_chain(registry, quick());

        let records = discovery.select(4).await.unwrap();
        let addresses: Vec<String> = records.iter().map(|r| r.address.to_hex()).collect();
        assert_eq!(addresses, vec![addr(1), addr(4)]);
    }

    #[tokio::test]
    async fn test_on_chain_respects_desired_and_cap() {
        let entries = (1..=20u8).map(|i| raw(&addr(i), "https://o.example")).collect();
        let registry = Arc::new(MemoryRegistry::with_entries(entries));
        let discovery = OrchestratorDiscovery::on_chain(registry, quick());

        assert_eq!(discovery.select(2).await.unwrap().len(), 2);
        assert_eq!(discovery.select(100).await.unwrap().len(), 16);
        assert!(discovery.select(0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_on_chain_registry_timeout() {
        let discovery = OrchestratorDiscovery::on_chain(Arc::new(SlowRegistry), quick());
        let started = std::time::Instant::now();
        assert!(matches!(discovery.select(3).await, Err(DiscoveryError::Unreachable(_))));
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_on_chain_registry_failure_surfaces() {
        let discovery = OnChainDiscovery::new(Arc::new(BrokenRegistry), quick());
        assert!(matches!(discovery.select(3).await, Err(DiscoveryError::Registry(_))));
        assert!(matches!(
            discovery.lookup(&Address::from_bytes([9; 20])).await,
            Err(DiscoveryError::Registry(_))
        ));
    }

    #[tokio::test]
    async fn test_on_chain_lookup() {
        let registry = Arc::new(MemoryRegistry::with_entries(vec![raw(&addr(9), "https://n.example")]));
        let discovery = OnChainDiscovery::new(registry, quick());

        let found = discovery.lookup(&Address::from_bytes([9; 20])).await.unwrap().unwrap();
        assert_eq!(found.service_uri.as_str(), "https://n.example/");
        assert!(discovery.lookup(&Address::from_bytes([8; 20])).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_off_chain_single_candidate() {
        let uri = Url::parse("https://orch.example:8935").unwrap();
        let network = MemoryNetwork::new();
        network
            .serve(uri.clone(), Arc::new(Info(raw(&addr(7), "https://orch.example:8935"))))
            .await;

        let discovery = OrchestratorDiscovery::off_chain(uri, Arc::new(network.transport()), quick());
        for desired in [0, 1, 5] {
            let records = discovery.select(desired).await.unwrap();
            assert_eq!(records.len(), 1);
            assert_eq!(records[0].address.to_hex(), addr(7));
        }
    }

    #[tokio::test]
    async fn test_off_chain_unreachable() {
        let transport = Arc::new(MemoryNetwork::new().transport());
        let uri = Url::parse("https://gone.example").unwrap();
        let discovery = OrchestratorDiscovery::off_chain(uri, transport, quick());

        let started = std::time::Instant::now();
        assert!(matches!(discovery.select(1).await, Err(DiscoveryError::Unreachable(_))));
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_off_chain_invalid_record() {
        let uri = Url::parse("https://orch.example").unwrap();
        let network = MemoryNetwork::new();
        network
            .serve(uri.clone(), Arc::new(Info(raw(&Address::ZERO.to_hex(), "https://orch.example"))))
            .await;

        let discovery = OrchestratorDiscovery::off_chain(uri, Arc::new(network.transport()), quick());
        assert!(matches!(discovery.select(1).await, Err(DiscoveryError::InvalidRecord(_))));
    }
}
