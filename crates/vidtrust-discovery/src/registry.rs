//! Registry collaborator used by on-chain discovery.
//!
//! The registry owns ranking and stake-weighting; discovery only bounds the
//! query and validates what comes back.

use async_trait::async_trait;

use vidtrust_core::Address;

use crate::error::Result;
use crate::record::RawRecord;

/// Source of registered orchestrators.
#[async_trait]
pub trait Registry: Send + Sync {
    /// Up to `limit` registered orchestrators, in the registry's preferred order.
    async fn registered_orchestrators(&self, limit: usize) -> Result<Vec<RawRecord>>;

    /// The registered record for `address`, if any.
    async fn get_registered_orchestrator(&self, address: &Address) -> Result<Option<RawRecord>>;
}

/// In-memory registry for testing.
pub mod memory {
    use super::*;
    use tokio::sync::RwLock;

    /// Entries are returned in insertion order.
    #[derive(Default)]
    pub struct MemoryRegistry {
        entries: RwLock<Vec<RawRecord>>,
    }

    impl MemoryRegistry {
        pub fn new() -> Self {
            Self::default()
        }

        /// Seed from a list of records.
        pub fn with_entries(entries: Vec<RawRecord>) -> Self {
            Self {
                entries: RwLock::new(entries),
            }
        }

        /// Register a record. No validation is done here.
        pub async fn insert(&self, entry: RawRecord) {
            self.entries.write().await.push(entry);
        }

        pub async fn len(&self) -> usize {
            self.entries.read().await.len()
        }

        pub async fn is_empty(&self) -> bool {
            self.entries.read().await.is_empty()
        }
    }

    #[async_trait]
    impl Registry for MemoryRegistry {
        async fn registered_orchestrators(&self, limit: usize) -> Result<Vec<RawRecord>> {
            Ok(self.entries.read().await.iter().take(limit).cloned().collect())
        }

        async fn get_registered_orchestrator(&self, address: &Address) -> Result<Option<RawRecord>> {
            let entries = self.entries.read().await;
            Ok(entries
                .iter()
                .find(|entry| {
                    Address::from_hex(&entry.address)
                        .map(|a| a == *address)
                        .unwrap_or(false)
                })
                .cloned())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::memory::MemoryRegistry;
    use super::*;
    use crate::record::Capabilities;

    fn entry(address: &str) -> RawRecord {
        RawRecord {
            address: address.into(),
            service_uri: "https://orch.example".into(),
            capabilities: Capabilities::default(),
        }
    }

    #[tokio::test]
    async fn test_limit_respected() {
        let registry = MemoryRegistry::new();
        for i in 1..=5u8 {
            registry.insert(entry(&Address::from_bytes([i; 20]).to_hex())).await;
        }
        assert_eq!(registry.len().await, 5);
        assert_eq!(registry.registered_orchestrators(3).await.unwrap().len(), 3);
        assert_eq!(registry.registered_orchestrators(10).await.unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_lookup_by_address() {
        let wanted = Address::from_bytes([0x22; 20]);
        let registry = MemoryRegistry::with_entries(vec![
            entry("garbage"),
            entry(&Address::from_bytes([0x11; 20]).to_hex()),
            // Stored without the 0x prefix.
            entry(&wanted.to_hex()[2..]),
        ]);

        let found = registry.get_registered_orchestrator(&wanted).await.unwrap().unwrap();
        assert_eq!(Address::from_hex(&found.address).unwrap(), wanted);
        assert!(registry
            .get_registered_orchestrator(&Address::from_bytes([0x33; 20]))
            .await
            .unwrap()
            .is_none());
    }
}
