//! Transport abstraction for discovery round trips.
//!
//! The transport is byte-in/byte-out: it carries one encoded request to a
//! service URI and returns the encoded reply. Framing and retries belong to
//! implementations.

use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use crate::error::{DiscoveryError, Result};
use crate::messages::{DiscoveryRequest, DiscoveryResponse};

/// Request/response exchange with a remote service.
///
/// Implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send `request` to `uri` and wait for the reply bytes.
    async fn exchange(&self, uri: &Url, request: Vec<u8>) -> Result<Vec<u8>>;
}

/// The serving side of a discovery round trip.
#[async_trait]
pub trait RequestHandler: Send + Sync {
    async fn handle(&self, request: DiscoveryRequest) -> DiscoveryResponse;
}

/// Perform one request/response round trip bounded by `timeout`.
///
/// Any transport failure, including expiry of the timeout, is reported as
/// [`DiscoveryError::Unreachable`].
pub async fn round_trip<T>(
    transport: &T,
    uri: &Url,
    request: &DiscoveryRequest,
    timeout: Duration,
) -> Result<DiscoveryResponse>
where
    T: Transport + ?Sized,
{
    let bytes = request.to_bytes()?;
    let reply = match tokio::time::timeout(timeout, transport.exchange(uri, bytes)).await {
        Ok(Ok(reply)) => reply,
        Ok(Err(DiscoveryError::Unreachable(reason))) => {
            tracing::debug!(%uri, %reason, "round trip failed");
            return Err(DiscoveryError::Unreachable(reason));
        }
        Ok(Err(e)) => {
            tracing::debug!(%uri, error = %e, "round trip failed");
            return Err(DiscoveryError::Unreachable(format!("{uri}: {e}")));
        }
        Err(_) => {
            tracing::warn!(%uri, ?timeout, "round trip timed out");
            return Err(DiscoveryError::Unreachable(format!("{uri}: timed out after {timeout:?}")));
        }
    };
    DiscoveryResponse::from_bytes(&reply)
}

/// A simple in-memory transport for testing.
///
/// Routes each exchange to the handler registered under the exact URI.
pub mod memory {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    use crate::messages::DiscoveryErrorCode;

    /// Shared routing table for memory transports.
    pub struct MemoryNetwork {
        handlers: RwLock<HashMap<Url, Arc<dyn RequestHandler>>>,
    }

    impl MemoryNetwork {
        /// Create a new memory network.
        pub fn new() -> Arc<Self> {
            Arc::new(Self::default())
        }

        /// Serve `handler` at `uri`, replacing any previous handler.
        pub async fn serve(&self, uri: Url, handler: Arc<dyn RequestHandler>) {
            self.handlers.write().await.insert(uri, handler);
        }

        /// Stop serving `uri`.
        pub async fn shutdown(&self, uri: &Url) {
            self.handlers.write().await.remove(uri);
        }

        /// Create a transport connected to this network.
        pub fn transport(self: &Arc<Self>) -> MemoryTransport {
            MemoryTransport {
                network: Arc::clone(self),
            }
        }
    }

    impl Default for MemoryNetwork {
        fn default() -> Self {
            Self {
                handlers: RwLock::new(HashMap::new()),
            }
        }
    }

    /// In-memory transport implementation.
    #[derive(Clone)]
    pub struct MemoryTransport {
        network: Arc<MemoryNetwork>,
    }

    #[async_trait]
    impl Transport for MemoryTransport {
        async fn exchange(&self, uri: &Url, request: Vec<u8>) -> Result<Vec<u8>> {
            let handler = self
                .network
                .handlers
                .read()
                .await
                .get(uri)
                .cloned()
                .ok_or_else(|| DiscoveryError::Unreachable(format!("{uri}: connection refused")))?;

            let response = match DiscoveryRequest::from_bytes(&request) {
                Ok(request) => match request.validate_limits() {
                    Ok(()) => handler.handle(request).await,
                    Err(reason) => DiscoveryResponse::error(DiscoveryErrorCode::MessageTooLarge, reason),
                },
                Err(e) => DiscoveryResponse::error(DiscoveryErrorCode::InvalidMessage, e.to_string()),
            };
            response.to_bytes()
        }
    }
}
