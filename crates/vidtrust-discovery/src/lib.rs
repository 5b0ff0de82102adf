//! # vidtrust Discovery
//!
//! Finding orchestrators to send work to.
//!
//! ## Overview
//!
//! [`OrchestratorDiscovery`] is one selection contract over two strategies:
//! a registry query ([`OnChainDiscovery`]) or a single known service URI
//! ([`OffChainDiscovery`]). Both yield [`OrchestratorRecord`]s validated by
//! the same rules, so callers never branch on where a record came from.
//!
//! This is the only crate in the workspace that waits on I/O. Every registry
//! query and every round trip is bounded by [`DiscoveryConfig::timeout`] and
//! fails with [`DiscoveryError::Unreachable`] on expiry.
//!
//! ## Message Flow
//!
//! ```text
//! Broadcaster                         Orchestrator
//!   |-------- GetOrchestratorInfo --->|
//!   |<------- OrchestratorInfo -------|
//!   |-------- Ping { nonce } -------->|
//!   |<------- Pong { signature } -----|
//! ```

pub mod discovery;
pub mod error;
pub mod messages;
pub mod record;
pub mod registry;
pub mod transport;

pub use discovery::{DiscoveryConfig, OffChainDiscovery, OnChainDiscovery, OrchestratorDiscovery};
pub use error::{DiscoveryError, Result};
pub use messages::{limits, DiscoveryErrorCode, DiscoveryRequest, DiscoveryResponse};
pub use record::{Capabilities, OrchestratorRecord, RawRecord};
pub use registry::{memory::MemoryRegistry, Registry};
pub use transport::{
    memory::MemoryNetwork, memory::MemoryTransport, round_trip, RequestHandler, Transport,
};
