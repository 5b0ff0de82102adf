//! # vidtrust
//!
//! The trust layer between broadcasters submitting video segments and the
//! orchestrators transcoding them.
//!
//! ## Overview
//!
//! - **Identity**: secp256k1 keys; parties are known by 20-byte addresses
//!   recovered from their signatures
//! - **Discovery**: choose orchestrators from a registry or a fixed address,
//!   and prove each one holds its advertised key with a ping
//! - **Credentials**: registration, job tokens and per-segment credentials,
//!   each a base64 string that verifies against one expected address
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use vidtrust::{Broadcaster, NodeConfig, Orchestrator};
//! use vidtrust::core::{Keypair, ManifestId, SegmentDescriptor, VideoProfile};
//! use vidtrust::creds::BroadcasterSession;
//! use vidtrust::discovery::{Capabilities, MemoryNetwork, OrchestratorDiscovery};
//!
//! async fn example() -> anyhow::Result<()> {
//!     let uri = url::Url::parse("https://orch.example:8935")?;
//!     let orchestrator = Arc::new(Orchestrator::new(
//!         Keypair::generate(),
//!         uri.clone(),
//!         Capabilities::with_profiles(&VideoProfile::PRESETS),
//!     ));
//!
//!     let network = MemoryNetwork::new();
//!     network.serve(uri.clone(), orchestrator.clone()).await;
//!     let transport = Arc::new(network.transport());
//!
//!     let config = NodeConfig::default();
//!     let discovery = OrchestratorDiscovery::off_chain(uri, transport.clone(), config.discovery.clone());
//!     let broadcaster = Broadcaster::new(Keypair::generate(), discovery, transport, config);
//!
//!     let selected = broadcaster.discover(1).await?;
//!     let token = orchestrator.open_job("job-1", &broadcaster.registration_request()?).await?;
//!     let session = broadcaster.start_session(token.encoded(), &selected[0].address)?;
//!
//!     let descriptor = SegmentDescriptor::for_payload(
//!         ManifestId::random(),
//!         0,
//!         b"segment bytes",
//!         vec![VideoProfile::P240P30FPS16X9],
//!     );
//!     let credential = session.segment_credential(&descriptor)?;
//!     orchestrator.accept_segment("job-1", credential.encoded()).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Re-exports
//!
//! This crate re-exports the component crates for convenience:
//!
//! - `vidtrust::core` - Identifiers, descriptors, keys and signatures
//! - `vidtrust::creds` - Credential protocol and job sessions
//! - `vidtrust::discovery` - Orchestrator discovery

pub mod error;
pub mod node;

// Re-export component crates
pub use vidtrust_core as core;
pub use vidtrust_creds as creds;
pub use vidtrust_discovery as discovery;

// Re-export main types for convenience
pub use error::{NodeError, Result};
pub use node::{Broadcaster, NodeConfig, Orchestrator};

// Re-export commonly used types
pub use vidtrust_core::{
    Address, Keypair, ManifestId, SegmentDescriptor, SigningIdentity, SigningService, StreamId,
    VideoProfile,
};
pub use vidtrust_creds::{BroadcastSession, JobState, JobToken, RegistrationRequest, SegmentCredential};
pub use vidtrust_discovery::{DiscoveryConfig, OrchestratorDiscovery, OrchestratorRecord};
