//! The common orchestrator record shape.
//!
//! Both discovery variants receive records in untrusted [`RawRecord`] form
//! and pass them through the same [`OrchestratorRecord::validate`], so a
//! record means the same thing whichever variant produced it.

use serde::{Deserialize, Serialize};
use url::Url;

use vidtrust_core::{Address, VideoProfile};

use crate::error::{DiscoveryError, Result};

/// What an orchestrator says it can do.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    /// Names of the output profiles it transcodes to.
    pub profiles: Vec<String>,
    /// Free-form software version, if advertised.
    pub version: Option<String>,
}

impl Capabilities {
    /// Advertise the given profiles.
    pub fn with_profiles(profiles: &[VideoProfile]) -> Self {
        Self {
            profiles: profiles.iter().map(|p| p.name.to_owned()).collect(),
            version: None,
        }
    }

    /// The advertised profiles that name a known preset, in advertised order.
    pub fn video_profiles(&self) -> Vec<VideoProfile> {
        self.profiles
            .iter()
            .filter_map(|name| VideoProfile::lookup(name))
            .collect()
    }

    /// Check whether `profile` is advertised.
    pub fn supports(&self, profile: &VideoProfile) -> bool {
        self.profiles.iter().any(|name| name == profile.name)
    }
}

/// A record as advertised by a registry or a peer, before validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    /// Hex address, `0x` prefix optional.
    pub address: String,
    pub service_uri: String,
    #[serde(default)]
    pub capabilities: Capabilities,
}

/// A validated orchestrator candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrchestratorRecord {
    pub address: Address,
    pub service_uri: Url,
    pub capabilities: Capabilities,
}

impl OrchestratorRecord {
    pub fn new(address: Address, service_uri: Url, capabilities: Capabilities) -> Self {
        Self {
            address,
            service_uri,
            capabilities,
        }
    }

    /// Validate an advertised record.
    ///
    /// The address must be 20 bytes of hex and not the zero address; the
    /// service URI must parse and name a host. Profile names that match no
    /// preset are dropped from the capabilities.
    pub fn validate(raw: RawRecord) -> Result<Self> {
        let address = Address::from_hex(&raw.address)
            .map_err(|e| DiscoveryError::InvalidRecord(format!("address {:?}: {e}", raw.address)))?;
        if address.is_zero() {
            return Err(DiscoveryError::InvalidRecord("zero address".into()));
        }

        let service_uri = Url::parse(&raw.service_uri).map_err(|e| {
            DiscoveryError::InvalidRecord(format!("service uri {:?}: {e}", raw.service_uri))
        })?;
        if service_uri.host().is_none() {
            return Err(DiscoveryError::InvalidRecord(format!(
                "service uri {:?} has no host",
                raw.service_uri
            )));
        }

        let mut capabilities = raw.capabilities;
        let known: Vec<String> = capabilities
            .video_profiles()
            .iter()
            .map(|p| p.name.to_owned())
            .collect();
        if known.len() != capabilities.profiles.len() {
            tracing::debug!(
                %address,
                advertised = capabilities.profiles.len(),
                known = known.len(),
                "dropping unknown profile names"
            );
            capabilities.profiles = known;
        }

        Ok(Self {
            address,
            service_uri,
            capabilities,
        })
    }

    /// The advertised form of this record.
    pub fn to_raw(&self) -> RawRecord {
        RawRecord {
            address: self.address.to_hex(),
            service_uri: self.service_uri.to_string(),
            capabilities: self.capabilities.clone(),
        }
    }
}
