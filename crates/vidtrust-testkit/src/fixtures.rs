//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use vidtrust_core::{
    Address, AddressHolder, CoreError, Keccak256Hash, Keypair, ManifestId, RecoverableSignature,
    SegmentDescriptor, Signer, VideoProfile,
};

/// Job id used by the reference scenarios.
pub const STUB_JOB_ID: &str = "iamajobstring";

/// A signing identity whose signer can be made to fail on demand.
///
/// Clones share the fault switch, so a fault can be injected after the
/// identity has been handed to a session.
#[derive(Clone, Debug)]
pub struct StubIdentity {
    keypair: Keypair,
    fail_signing: Arc<AtomicBool>,
}

impl StubIdentity {
    /// Create with a random keypair.
    pub fn new() -> Self {
        Self::from_keypair(Keypair::generate())
    }

    /// Create with a deterministic keypair.
    ///
    /// Returns `None` for seeds that are not valid secret scalars.
    pub fn with_seed(seed: [u8; 32]) -> Option<Self> {
        Keypair::from_seed(&seed).ok().map(Self::from_keypair)
    }

    pub fn from_keypair(keypair: Keypair) -> Self {
        Self {
            keypair,
            fail_signing: Arc::new(AtomicBool::new(false)),
        }
    }

    /// An identity whose every signature attempt fails.
    pub fn failing() -> Self {
        let stub = Self::new();
        stub.set_fail_signing(true);
        stub
    }

    /// Turn signer fault injection on or off.
    pub fn set_fail_signing(&self, fail: bool) {
        self.fail_signing.store(fail, Ordering::SeqCst);
    }

    pub fn keypair(&self) -> &Keypair {
        &self.keypair
    }
}

impl Default for StubIdentity {
    fn default() -> Self {
        Self::new()
    }
}

impl AddressHolder for StubIdentity {
    fn address(&self) -> Address {
        self.keypair.address()
    }
}

impl Signer for StubIdentity {
    fn sign(&self, payload: &[u8]) -> vidtrust_core::Result<RecoverableSignature> {
        if self.fail_signing.load(Ordering::SeqCst) {
            return Err(CoreError::SigningFailed("injected signer fault".into()));
        }
        self.keypair.sign(payload)
    }
}

/// Create deterministic identities for multi-party tests.
///
/// Party `i` uses the secret scalar `i + 1`.
pub fn multi_party_fixtures(count: u16) -> Vec<StubIdentity> {
    (0..count)
        .filter_map(|i| {
            let mut seed = [0u8; 32];
            seed[30..].copy_from_slice(&(i + 1).to_be_bytes());
            StubIdentity::with_seed(seed)
        })
        .collect()
}

/// The reference segment: content hash is `"browns"` right-padded to 32
/// bytes, under a full-length manifest id of `0x42` bytes.
pub fn stub_segment(seq: u64) -> SegmentDescriptor {
    SegmentDescriptor::new(
        ManifestId::from_raw("42".repeat(32)),
        seq,
        Keccak256Hash::right_padded(b"browns"),
        vec![VideoProfile::P240P30FPS16X9],
    )
}
