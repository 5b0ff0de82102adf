//! # vidtrust Core
//!
//! Pure primitives for the vidtrust credential layer: content identifiers,
//! segment descriptors, and recoverable signatures.
//!
//! This crate contains no I/O and no shared mutable state. Every function
//! operates only on its arguments and is safe to call from any thread.
//!
//! ## Key Types
//!
//! - [`ManifestId`] / [`StreamId`] - Hex content identifiers for manifests and renditions
//! - [`SegmentDescriptor`] - Per-segment metadata with a bit-exact [`flatten`](SegmentDescriptor::flatten)
//! - [`Keypair`] / [`SigningService`] - secp256k1 signing under the personal-message prefix
//! - [`Address`] / [`RecoverableSignature`] - What crosses the wire instead of keys
//!
//! ## Digests
//!
//! Keccak-256 is used everywhere. See [`crypto`] module.

pub mod crypto;
pub mod error;
pub mod identity;
pub mod segment;
pub mod types;

pub use crypto::{
    personal_message_digest, verify_signature, Address, Keccak256Hash, Keypair,
    RecoverableSignature, SigningService, ADDRESS_LENGTH, SIGNATURE_LENGTH,
};
pub use error::{CoreError, Result};
pub use identity::{AddressHolder, Signer, SigningIdentity};
pub use segment::{profiles_to_hex, FlattenedSegment, SegmentDescriptor, StorageInfo, VideoProfile};
pub use types::{random_id, ManifestId, StreamId, HASH_LENGTH, MANIFEST_ID_HEX_LENGTH};
