//! Cryptographic primitives for vidtrust.
//!
//! Wraps secp256k1 recoverable signing and Keccak-256 hashing with strong
//! types. Every signature is taken over the personal-message digest
//! `Keccak256("\x19Ethereum Signed Message:\n32" || Keccak256(payload))`.

use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};
use std::fmt;

use crate::error::{CoreError, Result};

/// Domain-separation prefix for personal messages over a 32-byte hash.
pub const PERSONAL_MESSAGE_PREFIX: &[u8] = b"\x19Ethereum Signed Message:\n32";

/// Length of a recoverable signature in `r || s || v` form.
pub const SIGNATURE_LENGTH: usize = 65;

/// Length of an account address.
pub const ADDRESS_LENGTH: usize = 20;

/// A 32-byte Keccak-256 digest.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Keccak256Hash(pub [u8; 32]);

impl Keccak256Hash {
    /// Compute the Keccak-256 digest of the given data.
    pub fn hash(data: &[u8]) -> Self {
        Self(Keccak256::digest(data).into())
    }

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Right-pad `data` with zeros into a 32-byte hash value.
    ///
    /// Inputs longer than 32 bytes are truncated.
    pub fn right_padded(data: &[u8]) -> Self {
        let mut out = [0u8; 32];
        let n = data.len().min(32);
        out[..n].copy_from_slice(&data[..n]);
        Self(out)
    }

    /// The zero hash (sentinel value).
    pub const ZERO: Self = Self([0u8; 32]);
}

impl fmt::Debug for Keccak256Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Keccak256({})", &self.to_hex()[..16])
    }
}

impl AsRef<[u8]> for Keccak256Hash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 32]> for Keccak256Hash {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

/// Digest that is actually signed for `payload`.
pub fn personal_message_digest(payload: &[u8]) -> Keccak256Hash {
    let inner = Keccak256Hash::hash(payload);
    let mut hasher = Keccak256::new();
    hasher.update(PERSONAL_MESSAGE_PREFIX);
    hasher.update(inner.0);
    Keccak256Hash(hasher.finalize().into())
}

/// A 20-byte account address derived from a secp256k1 public key.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Address(pub [u8; ADDRESS_LENGTH]);

impl Address {
    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; ADDRESS_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Parse from a byte slice that must be exactly 20 bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let arr: [u8; ADDRESS_LENGTH] = bytes.try_into().map_err(|_| {
            CoreError::MalformedAddress(format!(
                "expected {} bytes, got {}",
                ADDRESS_LENGTH,
                bytes.len()
            ))
        })?;
        Ok(Self(arr))
    }

    /// Parse from hex, with or without a `0x` prefix.
    pub fn from_hex(s: &str) -> Result<Self> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(digits).map_err(|e| CoreError::MalformedAddress(e.to_string()))?;
        Self::from_slice(&bytes)
    }

    /// Derive the address of a public key: the low 20 bytes of
    /// `Keccak256(uncompressed_point[1..])`.
    pub fn from_verifying_key(key: &VerifyingKey) -> Self {
        let point = key.to_encoded_point(false);
        let digest = Keccak256Hash::hash(&point.as_bytes()[1..]);
        let mut out = [0u8; ADDRESS_LENGTH];
        out.copy_from_slice(&digest.0[32 - ADDRESS_LENGTH..]);
        Self(out)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; ADDRESS_LENGTH] {
        &self.0
    }

    /// Convert to `0x`-prefixed lowercase hex.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// True for the unconfigured address.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; ADDRESS_LENGTH]
    }

    /// The zero address.
    pub const ZERO: Self = Self([0u8; ADDRESS_LENGTH]);
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_hex())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; ADDRESS_LENGTH]> for Address {
    fn from(bytes: [u8; ADDRESS_LENGTH]) -> Self {
        Self(bytes)
    }
}

/// A 65-byte recoverable signature in `r || s || v` form.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct RecoverableSignature(pub [u8; SIGNATURE_LENGTH]);

impl RecoverableSignature {
    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; SIGNATURE_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Parse from a slice that must be exactly 65 bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let arr: [u8; SIGNATURE_LENGTH] = bytes.try_into().map_err(|_| {
            CoreError::MalformedSignature(format!(
                "expected {} bytes, got {}",
                SIGNATURE_LENGTH,
                bytes.len()
            ))
        })?;
        Ok(Self(arr))
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; SIGNATURE_LENGTH] {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Recover the address that produced this signature over `digest`.
    ///
    /// Returns `Ok(None)` when the signature is well-formed but no key
    /// recovers from it; that is a verification failure, not a format error.
    pub fn recover(&self, digest: &Keccak256Hash) -> Result<Option<Address>> {
        let signature = Signature::from_slice(&self.0[..64])
            .map_err(|e| CoreError::MalformedSignature(e.to_string()))?;
        // v is the raw parity bit; 27/28 offsets are rejected.
        let v = self.0[64];
        let recovery_id = RecoveryId::from_byte(v)
            .filter(|_| v <= 1)
            .ok_or_else(|| CoreError::MalformedSignature(format!("invalid recovery byte {v}")))?;

        match VerifyingKey::recover_from_prehash(&digest.0, &signature, recovery_id) {
            Ok(key) => Ok(Some(Address::from_verifying_key(&key))),
            Err(_) => Ok(None),
        }
    }
}

impl fmt::Debug for RecoverableSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RecoverableSig({}...)", &self.to_hex()[..16])
    }
}

impl AsRef<[u8]> for RecoverableSignature {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; SIGNATURE_LENGTH]> for RecoverableSignature {
    fn from(bytes: [u8; SIGNATURE_LENGTH]) -> Self {
        Self(bytes)
    }
}

/// Check that `signature` over `payload` recovers to `claimed`.
///
/// A well-formed signature by someone else yields `Ok(false)`. Bytes that
/// cannot be a signature at all yield [`CoreError::MalformedSignature`].
pub fn verify_signature(claimed: &Address, payload: &[u8], signature: &[u8]) -> Result<bool> {
    let signature = RecoverableSignature::from_slice(signature)?;
    let digest = personal_message_digest(payload);
    Ok(signature.recover(&digest)? == Some(*claimed))
}

/// A secp256k1 keypair.
///
/// This wraps k256's SigningKey.
#[derive(Clone)]
pub struct Keypair {
    signing_key: SigningKey,
}

impl Keypair {
    /// Generate a new random keypair.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let signing_key = SigningKey::random(&mut rng);
        Self { signing_key }
    }

    /// Create from a 32-byte secret scalar.
    ///
    /// Fails for the zero scalar and for values not below the curve order.
    pub fn from_seed(seed: &[u8; 32]) -> Result<Self> {
        let signing_key = SigningKey::from_slice(seed)
            .map_err(|e| CoreError::SigningFailed(format!("invalid secret key: {e}")))?;
        Ok(Self { signing_key })
    }

    /// Get the address of this keypair.
    pub fn address(&self) -> Address {
        Address::from_verifying_key(self.signing_key.verifying_key())
    }

    /// Sign a 32-byte digest directly.
    pub fn sign_digest(&self, digest: &Keccak256Hash) -> Result<RecoverableSignature> {
        let (signature, recovery_id) = self
            .signing_key
            .sign_prehash_recoverable(&digest.0)
            .map_err(|e| CoreError::SigningFailed(e.to_string()))?;

        let mut out = [0u8; SIGNATURE_LENGTH];
        out[..64].copy_from_slice(&signature.to_bytes());
        out[64] = recovery_id.to_byte();
        Ok(RecoverableSignature(out))
    }

    /// Sign a payload under the personal-message prefix.
    pub fn sign(&self, payload: &[u8]) -> Result<RecoverableSignature> {
        self.sign_digest(&personal_message_digest(payload))
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Keypair({:?})", self.address())
    }
}

/// Signing service over an optional keypair.
///
/// The key is supplied by an external keystore; an unconfigured service
/// reports the zero address and refuses to sign.
#[derive(Clone, Debug, Default)]
pub struct SigningService {
    keypair: Option<Keypair>,
}

impl SigningService {
    /// A service holding `keypair`.
    pub fn new(keypair: Keypair) -> Self {
        Self { keypair: Some(keypair) }
    }

    /// A service with no key configured.
    pub fn unconfigured() -> Self {
        Self { keypair: None }
    }

    /// Whether a key is configured.
    pub fn is_configured(&self) -> bool {
        self.keypair.is_some()
    }

    /// Sign `payload`, failing with [`CoreError::NoSigningKey`] if unconfigured.
    pub fn sign(&self, payload: &[u8]) -> Result<RecoverableSignature> {
        self.keypair
            .as_ref()
            .ok_or(CoreError::NoSigningKey)?
            .sign(payload)
    }

    /// Address of the held key, or the zero address.
    pub fn address(&self) -> Address {
        self.keypair
            .as_ref()
            .map(Keypair::address)
            .unwrap_or(Address::ZERO)
    }

    /// See [`verify_signature`].
    pub fn verify_signature(claimed: &Address, payload: &[u8], signature: &[u8]) -> Result<bool> {
        verify_signature(claimed, payload, signature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_keccak_empty_input() {
        assert_eq!(
            Keccak256Hash::hash(b"").to_hex(),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn test_address_from_known_key() {
        // Secret key 1 maps to the generator point.
        let mut seed = [0u8; 32];
        seed[31] = 1;
        let keypair = Keypair::from_seed(&seed).unwrap();
        assert_eq!(
            keypair.address().to_hex(),
            "0x7e5f4552091a69125d5dfcb7b8c2659029395bdf"
        );
    }

    #[test]
    fn test_zero_seed_is_rejected() {
        assert!(Keypair::from_seed(&[0u8; 32]).is_err());
    }

    #[test]
    fn test_sign_verify() {
        let keypair = Keypair::generate();
        let message = b"hello world";
        let signature = keypair.sign(message).unwrap();

        assert!(verify_signature(&keypair.address(), message, signature.as_bytes()).unwrap());

        // Tampered message should fail cleanly
        assert!(!verify_signature(&keypair.address(), b"hello worlD", signature.as_bytes()).unwrap());
    }

    #[test]
    fn test_signature_length_is_checked() {
        let keypair = Keypair::generate();
        let signature = keypair.sign(b"msg").unwrap();
        assert!(matches!(
            verify_signature(&keypair.address(), b"msg", &signature.as_bytes()[..64]),
            Err(CoreError::MalformedSignature(_))
        ));
        assert!(matches!(
            verify_signature(&keypair.address(), b"msg", &[]),
            Err(CoreError::MalformedSignature(_))
        ));
    }

    #[test]
    fn test_recovery_byte_must_be_parity() {
        let keypair = Keypair::generate();
        let mut signature = keypair.sign(b"msg").unwrap();
        assert!(signature.0[64] <= 1);

        signature.0[64] += 27;
        assert!(matches!(
            verify_signature(&keypair.address(), b"msg", signature.as_bytes()),
            Err(CoreError::MalformedSignature(_))
        ));
    }

    #[test]
    fn test_unconfigured_service() {
        let service = SigningService::unconfigured();
        assert_eq!(service.address(), Address::ZERO);
        assert_eq!(service.sign(b"payload"), Err(CoreError::NoSigningKey));
    }

    #[test]
    fn test_configured_service() {
        let keypair = Keypair::generate();
        let service = SigningService::new(keypair.clone());
        assert_eq!(service.address(), keypair.address());
        let signature = service.sign(b"payload").unwrap();
        assert!(SigningService::verify_signature(&service.address(), b"payload", signature.as_bytes()).unwrap());
    }

    #[test]
    fn test_address_hex_roundtrip() {
        let address = Keypair::generate().address();
        assert_eq!(Address::from_hex(&address.to_hex()).unwrap(), address);
        assert_eq!(Address::from_hex(&address.to_hex()[2..]).unwrap(), address);
        assert!(matches!(
            Address::from_hex("#non-hex address!"),
            Err(CoreError::MalformedAddress(_))
        ));
        assert!(Address::from_hex("0x1234").is_err());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_own_signature_verifies(msg in prop::collection::vec(any::<u8>(), 0..256)) {
            let keypair = Keypair::generate();
            let signature = keypair.sign(&msg).unwrap();
            prop_assert!(verify_signature(&keypair.address(), &msg, signature.as_bytes()).unwrap());
        }

        #[test]
        fn prop_other_signature_rejected(msg in prop::collection::vec(any::<u8>(), 0..256)) {
            let a = Keypair::generate();
            let b = Keypair::generate();
            let signature = b.sign(&msg).unwrap();
            prop_assert!(!verify_signature(&a.address(), &msg, signature.as_bytes()).unwrap());
        }

        #[test]
        fn prop_flipped_byte_never_verifies(
            msg in prop::collection::vec(any::<u8>(), 1..64),
            index in 0usize..SIGNATURE_LENGTH,
            mask in 1u8..=255,
        ) {
            let keypair = Keypair::generate();
            let mut signature = keypair.sign(&msg).unwrap();
            signature.0[index] ^= mask;
            let result = verify_signature(&keypair.address(), &msg, signature.as_bytes());
            prop_assert!(!matches!(result, Ok(true)));
        }
    }
}
