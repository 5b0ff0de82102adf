//! Capability traits for the parties of the protocol.
//!
//! A party's private key never leaves the type that holds it; only its
//! address and the signatures it produces cross these interfaces.

use crate::crypto::{Address, Keypair, RecoverableSignature, SigningService};
use crate::error::Result;

/// Anything with a public address.
pub trait AddressHolder {
    fn address(&self) -> Address;
}

/// Anything that can sign payloads under the personal-message prefix.
pub trait Signer {
    fn sign(&self, payload: &[u8]) -> Result<RecoverableSignature>;
}

/// The shared base capability: sign, and say who signed.
///
/// Role traits build on this instead of being satisfied structurally.
pub trait SigningIdentity: Signer + AddressHolder + Send + Sync {}

impl<T: Signer + AddressHolder + Send + Sync> SigningIdentity for T {}

impl AddressHolder for Address {
    fn address(&self) -> Address {
        *self
    }
}

impl AddressHolder for Keypair {
    fn address(&self) -> Address {
        Keypair::address(self)
    }
}

impl Signer for Keypair {
    fn sign(&self, payload: &[u8]) -> Result<RecoverableSignature> {
        Keypair::sign(self, payload)
    }
}

impl AddressHolder for SigningService {
    fn address(&self) -> Address {
        SigningService::address(self)
    }
}

impl Signer for SigningService {
    fn sign(&self, payload: &[u8]) -> Result<RecoverableSignature> {
        SigningService::sign(self, payload)
    }
}

impl<T: AddressHolder + ?Sized> AddressHolder for &T {
    fn address(&self) -> Address {
        (**self).address()
    }
}

impl<T: Signer + ?Sized> Signer for &T {
    fn sign(&self, payload: &[u8]) -> Result<RecoverableSignature> {
        (**self).sign(payload)
    }
}

impl<T: AddressHolder + ?Sized> AddressHolder for std::sync::Arc<T> {
    fn address(&self) -> Address {
        (**self).address()
    }
}

impl<T: Signer + ?Sized> Signer for std::sync::Arc<T> {
    fn sign(&self, payload: &[u8]) -> Result<RecoverableSignature> {
        (**self).sign(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::verify_signature;

    fn sign_as<I: SigningIdentity>(identity: &I, payload: &[u8]) -> (Address, RecoverableSignature) {
        (identity.address(), identity.sign(payload).unwrap())
    }

    #[test]
    fn test_keypair_is_signing_identity() {
        let keypair = Keypair::generate();
        let (address, signature) = sign_as(&keypair, b"payload");
        assert!(verify_signature(&address, b"payload", signature.as_bytes()).unwrap());
    }

    #[test]
    fn test_service_is_signing_identity() {
        let service = SigningService::new(Keypair::generate());
        let (address, signature) = sign_as(&service, b"payload");
        assert_eq!(address, SigningService::address(&service));
        assert!(verify_signature(&address, b"payload", signature.as_bytes()).unwrap());
    }
}
