//! Registration requests: a broadcaster proving it controls its address.

use vidtrust_core::{
    personal_message_digest, Address, CoreError, RecoverableSignature, SigningIdentity,
};

use crate::canonical;
use crate::error::{CredsError, Result};

/// A claimed address signed by the key behind it.
///
/// Fields hold the bytes as received; nothing is validated until
/// [`verify_registration_request`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationRequest {
    pub address: Vec<u8>,
    pub signature: Vec<u8>,
}

impl RegistrationRequest {
    /// Build a request from a hex address as carried in text transports.
    pub fn from_hex_address(address: &str, signature: Vec<u8>) -> Result<Self> {
        let address = Address::from_hex(address)?;
        Ok(Self {
            address: address.0.to_vec(),
            signature,
        })
    }

    /// Base64 transport form.
    pub fn encode(&self) -> String {
        canonical::encode_registration(&self.address, &self.signature)
    }

    /// Parse the base64 transport form.
    pub fn decode(encoded: &str) -> Result<Self> {
        let (address, signature) = canonical::decode_registration(encoded)?;
        Ok(Self { address, signature })
    }
}

/// Sign the identity's own address.
///
/// Any signer fault surfaces as [`CoreError::SigningFailed`].
pub fn generate_registration_request<I>(identity: &I) -> Result<RegistrationRequest>
where
    I: SigningIdentity + ?Sized,
{
    let address = identity.address();
    let signature = identity
        .sign(address.as_bytes())
        .map_err(|e| CoreError::SigningFailed(e.to_string()))?;
    Ok(RegistrationRequest {
        address: address.0.to_vec(),
        signature: signature.0.to_vec(),
    })
}

/// Check that the request was signed by the address it claims.
///
/// Returns the verified address.
pub fn verify_registration_request(request: &RegistrationRequest) -> Result<Address> {
    let claimed = Address::from_slice(&request.address)?;
    let signature = RecoverableSignature::from_slice(&request.signature)?;
    let recovered = signature.recover(&personal_message_digest(claimed.as_bytes()))?;
    if recovered == Some(claimed) {
        return Ok(claimed);
    }

    tracing::debug!(%claimed, ?recovered, "registration request rejected");
    Err(CredsError::AddressMismatch { claimed, recovered })
}

#[cfg(test)]
mod tests {
    use super::*;
    use vidtrust_core::Keypair;

    #[test]
    fn test_registration_roundtrip() {
        let broadcaster = Keypair::generate();
        let request = generate_registration_request(&broadcaster).unwrap();
        assert_eq!(verify_registration_request(&request).unwrap(), broadcaster.address());

        let decoded = RegistrationRequest::decode(&request.encode()).unwrap();
        assert_eq!(decoded, request);
    }

    #[test]
    fn test_registration_wrong_address() {
        let broadcaster = Keypair::generate();
        let mut request = generate_registration_request(&broadcaster).unwrap();
        request.address = Keypair::generate().address().0.to_vec();

        match verify_registration_request(&request) {
            Err(CredsError::AddressMismatch { recovered, .. }) => {
                assert_eq!(recovered, Some(broadcaster.address()));
            }
            other => panic!("expected AddressMismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_registration_malformed_address() {
        let broadcaster = Keypair::generate();
        let mut request = generate_registration_request(&broadcaster).unwrap();
        request.address = b"#non-hex address!".to_vec();
        assert!(matches!(
            verify_registration_request(&request),
            Err(CredsError::Core(CoreError::MalformedAddress(_)))
        ));

        assert!(matches!(
            RegistrationRequest::from_hex_address("#non-hex address!", request.signature),
            Err(CredsError::Core(CoreError::MalformedAddress(_)))
        ));
    }

    #[test]
    fn test_registration_from_hex_address() {
        let broadcaster = Keypair::generate();
        let request = generate_registration_request(&broadcaster).unwrap();
        let rebuilt = RegistrationRequest::from_hex_address(
            &broadcaster.address().to_hex(),
            request.signature.clone(),
        )
        .unwrap();
        assert_eq!(rebuilt, request);
    }

    #[test]
    fn test_registration_unconfigured_signer() {
        let service = vidtrust_core::SigningService::unconfigured();
        assert!(matches!(
            generate_registration_request(&service),
            Err(CredsError::Core(CoreError::SigningFailed(_)))
        ));
    }
}
