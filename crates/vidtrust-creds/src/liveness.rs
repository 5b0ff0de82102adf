//! Liveness: a signed ping/pong proving a party holds the key behind an
//! address, independent of any job.

use vidtrust_core::{random_id, verify_signature, Address, Keccak256Hash, Signer};

use crate::error::Result;

/// A fresh 32-byte ping nonce.
pub fn generate_nonce() -> [u8; 32] {
    Keccak256Hash::hash(&random_id()).0
}

/// Answer a ping: sign `Keccak256(nonce)` and return the raw signature.
pub fn ping<S>(responder: &S, nonce: &[u8]) -> Result<Vec<u8>>
where
    S: Signer + ?Sized,
{
    let challenge = Keccak256Hash::hash(nonce);
    Ok(responder.sign(challenge.as_bytes())?.0.to_vec())
}

/// Check a pong against the address it should come from.
pub fn verify_pong(claimed: &Address, nonce: &[u8], response: &[u8]) -> Result<bool> {
    let challenge = Keccak256Hash::hash(nonce);
    Ok(verify_signature(claimed, challenge.as_bytes(), response)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CredsError;
    use vidtrust_core::{CoreError, Keypair};

    #[test]
    fn test_ping_pong() {
        let orchestrator = Keypair::generate();
        let nonce = generate_nonce();
        let pong = ping(&orchestrator, &nonce).unwrap();
        assert!(verify_pong(&orchestrator.address(), &nonce, &pong).unwrap());
    }

    #[test]
    fn test_pong_from_impostor() {
        let claimed = Keypair::generate();
        let impostor = Keypair::generate();
        let nonce = generate_nonce();
        let pong = ping(&impostor, &nonce).unwrap();
        assert!(!verify_pong(&claimed.address(), &nonce, &pong).unwrap());
    }

    #[test]
    fn test_pong_for_other_nonce() {
        let orchestrator = Keypair::generate();
        let pong = ping(&orchestrator, &generate_nonce()).unwrap();
        assert!(!verify_pong(&orchestrator.address(), &generate_nonce(), &pong).unwrap());
    }

    #[test]
    fn test_truncated_pong() {
        let orchestrator = Keypair::generate();
        let nonce = generate_nonce();
        let pong = ping(&orchestrator, &nonce).unwrap();
        assert!(matches!(
            verify_pong(&orchestrator.address(), &nonce, &pong[..10]),
            Err(CredsError::Core(CoreError::MalformedSignature(_)))
        ));
    }
}
