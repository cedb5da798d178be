//! Ed25519 signature handler
//!
//! Owners sign the 32-byte signed hash directly. A public key that does not
//! decode to a curve point verifies nothing; it is never an error, because
//! the ledger turns every failed verification into the same "unknown signer"
//! rejection.

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use tally_core::effects::SignatureEffects;
use tally_core::{Hash32, PublicKeyBytes, SignatureBytes, SignerSignature};

/// Production signature verifier
#[derive(Debug, Clone, Copy, Default)]
pub struct Ed25519Verifier;

impl Ed25519Verifier {
    /// Create a new verifier
    pub fn new() -> Self {
        Self
    }
}

impl SignatureEffects for Ed25519Verifier {
    fn verify(
        &self,
        public_key: &PublicKeyBytes,
        digest: &Hash32,
        signature: &SignatureBytes,
    ) -> bool {
        let Ok(key) = VerifyingKey::from_bytes(&public_key.0) else {
            tracing::debug!("rejecting malformed public key");
            return false;
        };
        let signature = Signature::from_bytes(&signature.0);
        key.verify(digest.as_bytes(), &signature).is_ok()
    }
}

/// Sign `digest` with an owner's key, producing the pair the ledger expects
pub fn sign_digest(signing_key: &SigningKey, digest: &Hash32) -> SignerSignature {
    let signature = signing_key.sign(digest.as_bytes());
    SignerSignature::new(
        PublicKeyBytes(signing_key.verifying_key().to_bytes()),
        SignatureBytes(signature.to_bytes()),
    )
}
