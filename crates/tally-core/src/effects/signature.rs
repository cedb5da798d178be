use crate::identifiers::Hash32;
use crate::types::{PublicKeyBytes, SignatureBytes};
use std::sync::Arc;

/// Signature verification capability.
///
/// The authorization ledger only asks whether `signature` is a valid
/// signature by `public_key` over `digest`; the scheme behind it is the
/// handler's concern.
pub trait SignatureEffects: Send + Sync {
    /// True when `signature` verifies for `public_key` over `digest`
    fn verify(
        &self,
        public_key: &PublicKeyBytes,
        digest: &Hash32,
        signature: &SignatureBytes,
    ) -> bool;
}

impl<T: SignatureEffects + ?Sized> SignatureEffects for Arc<T> {
    fn verify(
        &self,
        public_key: &PublicKeyBytes,
        digest: &Hash32,
        signature: &SignatureBytes,
    ) -> bool {
        (**self).verify(public_key, digest, signature)
    }
}
