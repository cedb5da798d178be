//! Owner key fixtures
//!
//! [`KeyTestFixture`] produces real Ed25519 owners from seeds so tests can run
//! against `Ed25519Verifier`. [`FakeSigner`] / [`FakeVerifier`] replace the
//! scheme with a keyed digest for tests that only exercise ledger logic.

use ed25519_dalek::SigningKey;
use tally_core::effects::SignatureEffects;
use tally_core::hash::{hash, hasher};
use tally_core::{Address, Hash32, PublicKeyBytes, SignatureBytes, SignerSignature};
use tally_effects::sign_digest;

/// Deterministic Ed25519 owner
#[derive(Debug, Clone)]
pub struct KeyTestFixture {
    signing_key: SigningKey,
}

impl KeyTestFixture {
    /// Create a fixture from a 32-byte seed
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(seed),
        }
    }

    /// Create a fixture from a seed string
    pub fn from_seed_string(seed: &str) -> Self {
        Self::from_seed(&hash(seed.as_bytes()))
    }

    /// The signing key
    pub fn signing_key(&self) -> &SigningKey {
        &self.signing_key
    }

    /// Public key bytes
    pub fn public_key(&self) -> PublicKeyBytes {
        PublicKeyBytes(self.signing_key.verifying_key().to_bytes())
    }

    /// Address controlled by this key
    pub fn address(&self) -> Address {
        Address::from_public_key(&self.public_key().0)
    }

    /// Sign a signed hash
    pub fn sign(&self, digest: &Hash32) -> SignerSignature {
        sign_digest(&self.signing_key, digest)
    }
}

/// Owner whose "signatures" are keyed digests checked by [`FakeVerifier`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FakeSigner {
    public_key: PublicKeyBytes,
}

impl FakeSigner {
    /// Signer identified by a label
    pub fn new(label: &str) -> Self {
        Self {
            public_key: PublicKeyBytes(hash(format!("fake-signer:{label}").as_bytes())),
        }
    }

    /// Address of this signer
    pub fn address(&self) -> Address {
        Address::from_public_key(&self.public_key.0)
    }

    /// Public key bytes
    pub fn public_key(&self) -> PublicKeyBytes {
        self.public_key
    }

    /// Sign a signed hash
    pub fn sign(&self, digest: &Hash32) -> SignerSignature {
        SignerSignature::new(self.public_key, fake_signature(&self.public_key, digest))
    }
}

fn fake_signature(public_key: &PublicKeyBytes, digest: &Hash32) -> SignatureBytes {
    let mut h = hasher();
    h.update(b"tally.fake-signature");
    h.update(&public_key.0);
    h.update(digest.as_bytes());
    let first = h.finalize();
    let second = hash(&first);
    let mut out = [0u8; 64];
    out[..32].copy_from_slice(&first);
    out[32..].copy_from_slice(&second);
    SignatureBytes(out)
}

/// Verifier accepting exactly the signatures produced by [`FakeSigner`]
#[derive(Debug, Clone, Copy, Default)]
pub struct FakeVerifier;

impl SignatureEffects for FakeVerifier {
    fn verify(
        &self,
        public_key: &PublicKeyBytes,
        digest: &Hash32,
        signature: &SignatureBytes,
    ) -> bool {
        fake_signature(public_key, digest) == *signature
    }
}
