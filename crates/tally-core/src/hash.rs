//! Pure synchronous hashing
//!
//! Every digest in Tally (addresses, action hashes, signed-message envelopes)
//! goes through [`hash`] or [`hasher`]. The algorithm is selected once by the
//! [`ALGORITHM`] constant; swapping it changes every call site at once.
//!
//! Current algorithm: **SHA-256** (32-byte output)
//!
//! ```
//! use tally_core::hash::{hash, hasher};
//!
//! let mut h = hasher();
//! h.update(b"hello");
//! h.update(b" world");
//! assert_eq!(h.finalize(), hash(b"hello world"));
//! ```

use sha2::{Digest, Sha256};
use std::fmt;

/// Hash algorithm used for all ledger digests
pub trait HashAlgorithm: Send + Sync + fmt::Debug {
    /// Hash arbitrary bytes to a 32-byte digest
    fn hash(&self, data: &[u8]) -> [u8; 32];

    /// Create an incremental hasher for multi-part input
    fn hasher(&self) -> Box<dyn Hasher>;
}

/// Incremental hashing of multi-part data
pub trait Hasher: Send {
    /// Update the hasher with more data
    fn update(&mut self, data: &[u8]);

    /// Finalize and return the 32-byte digest
    fn finalize(self: Box<Self>) -> [u8; 32];
}

/// SHA-256 (NIST FIPS 180-4)
#[derive(Debug, Clone, Copy)]
pub struct Sha256Algorithm;

impl HashAlgorithm for Sha256Algorithm {
    fn hash(&self, data: &[u8]) -> [u8; 32] {
        Sha256::digest(data).into()
    }

    fn hasher(&self) -> Box<dyn Hasher> {
        Box::new(Sha256Hasher(Sha256::new()))
    }
}

struct Sha256Hasher(Sha256);

impl Hasher for Sha256Hasher {
    fn update(&mut self, data: &[u8]) {
        self.0.update(data);
    }

    fn finalize(self: Box<Self>) -> [u8; 32] {
        self.0.finalize().into()
    }
}

/// The hash algorithm used throughout the workspace.
pub const ALGORITHM: Sha256Algorithm = Sha256Algorithm;

/// Hash `data` with the global algorithm
#[inline]
pub fn hash(data: &[u8]) -> [u8; 32] {
    ALGORITHM.hash(data)
}

/// Create an incremental hasher using the global algorithm
#[inline]
pub fn hasher() -> Box<dyn Hasher> {
    ALGORITHM.hasher()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_determinism() {
        assert_eq!(hash(b"owner"), hash(b"owner"));
    }

    #[test]
    fn test_incremental_hasher_equivalence() {
        let mut h = hasher();
        h.update(b"getFreeReward");
        h.update(b"(address,uint256)");
        assert_eq!(h.finalize(), hash(b"getFreeReward(address,uint256)"));
    }

    #[test]
    fn test_different_inputs_different_hashes() {
        assert_ne!(hash(b"nonce-0"), hash(b"nonce-1"));
    }

    #[test]
    fn test_sha256_known_vector() {
        // SHA256("") = e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855
        let expected = [
            0xe3, 0xb0, 0xc4, 0x42, 0x98, 0xfc, 0x1c, 0x14, 0x9a, 0xfb, 0xf4, 0xc8, 0x99, 0x6f,
            0xb9, 0x24, 0x27, 0xae, 0x41, 0xe4, 0x64, 0x9b, 0x93, 0x4c, 0xa4, 0x95, 0x99, 0x1b,
            0x78, 0x52, 0xb8, 0x55,
        ];
        assert_eq!(hash(b""), expected);
    }
}
