//! Account and digest identifiers
//!
//! [`Address`] names signers, owners, beneficiaries and token accounts.
//! [`Hash32`] names action hashes and signed hashes. Both display as
//! `0x`-prefixed lowercase hex and serialize through that string form so
//! configuration files stay readable.

use crate::errors::TallyError;
use crate::hash::hash;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

fn decode_hex<const N: usize>(kind: &str, s: &str) -> Result<[u8; N], TallyError> {
    let digits = s.strip_prefix("0x").unwrap_or(s);
    let bytes = hex::decode(digits).map_err(|e| TallyError::invalid(format!("{kind} hex: {e}")))?;
    bytes.try_into().map_err(|v: Vec<u8>| {
        TallyError::invalid(format!("{kind} must be {N} bytes, got {}", v.len()))
    })
}

/// 20-byte account identity
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(pub [u8; 20]);

impl Address {
    /// The all-zero address
    pub const ZERO: Address = Address([0u8; 20]);

    /// Derive the address controlled by an Ed25519 public key: the last
    /// 20 bytes of the key's digest.
    pub fn from_public_key(public_key: &[u8; 32]) -> Self {
        let digest = hash(public_key);
        let mut out = [0u8; 20];
        out.copy_from_slice(&digest[12..]);
        Address(out)
    }

    /// Deterministic address for a label, for fixed accounts such as a
    /// custody or treasury account.
    pub fn from_label(label: &str) -> Self {
        let digest = hash(label.as_bytes());
        let mut out = [0u8; 20];
        out.copy_from_slice(&digest[..20]);
        Address(out)
    }

    /// Raw bytes
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({self})")
    }
}

impl FromStr for Address {
    type Err = TallyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_hex::<20>("address", s).map(Address)
    }
}

impl TryFrom<String> for Address {
    type Error = TallyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Address> for String {
    fn from(value: Address) -> Self {
        value.to_string()
    }
}

/// 32-byte digest
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Hash32(pub [u8; 32]);

impl Hash32 {
    /// The all-zero digest
    pub const ZERO: Hash32 = Hash32([0u8; 32]);

    /// Hash `data` with the workspace algorithm
    pub fn digest(data: &[u8]) -> Self {
        Hash32(hash(data))
    }

    /// Raw bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl From<[u8; 32]> for Hash32 {
    fn from(bytes: [u8; 32]) -> Self {
        Hash32(bytes)
    }
}

impl fmt::Display for Hash32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Hash32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash32({self})")
    }
}

impl FromStr for Hash32 {
    type Err = TallyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_hex::<32>("hash", s).map(Hash32)
    }
}

impl TryFrom<String> for Hash32 {
    type Error = TallyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Hash32> for String {
    fn from(value: Hash32) -> Self {
        value.to_string()
    }
}
