//! Layer 2: production effect handlers
//!
//! Stateless implementations of the `tally-core` effect traits backed by the
//! operating system and real cryptography.
//!
//! **Layer Constraint**: no mock handlers here; deterministic handlers belong
//! in `tally-testkit`.

#![forbid(unsafe_code)]

pub mod crypto;
pub mod time;

pub use crypto::{sign_digest, Ed25519Verifier};
pub use time::RealTimeHandler;
