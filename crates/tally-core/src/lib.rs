//! Tally Core - shared foundation for the Tally ledgers
//!
//! This crate holds everything the quorum authorization ledger and the
//! vesting ledger agree on, and nothing either of them owns:
//!
//! - Identifiers and amounts: [`Address`], [`Hash32`], [`TokenAmount`],
//!   [`Timestamp`], signature material
//! - [`hash`]: the single hashing entry point
//! - [`TallyError`] with stable error codes
//! - [`effects`]: the time, signature, token and randomness capabilities
//!   ledgers are constructed with
//! - [`config`]: TOML configuration with `TALLY_*` environment overrides
//! - [`EventLog`]: append-only event record kept beside ledger state

#![forbid(unsafe_code)]

/// Ledger configuration
pub mod config;

/// Effect interfaces (no implementations)
pub mod effects;

/// Unified error handling
pub mod errors;

/// Append-only event log
pub mod events;

/// Hashing
pub mod hash;

/// Account and digest identifiers
pub mod identifiers;

/// Amounts, timestamps and signature material
pub mod types;

pub use config::{
    ActivityWindow, AuthorizationConfig, DepositConfig, LedgerConfig, ReleaseConfig, RewardConfig,
    TallyConfig,
};
pub use errors::{Result, TallyError};
pub use events::EventLog;
pub use identifiers::{Address, Hash32};
pub use types::{
    PublicKeyBytes, SignatureBytes, SignerSignature, Timestamp, TokenAmount, BPS_DENOMINATOR,
};
