//! Effect interfaces consumed by the ledgers
//!
//! Ledgers never read the clock, verify signatures, move tokens or request
//! randomness directly. Each of those capabilities is a trait here; production
//! handlers live in `tally-effects`, deterministic ones in `tally-testkit`.
//!
//! All traits are synchronous: ledger transitions run to completion under a
//! single lock and never suspend.

mod randomness;
mod signature;
mod time;
mod token;

pub use randomness::{RandomnessEffects, RequestId};
pub use signature::SignatureEffects;
pub use time::{PhysicalTimeEffects, TimeError};
pub use token::TokenEffects;
