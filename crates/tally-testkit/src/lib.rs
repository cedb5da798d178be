//! Tally Testkit - deterministic test infrastructure
//!
//! - [`ControllableTimeSource`]: a clock tests move by hand
//! - [`MockToken`]: in-memory ERC-20 with failure injection
//! - [`MockRandomnessCoordinator`]: records randomness requests, fulfilment
//!   is driven by the test
//! - [`KeyTestFixture`] / [`FakeVerifier`]: real Ed25519 owners from seeds, and
//!   a signature fake for tests that do not care about the scheme
//! - [`strategies`]: proptest strategies shared by the ledger crates

#![allow(clippy::expect_used)]

pub mod keys;
pub mod randomness;
pub mod strategies;
pub mod time;
pub mod token;

pub use keys::{FakeSigner, FakeVerifier, KeyTestFixture};
pub use randomness::MockRandomnessCoordinator;
pub use time::ControllableTimeSource;
pub use token::MockToken;

use std::sync::Once;
use tally_core::TokenAmount;

/// Start of the test epoch used by scenario tests (2024-01-01T00:00:00Z)
pub const TEST_EPOCH: u64 = 1_704_067_200;

/// Parse a decimal token amount, panicking on malformed input
pub fn tokens(amount: &str) -> TokenAmount {
    amount.parse().expect("valid token amount literal")
}

static TRACING: Once = Once::new();

/// Install a fmt subscriber filtered by `RUST_LOG` once per test binary
pub fn init_test_tracing() {
    TRACING.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}
