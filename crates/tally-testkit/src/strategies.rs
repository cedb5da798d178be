//! Property test strategies for Tally types
//!
//! Strategies generate from seeds so failures shrink to small, reproducible
//! cases.

use crate::FakeSigner;
use proptest::prelude::*;
use tally_core::{Address, TokenAmount};

pub use proptest;

/// Deterministic addresses from seeds in `0..10000`
pub fn arb_address() -> impl Strategy<Value = Address> {
    (0u64..10_000).prop_map(|seed| Address::from_label(&format!("account-{seed}")))
}

/// Fake signers from seeds in `0..10000`
pub fn arb_fake_signer() -> impl Strategy<Value = FakeSigner> {
    (0u64..10_000).prop_map(|seed| FakeSigner::new(&format!("signer-{seed}")))
}

/// An owner set of `n` distinct fake signers with `1 <= threshold <= n`,
/// for `n` in `sizes`
pub fn arb_owner_set(
    sizes: std::ops::RangeInclusive<usize>,
) -> impl Strategy<Value = (Vec<FakeSigner>, usize)> {
    sizes.prop_flat_map(|n| {
        let signers: Vec<FakeSigner> = (0..n)
            .map(|i| FakeSigner::new(&format!("owner-{i}")))
            .collect();
        (Just(signers), 1..=n)
    })
}

/// Token amounts between one unit and `max_tokens` whole tokens
pub fn arb_token_amount(max_tokens: u64) -> impl Strategy<Value = TokenAmount> {
    let max_units = u128::from(max_tokens) * TokenAmount::ONE_TOKEN.units();
    (1u128..=max_units).prop_map(TokenAmount::from_units)
}

/// Caller-chosen nonces
pub fn arb_nonce() -> impl Strategy<Value = u64> {
    any::<u64>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    proptest! {
        #[test]
        fn prop_owner_sets_are_well_formed((owners, threshold) in arb_owner_set(1..=6)) {
            let distinct: BTreeSet<_> = owners.iter().map(FakeSigner::address).collect();
            prop_assert_eq!(distinct.len(), owners.len());
            prop_assert!(threshold >= 1 && threshold <= owners.len());
        }

        #[test]
        fn prop_amounts_are_positive(amount in arb_token_amount(1_000)) {
            prop_assert!(!amount.is_zero());
        }
    }
}
