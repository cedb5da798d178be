//! Release schedule arithmetic
//!
//! Pure functions of the policy. Nothing here reads the clock or touches
//! state; the ledger feeds in the record and the current time.
//!
//! An injection of `amount` splits into an instant share, released at once,
//! and a scheduled share added to the beneficiary's principal. Each elapsed
//! period unlocks one chunk of principal:
//!
//! ```text
//! chunk       = max(principal × period_bps / 10 000, min_release_chunk)
//! unlocked(k) = min(principal, k × chunk)
//! ```
//!
//! `unlocked(k)` is computed from `principal` and `k` alone, never from a
//! running remainder, so rounding cannot drift across periods. When the
//! remaining principal is below the floor, the last period releases exactly
//! what is left.

use serde::{Deserialize, Serialize};
use tally_core::{ReleaseConfig, Result, TallyError, Timestamp, TokenAmount};

/// Monthly release policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseSchedule {
    instant_release_bps: u32,
    period_release_bps: u32,
    min_release_chunk: TokenAmount,
    period_secs: u64,
}

impl ReleaseSchedule {
    /// Schedule from configuration. Rejects a zero-length period and shares
    /// above 100%.
    pub fn new(config: &ReleaseConfig) -> Result<Self> {
        if config.period_secs == 0 {
            return Err(TallyError::invalid("release period must be non-zero"));
        }
        if config.instant_release_bps > 10_000 || config.period_release_bps > 10_000 {
            return Err(TallyError::invalid("release shares must not exceed 10000 bps"));
        }
        Ok(Self {
            instant_release_bps: config.instant_release_bps,
            period_release_bps: config.period_release_bps,
            min_release_chunk: config.min_release_chunk,
            period_secs: config.period_secs,
        })
    }

    /// Period length in seconds
    pub fn period_secs(&self) -> u64 {
        self.period_secs
    }

    /// Split an injection into `(instant, scheduled)` shares
    pub fn split_injection(&self, amount: TokenAmount) -> (TokenAmount, TokenAmount) {
        let instant = amount
            .mul_bps(self.instant_release_bps)
            .unwrap_or(amount)
            .min(amount);
        (instant, amount.saturating_sub(instant))
    }

    /// Whole periods elapsed between `start` and `now`
    pub fn periods_elapsed(&self, start: Timestamp, now: Timestamp) -> Result<u64> {
        let elapsed = now
            .secs()
            .checked_sub(start.secs())
            .ok_or(TallyError::ScheduleNotStarted {
                starts_at: start.secs(),
                now: now.secs(),
            })?;
        Ok(elapsed / self.period_secs)
    }

    /// Amount one period unlocks for `principal`
    pub fn period_chunk(&self, principal: TokenAmount) -> TokenAmount {
        if principal.is_zero() {
            return TokenAmount::ZERO;
        }
        principal
            .mul_bps(self.period_release_bps)
            .unwrap_or(principal)
            .max(self.min_release_chunk)
    }

    /// Cumulative principal unlocked after `periods` whole periods
    pub fn unlocked_after(&self, principal: TokenAmount, periods: u64) -> TokenAmount {
        self.period_chunk(principal)
            .checked_mul(u128::from(periods))
            .map_or(principal, |unlocked| unlocked.min(principal))
    }

    /// Amount period `k` (1-based) unlocks on its own
    pub fn released_in_period(&self, principal: TokenAmount, k: u64) -> TokenAmount {
        if k == 0 {
            return TokenAmount::ZERO;
        }
        self.unlocked_after(principal, k)
            .saturating_sub(self.unlocked_after(principal, k - 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_testkit::tokens;

    fn schedule() -> ReleaseSchedule {
        ReleaseSchedule::new(&ReleaseConfig::default()).unwrap_or_else(|e| panic!("{e}"))
    }

    #[test]
    fn test_split_injection_five_percent() {
        assert_eq!(
            schedule().split_injection(tokens("100")),
            (tokens("5"), tokens("95"))
        );
        assert_eq!(
            schedule().split_injection(tokens("45")),
            (tokens("2.25"), tokens("42.75"))
        );
    }

    #[test]
    fn test_ten_percent_chunk_above_floor() {
        let s = schedule();
        assert_eq!(s.period_chunk(tokens("95")), tokens("9.5"));
        assert_eq!(s.unlocked_after(tokens("95"), 1), tokens("9.5"));
        assert_eq!(s.unlocked_after(tokens("95"), 10), tokens("95"));
        assert_eq!(s.unlocked_after(tokens("95"), 11), tokens("95"));
    }

    #[test]
    fn test_floor_chunk_when_ten_percent_is_small() {
        let s = schedule();
        // 10% of 42.75 is 4.275, below the 5 token floor.
        assert_eq!(s.period_chunk(tokens("42.75")), tokens("5"));
        assert_eq!(s.released_in_period(tokens("42.75"), 1), tokens("5"));
        assert_eq!(s.released_in_period(tokens("42.75"), 9), tokens("2.75"));
        assert_eq!(s.released_in_period(tokens("42.75"), 10), TokenAmount::ZERO);
    }

    #[test]
    fn test_remainder_below_floor_released_whole() {
        let s = schedule();
        assert_eq!(s.unlocked_after(tokens("3.8"), 1), tokens("3.8"));
    }

    #[test]
    fn test_periods_elapsed() {
        let s = schedule();
        let start = Timestamp(1_000);
        assert_eq!(s.periods_elapsed(start, Timestamp(1_000)).ok(), Some(0));
        assert_eq!(
            s.periods_elapsed(start, Timestamp(1_000 + 2_592_000)).ok(),
            Some(1)
        );
        assert!(matches!(
            s.periods_elapsed(start, Timestamp(999)),
            Err(TallyError::ScheduleNotStarted { .. })
        ));
    }

    #[test]
    fn test_zero_period_rejected() {
        let config = ReleaseConfig {
            period_secs: 0,
            ..ReleaseConfig::default()
        };
        assert!(ReleaseSchedule::new(&config).is_err());
    }

    proptest::proptest! {
        #[test]
        fn prop_unlocked_is_monotone_and_bounded(
            principal in 0u128..1_000_000_000_000_000_000_000u128,
            k in 0u64..200,
        ) {
            let s = schedule();
            let p = TokenAmount::from_units(principal);
            let a = s.unlocked_after(p, k);
            let b = s.unlocked_after(p, k + 1);
            proptest::prop_assert!(a <= b);
            proptest::prop_assert!(b <= p);
        }
    }
}
