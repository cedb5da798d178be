//! Per-beneficiary vesting record

use crate::schedule::ReleaseSchedule;
use serde::{Deserialize, Serialize};
use tally_core::{Result, TallyError, Timestamp, TokenAmount};

/// Everything the ledger remembers about one beneficiary.
///
/// Invariants: `withdrawn <= instant_released + principal == deposited`,
/// and `first_injection_time` never changes once set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VestingRecord {
    /// Total injected
    pub deposited: TokenAmount,
    /// Scheduled share of all injections
    pub principal: TokenAmount,
    /// Instant share of all injections
    pub instant_released: TokenAmount,
    /// Start of the schedule
    pub first_injection_time: Timestamp,
    /// Total paid out
    pub withdrawn: TokenAmount,
}

impl VestingRecord {
    pub(crate) fn new(first_injection_time: Timestamp) -> Self {
        Self {
            deposited: TokenAmount::ZERO,
            principal: TokenAmount::ZERO,
            instant_released: TokenAmount::ZERO,
            first_injection_time,
            withdrawn: TokenAmount::ZERO,
        }
    }

    pub(crate) fn deposit(&mut self, instant: TokenAmount, scheduled: TokenAmount) -> Result<()> {
        let add = |a: TokenAmount, b: TokenAmount| {
            a.checked_add(b)
                .ok_or_else(|| TallyError::overflow("vesting deposit"))
        };
        self.deposited = add(self.deposited, add(instant, scheduled)?)?;
        self.instant_released = add(self.instant_released, instant)?;
        self.principal = add(self.principal, scheduled)?;
        Ok(())
    }

    pub(crate) fn record_withdrawal(&mut self, amount: TokenAmount) -> Result<()> {
        self.withdrawn = self
            .withdrawn
            .checked_add(amount)
            .filter(|w| *w <= self.deposited)
            .ok_or_else(|| TallyError::internal("withdrawal exceeds deposits"))?;
        Ok(())
    }

    /// Everything unlocked by `now`, withdrawn or not
    pub fn unlocked_total(&self, schedule: &ReleaseSchedule, now: Timestamp) -> Result<TokenAmount> {
        let periods = schedule.periods_elapsed(self.first_injection_time, now)?;
        self.instant_released
            .checked_add(schedule.unlocked_after(self.principal, periods))
            .ok_or_else(|| TallyError::overflow("unlocked total"))
    }

    /// Unlocked and not yet withdrawn at `now`
    pub fn releasable(&self, schedule: &ReleaseSchedule, now: Timestamp) -> Result<TokenAmount> {
        Ok(self
            .unlocked_total(schedule, now)?
            .saturating_sub(self.withdrawn))
    }

    /// Amount still held for the beneficiary
    pub fn pool(&self) -> TokenAmount {
        self.deposited.saturating_sub(self.withdrawn)
    }
}

/// Summary of a beneficiary's release position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseInfo {
    /// Start of the schedule
    pub first_injection_time: Timestamp,
    /// Amount still held
    pub pool: TokenAmount,
    /// Total injected
    pub deposited: TokenAmount,
    /// Total paid out
    pub withdrawn: TokenAmount,
}

impl From<&VestingRecord> for ReleaseInfo {
    fn from(record: &VestingRecord) -> Self {
        Self {
            first_injection_time: record.first_injection_time,
            pool: record.pool(),
            deposited: record.deposited,
            withdrawn: record.withdrawn,
        }
    }
}
