//! Release ledger
//!
//! Holds one [`VestingRecord`] per beneficiary and moves tokens through the
//! injected [`TokenEffects`] handler:
//!
//! ```text
//! inject:    treasury ──transfer_from──▶ beneficiary   (unlocked now, instant share included)
//!            custody  ──transfer──────▶ beneficiary   (earlier unlocks never withdrawn)
//!            treasury ──transfer_from──▶ custody       (retained share)
//! withdraw:  custody  ──transfer──────▶ beneficiary   (unlocked share)
//! ```
//!
//! Mutations hold the write lock for the whole transition, token calls
//! included; queries clone the record under the read lock and compute on
//! the copy. Records are written back only after every token call
//! succeeded. Balances and allowances are checked before the first token
//! call, so a failing injection normally moves nothing; one that fails
//! after paying the beneficiary is kept in [`ReleaseLedger::unreconciled`].

use crate::projection::ReleaseProjection;
use crate::record::{ReleaseInfo, VestingRecord};
use crate::schedule::ReleaseSchedule;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tally_core::effects::{PhysicalTimeEffects, TokenEffects};
use tally_core::{
    Address, EventLog, ReleaseConfig, Result, TallyError, Timestamp, TokenAmount,
};

/// Events recorded by the release ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReleaseEvent {
    /// Tokens entered a beneficiary's release pool
    InjectReleaseReward {
        /// Beneficiary
        beneficiary: Address,
        /// Injected amount
        amount: TokenAmount,
    },
    /// Unlocked tokens were paid to a beneficiary
    WithdrawReleasedReward {
        /// Beneficiary
        beneficiary: Address,
        /// Paid amount
        amount: TokenAmount,
    },
}

/// Outcome of an injection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InjectionReceipt {
    /// Paid to the beneficiary during the injection
    pub released: TokenAmount,
    /// Held for the beneficiary afterwards
    pub pool: TokenAmount,
    /// Start of the beneficiary's schedule
    pub first_injection_time: Timestamp,
}

/// Payout that reached a beneficiary from an injection that then failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnreconciledPayout {
    /// Beneficiary of the failed injection
    pub beneficiary: Address,
    /// Amount the injection tried to add
    pub injected: TokenAmount,
    /// Amount already paid when it failed
    pub paid: TokenAmount,
}

#[derive(Debug, Clone, Copy)]
struct ReleasePlan {
    /// treasury to beneficiary
    direct: TokenAmount,
    /// custody to beneficiary
    from_custody: TokenAmount,
    /// treasury to custody
    retained: TokenAmount,
}

impl ReleasePlan {
    fn payout(&self) -> TokenAmount {
        self.direct.saturating_add(self.from_custody)
    }
}

#[derive(Debug, Default)]
struct VestingState {
    records: HashMap<Address, VestingRecord>,
    events: EventLog<ReleaseEvent>,
    unreconciled: Vec<UnreconciledPayout>,
}

/// Per-beneficiary monthly release ledger
#[derive(Debug)]
pub struct ReleaseLedger<T, K> {
    config: ReleaseConfig,
    schedule: ReleaseSchedule,
    time: T,
    token: K,
    state: RwLock<VestingState>,
}

impl<T, K> ReleaseLedger<T, K>
where
    T: PhysicalTimeEffects,
    K: TokenEffects,
{
    /// Ledger with the given policy, clock and token
    pub fn new(config: ReleaseConfig, time: T, token: K) -> Result<Self> {
        let schedule = ReleaseSchedule::new(&config)?;
        if config.projection_periods == 0 {
            return Err(TallyError::invalid("projection window must be non-zero"));
        }
        Ok(Self {
            config,
            schedule,
            time,
            token,
            state: RwLock::new(VestingState::default()),
        })
    }

    /// The release schedule in force
    pub fn schedule(&self) -> &ReleaseSchedule {
        &self.schedule
    }

    /// Account holding pooled tokens
    pub fn custody(&self) -> Address {
        self.config.custody
    }

    fn now(&self) -> Result<Timestamp> {
        Ok(self.time.physical_time()?)
    }

    /// `(instant payout, retained pool)` an injection of `amount` would give
    pub fn preview_injection(&self, amount: TokenAmount) -> (TokenAmount, TokenAmount) {
        self.schedule.split_injection(amount)
    }

    /// Add `amount` to `beneficiary`'s release pool and pay out whatever is
    /// unlocked at once.
    ///
    /// The record is updated first on a copy (the first injection fixes the
    /// schedule start), then the auto-release step works out everything
    /// unlocked now, which is at least the instant share. Balances and the
    /// treasury allowance are checked before any token moves. The payout
    /// goes straight from the treasury to the beneficiary, topped up from
    /// custody when earlier unlocks were never withdrawn, and only the
    /// retained share is moved into custody.
    pub fn inject(&self, beneficiary: Address, amount: TokenAmount) -> Result<InjectionReceipt> {
        if amount.is_zero() {
            return Err(TallyError::invalid_amount("injection must be non-zero"));
        }
        let now = self.now()?;
        if let Some(window) = self.config.activity_window {
            if !window.contains(now.secs()) {
                return Err(TallyError::OutsideActivityWindow {
                    start: window.start,
                    end: window.end,
                    now: now.secs(),
                });
            }
        }

        let (instant, scheduled) = self.schedule.split_injection(amount);
        let mut state = self.state.write();
        let mut record = state
            .records
            .get(&beneficiary)
            .cloned()
            .unwrap_or_else(|| VestingRecord::new(now));
        record.deposit(instant, scheduled)?;

        let plan = self.plan_auto_release(&record, amount, now)?;
        self.check_injection_funds(amount, &plan)?;
        if let Err((paid, err)) = self.execute_auto_release(beneficiary, &plan) {
            if paid.is_zero() {
                return Err(err);
            }
            tracing::error!(
                beneficiary = %beneficiary,
                amount = %amount,
                paid = %paid,
                error = %err,
                "injection failed after a partial payout"
            );
            state.unreconciled.push(UnreconciledPayout {
                beneficiary,
                injected: amount,
                paid,
            });
            return Err(TallyError::token(format!(
                "injection of {amount} for {beneficiary} failed after paying {paid}: {err}"
            )));
        }
        let released = plan.payout();
        record.record_withdrawal(released)?;

        let receipt = InjectionReceipt {
            released,
            pool: record.pool(),
            first_injection_time: record.first_injection_time,
        };
        state.records.insert(beneficiary, record);
        state
            .events
            .record(ReleaseEvent::InjectReleaseReward { beneficiary, amount });
        if !released.is_zero() {
            state.events.record(ReleaseEvent::WithdrawReleasedReward {
                beneficiary,
                amount: released,
            });
        }
        tracing::info!(
            beneficiary = %beneficiary,
            amount = %amount,
            released = %released,
            pool = %receipt.pool,
            "release reward injected"
        );
        Ok(receipt)
    }

    /// Auto-release step of an injection: how much of the releasable amount
    /// comes out of the injection itself and how much out of custody
    fn plan_auto_release(
        &self,
        record: &VestingRecord,
        amount: TokenAmount,
        now: Timestamp,
    ) -> Result<ReleasePlan> {
        let payout = record.releasable(&self.schedule, now)?;
        let direct = payout.min(amount);
        Ok(ReleasePlan {
            direct,
            from_custody: payout.saturating_sub(direct),
            retained: amount.saturating_sub(direct),
        })
    }

    fn check_injection_funds(&self, amount: TokenAmount, plan: &ReleasePlan) -> Result<()> {
        let available = self
            .token
            .allowance(self.config.treasury, self.config.custody)
            .min(self.token.balance_of(self.config.treasury));
        if available < amount {
            return Err(TallyError::InsufficientFunds {
                needed: amount,
                available,
            });
        }
        let held = self.token.balance_of(self.config.custody);
        if held < plan.from_custody {
            return Err(TallyError::InsufficientDeposits {
                needed: plan.from_custody,
                available: held,
            });
        }
        Ok(())
    }

    /// Run the transfers of `plan`, beneficiary legs first. On failure
    /// returns what already reached the beneficiary with the error.
    fn execute_auto_release(
        &self,
        beneficiary: Address,
        plan: &ReleasePlan,
    ) -> std::result::Result<(), (TokenAmount, TallyError)> {
        let (custody, treasury) = (self.config.custody, self.config.treasury);
        let mut paid = TokenAmount::ZERO;
        if !plan.direct.is_zero() {
            self.token
                .transfer_from(custody, treasury, beneficiary, plan.direct)
                .map_err(|err| (paid, err))?;
            paid = plan.direct;
        }
        if !plan.from_custody.is_zero() {
            self.token
                .transfer(custody, beneficiary, plan.from_custody)
                .map_err(|err| (paid, err))?;
            paid = paid.saturating_add(plan.from_custody);
        }
        if !plan.retained.is_zero() {
            self.token
                .transfer_from(custody, treasury, custody, plan.retained)
                .map_err(|err| (paid, err))?;
        }
        if !paid.is_zero() {
            tracing::debug!(beneficiary = %beneficiary, amount = %paid, "released");
        }
        Ok(())
    }

    /// Pay the releasable amount to `beneficiary` out of custody, updating
    /// `record` only on success
    fn try_auto_release(
        &self,
        record: &mut VestingRecord,
        beneficiary: Address,
        now: Timestamp,
    ) -> Result<TokenAmount> {
        let amount = record.releasable(&self.schedule, now)?;
        if amount.is_zero() {
            return Ok(amount);
        }
        let held = self.token.balance_of(self.config.custody);
        if held < amount {
            return Err(TallyError::InsufficientDeposits {
                needed: amount,
                available: held,
            });
        }
        self.token.transfer(self.config.custody, beneficiary, amount)?;
        record.record_withdrawal(amount)?;
        tracing::debug!(beneficiary = %beneficiary, amount = %amount, "released");
        Ok(amount)
    }

    /// Injections that failed after part of their payout reached the
    /// beneficiary. These tokens left the treasury without a record.
    pub fn unreconciled(&self) -> Vec<UnreconciledPayout> {
        self.state.read().unreconciled.clone()
    }

    /// Unlocked amount `beneficiary` could withdraw now. Zero for unknown
    /// beneficiaries.
    pub fn check_released(&self, beneficiary: Address) -> Result<TokenAmount> {
        let now = self.now()?;
        match self.record(beneficiary) {
            Some(record) => record.releasable(&self.schedule, now),
            None => Ok(TokenAmount::ZERO),
        }
    }

    /// Pay `beneficiary` everything unlocked and not yet withdrawn.
    /// Returns the amount paid; zero is a no-op.
    pub fn withdraw_released(&self, beneficiary: Address) -> Result<TokenAmount> {
        let now = self.now()?;
        let mut state = self.state.write();
        let Some(mut record) = state.records.get(&beneficiary).cloned() else {
            return Ok(TokenAmount::ZERO);
        };
        let amount = self.try_auto_release(&mut record, beneficiary, now)?;
        if amount.is_zero() {
            return Ok(amount);
        }
        state.records.insert(beneficiary, record);
        state
            .events
            .record(ReleaseEvent::WithdrawReleasedReward { beneficiary, amount });
        tracing::info!(beneficiary = %beneficiary, amount = %amount, "released reward withdrawn");
        Ok(amount)
    }

    /// Upcoming periods of `beneficiary`'s schedule, one step per period
    /// after the current one. Unknown beneficiaries get all-zero steps.
    pub fn future_release_data(&self, beneficiary: Address) -> Result<ReleaseProjection> {
        let now = self.now()?;
        let len = self.config.projection_periods;
        let Some(record) = self.record(beneficiary) else {
            return Ok(ReleaseProjection::new(self.schedule, TokenAmount::ZERO, now, 0, len));
        };
        let current = match self.schedule.periods_elapsed(record.first_injection_time, now) {
            Ok(periods) => periods,
            Err(TallyError::ScheduleNotStarted { .. }) => 0,
            Err(err) => return Err(err),
        };
        Ok(ReleaseProjection::new(
            self.schedule,
            record.principal,
            record.first_injection_time,
            current,
            len,
        ))
    }

    /// Schedule start and pool of `beneficiary`
    pub fn release_info(&self, beneficiary: Address) -> Option<ReleaseInfo> {
        self.record(beneficiary).as_ref().map(ReleaseInfo::from)
    }

    /// Snapshot of `beneficiary`'s record
    pub fn record(&self, beneficiary: Address) -> Option<VestingRecord> {
        self.state.read().records.get(&beneficiary).cloned()
    }

    /// Events recorded so far
    pub fn events(&self) -> Vec<ReleaseEvent> {
        self.state.read().events.snapshot()
    }

    /// Remove and return recorded events
    pub fn drain_events(&self) -> Vec<ReleaseEvent> {
        self.state.write().events.drain()
    }
}
