//! Lazy release projections

use crate::schedule::ReleaseSchedule;
use serde::{Deserialize, Serialize};
use tally_core::{Timestamp, TokenAmount};

/// One future period of a beneficiary's schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseStep {
    /// 1-based period index counted from the first injection
    pub period_index: u64,
    /// Moment the period's chunk unlocks
    pub unlock_at: Timestamp,
    /// Amount the period unlocks
    pub amount: TokenAmount,
}

/// Fixed-length iterator over the periods after the current one.
///
/// Each step is computed on demand from the schedule; the iterator holds
/// no reference to ledger state. Once the principal is exhausted the
/// remaining steps carry zero amounts, so the length is always the
/// configured projection window. Clone it or call [`restart`] to iterate
/// again.
///
/// [`restart`]: ReleaseProjection::restart
#[derive(Debug, Clone)]
pub struct ReleaseProjection {
    schedule: ReleaseSchedule,
    principal: TokenAmount,
    start: Timestamp,
    first_period: u64,
    len: u32,
    pos: u32,
}

impl ReleaseProjection {
    pub(crate) fn new(
        schedule: ReleaseSchedule,
        principal: TokenAmount,
        start: Timestamp,
        current_period: u64,
        len: u32,
    ) -> Self {
        Self {
            schedule,
            principal,
            start,
            first_period: current_period.saturating_add(1),
            len,
            pos: 0,
        }
    }

    /// Rewind to the first step
    pub fn restart(&mut self) {
        self.pos = 0;
    }

    /// Sum of the remaining steps, clamped at the largest amount
    pub fn total(&self) -> TokenAmount {
        self.clone()
            .fold(TokenAmount::ZERO, |acc, step| acc.saturating_add(step.amount))
    }
}

impl Iterator for ReleaseProjection {
    type Item = ReleaseStep;

    fn next(&mut self) -> Option<ReleaseStep> {
        if self.pos >= self.len {
            return None;
        }
        let k = self.first_period.saturating_add(u64::from(self.pos));
        self.pos += 1;
        Some(ReleaseStep {
            period_index: k,
            unlock_at: self
                .start
                .saturating_add(k.saturating_mul(self.schedule.period_secs())),
            amount: self.schedule.released_in_period(self.principal, k),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = (self.len - self.pos) as usize;
        (left, Some(left))
    }
}

impl ExactSizeIterator for ReleaseProjection {}
