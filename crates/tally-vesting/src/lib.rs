//! Tally Vesting - monthly release of injected rewards
//!
//! Every injection pays a fixed share to the beneficiary at once and adds
//! the rest to a principal that unlocks one chunk per elapsed period,
//! counted from the beneficiary's first injection. See [`schedule`] for the
//! arithmetic and [`ReleaseLedger`] for the token flow.

#![forbid(unsafe_code)]

pub mod ledger;
pub mod projection;
pub mod record;
pub mod schedule;

pub use ledger::{InjectionReceipt, ReleaseEvent, ReleaseLedger, UnreconciledPayout};
pub use projection::{ReleaseProjection, ReleaseStep};
pub use record::{ReleaseInfo, VestingRecord};
pub use schedule::ReleaseSchedule;
