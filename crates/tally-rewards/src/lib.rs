//! Tally Rewards - the application layer over both ledgers
//!
//! [`RewardDesk`] exposes the privileged reward calls. Each one recomputes
//! its action hash from its own arguments and runs under
//! [`QuorumLedger::execute_gated`](tally_authorization::QuorumLedger::execute_gated),
//! so a payout happens only for a call the owners approved verbatim.
//! [`DepositLedger`] charges gated spends against prepaid deposits under the
//! same approvals.

#![forbid(unsafe_code)]

pub mod deposits;
pub mod desk;

pub use deposits::{
    DepositEvent, DepositLedger, REFUND_AT_DISPOSAL_SIGNATURE, REFUND_SIGNATURE, SPEND_SIGNATURE,
};
pub use desk::{
    RewardDesk, RewardEvent, FREE_REWARD_SIGNATURE, INJECT_RELEASE_REWARD_SIGNATURE,
    MULTIPLE_REWARD_SIGNATURE,
};
