//! Reward desk
//!
//! Token movements, with `desk` the authorization ledger's account:
//!
//! ```text
//! free reward:   spender ──▶ caller                 (desk spends the spender's allowance)
//! draw entry:    caller  ──▶ spender                (desk spends the caller's allowance)
//! draw prize:    spender ──▶ player                 (on fulfilment)
//! release:       see tally_vesting::ReleaseLedger
//! ```
//!
//! Lock order is authorization ledger, then release ledger, then the desk's
//! own draw table. Fulfilment takes only the draw table.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tally_authorization::{ActionArg, QuorumLedger};
use tally_core::effects::{
    PhysicalTimeEffects, RandomnessEffects, RequestId, SignatureEffects, TokenEffects,
};
use tally_core::{
    Address, EventLog, Hash32, Result, RewardConfig, TallyError, TokenAmount,
};
use tally_vesting::{InjectionReceipt, ReleaseLedger};

/// Function signature bound into free-reward approvals
pub const FREE_REWARD_SIGNATURE: &str = "getFreeReward(address,uint256)";
/// Function signature bound into release-injection approvals
pub const INJECT_RELEASE_REWARD_SIGNATURE: &str = "injectReleaseReward(address,uint256,uint256)";
/// Function signature bound into prize-draw approvals
pub const MULTIPLE_REWARD_SIGNATURE: &str = "getMultipleReward(address,uint256)";

/// Events recorded by the desk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RewardEvent {
    /// A free reward was paid
    RewardGranted {
        /// Recipient
        user: Address,
        /// Paid amount
        amount: TokenAmount,
    },
    /// A prize draw collected its fee and asked for randomness
    DrawRequested {
        /// Randomness request
        request_id: RequestId,
        /// Player
        user: Address,
        /// Collected entry fee
        fee: TokenAmount,
    },
    /// A prize draw received its random word
    DrawSettled {
        /// Randomness request
        request_id: RequestId,
        /// Player
        user: Address,
        /// Selected multiplier in bps of the fee
        multiplier_bps: u32,
        /// Paid prize, possibly zero
        prize: TokenAmount,
    },
}

#[derive(Debug, Clone, Copy)]
struct PendingDraw {
    user: Address,
    fee: TokenAmount,
}

#[derive(Debug, Default)]
struct DeskState {
    draws: HashMap<RequestId, PendingDraw>,
    events: EventLog<RewardEvent>,
}

/// Privileged reward calls gated on quorum approvals
pub struct RewardDesk<V, T, K, R> {
    authorization: Arc<QuorumLedger<V>>,
    release: Arc<ReleaseLedger<T, K>>,
    token: K,
    randomness: R,
    config: RewardConfig,
    state: Mutex<DeskState>,
}

impl<V, T, K, R> RewardDesk<V, T, K, R>
where
    V: SignatureEffects,
    T: PhysicalTimeEffects,
    K: TokenEffects,
    R: RandomnessEffects,
{
    /// Desk over the given ledgers. `token` must move the same balances as
    /// the release ledger's token handle.
    pub fn new(
        authorization: Arc<QuorumLedger<V>>,
        release: Arc<ReleaseLedger<T, K>>,
        token: K,
        randomness: R,
        config: RewardConfig,
    ) -> Result<Self> {
        if config.multipliers_bps.is_empty() {
            return Err(TallyError::invalid("prize table must not be empty"));
        }
        Ok(Self {
            authorization,
            release,
            token,
            randomness,
            config,
            state: Mutex::new(DeskState::default()),
        })
    }

    /// The authorization ledger gating this desk
    pub fn authorization(&self) -> &QuorumLedger<V> {
        &self.authorization
    }

    /// The release ledger behind injections and withdrawals
    pub fn release(&self) -> &ReleaseLedger<T, K> {
        &self.release
    }

    fn desk_account(&self) -> Address {
        self.authorization.domain().ledger_account
    }

    /// Action hash owners approve for `user` claiming a free reward
    pub fn free_reward_hash(&self, user: Address, nonce: u64) -> Hash32 {
        self.authorization
            .action_hash(FREE_REWARD_SIGNATURE, &[ActionArg::Address(user)], nonce)
    }

    /// Pay the configured free reward to `caller` under an approval bound to
    /// `caller` and `nonce`
    pub fn get_free_reward(&self, caller: Address, nonce: u64) -> Result<TokenAmount> {
        let signed = self
            .authorization
            .signed_hash(FREE_REWARD_SIGNATURE, &[ActionArg::Address(caller)], nonce);
        let amount = self.config.free_reward;
        self.authorization.execute_gated(signed, || {
            self.token
                .transfer_from(self.desk_account(), self.config.spender, caller, amount)
        })?;
        self.state
            .lock()
            .events
            .record(RewardEvent::RewardGranted { user: caller, amount });
        tracing::info!(user = %caller, amount = %amount, "free reward granted");
        Ok(amount)
    }

    /// Action hash owners approve for injecting `amount` into `user`'s
    /// release pool
    pub fn inject_release_reward_hash(&self, user: Address, amount: TokenAmount, nonce: u64) -> Hash32 {
        self.authorization.action_hash(
            INJECT_RELEASE_REWARD_SIGNATURE,
            &[ActionArg::Address(user), ActionArg::Amount(amount)],
            nonce,
        )
    }

    /// Inject `amount` into `user`'s release pool. Anyone may submit once
    /// the matching approval is pending.
    pub fn inject_release_reward(
        &self,
        user: Address,
        amount: TokenAmount,
        nonce: u64,
    ) -> Result<InjectionReceipt> {
        let signed = self.authorization.signed_hash(
            INJECT_RELEASE_REWARD_SIGNATURE,
            &[ActionArg::Address(user), ActionArg::Amount(amount)],
            nonce,
        );
        self.authorization
            .execute_gated(signed, || self.release.inject(user, amount))
    }

    /// `caller` withdraws its own unlocked release
    pub fn withdraw_released_reward(&self, caller: Address) -> Result<TokenAmount> {
        self.release.withdraw_released(caller)
    }

    /// Owner-only: pay `user` its unlocked release
    pub fn withdraw_released_reward_to(&self, caller: Address, user: Address) -> Result<TokenAmount> {
        self.authorization.require_owner(caller)?;
        self.release.withdraw_released(user)
    }

    /// Action hash owners approve for `user` entering a prize draw
    pub fn multiple_reward_hash(&self, user: Address, nonce: u64) -> Hash32 {
        self.authorization
            .action_hash(MULTIPLE_REWARD_SIGNATURE, &[ActionArg::Address(user)], nonce)
    }

    /// Collect the entry fee from `caller` and request one random word.
    /// Returns the request id the fulfilment must carry.
    pub fn get_multiple_reward(&self, caller: Address, nonce: u64) -> Result<RequestId> {
        let signed = self
            .authorization
            .signed_hash(MULTIPLE_REWARD_SIGNATURE, &[ActionArg::Address(caller)], nonce);
        let fee = self.config.entry_fee;
        self.authorization.execute_gated(signed, || {
            let allowance = self.token.allowance(caller, self.desk_account());
            let balance = self.token.balance_of(caller);
            let available = allowance.min(balance);
            if available < fee {
                return Err(TallyError::InsufficientFunds {
                    needed: fee,
                    available,
                });
            }
            self.token
                .transfer_from(self.desk_account(), caller, self.config.spender, fee)?;
            let request_id = match self.randomness.request_random_words(caller, 1) {
                Ok(id) => id,
                Err(err) => return Err(self.refund_entry_fee(caller, fee, err)),
            };
            let mut state = self.state.lock();
            state
                .draws
                .insert(request_id, PendingDraw { user: caller, fee });
            state.events.record(RewardEvent::DrawRequested {
                request_id,
                user: caller,
                fee,
            });
            tracing::info!(user = %caller, request_id, fee = %fee, "prize draw requested");
            Ok(request_id)
        })
    }

    /// Return a collected entry fee after the randomness request failed.
    /// Yields the error the draw call reports.
    fn refund_entry_fee(&self, caller: Address, fee: TokenAmount, cause: TallyError) -> TallyError {
        match self
            .token
            .transfer_from(self.desk_account(), self.config.spender, caller, fee)
        {
            Ok(()) => {
                tracing::warn!(user = %caller, fee = %fee, code = cause.code(), "randomness request failed; entry fee refunded");
                cause
            }
            Err(refund) => {
                tracing::error!(user = %caller, fee = %fee, error = %refund, "entry fee refund failed");
                TallyError::token(format!(
                    "randomness request failed ({cause}); entry fee {fee} held by {} not refunded: {refund}",
                    self.config.spender
                ))
            }
        }
    }

    /// Settle the draw for `request_id` with the delivered random words.
    ///
    /// The first word selects the multiplier; the prize is the entry fee
    /// scaled by it. A draw whose payout fails stays open for another
    /// delivery.
    pub fn fulfill_random_words(&self, request_id: RequestId, words: &[u64]) -> Result<TokenAmount> {
        let mut state = self.state.lock();
        let draw = *state
            .draws
            .get(&request_id)
            .ok_or(TallyError::UnknownRequest { request_id })?;
        let word = words
            .first()
            .ok_or_else(|| TallyError::invalid("no random words delivered"))?;

        let table = &self.config.multipliers_bps;
        let index = usize::try_from(*word % table.len() as u64)
            .map_err(|_| TallyError::internal("prize index out of range"))?;
        let multiplier_bps = table[index];
        let prize = draw
            .fee
            .mul_bps(multiplier_bps)
            .ok_or_else(|| TallyError::overflow("prize"))?;

        if !prize.is_zero() {
            self.token
                .transfer_from(self.desk_account(), self.config.spender, draw.user, prize)?;
        }
        state.draws.remove(&request_id);
        state.events.record(RewardEvent::DrawSettled {
            request_id,
            user: draw.user,
            multiplier_bps,
            prize,
        });
        tracing::info!(user = %draw.user, request_id, multiplier_bps, prize = %prize, "prize draw settled");
        Ok(prize)
    }

    /// Draws waiting for randomness
    pub fn pending_draws(&self) -> usize {
        self.state.lock().draws.len()
    }

    /// Events recorded so far
    pub fn events(&self) -> Vec<RewardEvent> {
        self.state.lock().events.snapshot()
    }
}
