//! Deposit ledger
//!
//! Users prepay into the vault and gated spends draw the configured cost
//! from the caller's deposit. Spent tokens stay in the vault as the amount
//! at the owners' disposal.
//!
//! ```text
//! deposit:            payer ──▶ vault      (ledger spends the payer's allowance)
//! withdraw:           vault ──▶ recipient  (caller's own deposit)
//! refund:             vault ──▶ user       (gated, from the user's deposit)
//! refund at disposal: vault ──▶ recipient  (gated, from spent deposits)
//! ```
//!
//! Every operation makes at most one token call and touches its own state
//! only after that call returned. Lock order is authorization ledger, then
//! the deposit table.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tally_authorization::{ActionArg, QuorumLedger};
use tally_core::effects::{SignatureEffects, TokenEffects};
use tally_core::{Address, DepositConfig, EventLog, Hash32, Result, TallyError, TokenAmount};

/// Function signature bound into spend approvals
pub const SPEND_SIGNATURE: &str = "spend(address,uint256)";
/// Function signature bound into deposit refund approvals
pub const REFUND_SIGNATURE: &str = "refund(address,uint256,uint256)";
/// Function signature bound into refunds of spent deposits
pub const REFUND_AT_DISPOSAL_SIGNATURE: &str = "refundAtDisposal(address,uint256,uint256)";

/// Events recorded by the deposit ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DepositEvent {
    /// Tokens were credited to a deposit
    Deposit {
        /// Credited account
        user: Address,
        /// Credited amount
        amount: TokenAmount,
    },
    /// Tokens left a deposit at its holder's request
    Withdraw {
        /// Recipient
        to: Address,
        /// Paid amount
        amount: TokenAmount,
    },
    /// A gated spend was charged
    Spent {
        /// Account charged
        payer: Address,
        /// Account the approval names
        beneficiary: Address,
        /// Position of the spend, starting at zero
        sequence: u64,
        /// Charged amount
        cost: TokenAmount,
    },
    /// Owners returned tokens from the vault
    Refund {
        /// Recipient
        to: Address,
        /// Paid amount
        amount: TokenAmount,
        /// Paid from spent deposits rather than the recipient's own
        at_disposal: bool,
    },
}

#[derive(Debug, Default)]
struct DepositState {
    balances: HashMap<Address, TokenAmount>,
    at_disposal: TokenAmount,
    spent: u64,
    events: EventLog<DepositEvent>,
}

impl DepositState {
    fn balance(&self, user: &Address) -> TokenAmount {
        self.balances.get(user).copied().unwrap_or_default()
    }

    fn require(&self, user: &Address, needed: TokenAmount) -> Result<TokenAmount> {
        let available = self.balance(user);
        if available < needed {
            return Err(TallyError::InsufficientDeposits { needed, available });
        }
        Ok(available)
    }
}

/// Prepaid deposits charged by quorum-gated spends
pub struct DepositLedger<V, K> {
    authorization: Arc<QuorumLedger<V>>,
    token: K,
    config: DepositConfig,
    state: Mutex<DepositState>,
}

impl<V, K> DepositLedger<V, K>
where
    V: SignatureEffects,
    K: TokenEffects,
{
    /// Ledger gated by `authorization`. Payers approve the authorization
    /// ledger's account before depositing.
    pub fn new(authorization: Arc<QuorumLedger<V>>, token: K, config: DepositConfig) -> Result<Self> {
        if config.spend_cost.is_zero() {
            return Err(TallyError::invalid("spend cost must be non-zero"));
        }
        Ok(Self {
            authorization,
            token,
            config,
            state: Mutex::new(DepositState::default()),
        })
    }

    /// The authorization ledger gating spends and refunds
    pub fn authorization(&self) -> &QuorumLedger<V> {
        &self.authorization
    }

    fn ledger_account(&self) -> Address {
        self.authorization.domain().ledger_account
    }

    /// Credit `amount` to `payer`'s own deposit
    pub fn deposit(&self, payer: Address, amount: TokenAmount) -> Result<()> {
        self.deposit_to(payer, payer, amount)
    }

    /// Pull `amount` from `payer` into the vault and credit it to `user`
    pub fn deposit_to(&self, payer: Address, user: Address, amount: TokenAmount) -> Result<()> {
        if amount.is_zero() {
            return Err(TallyError::invalid_amount("deposit must be non-zero"));
        }
        let mut state = self.state.lock();
        let credited = state
            .balance(&user)
            .checked_add(amount)
            .ok_or_else(|| TallyError::overflow("deposit balance"))?;
        self.token
            .transfer_from(self.ledger_account(), payer, self.config.vault, amount)?;
        state.balances.insert(user, credited);
        state.events.record(DepositEvent::Deposit { user, amount });
        tracing::info!(payer = %payer, user = %user, amount = %amount, "deposit credited");
        Ok(())
    }

    /// `caller` takes `amount` back out of its deposit
    pub fn withdraw(&self, caller: Address, amount: TokenAmount) -> Result<()> {
        self.withdraw_to(caller, caller, amount)
    }

    /// Pay `amount` of `caller`'s deposit to `to`
    pub fn withdraw_to(&self, caller: Address, to: Address, amount: TokenAmount) -> Result<()> {
        if amount.is_zero() {
            return Err(TallyError::invalid_amount("withdrawal must be non-zero"));
        }
        let mut state = self.state.lock();
        let held = state.require(&caller, amount)?;
        self.token.transfer(self.config.vault, to, amount)?;
        state.balances.insert(caller, held.saturating_sub(amount));
        state.events.record(DepositEvent::Withdraw { to, amount });
        tracing::info!(user = %caller, to = %to, amount = %amount, "deposit withdrawn");
        Ok(())
    }

    /// Action hash owners approve for a spend naming `beneficiary`
    pub fn spend_hash(&self, beneficiary: Address, nonce: u64) -> Hash32 {
        self.authorization
            .action_hash(SPEND_SIGNATURE, &[ActionArg::Address(beneficiary)], nonce)
    }

    /// Charge the spend cost to `caller` for itself
    pub fn spend(&self, caller: Address, nonce: u64) -> Result<u64> {
        self.spend_to(caller, caller, nonce)
    }

    /// Charge the spend cost to `caller` under an approval naming
    /// `beneficiary`. Returns the spend's sequence number.
    ///
    /// A caller without enough deposit is turned away before the approval
    /// is looked at, so a pending approval survives the attempt.
    pub fn spend_to(&self, caller: Address, beneficiary: Address, nonce: u64) -> Result<u64> {
        let cost = self.config.spend_cost;
        self.state.lock().require(&caller, cost)?;

        let signed = self.authorization.signed_hash(
            SPEND_SIGNATURE,
            &[ActionArg::Address(beneficiary)],
            nonce,
        );
        self.authorization.execute_gated(signed, || {
            let mut state = self.state.lock();
            let held = state.require(&caller, cost)?;
            let at_disposal = state
                .at_disposal
                .checked_add(cost)
                .ok_or_else(|| TallyError::overflow("amount at disposal"))?;
            let sequence = state.spent;
            state.balances.insert(caller, held.saturating_sub(cost));
            state.at_disposal = at_disposal;
            state.spent += 1;
            state.events.record(DepositEvent::Spent {
                payer: caller,
                beneficiary,
                sequence,
                cost,
            });
            tracing::info!(payer = %caller, beneficiary = %beneficiary, sequence, cost = %cost, "deposit spent");
            Ok(sequence)
        })
    }

    /// Action hash owners approve for refunding `amount` of `user`'s deposit
    pub fn refund_hash(&self, user: Address, amount: TokenAmount, nonce: u64) -> Hash32 {
        self.authorization.action_hash(
            REFUND_SIGNATURE,
            &[ActionArg::Address(user), ActionArg::Amount(amount)],
            nonce,
        )
    }

    /// Return `amount` of `user`'s deposit to `user`. Anyone may submit once
    /// the matching approval is pending.
    pub fn refund(&self, user: Address, amount: TokenAmount, nonce: u64) -> Result<()> {
        let signed = self.authorization.signed_hash(
            REFUND_SIGNATURE,
            &[ActionArg::Address(user), ActionArg::Amount(amount)],
            nonce,
        );
        self.authorization.execute_gated(signed, || {
            let mut state = self.state.lock();
            let held = state.require(&user, amount)?;
            self.token.transfer(self.config.vault, user, amount)?;
            state.balances.insert(user, held.saturating_sub(amount));
            state.events.record(DepositEvent::Refund {
                to: user,
                amount,
                at_disposal: false,
            });
            tracing::info!(user = %user, amount = %amount, "deposit refunded");
            Ok(())
        })
    }

    /// Action hash owners approve for paying `amount` of spent deposits to `to`
    pub fn refund_at_disposal_hash(&self, to: Address, amount: TokenAmount, nonce: u64) -> Hash32 {
        self.authorization.action_hash(
            REFUND_AT_DISPOSAL_SIGNATURE,
            &[ActionArg::Address(to), ActionArg::Amount(amount)],
            nonce,
        )
    }

    /// Pay `amount` of the spent deposits to `to`
    pub fn refund_at_disposal(&self, to: Address, amount: TokenAmount, nonce: u64) -> Result<()> {
        let signed = self.authorization.signed_hash(
            REFUND_AT_DISPOSAL_SIGNATURE,
            &[ActionArg::Address(to), ActionArg::Amount(amount)],
            nonce,
        );
        self.authorization.execute_gated(signed, || {
            let mut state = self.state.lock();
            if state.at_disposal < amount {
                return Err(TallyError::InsufficientDeposits {
                    needed: amount,
                    available: state.at_disposal,
                });
            }
            self.token.transfer(self.config.vault, to, amount)?;
            state.at_disposal = state.at_disposal.saturating_sub(amount);
            state.events.record(DepositEvent::Refund {
                to,
                amount,
                at_disposal: true,
            });
            tracing::info!(to = %to, amount = %amount, "spent deposits refunded");
            Ok(())
        })
    }

    /// Current deposit of `user`
    pub fn balance_of(&self, user: Address) -> TokenAmount {
        self.state.lock().balance(&user)
    }

    /// Spent deposits not yet refunded
    pub fn at_disposal(&self) -> TokenAmount {
        self.state.lock().at_disposal
    }

    /// Charge of one spend
    pub fn spend_cost(&self) -> TokenAmount {
        self.config.spend_cost
    }

    /// Events recorded so far
    pub fn events(&self) -> Vec<DepositEvent> {
        self.state.lock().events.snapshot()
    }
}
