//! In-memory fungible token

use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use tally_core::effects::TokenEffects;
use tally_core::{Address, Result, TallyError, TokenAmount};

#[derive(Debug, Default)]
struct TokenState {
    balances: HashMap<Address, TokenAmount>,
    allowances: HashMap<(Address, Address), TokenAmount>,
    rejected_recipients: HashSet<Address>,
    transfers: usize,
}

impl TokenState {
    fn balance(&self, account: Address) -> TokenAmount {
        self.balances.get(&account).copied().unwrap_or_default()
    }

    fn check_recipient(&self, to: Address) -> Result<()> {
        if self.rejected_recipients.contains(&to) {
            return Err(TallyError::token(format!("transfer to {to} rejected")));
        }
        Ok(())
    }

    fn move_balance(&mut self, from: Address, to: Address, amount: TokenAmount) -> Result<()> {
        let available = self.balance(from);
        let remaining = available
            .checked_sub(amount)
            .ok_or(TallyError::InsufficientFunds {
                needed: amount,
                available,
            })?;
        if from != to {
            let credited = self
                .balance(to)
                .checked_add(amount)
                .ok_or_else(|| TallyError::overflow("balance"))?;
            self.balances.insert(from, remaining);
            self.balances.insert(to, credited);
        }
        self.transfers += 1;
        Ok(())
    }
}

/// ERC-20 shaped token kept in memory
///
/// Failed calls leave balances and allowances untouched.
#[derive(Debug, Default)]
pub struct MockToken {
    state: Mutex<TokenState>,
}

impl MockToken {
    /// Empty token
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit `amount` to `to` out of thin air
    pub fn mint(&self, to: Address, amount: TokenAmount) {
        let mut state = self.state.lock();
        let balance = state.balance(to);
        state
            .balances
            .insert(to, TokenAmount::from_units(balance.units().saturating_add(amount.units())));
    }

    /// Make every transfer credited to `recipient` fail (or stop failing)
    pub fn reject_transfers_to(&self, recipient: Address, reject: bool) {
        let mut state = self.state.lock();
        if reject {
            state.rejected_recipients.insert(recipient);
        } else {
            state.rejected_recipients.remove(&recipient);
        }
    }

    /// Number of successful transfers so far
    pub fn transfer_count(&self) -> usize {
        self.state.lock().transfers
    }
}

impl TokenEffects for MockToken {
    fn transfer(&self, from: Address, to: Address, amount: TokenAmount) -> Result<()> {
        let mut state = self.state.lock();
        state.check_recipient(to)?;
        state.move_balance(from, to, amount)
    }

    fn transfer_from(
        &self,
        spender: Address,
        from: Address,
        to: Address,
        amount: TokenAmount,
    ) -> Result<()> {
        let mut state = self.state.lock();
        state.check_recipient(to)?;
        let allowance = state
            .allowances
            .get(&(from, spender))
            .copied()
            .unwrap_or_default();
        let remaining = allowance
            .checked_sub(amount)
            .ok_or(TallyError::InsufficientFunds {
                needed: amount,
                available: allowance,
            })?;
        state.move_balance(from, to, amount)?;
        state.allowances.insert((from, spender), remaining);
        Ok(())
    }

    fn approve(&self, owner: Address, spender: Address, amount: TokenAmount) -> Result<()> {
        self.state.lock().allowances.insert((owner, spender), amount);
        Ok(())
    }

    fn balance_of(&self, account: Address) -> TokenAmount {
        self.state.lock().balance(account)
    }

    fn allowance(&self, owner: Address, spender: Address) -> TokenAmount {
        self.state
            .lock()
            .allowances
            .get(&(owner, spender))
            .copied()
            .unwrap_or_default()
    }
}
