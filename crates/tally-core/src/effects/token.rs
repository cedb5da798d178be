use crate::errors::Result;
use crate::identifiers::Address;
use crate::types::TokenAmount;
use std::sync::Arc;

/// Fungible token collaborator.
///
/// Mirrors the ERC-20 surface the ledgers rely on. Any `Err` aborts the
/// enclosing ledger operation; a handler must leave balances untouched when
/// it returns an error.
pub trait TokenEffects: Send + Sync {
    /// Move `amount` from `from` to `to`
    fn transfer(&self, from: Address, to: Address, amount: TokenAmount) -> Result<()>;

    /// Move `amount` from `from` to `to` using `spender`'s allowance
    fn transfer_from(
        &self,
        spender: Address,
        from: Address,
        to: Address,
        amount: TokenAmount,
    ) -> Result<()>;

    /// Set `spender`'s allowance over `owner`'s balance
    fn approve(&self, owner: Address, spender: Address, amount: TokenAmount) -> Result<()>;

    /// Balance held by `account`
    fn balance_of(&self, account: Address) -> TokenAmount;

    /// Remaining allowance of `spender` over `owner`
    fn allowance(&self, owner: Address, spender: Address) -> TokenAmount;
}

impl<T: TokenEffects + ?Sized> TokenEffects for Arc<T> {
    fn transfer(&self, from: Address, to: Address, amount: TokenAmount) -> Result<()> {
        (**self).transfer(from, to, amount)
    }

    fn transfer_from(
        &self,
        spender: Address,
        from: Address,
        to: Address,
        amount: TokenAmount,
    ) -> Result<()> {
        (**self).transfer_from(spender, from, to, amount)
    }

    fn approve(&self, owner: Address, spender: Address, amount: TokenAmount) -> Result<()> {
        (**self).approve(owner, spender, amount)
    }

    fn balance_of(&self, account: Address) -> TokenAmount {
        (**self).balance_of(account)
    }

    fn allowance(&self, owner: Address, spender: Address) -> TokenAmount {
        (**self).allowance(owner, spender)
    }
}
