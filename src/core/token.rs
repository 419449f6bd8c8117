//! Stable unit ledger.
//!
//! The engine only talks to the stable unit through [`StableUnitLedger`].
//! Access control is the ledger's job: [`StableToken`] lets only its owner
//! (the engine) mint and burn.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::balances::FungibleBalances;
use crate::core::journal::Journaled;
use crate::utils::constants::{STABLE_DECIMALS, STABLE_NAME, STABLE_SYMBOL};
use crate::utils::crypto::Address;

// ═══════════════════════════════════════════════════════════════════════════════
// ERRORS
// ═══════════════════════════════════════════════════════════════════════════════

/// Rejections raised by the stable unit ledger itself
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Caller lacks the mint/burn capability
    #[error("caller {0} is not the token owner")]
    NotOwner(Address),

    /// Zero amount
    #[error("amount must be more than zero")]
    ZeroAmount,

    /// Burn larger than the caller's balance
    #[error("burn amount {amount} exceeds balance {balance}")]
    BurnExceedsBalance {
        /// Requested burn
        amount: u128,
        /// Caller balance
        balance: u128,
    },

    /// Mint to the zero address
    #[error("cannot mint to the zero address")]
    ZeroAddress,
}

// ═══════════════════════════════════════════════════════════════════════════════
// INTERFACE
// ═══════════════════════════════════════════════════════════════════════════════

/// Operations the engine performs on the stable unit
pub trait StableUnitLedger {
    /// Symbol used in logs and errors
    fn symbol(&self) -> &str;

    /// Balance of `owner`
    fn balance_of(&self, owner: &Address) -> u128;

    /// Mint `amount` to `to`. `Ok(false)` reports a soft failure.
    fn mint(&mut self, caller: &Address, to: &Address, amount: u128) -> Result<bool, TokenError>;

    /// Burn `amount` of the caller's own balance
    fn burn(&mut self, caller: &Address, amount: u128) -> Result<(), TokenError>;

    /// Move `amount` from `owner` to `recipient` using `spender`'s allowance
    fn transfer_from(&mut self, spender: &Address, owner: &Address, recipient: &Address, amount: u128) -> bool;
}

// ═══════════════════════════════════════════════════════════════════════════════
// STABLE TOKEN
// ═══════════════════════════════════════════════════════════════════════════════

/// In-memory owner-gated stable unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StableToken {
    /// Token name
    pub name: String,
    /// Token symbol
    pub symbol: String,
    /// Decimal places
    pub decimals: u8,
    owner: Address,
    book: FungibleBalances,
}

impl StableToken {
    /// Create a token whose mint/burn capability belongs to `owner`
    pub fn new(owner: Address) -> Self {
        Self {
            name: STABLE_NAME.to_string(),
            symbol: STABLE_SYMBOL.to_string(),
            decimals: STABLE_DECIMALS,
            owner,
            book: FungibleBalances::new(),
        }
    }

    /// Current owner
    pub fn owner(&self) -> &Address {
        &self.owner
    }

    /// Hand the mint/burn capability to `new_owner`
    pub fn transfer_ownership(&mut self, caller: &Address, new_owner: Address) -> Result<(), TokenError> {
        self.only_owner(caller)?;
        if new_owner.is_zero() {
            return Err(TokenError::ZeroAddress);
        }
        self.owner = new_owner;
        Ok(())
    }

    /// Total supply
    pub fn total_supply(&self) -> u128 {
        self.book.total_supply()
    }

    /// Remaining allowance
    pub fn allowance(&self, owner: &Address, spender: &Address) -> u128 {
        self.book.allowance(owner, spender)
    }

    /// Approve `spender` to move up to `amount` of `owner`'s units
    pub fn approve(&mut self, owner: &Address, spender: &Address, amount: u128) {
        self.book.approve(owner, spender, amount);
    }

    /// Plain transfer by the holder
    pub fn transfer(&mut self, from: &Address, to: &Address, amount: u128) -> bool {
        self.book.transfer(from, to, amount)
    }

    /// Supply equals the sum of balances
    pub fn verify_supply_invariant(&self) -> bool {
        self.book.verify_supply_invariant()
    }

    fn only_owner(&self, caller: &Address) -> Result<(), TokenError> {
        if *caller != self.owner {
            return Err(TokenError::NotOwner(*caller));
        }
        Ok(())
    }
}

impl StableUnitLedger for StableToken {
    fn symbol(&self) -> &str {
        &self.symbol
    }

    fn balance_of(&self, owner: &Address) -> u128 {
        self.book.balance_of(owner)
    }

    fn mint(&mut self, caller: &Address, to: &Address, amount: u128) -> Result<bool, TokenError> {
        self.only_owner(caller)?;
        if to.is_zero() {
            return Err(TokenError::ZeroAddress);
        }
        if amount == 0 {
            return Err(TokenError::ZeroAmount);
        }
        Ok(self.book.mint(to, amount))
    }

    fn burn(&mut self, caller: &Address, amount: u128) -> Result<(), TokenError> {
        self.only_owner(caller)?;
        if amount == 0 {
            return Err(TokenError::ZeroAmount);
        }
        let balance = self.book.balance_of(caller);
        if !self.book.burn(caller, amount) {
            return Err(TokenError::BurnExceedsBalance { amount, balance });
        }
        Ok(())
    }

    fn transfer_from(&mut self, spender: &Address, owner: &Address, recipient: &Address, amount: u128) -> bool {
        self.book.transfer_from(spender, owner, recipient, amount)
    }
}

impl Journaled for StableToken {
    type Checkpoint = FungibleBalances;

    fn checkpoint(&self) -> Self::Checkpoint {
        self.book.clone()
    }

    fn rollback(&mut self, checkpoint: Self::Checkpoint) {
        self.book = checkpoint;
    }
}
