//! Fungible balance book shared by the in-memory token collaborators.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::utils::crypto::Address;

/// Balances, allowances and supply of a single fungible unit
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FungibleBalances {
    total_supply: u128,
    balances: HashMap<Address, u128>,
    /// owner -> spender -> remaining allowance
    allowances: HashMap<Address, HashMap<Address, u128>>,
}

impl FungibleBalances {
    /// Create an empty book
    pub fn new() -> Self {
        Self::default()
    }

    /// Total units in circulation
    pub fn total_supply(&self) -> u128 {
        self.total_supply
    }

    /// Balance of an owner
    pub fn balance_of(&self, owner: &Address) -> u128 {
        self.balances.get(owner).copied().unwrap_or(0)
    }

    /// Remaining allowance of `spender` over `owner`'s balance
    pub fn allowance(&self, owner: &Address, spender: &Address) -> u128 {
        self.allowances
            .get(owner)
            .and_then(|m| m.get(spender))
            .copied()
            .unwrap_or(0)
    }

    /// Set the allowance of `spender` over `owner`'s balance
    pub fn approve(&mut self, owner: &Address, spender: &Address, amount: u128) {
        self.allowances
            .entry(*owner)
            .or_default()
            .insert(*spender, amount);
    }

    /// Create new units; false on supply overflow
    pub fn mint(&mut self, to: &Address, amount: u128) -> bool {
        let Some(supply) = self.total_supply.checked_add(amount) else {
            return false;
        };
        let Some(balance) = self.balance_of(to).checked_add(amount) else {
            return false;
        };
        self.total_supply = supply;
        self.balances.insert(*to, balance);
        true
    }

    /// Destroy units; false if the balance is short
    pub fn burn(&mut self, from: &Address, amount: u128) -> bool {
        let Some(balance) = self.balance_of(from).checked_sub(amount) else {
            return false;
        };
        self.set_balance(from, balance);
        self.total_supply -= amount;
        true
    }

    /// Move units; false if the sender's balance is short
    pub fn transfer(&mut self, from: &Address, to: &Address, amount: u128) -> bool {
        let Some(from_balance) = self.balance_of(from).checked_sub(amount) else {
            return false;
        };
        if from == to {
            return true;
        }
        self.set_balance(from, from_balance);
        let to_balance = self.balance_of(to) + amount;
        self.balances.insert(*to, to_balance);
        true
    }

    /// Move units on behalf of `owner`, spending `spender`'s allowance
    pub fn transfer_from(&mut self, spender: &Address, owner: &Address, to: &Address, amount: u128) -> bool {
        let Some(remaining) = self.allowance(owner, spender).checked_sub(amount) else {
            return false;
        };
        if !self.transfer(owner, to, amount) {
            return false;
        }
        self.approve(owner, spender, remaining);
        true
    }

    /// Number of non-zero holders
    #[cfg(test)]
    pub fn holder_count(&self) -> usize {
        self.balances.len()
    }

    /// total_supply == sum of all balances
    pub fn verify_supply_invariant(&self) -> bool {
        self.balances.values().sum::<u128>() == self.total_supply
    }

    fn set_balance(&mut self, owner: &Address, balance: u128) {
        if balance == 0 {
            self.balances.remove(owner);
        } else {
            self.balances.insert(*owner, balance);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn a() -> Address {
        Address::from_label("a")
    }

    fn b() -> Address {
        Address::from_label("b")
    }

    #[test]
    fn test_mint_burn() {
        let mut book = FungibleBalances::new();
        assert!(book.mint(&a(), 100));
        assert!(book.burn(&a(), 40));
        assert!(!book.burn(&a(), 61));
        assert_eq!(book.balance_of(&a()), 60);
        assert_eq!(book.total_supply(), 60);
        assert!(book.verify_supply_invariant());
    }

    #[test]
    fn test_transfer_from_requires_allowance() {
        let mut book = FungibleBalances::new();
        book.mint(&a(), 100);

        assert!(!book.transfer_from(&b(), &a(), &b(), 10));

        book.approve(&a(), &b(), 30);
        assert!(book.transfer_from(&b(), &a(), &b(), 10));
        assert_eq!(book.allowance(&a(), &b()), 20);
        assert_eq!(book.balance_of(&b()), 10);

        assert!(!book.transfer_from(&b(), &a(), &b(), 21));
    }

    #[test]
    fn test_failed_transfer_keeps_allowance() {
        let mut book = FungibleBalances::new();
        book.mint(&a(), 5);
        book.approve(&a(), &b(), 50);
        assert!(!book.transfer_from(&b(), &a(), &b(), 10));
        assert_eq!(book.allowance(&a(), &b()), 50);
    }

    #[test]
    fn test_holder_count_drops_on_empty() {
        let mut book = FungibleBalances::new();
        book.mint(&a(), 5);
        assert!(book.transfer(&a(), &b(), 5));
        assert_eq!(book.holder_count(), 1);
        assert_eq!(book.balance_of(&b()), 5);
    }
}
