//! Per-account collateral and debt bookkeeping.
//!
//! Entries are created implicitly (zero-initialized) on first credit and never
//! removed. All subtractions are checked and fail with
//! [`Error::InsufficientBalance`] instead of wrapping.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::core::registry::AssetId;
use crate::error::{Error, Result};
use crate::utils::crypto::Address;
use crate::utils::math::{safe_add, safe_sub};

// ═══════════════════════════════════════════════════════════════════════════════
// ACCOUNT STATE
// ═══════════════════════════════════════════════════════════════════════════════

/// Recorded position of a single account
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountState {
    /// Deposited quantity per collateral asset
    pub collateral: HashMap<AssetId, u128>,
    /// Outstanding minted stable units
    pub debt: u128,
}

impl AccountState {
    /// Deposited amount of one asset
    pub fn collateral_of(&self, asset: &AssetId) -> u128 {
        self.collateral.get(asset).copied().unwrap_or(0)
    }

    /// Whether every balance is zero
    pub fn is_empty(&self) -> bool {
        self.debt == 0 && self.collateral.values().all(|v| *v == 0)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// ACCOUNT LEDGER
// ═══════════════════════════════════════════════════════════════════════════════

/// Collateral and debt of every account plus protocol-wide totals
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountLedger {
    accounts: HashMap<Address, AccountState>,
    total_collateral: HashMap<AssetId, u128>,
    total_debt: u128,
}

impl AccountLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // QUERIES
    // ═══════════════════════════════════════════════════════════════════════════

    /// Recorded state of an account, if it was ever touched
    pub fn account(&self, account: &Address) -> Option<&AccountState> {
        self.accounts.get(account)
    }

    /// Deposited amount of `asset` for `account`
    pub fn collateral_of(&self, account: &Address, asset: &AssetId) -> u128 {
        self.accounts
            .get(account)
            .map(|a| a.collateral_of(asset))
            .unwrap_or(0)
    }

    /// Outstanding debt of `account`
    pub fn debt_of(&self, account: &Address) -> u128 {
        self.accounts.get(account).map(|a| a.debt).unwrap_or(0)
    }

    /// Sum of all deposits of `asset`
    pub fn total_collateral(&self, asset: &AssetId) -> u128 {
        self.total_collateral.get(asset).copied().unwrap_or(0)
    }

    /// Sum of all outstanding debt
    pub fn total_debt(&self) -> u128 {
        self.total_debt
    }

    /// Number of accounts ever touched
    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }

    /// Accounts with non-zero debt
    pub fn debtors(&self) -> impl Iterator<Item = &Address> + '_ {
        self.accounts
            .iter()
            .filter(|(_, state)| state.debt > 0)
            .map(|(addr, _)| addr)
    }

    /// Totals equal the sum of per-account balances
    pub fn verify_totals(&self) -> bool {
        let debt: u128 = self.accounts.values().map(|a| a.debt).sum();
        if debt != self.total_debt {
            return false;
        }
        self.total_collateral.iter().all(|(asset, total)| {
            let sum: u128 = self.accounts.values().map(|a| a.collateral_of(asset)).sum();
            sum == *total
        })
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // MUTATIONS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Credit deposited collateral
    pub fn credit_collateral(&mut self, account: &Address, asset: &AssetId, amount: u128) -> Result<()> {
        let total = safe_add(self.total_collateral(asset), amount)?;
        let entry = self.accounts.entry(*account).or_default();
        let balance = safe_add(entry.collateral_of(asset), amount)?;
        entry.collateral.insert(asset.clone(), balance);
        self.total_collateral.insert(asset.clone(), total);
        Ok(())
    }

    /// Debit collateral; fails without touching state if the balance is short
    pub fn debit_collateral(&mut self, account: &Address, asset: &AssetId, amount: u128) -> Result<()> {
        let balance = safe_sub(self.collateral_of(account, asset), amount)?;
        let total = safe_sub(self.total_collateral(asset), amount)?;
        self.accounts
            .entry(*account)
            .or_default()
            .collateral
            .insert(asset.clone(), balance);
        self.total_collateral.insert(asset.clone(), total);
        Ok(())
    }

    /// Record newly minted debt
    pub fn add_debt(&mut self, account: &Address, amount: u128) -> Result<()> {
        let total = safe_add(self.total_debt, amount)?;
        let entry = self.accounts.entry(*account).or_default();
        entry.debt = safe_add(entry.debt, amount)?;
        self.total_debt = total;
        Ok(())
    }

    /// Record repaid debt; fails without touching state if debt is short
    pub fn sub_debt(&mut self, account: &Address, amount: u128) -> Result<()> {
        let debt = safe_sub(self.debt_of(account), amount)?;
        let total = safe_sub(self.total_debt, amount)?;
        self.accounts.entry(*account).or_default().debt = debt;
        self.total_debt = total;
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // SNAPSHOTS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Serialize to bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::serialize(self).map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Deserialize from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        bincode::deserialize(bytes).map_err(|e| Error::Deserialization(e.to_string()))
    }
}
