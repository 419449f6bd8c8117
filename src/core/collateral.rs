//! Collateral asset transfers.
//!
//! [`AssetTransfer`] is the primitive the engine uses to pull collateral into
//! custody and pay it back out. [`CollateralBank`] is an in-memory
//! implementation holding one balance book per asset.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::core::balances::FungibleBalances;
use crate::core::journal::Journaled;
use crate::core::registry::AssetId;
use crate::utils::crypto::Address;

/// Transfer primitives for every approved collateral asset
pub trait AssetTransfer {
    /// Balance of `owner` in `asset`
    fn balance_of(&self, asset: &AssetId, owner: &Address) -> u128;

    /// Move `amount` of `asset` from `owner` to `recipient` using `spender`'s allowance
    fn transfer_from(
        &mut self,
        asset: &AssetId,
        spender: &Address,
        owner: &Address,
        recipient: &Address,
        amount: u128,
    ) -> bool;

    /// Move `amount` of `asset` held by `sender` to `recipient`
    fn transfer(&mut self, asset: &AssetId, sender: &Address, recipient: &Address, amount: u128) -> bool;
}

/// In-memory multi-asset balances
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollateralBank {
    assets: HashMap<AssetId, FungibleBalances>,
}

impl CollateralBank {
    /// Create an empty bank
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit freshly issued units of `asset` to `to`
    pub fn mint_to(&mut self, asset: &AssetId, to: &Address, amount: u128) -> bool {
        self.assets.entry(asset.clone()).or_default().mint(to, amount)
    }

    /// Approve `spender` to move `amount` of `owner`'s `asset`
    pub fn approve(&mut self, asset: &AssetId, owner: &Address, spender: &Address, amount: u128) {
        self.assets
            .entry(asset.clone())
            .or_default()
            .approve(owner, spender, amount);
    }

    /// Remaining allowance
    pub fn allowance(&self, asset: &AssetId, owner: &Address, spender: &Address) -> u128 {
        self.assets
            .get(asset)
            .map(|b| b.allowance(owner, spender))
            .unwrap_or(0)
    }

    /// Total issued units of `asset`
    pub fn total_supply(&self, asset: &AssetId) -> u128 {
        self.assets.get(asset).map(|b| b.total_supply()).unwrap_or(0)
    }
}

impl AssetTransfer for CollateralBank {
    fn balance_of(&self, asset: &AssetId, owner: &Address) -> u128 {
        self.assets.get(asset).map(|b| b.balance_of(owner)).unwrap_or(0)
    }

    fn transfer_from(
        &mut self,
        asset: &AssetId,
        spender: &Address,
        owner: &Address,
        recipient: &Address,
        amount: u128,
    ) -> bool {
        self.assets
            .get_mut(asset)
            .map(|b| b.transfer_from(spender, owner, recipient, amount))
            .unwrap_or(false)
    }

    fn transfer(&mut self, asset: &AssetId, sender: &Address, recipient: &Address, amount: u128) -> bool {
        self.assets
            .get_mut(asset)
            .map(|b| b.transfer(sender, recipient, amount))
            .unwrap_or(false)
    }
}

impl Journaled for CollateralBank {
    type Checkpoint = CollateralBank;

    fn checkpoint(&self) -> Self::Checkpoint {
        self.clone()
    }

    fn rollback(&mut self, checkpoint: Self::Checkpoint) {
        *self = checkpoint;
    }
}
