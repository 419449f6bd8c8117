//! DSC engine: collateral, debt and health-factor enforcement.
//!
//! Every mutating entry point runs as one transaction: the re-entrancy flag is
//! raised, ledger/event log/collaborators are checkpointed, and any error
//! restores all of them before it is returned. Reads never mutate and fetch
//! prices fresh on every call.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, warn};

use crate::core::collateral::AssetTransfer;
use crate::core::config::{EngineConfig, EngineParams};
use crate::core::journal::Journaled;
use crate::core::ledger::AccountLedger;
use crate::core::registry::{AssetId, CollateralRegistry, FeedId};
use crate::core::token::StableUnitLedger;
use crate::error::{Error, Result};
use crate::oracle::PriceOracle;
use crate::protocol::events::{EngineEvent, EventLog};
use crate::utils::crypto::Address;
use crate::utils::guard::ReentrancyLock;
use crate::utils::math::{self, format_units, mul_div, safe_add};

// ═══════════════════════════════════════════════════════════════════════════════
// HEALTH FACTOR
// ═══════════════════════════════════════════════════════════════════════════════

/// Margin of safety of a position.
///
/// An account without debt has no numeric factor and is `Unbounded`, which
/// orders above every finite value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HealthFactor {
    /// Finite factor at the working scale (1e18 == 1.0)
    Finite(u128),
    /// Zero-debt position
    Unbounded,
}

impl HealthFactor {
    /// Numeric value, `u128::MAX` when unbounded
    pub fn value(&self) -> u128 {
        match self {
            HealthFactor::Finite(v) => *v,
            HealthFactor::Unbounded => u128::MAX,
        }
    }

    /// Whether the factor is strictly below `min`
    pub fn is_below(&self, min: u128) -> bool {
        matches!(self, HealthFactor::Finite(v) if *v < min)
    }

    /// Position status against `min`
    pub fn status(&self, min: u128) -> PositionStatus {
        if self.is_below(min) {
            PositionStatus::Unhealthy
        } else {
            PositionStatus::Healthy
        }
    }
}

impl fmt::Display for HealthFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HealthFactor::Finite(v) => write!(f, "{}", format_units(*v)),
            HealthFactor::Unbounded => write!(f, "∞"),
        }
    }
}

/// Liquidation state of an account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PositionStatus {
    /// No debt, or factor at or above the minimum
    Healthy,
    /// Factor below the minimum; anyone may liquidate
    Unhealthy,
}

/// Debt and collateral value of an account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountInfo {
    /// Outstanding minted stable units
    pub debt: u128,
    /// USD value of all deposited collateral
    pub collateral_value_usd: u128,
}

// ═══════════════════════════════════════════════════════════════════════════════
// ENGINE
// ═══════════════════════════════════════════════════════════════════════════════

/// Collateral/debt engine over an oracle `O`, a collateral transfer
/// primitive `B` and a stable unit ledger `S`
#[derive(Debug)]
pub struct DscEngine<O, B, S> {
    address: Address,
    params: EngineParams,
    registry: CollateralRegistry,
    ledger: AccountLedger,
    events: EventLog,
    oracle: O,
    bank: B,
    stable: S,
    lock: ReentrancyLock,
}

impl<O, B, S> DscEngine<O, B, S>
where
    O: PriceOracle,
    B: AssetTransfer + Journaled,
    S: StableUnitLedger + Journaled,
{
    /// Build an engine from a validated configuration and its collaborators.
    ///
    /// The stable unit must already grant its mint/burn capability to
    /// `config.engine_address`; the ledger enforces that on every call.
    pub fn new(config: &EngineConfig, oracle: O, bank: B, stable: S) -> Result<Self> {
        config.validate()?;
        let registry = config.build_registry()?;
        info!(
            engine = %config.engine_address.short(),
            assets = registry.len(),
            "engine constructed"
        );
        Ok(Self {
            address: config.engine_address,
            params: config.params,
            registry,
            ledger: AccountLedger::new(),
            events: EventLog::new(),
            oracle,
            bank,
            stable,
            lock: ReentrancyLock::new(),
        })
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // TRANSACTIONS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Run `f` as one all-or-nothing, non-reentrant transaction
    pub(crate) fn transact<R>(
        &mut self,
        operation: &'static str,
        f: impl FnOnce(&mut Self) -> Result<R>,
    ) -> Result<R> {
        let _entered = self.lock.enter()?;

        let ledger = self.ledger.clone();
        let events_len = self.events.len();
        let bank = self.bank.checkpoint();
        let stable = self.stable.checkpoint();

        match f(self) {
            Ok(value) => Ok(value),
            Err(err) => {
                self.ledger = ledger;
                self.events.truncate(events_len);
                self.bank.rollback(bank);
                self.stable.rollback(stable);
                warn!(operation, code = err.code(), error = %err, "transaction rolled back");
                Err(err)
            }
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // USER OPERATIONS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Deposit `amount` of an approved asset as collateral
    pub fn deposit_collateral(&mut self, caller: &Address, asset: &AssetId, amount: u128) -> Result<()> {
        self.transact("deposit_collateral", |engine| {
            engine.deposit_inner(caller, asset, amount)
        })?;
        info!(account = %caller.short(), asset = %asset, amount, "collateral deposited");
        Ok(())
    }

    /// Mint `amount` stable units against the caller's collateral
    pub fn mint(&mut self, caller: &Address, amount: u128) -> Result<()> {
        self.transact("mint", |engine| engine.mint_inner(caller, amount))?;
        info!(account = %caller.short(), amount, "stable units minted");
        Ok(())
    }

    /// Deposit then mint in one transaction
    pub fn deposit_collateral_and_mint(
        &mut self,
        caller: &Address,
        asset: &AssetId,
        collateral_amount: u128,
        mint_amount: u128,
    ) -> Result<()> {
        self.transact("deposit_collateral_and_mint", |engine| {
            engine.deposit_inner(caller, asset, collateral_amount)?;
            engine.mint_inner(caller, mint_amount)
        })?;
        info!(
            account = %caller.short(),
            asset = %asset,
            collateral_amount,
            mint_amount,
            "collateral deposited and stable units minted"
        );
        Ok(())
    }

    /// Repay `amount` of the caller's own debt with the caller's stable units
    pub fn burn(&mut self, caller: &Address, amount: u128) -> Result<()> {
        self.transact("burn", |engine| {
            engine.burn_inner(amount, caller, caller)?;
            // Cannot fail after a debt decrease; kept as an invariant check
            engine.revert_if_health_factor_broken(caller)
        })?;
        info!(account = %caller.short(), amount, "stable units burned");
        Ok(())
    }

    /// Withdraw `amount` of the caller's collateral
    pub fn redeem_collateral(&mut self, caller: &Address, asset: &AssetId, amount: u128) -> Result<()> {
        self.transact("redeem_collateral", |engine| {
            engine.redeem_inner(asset, amount, caller, caller)?;
            engine.revert_if_health_factor_broken(caller)
        })?;
        info!(account = %caller.short(), asset = %asset, amount, "collateral redeemed");
        Ok(())
    }

    /// Burn debt then withdraw collateral in one transaction
    pub fn redeem_collateral_for_stable(
        &mut self,
        caller: &Address,
        asset: &AssetId,
        collateral_amount: u128,
        burn_amount: u128,
    ) -> Result<()> {
        self.transact("redeem_collateral_for_stable", |engine| {
            engine.burn_inner(burn_amount, caller, caller)?;
            engine.redeem_inner(asset, collateral_amount, caller, caller)?;
            engine.revert_if_health_factor_broken(caller)
        })?;
        info!(
            account = %caller.short(),
            asset = %asset,
            collateral_amount,
            burn_amount,
            "stable units burned and collateral redeemed"
        );
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // INTERNAL PRIMITIVES
    // ═══════════════════════════════════════════════════════════════════════════

    fn deposit_inner(&mut self, account: &Address, asset: &AssetId, amount: u128) -> Result<()> {
        require_positive(amount)?;
        self.registry.ensure_approved(asset)?;

        self.ledger.credit_collateral(account, asset, amount)?;
        self.events.emit(EngineEvent::CollateralDeposited {
            account: *account,
            asset: asset.clone(),
            amount,
        })?;

        let custody = self.address;
        if !self.bank.transfer_from(asset, &custody, account, &custody, amount) {
            return Err(Error::TransferFailed {
                asset: asset.to_string(),
            });
        }
        Ok(())
    }

    fn mint_inner(&mut self, account: &Address, amount: u128) -> Result<()> {
        require_positive(amount)?;
        self.ledger.add_debt(account, amount)?;
        self.revert_if_health_factor_broken(account)?;

        let custody = self.address;
        if !self.stable.mint(&custody, account, amount)? {
            return Err(Error::MintFailed);
        }
        Ok(())
    }

    /// Reduce `on_behalf_of`'s debt using stable units pulled from `payer`
    pub(crate) fn burn_inner(&mut self, amount: u128, on_behalf_of: &Address, payer: &Address) -> Result<()> {
        require_positive(amount)?;
        self.ledger.sub_debt(on_behalf_of, amount)?;

        let custody = self.address;
        if !self.stable.transfer_from(&custody, payer, &custody, amount) {
            return Err(Error::TransferFailed {
                asset: self.stable.symbol().to_string(),
            });
        }
        self.stable.burn(&custody, amount)?;
        Ok(())
    }

    /// Debit `from`'s collateral and pay the asset out to `to`
    pub(crate) fn redeem_inner(&mut self, asset: &AssetId, amount: u128, from: &Address, to: &Address) -> Result<()> {
        require_positive(amount)?;
        self.registry.ensure_approved(asset)?;

        self.ledger.debit_collateral(from, asset, amount)?;
        self.events.emit(EngineEvent::CollateralRedeemed {
            from: *from,
            to: *to,
            asset: asset.clone(),
            amount,
        })?;

        let custody = self.address;
        if !self.bank.transfer(asset, &custody, to, amount) {
            return Err(Error::TransferFailed {
                asset: asset.to_string(),
            });
        }
        Ok(())
    }

    /// Fail with [`Error::HealthFactorBroken`] if `account` is under-margined
    pub(crate) fn revert_if_health_factor_broken(&self, account: &Address) -> Result<()> {
        match self.health_factor(account)? {
            HealthFactor::Finite(factor) if factor < self.params.min_health_factor => {
                Err(Error::HealthFactorBroken(factor))
            }
            _ => Ok(()),
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // VALUATION
    // ═══════════════════════════════════════════════════════════════════════════

    /// Current price of an approved asset at the working scale
    pub fn price(&self, asset: &AssetId) -> Result<u128> {
        let feed = self.registry.price_feed(asset)?;
        let data = self.oracle.latest_price(feed)?;
        data.to_wad(feed)
    }

    /// USD value of `amount` of `asset`
    pub fn usd_value(&self, asset: &AssetId, amount: u128) -> Result<u128> {
        math::usd_value(amount, self.price(asset)?)
    }

    /// Quantity of `asset` worth `usd_amount`, rounded down
    pub fn token_amount_from_usd(&self, asset: &AssetId, usd_amount: u128) -> Result<u128> {
        math::token_amount_from_usd(usd_amount, self.price(asset)?)
    }

    /// USD value of everything `account` has deposited
    pub fn account_collateral_value(&self, account: &Address) -> Result<u128> {
        let mut total = 0u128;
        for asset in self.registry.assets() {
            let amount = self.ledger.collateral_of(account, asset);
            if amount == 0 {
                continue;
            }
            total = safe_add(total, self.usd_value(asset, amount)?)?;
        }
        debug!(account = %account.short(), value = total, "collateral valued");
        Ok(total)
    }

    /// Debt and collateral value of `account`
    pub fn account_information(&self, account: &Address) -> Result<AccountInfo> {
        Ok(AccountInfo {
            debt: self.ledger.debt_of(account),
            collateral_value_usd: self.account_collateral_value(account)?,
        })
    }

    /// Health factor of `account`; zero debt is `Unbounded` without any price read
    pub fn health_factor(&self, account: &Address) -> Result<HealthFactor> {
        let debt = self.ledger.debt_of(account);
        if debt == 0 {
            return Ok(HealthFactor::Unbounded);
        }
        let collateral = self.account_collateral_value(account)?;
        let factor = self.calculate_health_factor(debt, collateral)?;
        debug!(account = %account.short(), %factor, "health factor evaluated");
        Ok(factor)
    }

    /// Health factor of a hypothetical position
    pub fn calculate_health_factor(&self, debt: u128, collateral_value_usd: u128) -> Result<HealthFactor> {
        if debt == 0 {
            return Ok(HealthFactor::Unbounded);
        }
        math::calculate_health_factor(
            collateral_value_usd,
            debt,
            self.params.liquidation_threshold,
            self.params.liquidation_precision,
            self.params.precision,
        )
        .map(HealthFactor::Finite)
    }

    /// Aggregate custody value over total debt at the working scale;
    /// `None` while no debt is outstanding
    pub fn protocol_collateralization(&self) -> Result<Option<u128>> {
        let debt = self.ledger.total_debt();
        if debt == 0 {
            return Ok(None);
        }
        let mut value = 0u128;
        for asset in self.registry.assets() {
            let amount = self.ledger.total_collateral(asset);
            if amount > 0 {
                value = safe_add(value, self.usd_value(asset, amount)?)?;
            }
        }
        mul_div(value, self.params.precision, debt).map(Some)
    }

    /// True when aggregate collateral is worth no more than outstanding debt.
    ///
    /// In that state no liquidation bonus can be funded and positions may be
    /// impossible to rescue; the engine reports it but does not remedy it.
    pub fn is_protocol_insolvent(&self) -> Result<bool> {
        Ok(matches!(self.protocol_collateralization()?, Some(ratio) if ratio <= self.params.precision))
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // QUERIES
    // ═══════════════════════════════════════════════════════════════════════════

    /// Deposited amount of `asset` for `account`
    pub fn collateral_balance(&self, account: &Address, asset: &AssetId) -> u128 {
        self.ledger.collateral_of(account, asset)
    }

    /// Outstanding debt of `account`
    pub fn debt_of(&self, account: &Address) -> u128 {
        self.ledger.debt_of(account)
    }

    /// Approved collateral in registration order
    pub fn collateral_assets(&self) -> &[AssetId] {
        self.registry.assets()
    }

    /// Price feed of an approved asset
    pub fn price_feed(&self, asset: &AssetId) -> Result<&FeedId> {
        self.registry.price_feed(asset)
    }

    /// Risk parameters
    pub fn params(&self) -> &EngineParams {
        &self.params
    }

    /// Custody principal
    pub fn engine_address(&self) -> &Address {
        &self.address
    }

    /// Account ledger
    pub fn ledger(&self) -> &AccountLedger {
        &self.ledger
    }

    /// Event log
    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// Price oracle
    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    /// Price oracle, mutable (publishing prices is not an engine operation)
    pub fn oracle_mut(&mut self) -> &mut O {
        &mut self.oracle
    }

    /// Collateral transfer primitive
    pub fn collateral_bank(&self) -> &B {
        &self.bank
    }

    /// Collateral transfer primitive, mutable (funding and approvals)
    pub fn collateral_bank_mut(&mut self) -> &mut B {
        &mut self.bank
    }

    /// Stable unit ledger
    pub fn stable_unit(&self) -> &S {
        &self.stable
    }

    /// Stable unit ledger, mutable (approvals and transfers between holders)
    pub fn stable_unit_mut(&mut self) -> &mut S {
        &mut self.stable
    }

    /// Handle on the engine's re-entrancy flag
    pub fn reentrancy_lock(&self) -> ReentrancyLock {
        self.lock.clone()
    }
}

fn require_positive(amount: u128) -> Result<()> {
    if amount == 0 {
        return Err(Error::NonPositiveAmount);
    }
    Ok(())
}
