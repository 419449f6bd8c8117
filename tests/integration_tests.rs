//! Integration tests for the DSC engine.
//!
//! These tests drive complete operation sequences through the public API and
//! verify that rejected operations leave no trace.

use chrono::{Duration, Utc};

use dsc_engine::core::collateral::{AssetTransfer, CollateralBank};
use dsc_engine::core::config::{EngineConfig, EngineParams};
use dsc_engine::core::engine::{DscEngine, HealthFactor, PositionStatus};
use dsc_engine::core::journal::Journaled;
use dsc_engine::core::registry::AssetId;
use dsc_engine::core::token::{StableToken, StableUnitLedger, TokenError};
use dsc_engine::error::Error;
use dsc_engine::oracle::{PriceData, PriceOracle, StalenessGuard, StaticPriceOracle};
use dsc_engine::protocol::events::EngineEvent;
use dsc_engine::utils::constants::{MIN_HEALTH_FACTOR, PRECISION};
use dsc_engine::utils::crypto::Address;
use dsc_engine::utils::guard::ReentrancyLock;

const WAD: u128 = PRECISION;

// ═══════════════════════════════════════════════════════════════════════════════
// TEST HELPERS
// ═══════════════════════════════════════════════════════════════════════════════

fn custody() -> Address {
    Address::from_label("engine")
}

fn alice() -> Address {
    Address::from_label("alice")
}

fn bob() -> Address {
    Address::from_label("bob")
}

fn weth() -> AssetId {
    AssetId::new("WETH")
}

fn wbtc() -> AssetId {
    AssetId::new("WBTC")
}

fn config() -> EngineConfig {
    EngineConfig::new(
        custody(),
        vec![weth(), wbtc()],
        vec!["ETH/USD".into(), "BTC/USD".into()],
    )
}

fn oracle(eth_dollars: i128) -> StaticPriceOracle {
    let mut oracle = StaticPriceOracle::new();
    oracle.set_price(&"ETH/USD".into(), eth_dollars * 1_0000_0000, 8);
    oracle.set_price(&"BTC/USD".into(), 1_000 * 1_0000_0000, 8);
    oracle
}

/// Alice and Bob each hold 100 of both assets and have approved the engine
fn funded_bank() -> CollateralBank {
    let mut bank = CollateralBank::new();
    for who in [alice(), bob()] {
        for asset in [weth(), wbtc()] {
            bank.mint_to(&asset, &who, 100 * WAD);
            bank.approve(&asset, &who, &custody(), u128::MAX);
        }
    }
    bank
}

fn engine_at(eth_dollars: i128) -> DscEngine<StaticPriceOracle, CollateralBank, StableToken> {
    DscEngine::new(&config(), oracle(eth_dollars), funded_bank(), StableToken::new(custody())).unwrap()
}

fn set_eth_price<B, S>(engine: &mut DscEngine<StaticPriceOracle, B, S>, dollars: i128)
where
    B: AssetTransfer + Journaled,
    S: StableUnitLedger + Journaled,
{
    engine
        .oracle_mut()
        .update_answer(&"ETH/USD".into(), dollars * 1_0000_0000)
        .unwrap();
}

fn approve_stable(engine: &mut DscEngine<StaticPriceOracle, CollateralBank, StableToken>, owner: &Address) {
    engine.stable_unit_mut().approve(owner, &custody(), u128::MAX);
}

// ═══════════════════════════════════════════════════════════════════════════════
// VALUATION SCENARIOS
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_usd_value_of_fifteen_units() {
    let engine = engine_at(2_000);
    assert_eq!(engine.usd_value(&weth(), 15 * WAD).unwrap(), 30_000 * WAD);
}

#[test]
fn test_token_amount_for_one_hundred_dollars() {
    let engine = engine_at(2_000);
    assert_eq!(engine.token_amount_from_usd(&weth(), 100 * WAD).unwrap(), 5 * WAD / 100);
}

#[test]
fn test_collateral_value_sums_assets() {
    let mut engine = engine_at(2_000);
    engine.deposit_collateral(&alice(), &weth(), 2 * WAD).unwrap();
    engine.deposit_collateral(&alice(), &wbtc(), 3 * WAD).unwrap();

    let info = engine.account_information(&alice()).unwrap();
    assert_eq!(info.collateral_value_usd, 7_000 * WAD);
    assert_eq!(info.debt, 0);
    assert_eq!(engine.collateral_assets(), &[weth(), wbtc()]);
}

#[test]
fn test_missing_feed_aborts_valuation() {
    let mut only_eth = StaticPriceOracle::new();
    only_eth.set_price(&"ETH/USD".into(), 2_000 * 1_0000_0000, 8);
    let mut engine =
        DscEngine::new(&config(), only_eth, funded_bank(), StableToken::new(custody())).unwrap();

    engine.deposit_collateral(&alice(), &wbtc(), WAD).unwrap();
    assert_eq!(
        engine.account_collateral_value(&alice()),
        Err(Error::PriceUnavailable("BTC/USD".into()))
    );
    assert!(engine.mint(&alice(), WAD).is_err());
    assert_eq!(engine.debt_of(&alice()), 0);
}

// ═══════════════════════════════════════════════════════════════════════════════
// INPUT VALIDATION
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_zero_deposit_rejected() {
    let mut engine = engine_at(2_000);
    assert_eq!(
        engine.deposit_collateral(&alice(), &weth(), 0),
        Err(Error::NonPositiveAmount)
    );
}

#[test]
fn test_unapproved_asset_rejected() {
    let mut engine = engine_at(2_000);
    let doge = AssetId::new("DOGE");
    engine.collateral_bank_mut().mint_to(&doge, &alice(), WAD);
    engine.collateral_bank_mut().approve(&doge, &alice(), &custody(), WAD);

    assert_eq!(
        engine.deposit_collateral(&alice(), &doge, WAD),
        Err(Error::UnapprovedAsset("DOGE".into()))
    );
    assert!(engine.events().is_empty());
}

#[test]
fn test_mismatched_configuration_rejected() {
    let mut cfg = config();
    cfg.price_feeds.pop();
    let result = DscEngine::new(&cfg, oracle(2_000), funded_bank(), StableToken::new(custody()));
    assert!(matches!(result, Err(Error::InvalidConfiguration(_))));
}

#[test]
fn test_invalid_params_rejected() {
    let cfg = config().with_params(EngineParams::default().with_threshold(0));
    let result = DscEngine::new(&cfg, oracle(2_000), funded_bank(), StableToken::new(custody()));
    assert!(matches!(result, Err(Error::InvalidParameter { .. })));
}

// ═══════════════════════════════════════════════════════════════════════════════
// MINT AND HEALTH FACTOR
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_mint_beyond_threshold_breaks_health_factor() {
    // One unit at $150 supports at most $75
    let mut engine = engine_at(150);
    engine.deposit_collateral(&alice(), &weth(), WAD).unwrap();

    assert_eq!(engine.mint(&alice(), 150 * WAD), Err(Error::HealthFactorBroken(WAD / 2)));
    assert_eq!(engine.debt_of(&alice()), 0);
    assert_eq!(engine.stable_unit().total_supply(), 0);

    engine.mint(&alice(), 75 * WAD).unwrap();
    assert_eq!(engine.health_factor(&alice()).unwrap(), HealthFactor::Finite(MIN_HEALTH_FACTOR));
}

#[test]
fn test_first_mint_on_fresh_deposit() {
    let mut engine = engine_at(2_000);
    engine.deposit_collateral(&alice(), &weth(), WAD).unwrap();
    assert_eq!(engine.health_factor(&alice()).unwrap(), HealthFactor::Unbounded);

    engine.mint(&alice(), WAD).unwrap();
    assert_eq!(engine.debt_of(&alice()), WAD);
    assert_eq!(engine.stable_unit().balance_of(&alice()), WAD);
}

#[test]
fn test_mint_without_collateral_fails() {
    let mut engine = engine_at(2_000);
    assert_eq!(engine.mint(&alice(), WAD), Err(Error::HealthFactorBroken(0)));
}

#[test]
fn test_deposit_and_mint_is_atomic() {
    let mut engine = engine_at(2_000);
    let err = engine
        .deposit_collateral_and_mint(&alice(), &weth(), WAD, 1_001 * WAD)
        .unwrap_err();
    assert!(matches!(err, Error::HealthFactorBroken(_)));

    assert_eq!(engine.collateral_balance(&alice(), &weth()), 0);
    assert_eq!(engine.collateral_bank().balance_of(&weth(), &alice()), 100 * WAD);
    assert_eq!(engine.collateral_bank().balance_of(&weth(), &custody()), 0);
    assert!(engine.events().is_empty());
}

#[test]
fn test_pure_health_factor_calculator() {
    let engine = engine_at(2_000);
    assert_eq!(
        engine.calculate_health_factor(100 * WAD, 150 * WAD).unwrap(),
        HealthFactor::Finite(3 * WAD / 4)
    );
    assert_eq!(
        engine.calculate_health_factor(0, 0).unwrap(),
        HealthFactor::Unbounded
    );
}

#[test]
fn test_price_drop_makes_position_unhealthy() {
    let mut engine = engine_at(2_000);
    engine
        .deposit_collateral_and_mint(&alice(), &weth(), WAD, 1_000 * WAD)
        .unwrap();
    let min = engine.params().min_health_factor;
    assert_eq!(engine.health_factor(&alice()).unwrap().status(min), PositionStatus::Healthy);

    set_eth_price(&mut engine, 1_999);
    assert_eq!(engine.health_factor(&alice()).unwrap().status(min), PositionStatus::Unhealthy);
}

// ═══════════════════════════════════════════════════════════════════════════════
// ROLLBACK
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_failed_pull_rolls_back_credit() {
    let mut engine = engine_at(2_000);
    engine.collateral_bank_mut().approve(&weth(), &alice(), &custody(), 0);

    let before = engine.ledger().clone();
    assert_eq!(
        engine.deposit_collateral(&alice(), &weth(), WAD),
        Err(Error::TransferFailed { asset: "WETH".into() })
    );
    assert_eq!(engine.ledger(), &before);
    assert!(engine.events().is_empty());
}

#[test]
fn test_redeem_that_breaks_health_factor_is_undone() {
    let mut engine = engine_at(2_000);
    engine
        .deposit_collateral_and_mint(&alice(), &weth(), 2 * WAD, 1_000 * WAD)
        .unwrap();
    let events = engine.events().len();

    let err = engine.redeem_collateral(&alice(), &weth(), 3 * WAD / 2).unwrap_err();
    assert_eq!(err, Error::HealthFactorBroken(WAD / 2));

    // The asset left custody inside the transaction; rollback returns it
    assert_eq!(engine.collateral_bank().balance_of(&weth(), &custody()), 2 * WAD);
    assert_eq!(engine.collateral_bank().balance_of(&weth(), &alice()), 98 * WAD);
    assert_eq!(engine.collateral_balance(&alice(), &weth()), 2 * WAD);
    assert_eq!(engine.events().len(), events);

    engine.redeem_collateral(&alice(), &weth(), WAD).unwrap();
    assert_eq!(engine.collateral_bank().balance_of(&weth(), &alice()), 99 * WAD);
}

#[test]
fn test_redeem_more_than_deposited() {
    let mut engine = engine_at(2_000);
    engine.deposit_collateral(&alice(), &weth(), WAD).unwrap();
    assert_eq!(
        engine.redeem_collateral(&alice(), &weth(), 2 * WAD),
        Err(Error::InsufficientBalance {
            requested: 2 * WAD,
            available: WAD
        })
    );
}

/// Stable unit that reports a soft failure on every mint
#[derive(Debug, Clone)]
struct RefusingStable(StableToken);

impl StableUnitLedger for RefusingStable {
    fn symbol(&self) -> &str {
        self.0.symbol()
    }

    fn balance_of(&self, owner: &Address) -> u128 {
        self.0.balance_of(owner)
    }

    fn mint(&mut self, _caller: &Address, _to: &Address, _amount: u128) -> Result<bool, TokenError> {
        Ok(false)
    }

    fn burn(&mut self, caller: &Address, amount: u128) -> Result<(), TokenError> {
        self.0.burn(caller, amount)
    }

    fn transfer_from(&mut self, spender: &Address, owner: &Address, recipient: &Address, amount: u128) -> bool {
        self.0.transfer_from(spender, owner, recipient, amount)
    }
}

impl Journaled for RefusingStable {
    type Checkpoint = RefusingStable;

    fn checkpoint(&self) -> Self::Checkpoint {
        self.clone()
    }

    fn rollback(&mut self, checkpoint: Self::Checkpoint) {
        *self = checkpoint;
    }
}

#[test]
fn test_refused_mint_rolls_back_debt() {
    let stable = RefusingStable(StableToken::new(custody()));
    let mut engine = DscEngine::new(&config(), oracle(2_000), funded_bank(), stable).unwrap();

    let err = engine
        .deposit_collateral_and_mint(&alice(), &weth(), WAD, 10 * WAD)
        .unwrap_err();
    assert_eq!(err, Error::MintFailed);
    assert_eq!(engine.debt_of(&alice()), 0);
    assert_eq!(engine.collateral_balance(&alice(), &weth()), 0);
}

#[test]
fn test_stable_owner_mismatch_surfaces_token_error() {
    let stable = StableToken::new(Address::from_label("someone else"));
    let mut engine = DscEngine::new(&config(), oracle(2_000), funded_bank(), stable).unwrap();
    engine.deposit_collateral(&alice(), &weth(), WAD).unwrap();

    let err = engine.mint(&alice(), WAD).unwrap_err();
    assert_eq!(err, Error::StableUnitRejected(TokenError::NotOwner(custody())));
    assert_eq!(engine.debt_of(&alice()), 0);
}

// ═══════════════════════════════════════════════════════════════════════════════
// BURN AND COMPOSITES
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_burn_then_full_exit() {
    let mut engine = engine_at(2_000);
    engine
        .deposit_collateral_and_mint(&alice(), &weth(), WAD, 500 * WAD)
        .unwrap();
    approve_stable(&mut engine, &alice());

    engine.burn(&alice(), 200 * WAD).unwrap();
    assert_eq!(engine.debt_of(&alice()), 300 * WAD);
    assert_eq!(engine.stable_unit().total_supply(), 300 * WAD);

    engine
        .redeem_collateral_for_stable(&alice(), &weth(), WAD, 300 * WAD)
        .unwrap();
    assert_eq!(engine.debt_of(&alice()), 0);
    assert_eq!(engine.collateral_balance(&alice(), &weth()), 0);
    assert_eq!(engine.collateral_bank().balance_of(&weth(), &alice()), 100 * WAD);
    assert_eq!(engine.stable_unit().total_supply(), 0);
    assert!(engine.ledger().verify_totals());
}

#[test]
fn test_redeem_for_stable_checks_final_position() {
    let mut engine = engine_at(2_000);
    engine
        .deposit_collateral_and_mint(&alice(), &weth(), WAD, 500 * WAD)
        .unwrap();
    approve_stable(&mut engine, &alice());

    // Burning 100 leaves 400 of debt, which 0.3 units cannot carry
    let err = engine
        .redeem_collateral_for_stable(&alice(), &weth(), 7 * WAD / 10, 100 * WAD)
        .unwrap_err();
    assert!(matches!(err, Error::HealthFactorBroken(_)));
    assert_eq!(engine.debt_of(&alice()), 500 * WAD);
    assert_eq!(engine.stable_unit().balance_of(&alice()), 500 * WAD);
}

#[test]
fn test_burn_exceeding_debt() {
    let mut engine = engine_at(2_000);
    engine
        .deposit_collateral_and_mint(&alice(), &weth(), WAD, 10 * WAD)
        .unwrap();
    approve_stable(&mut engine, &alice());
    assert_eq!(
        engine.burn(&alice(), 11 * WAD),
        Err(Error::InsufficientBalance {
            requested: 11 * WAD,
            available: 10 * WAD
        })
    );
}

#[test]
fn test_dust_debt_against_large_collateral() {
    let mut engine = engine_at(2_000);
    engine.deposit_collateral(&alice(), &weth(), 100 * WAD).unwrap();

    engine.mint(&alice(), 1).unwrap();
    assert_eq!(engine.health_factor(&alice()).unwrap(), HealthFactor::Finite(u128::MAX));

    engine.mint(&alice(), 100 * WAD - 1).unwrap();
    approve_stable(&mut engine, &alice());
    engine.burn(&alice(), 100 * WAD - 1).unwrap();
    assert_eq!(engine.debt_of(&alice()), 1);

    engine.redeem_collateral(&alice(), &weth(), WAD).unwrap();
    assert_eq!(engine.collateral_balance(&alice(), &weth()), 99 * WAD);
    assert_eq!(
        engine.health_factor(&alice()).unwrap().status(MIN_HEALTH_FACTOR),
        PositionStatus::Healthy
    );
    assert!(engine.liquidatable_accounts().unwrap().is_empty());
}

// ═══════════════════════════════════════════════════════════════════════════════
// LIQUIDATION
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_liquidation_restores_solvency() {
    let mut engine = engine_at(2_000);
    engine
        .deposit_collateral_and_mint(&alice(), &weth(), 10 * WAD, 100 * WAD)
        .unwrap();
    engine
        .deposit_collateral_and_mint(&bob(), &weth(), 20 * WAD, 100 * WAD)
        .unwrap();
    approve_stable(&mut engine, &bob());

    assert_eq!(
        engine.liquidate(&bob(), &weth(), &alice(), 100 * WAD),
        Err(Error::HealthFactorOk)
    );

    set_eth_price(&mut engine, 18);
    let outcome = engine.liquidate(&bob(), &weth(), &alice(), 100 * WAD).unwrap();
    assert!(outcome.ending_health_factor > outcome.starting_health_factor);
    assert_eq!(engine.debt_of(&alice()), 0);

    let seized = outcome.quote.total_collateral;
    assert_eq!(engine.collateral_balance(&alice(), &weth()), 10 * WAD - seized);
    assert_eq!(engine.collateral_bank().balance_of(&weth(), &bob()), 80 * WAD + seized);

    let redeemed: Vec<_> = engine
        .events()
        .for_account(&alice())
        .filter_map(|r| match &r.event {
            EngineEvent::CollateralRedeemed { from, to, amount, .. } => Some((*from, *to, *amount)),
            _ => None,
        })
        .collect();
    assert_eq!(redeemed, vec![(alice(), bob(), seized)]);
}

#[test]
fn test_liquidation_down_to_dust_debt() {
    let mut engine = engine_at(2_000);
    engine
        .deposit_collateral_and_mint(&alice(), &weth(), 100 * WAD, 100_000 * WAD)
        .unwrap();
    engine.collateral_bank_mut().mint_to(&wbtc(), &bob(), 10_000 * WAD);
    engine
        .deposit_collateral_and_mint(&bob(), &wbtc(), 10_000 * WAD, 100_000 * WAD)
        .unwrap();
    approve_stable(&mut engine, &bob());

    set_eth_price(&mut engine, 1_900);
    let outcome = engine
        .liquidate(&bob(), &weth(), &alice(), 100_000 * WAD - 1)
        .unwrap();
    assert_eq!(outcome.starting_health_factor, HealthFactor::Finite(95 * WAD / 100));
    assert_eq!(outcome.ending_health_factor, HealthFactor::Finite(u128::MAX));
    assert_eq!(engine.debt_of(&alice()), 1);
    assert!(engine.liquidatable_accounts().unwrap().is_empty());
}

#[test]
fn test_liquidation_that_worsens_target_is_rejected() {
    let mut engine = engine_at(2_000);
    // Exactly at the minimum
    engine
        .deposit_collateral_and_mint(&alice(), &weth(), 10 * WAD, 10_000 * WAD)
        .unwrap();
    engine
        .deposit_collateral_and_mint(&bob(), &weth(), 100 * WAD, 1_000 * WAD)
        .unwrap();
    approve_stable(&mut engine, &bob());

    // 0.525 before; seizing with a 10% bonus at $1050 leaves about 0.522
    set_eth_price(&mut engine, 1_050);
    let ledger = engine.ledger().clone();
    assert_eq!(
        engine.liquidate(&bob(), &weth(), &alice(), 1_000 * WAD),
        Err(Error::HealthFactorNotImproved)
    );
    assert_eq!(engine.ledger(), &ledger);
    assert_eq!(engine.stable_unit().balance_of(&bob()), 1_000 * WAD);
}

#[test]
fn test_liquidation_beyond_holdings_is_underwater() {
    let mut engine = engine_at(2_000);
    engine
        .deposit_collateral_and_mint(&alice(), &weth(), 10 * WAD, 10_000 * WAD)
        .unwrap();
    engine.deposit_collateral(&bob(), &wbtc(), 50 * WAD).unwrap();

    set_eth_price(&mut engine, 900);
    assert!(!engine.is_protocol_insolvent().unwrap());
    let err = engine
        .liquidate(&bob(), &weth(), &alice(), 10_000 * WAD)
        .unwrap_err();
    assert!(matches!(err, Error::LiquidationUnderwater { available, .. } if available == 10 * WAD));
}

#[test]
fn test_unhealthy_liquidator_is_rejected() {
    let mut engine = engine_at(2_000);
    engine
        .deposit_collateral_and_mint(&alice(), &weth(), 10 * WAD, 5_000 * WAD)
        .unwrap();
    engine
        .deposit_collateral_and_mint(&bob(), &weth(), 2 * WAD, 1_000 * WAD)
        .unwrap();
    approve_stable(&mut engine, &bob());

    set_eth_price(&mut engine, 900);
    let err = engine
        .liquidate(&bob(), &weth(), &alice(), 1_000 * WAD)
        .unwrap_err();
    assert_eq!(err, Error::HealthFactorBroken(9 * WAD / 10));
    assert_eq!(engine.debt_of(&alice()), 5_000 * WAD);
}

#[test]
fn test_liquidatable_accounts_sorted_worst_first() {
    let mut engine = engine_at(2_000);
    engine
        .deposit_collateral_and_mint(&alice(), &weth(), WAD, 1_000 * WAD)
        .unwrap();
    engine
        .deposit_collateral_and_mint(&bob(), &weth(), WAD, 800 * WAD)
        .unwrap();

    set_eth_price(&mut engine, 1_000);
    let found = engine.liquidatable_accounts().unwrap();
    assert_eq!(found, vec![(alice(), WAD / 2), (bob(), 5 * WAD / 8)]);
}

// ═══════════════════════════════════════════════════════════════════════════════
// EVENTS, ORACLE AND GUARD
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_event_trail_is_ordered_and_chained() {
    let mut engine = engine_at(2_000);
    engine.deposit_collateral(&alice(), &weth(), WAD).unwrap();
    engine.deposit_collateral(&bob(), &wbtc(), WAD).unwrap();
    engine.redeem_collateral(&alice(), &weth(), WAD / 2).unwrap();

    let log = engine.events();
    assert_eq!(log.len(), 3);
    let kinds: Vec<_> = log.all().iter().map(|r| r.event.event_type()).collect();
    assert_eq!(
        kinds,
        vec!["CollateralDeposited", "CollateralDeposited", "CollateralRedeemed"]
    );
    let sequences: Vec<_> = log.all().iter().map(|r| r.sequence).collect();
    assert_eq!(sequences, vec![0, 1, 2]);
    assert_eq!(log.for_account(&alice()).count(), 2);
    assert!(log.verify_chain());
}

#[test]
fn test_stale_price_freezes_valuation() {
    let mut inner = oracle(2_000);
    let old = Utc::now() - Duration::hours(4);
    inner.set_price_data(&"ETH/USD".into(), PriceData::at(2_000 * 1_0000_0000, 8, old));
    let mut engine = DscEngine::new(
        &config(),
        StalenessGuard::new(inner),
        funded_bank(),
        StableToken::new(custody()),
    )
    .unwrap();

    // Deposits need no price
    engine.deposit_collateral(&alice(), &weth(), WAD).unwrap();
    assert!(matches!(engine.mint(&alice(), WAD), Err(Error::StalePrice { .. })));
    assert_eq!(engine.debt_of(&alice()), 0);

    engine
        .oracle_mut()
        .inner_mut()
        .set_price(&"ETH/USD".into(), 2_000 * 1_0000_0000, 8);
    engine.mint(&alice(), WAD).unwrap();
}

#[test]
fn test_non_positive_price_aborts() {
    let mut engine = engine_at(2_000);
    engine.deposit_collateral(&alice(), &weth(), WAD).unwrap();
    engine.oracle_mut().update_answer(&"ETH/USD".into(), 0).unwrap();
    assert!(matches!(engine.mint(&alice(), WAD), Err(Error::InvalidPrice { .. })));
    assert!(engine.oracle().latest_price(&"ETH/USD".into()).is_ok());
}

/// Collateral bank that tries to enter the engine's guard from inside a pull
#[derive(Debug, Clone)]
struct ReentrantBank {
    inner: CollateralBank,
    lock: Option<ReentrancyLock>,
    observed: Vec<Result<(), Error>>,
}

impl AssetTransfer for ReentrantBank {
    fn balance_of(&self, asset: &AssetId, owner: &Address) -> u128 {
        self.inner.balance_of(asset, owner)
    }

    fn transfer_from(
        &mut self,
        asset: &AssetId,
        spender: &Address,
        owner: &Address,
        recipient: &Address,
        amount: u128,
    ) -> bool {
        if let Some(lock) = &self.lock {
            let attempt = lock.enter().map(|_| ());
            self.observed.push(attempt);
        }
        self.inner.transfer_from(asset, spender, owner, recipient, amount)
    }

    fn transfer(&mut self, asset: &AssetId, sender: &Address, recipient: &Address, amount: u128) -> bool {
        self.inner.transfer(asset, sender, recipient, amount)
    }
}

impl Journaled for ReentrantBank {
    type Checkpoint = CollateralBank;

    fn checkpoint(&self) -> Self::Checkpoint {
        self.inner.clone()
    }

    fn rollback(&mut self, checkpoint: Self::Checkpoint) {
        self.inner = checkpoint;
    }
}

#[test]
fn test_nested_entry_is_rejected() {
    let bank = ReentrantBank {
        inner: funded_bank(),
        lock: None,
        observed: Vec::new(),
    };
    let mut engine = DscEngine::new(&config(), oracle(2_000), bank, StableToken::new(custody())).unwrap();
    let lock = engine.reentrancy_lock();
    engine.collateral_bank_mut().lock = Some(lock.clone());

    engine.deposit_collateral(&alice(), &weth(), WAD).unwrap();
    assert_eq!(engine.collateral_bank().observed, vec![Err(Error::Reentrancy)]);
    assert!(!lock.is_entered());

    // An outside holder of the flag blocks every mutating call
    let held = lock.enter().unwrap();
    assert_eq!(engine.deposit_collateral(&alice(), &weth(), WAD), Err(Error::Reentrancy));
    drop(held);
    engine.deposit_collateral(&alice(), &weth(), WAD).unwrap();
    assert_eq!(engine.collateral_balance(&alice(), &weth()), 2 * WAD);
}

#[test]
fn test_protocol_collateralization_tracks_prices() {
    let mut engine = engine_at(2_000);
    assert_eq!(engine.protocol_collateralization().unwrap(), None);

    engine
        .deposit_collateral_and_mint(&alice(), &weth(), WAD, 1_000 * WAD)
        .unwrap();
    assert_eq!(engine.protocol_collateralization().unwrap(), Some(2 * WAD));

    set_eth_price(&mut engine, 1_000);
    assert_eq!(engine.protocol_collateralization().unwrap(), Some(WAD));
    assert!(engine.is_protocol_insolvent().unwrap());
}

#[test]
fn test_ledger_snapshot_survives_round_trip() {
    let mut engine = engine_at(2_000);
    engine
        .deposit_collateral_and_mint(&alice(), &weth(), 3 * WAD, 100 * WAD)
        .unwrap();
    let bytes = engine.ledger().to_bytes().unwrap();
    let restored = dsc_engine::core::ledger::AccountLedger::from_bytes(&bytes).unwrap();
    assert_eq!(&restored, engine.ledger());
}
