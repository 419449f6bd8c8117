//! Scenario files for the `dsc` binary.
//!
//! A scenario describes an engine (collateral, feeds, parameters), a set of
//! named actors with starting collateral balances, and an ordered list of
//! steps. Amounts and prices are decimal strings at the working scale.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::cli::{CliError, CliResult};
use crate::core::collateral::{AssetTransfer, CollateralBank};
use crate::core::config::{EngineConfig, EngineParams};
use crate::core::engine::DscEngine;
use crate::core::registry::{AssetId, FeedId};
use crate::core::token::{StableToken, StableUnitLedger};
use crate::error::Error;
use crate::oracle::{StalenessGuard, StaticPriceOracle};
use crate::utils::constants::WAD_DECIMALS;
use crate::utils::crypto::Address;
use crate::utils::math::{format_units, parse_units};

/// Engine type driven by scenarios
pub type ScenarioEngine = DscEngine<StalenessGuard<StaticPriceOracle>, CollateralBank, StableToken>;

// ═══════════════════════════════════════════════════════════════════════════════
// SCENARIO MODEL
// ═══════════════════════════════════════════════════════════════════════════════

/// One approved collateral and its opening price
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollateralSpec {
    /// Asset identifier
    pub asset: String,
    /// Price feed identifier
    pub feed: String,
    /// Opening USD price, e.g. "2000"
    pub price: String,
}

/// Named participant with starting wallet balances
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorSpec {
    /// Actor name; the address is derived from it
    pub name: String,
    /// Asset -> amount held before the first step
    #[serde(default)]
    pub balances: BTreeMap<String, String>,
}

/// A single engine interaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum Step {
    /// Publish a new price
    SetPrice {
        /// Feed to update
        feed: String,
        /// USD price
        price: String,
    },
    /// Deposit collateral
    Deposit {
        /// Acting actor
        actor: String,
        /// Collateral asset
        asset: String,
        /// Amount deposited
        amount: String,
    },
    /// Mint stable units
    Mint {
        /// Acting actor
        actor: String,
        /// Amount minted
        amount: String,
    },
    /// Deposit and mint atomically
    DepositAndMint {
        /// Acting actor
        actor: String,
        /// Collateral asset
        asset: String,
        /// Amount deposited
        collateral: String,
        /// Amount minted
        mint: String,
    },
    /// Repay own debt
    Burn {
        /// Acting actor
        actor: String,
        /// Amount burned
        amount: String,
    },
    /// Withdraw collateral
    Redeem {
        /// Acting actor
        actor: String,
        /// Collateral asset
        asset: String,
        /// Amount withdrawn
        amount: String,
    },
    /// Repay then withdraw atomically
    RedeemForStable {
        /// Acting actor
        actor: String,
        /// Collateral asset
        asset: String,
        /// Amount withdrawn
        collateral: String,
        /// Amount burned
        burn: String,
    },
    /// Cover another account's debt
    Liquidate {
        /// Repaying actor
        liquidator: String,
        /// Unhealthy actor
        target: String,
        /// Collateral seized
        asset: String,
        /// Debt covered
        debt: String,
    },
}

impl Step {
    /// One-line description
    pub fn describe(&self) -> String {
        match self {
            Step::SetPrice { feed, price } => format!("set {} to ${}", feed, price),
            Step::Deposit { actor, asset, amount } => format!("{} deposits {} {}", actor, amount, asset),
            Step::Mint { actor, amount } => format!("{} mints {}", actor, amount),
            Step::DepositAndMint {
                actor,
                asset,
                collateral,
                mint,
            } => format!("{} deposits {} {} and mints {}", actor, collateral, asset, mint),
            Step::Burn { actor, amount } => format!("{} burns {}", actor, amount),
            Step::Redeem { actor, asset, amount } => format!("{} redeems {} {}", actor, amount, asset),
            Step::RedeemForStable {
                actor,
                asset,
                collateral,
                burn,
            } => format!("{} burns {} and redeems {} {}", actor, burn, collateral, asset),
            Step::Liquidate {
                liquidator,
                target,
                asset,
                debt,
            } => format!("{} liquidates {} covering {} in {}", liquidator, target, debt, asset),
        }
    }
}

/// Complete scenario file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario name
    pub name: String,
    /// Label of the engine's custody principal
    #[serde(default = "default_engine_label")]
    pub engine: String,
    /// Approved collateral
    pub collateral: Vec<CollateralSpec>,
    /// Risk parameters
    #[serde(default)]
    pub params: EngineParams,
    /// Participants
    pub actors: Vec<ActorSpec>,
    /// Steps in execution order
    pub steps: Vec<Step>,
}

fn default_engine_label() -> String {
    "engine".into()
}

impl Scenario {
    /// Load from a JSON file
    pub fn load(path: impl AsRef<Path>) -> CliResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| CliError::Io(format!("{}: {}", path.as_ref().display(), e)))?;
        serde_json::from_str(&content).map_err(|e| CliError::Scenario(e.to_string()))
    }

    /// Save to a JSON file
    pub fn save(&self, path: impl AsRef<Path>) -> CliResult<()> {
        let content = serde_json::to_string_pretty(self).map_err(|e| CliError::Scenario(e.to_string()))?;
        std::fs::write(path.as_ref(), content).map_err(|e| CliError::Io(e.to_string()))
    }

    /// Price crash followed by a liquidation
    pub fn sample() -> Self {
        let wallet = |amount: &str| BTreeMap::from([("WETH".to_string(), amount.to_string())]);
        Self {
            name: "eth-crash".into(),
            engine: default_engine_label(),
            collateral: vec![
                CollateralSpec {
                    asset: "WETH".into(),
                    feed: "ETH/USD".into(),
                    price: "2000".into(),
                },
                CollateralSpec {
                    asset: "WBTC".into(),
                    feed: "BTC/USD".into(),
                    price: "1000".into(),
                },
            ],
            params: EngineParams::default(),
            actors: vec![
                ActorSpec {
                    name: "alice".into(),
                    balances: wallet("10"),
                },
                ActorSpec {
                    name: "bob".into(),
                    balances: wallet("50"),
                },
            ],
            steps: vec![
                Step::DepositAndMint {
                    actor: "alice".into(),
                    asset: "WETH".into(),
                    collateral: "10".into(),
                    mint: "100".into(),
                },
                Step::DepositAndMint {
                    actor: "bob".into(),
                    asset: "WETH".into(),
                    collateral: "20".into(),
                    mint: "100".into(),
                },
                Step::Mint {
                    actor: "alice".into(),
                    amount: "20000".into(),
                },
                Step::SetPrice {
                    feed: "ETH/USD".into(),
                    price: "18".into(),
                },
                Step::Liquidate {
                    liquidator: "bob".into(),
                    target: "alice".into(),
                    asset: "WETH".into(),
                    debt: "100".into(),
                },
            ],
        }
    }

    /// Engine configuration described by this scenario
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig::new(
            Address::from_label(&self.engine),
            self.collateral.iter().map(|c| AssetId::new(&c.asset)).collect(),
            self.collateral.iter().map(|c| FeedId::new(&c.feed)).collect(),
        )
        .with_params(self.params)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// REPORT
// ═══════════════════════════════════════════════════════════════════════════════

/// Outcome of one step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepReport {
    /// Position in the scenario (1-based)
    pub index: usize,
    /// Human-readable step
    pub description: String,
    /// Whether the step committed
    pub ok: bool,
    /// Error code when rejected
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<u32>,
    /// Error message when rejected
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// End-of-run view of an actor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSummary {
    /// Actor name
    pub actor: String,
    /// Derived address
    pub address: String,
    /// Deposited collateral per asset
    pub collateral: BTreeMap<String, String>,
    /// Outstanding debt
    pub debt: String,
    /// USD value of deposits, or the error preventing valuation
    pub collateral_value_usd: String,
    /// Health factor, or the error preventing evaluation
    pub health_factor: String,
    /// Stable units held
    pub stable_balance: String,
    /// Collateral assets held outside the engine
    pub wallet: BTreeMap<String, String>,
}

/// Full result of a scenario run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioReport {
    /// Scenario name
    pub scenario: String,
    /// Per-step outcomes
    pub steps: Vec<StepReport>,
    /// Per-actor summaries
    pub accounts: Vec<AccountSummary>,
    /// Events emitted by committed steps
    pub events: usize,
    /// Whether the event hash chain verifies
    pub chain_valid: bool,
}

impl ScenarioReport {
    /// Number of rejected steps
    pub fn failures(&self) -> usize {
        self.steps.iter().filter(|s| !s.ok).count()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// RUNNER
// ═══════════════════════════════════════════════════════════════════════════════

/// Executes a scenario against a fresh engine
#[derive(Debug)]
pub struct ScenarioRunner {
    scenario: Scenario,
    engine: ScenarioEngine,
}

impl ScenarioRunner {
    /// Build the engine, publish opening prices and fund actors.
    ///
    /// Actors approve the engine for all of their collateral and stable units
    /// up front, so steps only fail on engine rules.
    pub fn new(scenario: Scenario) -> CliResult<Self> {
        let config = scenario.engine_config();
        let custody = config.engine_address;

        let mut oracle = StaticPriceOracle::new();
        for spec in &scenario.collateral {
            oracle.set_price(&FeedId::new(&spec.feed), to_price(&spec.price)?, WAD_DECIMALS);
        }

        let mut bank = CollateralBank::new();
        let mut stable = StableToken::new(custody);
        for actor in &scenario.actors {
            let address = Address::from_label(&actor.name);
            for (asset, amount) in &actor.balances {
                let asset = AssetId::new(asset);
                bank.mint_to(&asset, &address, parse_units(amount)?);
            }
            for spec in &scenario.collateral {
                bank.approve(&AssetId::new(&spec.asset), &address, &custody, u128::MAX);
            }
            stable.approve(&address, &custody, u128::MAX);
        }

        let engine = DscEngine::new(&config, StalenessGuard::new(oracle), bank, stable)?;
        Ok(Self { scenario, engine })
    }

    /// Engine being driven
    pub fn engine(&self) -> &ScenarioEngine {
        &self.engine
    }

    /// Apply every step, recording rejections without stopping
    pub fn run(&mut self) -> CliResult<ScenarioReport> {
        let steps = self.scenario.steps.clone();
        let mut reports = Vec::with_capacity(steps.len());
        for (i, step) in steps.iter().enumerate() {
            let result = self.apply(step);
            let (ok, code, error) = match result {
                Ok(()) => (true, None, None),
                Err(CliError::Engine(e)) => (false, Some(e.code()), Some(e.to_string())),
                Err(other) => return Err(other),
            };
            reports.push(StepReport {
                index: i + 1,
                description: step.describe(),
                ok,
                code,
                error,
            });
        }

        Ok(ScenarioReport {
            scenario: self.scenario.name.clone(),
            steps: reports,
            accounts: self.summaries(),
            events: self.engine.events().len(),
            chain_valid: self.engine.events().verify_chain(),
        })
    }

    fn apply(&mut self, step: &Step) -> CliResult<()> {
        let who = |name: &str| Address::from_label(name);
        match step {
            Step::SetPrice { feed, price } => {
                let feed = FeedId::new(feed);
                let price = to_price(price)?;
                self.engine
                    .oracle_mut()
                    .inner_mut()
                    .set_price(&feed, price, WAD_DECIMALS);
            }
            Step::Deposit { actor, asset, amount } => {
                self.engine
                    .deposit_collateral(&who(actor), &AssetId::new(asset), parse_units(amount)?)?;
            }
            Step::Mint { actor, amount } => {
                self.engine.mint(&who(actor), parse_units(amount)?)?;
            }
            Step::DepositAndMint {
                actor,
                asset,
                collateral,
                mint,
            } => {
                self.engine.deposit_collateral_and_mint(
                    &who(actor),
                    &AssetId::new(asset),
                    parse_units(collateral)?,
                    parse_units(mint)?,
                )?;
            }
            Step::Burn { actor, amount } => {
                self.engine.burn(&who(actor), parse_units(amount)?)?;
            }
            Step::Redeem { actor, asset, amount } => {
                self.engine
                    .redeem_collateral(&who(actor), &AssetId::new(asset), parse_units(amount)?)?;
            }
            Step::RedeemForStable {
                actor,
                asset,
                collateral,
                burn,
            } => {
                self.engine.redeem_collateral_for_stable(
                    &who(actor),
                    &AssetId::new(asset),
                    parse_units(collateral)?,
                    parse_units(burn)?,
                )?;
            }
            Step::Liquidate {
                liquidator,
                target,
                asset,
                debt,
            } => {
                self.engine.liquidate(
                    &who(liquidator),
                    &AssetId::new(asset),
                    &who(target),
                    parse_units(debt)?,
                )?;
            }
        }
        Ok(())
    }

    fn summaries(&self) -> Vec<AccountSummary> {
        self.scenario
            .actors
            .iter()
            .map(|actor| {
                let address = Address::from_label(&actor.name);
                let collateral = self
                    .engine
                    .collateral_assets()
                    .iter()
                    .map(|asset| {
                        let amount = self.engine.collateral_balance(&address, asset);
                        (asset.to_string(), format_units(amount))
                    })
                    .collect();
                let wallet = self
                    .engine
                    .collateral_assets()
                    .iter()
                    .map(|asset| (asset.to_string(), format_units(wallet_balance(&self.engine, &address, asset))))
                    .collect();
                AccountSummary {
                    actor: actor.name.clone(),
                    address: address.to_hex(),
                    collateral,
                    debt: format_units(self.engine.debt_of(&address)),
                    collateral_value_usd: describe(self.engine.account_collateral_value(&address).map(format_units)),
                    health_factor: describe(self.engine.health_factor(&address).map(|hf| hf.to_string())),
                    stable_balance: format_units(self.engine.stable_unit().balance_of(&address)),
                    wallet,
                }
            })
            .collect()
    }
}

fn wallet_balance(engine: &ScenarioEngine, owner: &Address, asset: &AssetId) -> u128 {
    engine.collateral_bank().balance_of(asset, owner)
}

fn to_price(value: &str) -> CliResult<i128> {
    let wad = parse_units(value)?;
    i128::try_from(wad).map_err(|_| CliError::InvalidArgument(format!("price out of range: {}", value)))
}

fn describe(value: Result<String, Error>) -> String {
    value.unwrap_or_else(|e| format!("error {}: {}", e.code(), e))
}
