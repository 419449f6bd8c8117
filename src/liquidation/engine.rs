//! Liquidation of under-margined accounts.
//!
//! Any caller may repay part of an unhealthy account's debt with its own
//! stable units and receive the equivalent collateral plus a bonus:
//! - Sizing via [`DscEngine::quote_liquidation`]
//! - Execution via [`DscEngine::liquidate`]
//! - Detection via [`DscEngine::liquidatable_accounts`]

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::core::collateral::AssetTransfer;
use crate::core::engine::{DscEngine, HealthFactor};
use crate::core::journal::Journaled;
use crate::core::registry::AssetId;
use crate::core::token::StableUnitLedger;
use crate::error::{Error, Result};
use crate::oracle::PriceOracle;
use crate::utils::crypto::Address;
use crate::utils::math::{liquidation_bonus, safe_add};

// ═══════════════════════════════════════════════════════════════════════════════
// LIQUIDATION QUOTE
// ═══════════════════════════════════════════════════════════════════════════════

/// Collateral owed to a liquidator for covering a given debt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidationQuote {
    /// Stable units repaid on the target's behalf
    pub debt_to_cover: u128,
    /// Asset quantity worth `debt_to_cover` at the current price
    pub base_collateral: u128,
    /// Incentive on top of the base amount
    pub bonus_collateral: u128,
    /// Total seized from the target
    pub total_collateral: u128,
}

/// Result of a committed liquidation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidationOutcome {
    /// Sizing that was executed
    pub quote: LiquidationQuote,
    /// Target's factor before the liquidation
    pub starting_health_factor: HealthFactor,
    /// Target's factor after the liquidation
    pub ending_health_factor: HealthFactor,
}

// ═══════════════════════════════════════════════════════════════════════════════
// LIQUIDATION
// ═══════════════════════════════════════════════════════════════════════════════

impl<O, B, S> DscEngine<O, B, S>
where
    O: PriceOracle,
    B: AssetTransfer + Journaled,
    S: StableUnitLedger + Journaled,
{
    /// Size a liquidation of `debt_to_cover` paid out in `asset`
    pub fn quote_liquidation(&self, asset: &AssetId, debt_to_cover: u128) -> Result<LiquidationQuote> {
        let base_collateral = self.token_amount_from_usd(asset, debt_to_cover)?;
        let params = self.params();
        let bonus_collateral =
            liquidation_bonus(base_collateral, params.liquidation_bonus, params.liquidation_precision)?;
        Ok(LiquidationQuote {
            debt_to_cover,
            base_collateral,
            bonus_collateral,
            total_collateral: safe_add(base_collateral, bonus_collateral)?,
        })
    }

    /// Repay `debt_to_cover` of `target`'s debt from `liquidator`'s stable
    /// units and seize the quoted collateral in `asset`.
    ///
    /// The liquidator must have approved the engine to pull the stable units.
    /// The whole operation reverts unless the target was unhealthy, its
    /// factor strictly improves, and the liquidator stays healthy.
    pub fn liquidate(
        &mut self,
        liquidator: &Address,
        asset: &AssetId,
        target: &Address,
        debt_to_cover: u128,
    ) -> Result<LiquidationOutcome> {
        let outcome = self.transact("liquidate", |engine| {
            if debt_to_cover == 0 {
                return Err(Error::NonPositiveAmount);
            }
            let starting = engine.health_factor(target)?;
            if !starting.is_below(engine.params().min_health_factor) {
                return Err(Error::HealthFactorOk);
            }

            let quote = engine.quote_liquidation(asset, debt_to_cover)?;
            let available = engine.collateral_balance(target, asset);
            if quote.total_collateral > available {
                return Err(Error::LiquidationUnderwater {
                    required: quote.total_collateral,
                    available,
                });
            }

            engine.redeem_inner(asset, quote.total_collateral, target, liquidator)?;
            engine.burn_inner(debt_to_cover, target, liquidator)?;

            let ending = engine.health_factor(target)?;
            if ending <= starting {
                return Err(Error::HealthFactorNotImproved);
            }
            engine.revert_if_health_factor_broken(liquidator)?;

            Ok(LiquidationOutcome {
                quote,
                starting_health_factor: starting,
                ending_health_factor: ending,
            })
        })?;

        info!(
            liquidator = %liquidator.short(),
            target = %target.short(),
            asset = %asset,
            debt_covered = outcome.quote.debt_to_cover,
            seized = outcome.quote.total_collateral,
            from = %outcome.starting_health_factor,
            to = %outcome.ending_health_factor,
            "account liquidated"
        );
        Ok(outcome)
    }

    /// Indebted accounts below the minimum factor, worst first
    pub fn liquidatable_accounts(&self) -> Result<Vec<(Address, u128)>> {
        let min = self.params().min_health_factor;
        let mut found = Vec::new();
        for account in self.ledger().debtors() {
            if let HealthFactor::Finite(factor) = self.health_factor(account)? {
                if factor < min {
                    found.push((*account, factor));
                }
            }
        }
        found.sort_by(|a, b| a.1.cmp(&b.1).then(a.0.cmp(&b.0)));
        Ok(found)
    }
}
