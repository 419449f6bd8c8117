//! Engine configuration and parameters.
//!
//! [`EngineParams`] holds the risk constants; [`EngineConfig`] is the
//! construction-time description of an engine (custody address, approved
//! collateral with its price feeds, parameters) and can be loaded from JSON.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::registry::{AssetId, CollateralRegistry, FeedId};
use crate::error::{Error, Result};
use crate::utils::constants::*;
use crate::utils::crypto::Address;

// ═══════════════════════════════════════════════════════════════════════════════
// ENGINE PARAMETERS
// ═══════════════════════════════════════════════════════════════════════════════

/// Risk parameters fixed at construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineParams {
    /// Share of collateral value counted toward the health factor,
    /// over `liquidation_precision`
    pub liquidation_threshold: u128,

    /// Liquidator bonus over `liquidation_precision`
    pub liquidation_bonus: u128,

    /// Denominator for threshold and bonus
    pub liquidation_precision: u128,

    /// Health factor below which a position is liquidatable
    pub min_health_factor: u128,

    /// Working scale
    pub precision: u128,
}

impl Default for EngineParams {
    fn default() -> Self {
        Self {
            liquidation_threshold: LIQUIDATION_THRESHOLD,
            liquidation_bonus: LIQUIDATION_BONUS,
            liquidation_precision: LIQUIDATION_PRECISION,
            min_health_factor: MIN_HEALTH_FACTOR,
            precision: PRECISION,
        }
    }
}

impl EngineParams {
    /// Override the liquidation threshold (for testing)
    pub fn with_threshold(mut self, threshold: u128) -> Self {
        self.liquidation_threshold = threshold;
        self
    }

    /// Override the liquidation bonus (for testing)
    pub fn with_bonus(mut self, bonus: u128) -> Self {
        self.liquidation_bonus = bonus;
        self
    }

    /// Validate parameters are consistent
    pub fn validate(&self) -> Result<()> {
        let invalid = |name: &str, reason: &str| {
            Err(Error::InvalidParameter {
                name: name.into(),
                reason: reason.into(),
            })
        };
        if self.liquidation_precision == 0 {
            return invalid("liquidation_precision", "cannot be zero");
        }
        if self.precision == 0 {
            return invalid("precision", "cannot be zero");
        }
        if self.liquidation_threshold == 0 || self.liquidation_threshold > self.liquidation_precision {
            return invalid("liquidation_threshold", "must be in (0, liquidation_precision]");
        }
        if self.liquidation_bonus >= self.liquidation_precision {
            return invalid("liquidation_bonus", "must be below liquidation_precision");
        }
        if self.min_health_factor == 0 {
            return invalid("min_health_factor", "cannot be zero");
        }
        Ok(())
    }

    /// Largest debt a given collateral value supports at the minimum health factor
    pub fn max_debt_for(&self, collateral_usd: u128) -> Result<u128> {
        let adjusted = crate::utils::math::mul_div(
            collateral_usd,
            self.liquidation_threshold,
            self.liquidation_precision,
        )?;
        crate::utils::math::mul_div(adjusted, self.precision, self.min_health_factor)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// ENGINE CONFIGURATION
// ═══════════════════════════════════════════════════════════════════════════════

/// Construction-time engine description
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Custody principal of the engine (also the stable unit owner)
    pub engine_address: Address,

    /// Approved collateral, in enumeration order
    pub collateral_assets: Vec<AssetId>,

    /// Price feed of each collateral, same order and length
    pub price_feeds: Vec<FeedId>,

    /// Risk parameters
    #[serde(default)]
    pub params: EngineParams,
}

impl EngineConfig {
    /// Create a configuration with default parameters
    pub fn new(engine_address: Address, collateral_assets: Vec<AssetId>, price_feeds: Vec<FeedId>) -> Self {
        Self {
            engine_address,
            collateral_assets,
            price_feeds,
            params: EngineParams::default(),
        }
    }

    /// Replace parameters
    pub fn with_params(mut self, params: EngineParams) -> Self {
        self.params = params;
        self
    }

    /// Build the collateral registry (rejects mismatched lists)
    pub fn build_registry(&self) -> Result<CollateralRegistry> {
        CollateralRegistry::new(self.collateral_assets.clone(), self.price_feeds.clone())
    }

    /// Check the whole configuration
    pub fn validate(&self) -> Result<()> {
        if self.engine_address.is_zero() {
            return Err(Error::InvalidConfiguration("engine address cannot be zero".into()));
        }
        self.build_registry()?;
        self.params.validate()
    }

    /// Load from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| Error::InvalidConfiguration(format!("{}: {}", path.as_ref().display(), e)))?;
        serde_json::from_str(&content).map_err(|e| Error::Deserialization(e.to_string()))
    }

    /// Save to a JSON file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = serde_json::to_string_pretty(self).map_err(|e| Error::Serialization(e.to_string()))?;
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent).map_err(|e| Error::Serialization(e.to_string()))?;
        }
        std::fs::write(path.as_ref(), content).map_err(|e| Error::Serialization(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> EngineConfig {
        EngineConfig::new(
            Address::from_label("engine"),
            vec!["WETH".into(), "WBTC".into()],
            vec!["ETH/USD".into(), "BTC/USD".into()],
        )
    }

    #[test]
    fn test_default_params_valid() {
        let params = EngineParams::default();
        assert!(params.validate().is_ok());
        assert_eq!(params.liquidation_threshold, 50);
        assert_eq!(params.liquidation_bonus, 10);
        assert_eq!(params.min_health_factor, PRECISION);
    }

    #[test]
    fn test_invalid_params() {
        assert!(EngineParams::default().with_threshold(0).validate().is_err());
        assert!(EngineParams::default().with_threshold(101).validate().is_err());
        assert!(EngineParams::default().with_bonus(100).validate().is_err());
        let zero_precision = EngineParams {
            liquidation_precision: 0,
            ..Default::default()
        };
        assert!(zero_precision.validate().is_err());
    }

    #[test]
    fn test_max_debt_for() {
        // $150 of collateral at 50% supports $75
        let params = EngineParams::default();
        assert_eq!(params.max_debt_for(150 * PRECISION).unwrap(), 75 * PRECISION);
    }

    #[test]
    fn test_config_validate() {
        assert!(config().validate().is_ok());

        let mut mismatched = config();
        mismatched.price_feeds.pop();
        assert!(matches!(mismatched.validate(), Err(Error::InvalidConfiguration(_))));

        let mut zero = config();
        zero.engine_address = Address::ZERO;
        assert!(zero.validate().is_err());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("engine.json");

        let original = config().with_params(EngineParams::default().with_bonus(5));
        original.save(&path).unwrap();
        let loaded = EngineConfig::load(&path).unwrap();
        assert_eq!(loaded, original);
    }

    #[test]
    fn test_params_default_when_missing() {
        let json = format!(
            r#"{{"engine_address":"{}","collateral_assets":["WETH"],"price_feeds":["ETH/USD"]}}"#,
            Address::from_label("engine")
        );
        let cfg: EngineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(cfg.params, EngineParams::default());
    }
}
